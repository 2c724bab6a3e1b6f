//! Logical-time scheduler for delayed and periodic payloads
//!
//! All boss choreography waits go through here instead of ad-hoc timers.
//! Each scheduled payload gets a handle for individual cancellation, and
//! the whole outstanding batch can be invalidated at once by bumping a
//! generation counter - entering the weak state cancels everything the
//! boss had in flight without enumerating it.

use crate::core::types::Tick;

/// Handle to one scheduled payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle {
    id: u64,
    generation: u64,
}

#[derive(Debug)]
struct Scheduled<T> {
    id: u64,
    generation: u64,
    due: Tick,
    /// Re-queue interval for periodic payloads
    every: Option<Tick>,
    payload: T,
}

/// Tick-driven scheduler owning payloads of type T
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Tick,
    next_id: u64,
    generation: u64,
    tasks: Vec<Scheduled<T>>,
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Scheduler whose clock begins at `now` rather than zero, for owners
    /// created mid-simulation
    pub fn starting_at(now: Tick) -> Self {
        Self {
            now,
            next_id: 0,
            generation: 0,
            tasks: Vec::new(),
        }
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    /// Schedule a payload to fire once, `delay` ticks from now
    pub fn schedule_in(&mut self, delay: Tick, payload: T) -> TaskHandle {
        self.push(self.now + delay, None, payload)
    }

    /// Schedule a payload to fire every `interval` ticks, starting one
    /// interval from now
    pub fn schedule_every(&mut self, interval: Tick, payload: T) -> TaskHandle {
        let interval = interval.max(1);
        self.push(self.now + interval, Some(interval), payload)
    }

    fn push(&mut self, due: Tick, every: Option<Tick>, payload: T) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.tasks.push(Scheduled {
            id,
            generation: self.generation,
            due,
            every,
            payload,
        });
        TaskHandle {
            id,
            generation: self.generation,
        }
    }

    /// Cancel one payload. Returns false if it already fired, was canceled,
    /// or belongs to an invalidated generation.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        if handle.generation != self.generation {
            return false;
        }
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != handle.id);
        self.tasks.len() < before
    }

    /// Invalidate every outstanding payload at once
    ///
    /// O(1): bumps the generation; stale entries are dropped lazily on the
    /// next advance. Payloads scheduled after this call are unaffected.
    pub fn cancel_all(&mut self) {
        self.generation += 1;
    }

    /// Count of live (current-generation) payloads
    pub fn pending(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.generation == self.generation)
            .count()
    }

    /// Advance the clock to `now` and collect every payload that came due,
    /// in (due tick, schedule order) order. Stale-generation entries are
    /// discarded here without firing.
    pub fn advance(&mut self, now: Tick) -> Vec<T> {
        self.now = now;
        let generation = self.generation;

        self.tasks.retain(|t| t.generation == generation);

        let mut due: Vec<&mut Scheduled<T>> = self
            .tasks
            .iter_mut()
            .filter(|t| t.due <= now)
            .collect();
        due.sort_by_key(|t| (t.due, t.id));

        let mut fired = Vec::with_capacity(due.len());
        for task in due {
            fired.push(task.payload.clone());
            if let Some(interval) = task.every {
                // Periodic: push the due tick forward instead of removing
                task.due = now + interval;
            }
        }

        // One-shot payloads that just fired still have due <= now; periodic
        // ones were pushed past it above
        self.tasks.retain(|t| t.due > now);

        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_at_due_tick() {
        let mut scheduler: Scheduler<&str> = Scheduler::new();
        scheduler.schedule_in(5, "boom");

        assert!(scheduler.advance(4).is_empty());
        assert_eq!(scheduler.advance(5), vec!["boom"]);
        assert!(scheduler.advance(6).is_empty());
    }

    #[test]
    fn test_fires_in_due_then_insertion_order() {
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        scheduler.schedule_in(10, 3);
        scheduler.schedule_in(5, 1);
        scheduler.schedule_in(5, 2);

        assert_eq!(scheduler.advance(10), vec![1, 2, 3]);
    }

    #[test]
    fn test_cancel_single() {
        let mut scheduler: Scheduler<&str> = Scheduler::new();
        let keep = scheduler.schedule_in(3, "keep");
        let drop = scheduler.schedule_in(3, "drop");

        assert!(scheduler.cancel(drop));
        assert!(!scheduler.cancel(drop));
        let _ = keep;

        assert_eq!(scheduler.advance(3), vec!["keep"]);
    }

    #[test]
    fn test_cancel_all_invalidates_everything() {
        let mut scheduler: Scheduler<u32> = Scheduler::new();
        for i in 0..5 {
            scheduler.schedule_in(i + 1, i as u32);
        }
        assert_eq!(scheduler.pending(), 5);

        scheduler.cancel_all();
        assert_eq!(scheduler.pending(), 0);
        assert!(scheduler.advance(100).is_empty());
    }

    #[test]
    fn test_schedule_after_cancel_all_survives() {
        let mut scheduler: Scheduler<&str> = Scheduler::new();
        scheduler.schedule_in(10, "stale");
        scheduler.cancel_all();
        scheduler.schedule_in(10, "fresh");

        assert_eq!(scheduler.advance(10), vec!["fresh"]);
    }

    #[test]
    fn test_stale_handle_cannot_cancel_fresh_task() {
        let mut scheduler: Scheduler<&str> = Scheduler::new();
        let stale = scheduler.schedule_in(10, "stale");
        scheduler.cancel_all();
        scheduler.schedule_in(10, "fresh");

        assert!(!scheduler.cancel(stale));
        assert_eq!(scheduler.advance(10), vec!["fresh"]);
    }

    #[test]
    fn test_periodic_requeues() {
        let mut scheduler: Scheduler<&str> = Scheduler::new();
        scheduler.schedule_every(10, "tick");

        assert_eq!(scheduler.advance(10), vec!["tick"]);
        assert!(scheduler.advance(15).is_empty());
        assert_eq!(scheduler.advance(20), vec!["tick"]);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_periodic_stops_on_cancel_all() {
        let mut scheduler: Scheduler<&str> = Scheduler::new();
        scheduler.schedule_every(10, "tick");
        assert_eq!(scheduler.advance(10), vec!["tick"]);

        scheduler.cancel_all();
        assert!(scheduler.advance(20).is_empty());
        assert!(scheduler.advance(30).is_empty());
    }

    #[test]
    fn test_starting_at_offsets_delays() {
        let mut scheduler: Scheduler<&str> = Scheduler::starting_at(500);
        scheduler.schedule_in(10, "late");
        assert!(scheduler.advance(505).is_empty());
        assert_eq!(scheduler.advance(510), vec!["late"]);
    }

    #[test]
    fn test_many_independent_timers() {
        let mut scheduler: Scheduler<usize> = Scheduler::new();
        for i in 0..5 {
            scheduler.schedule_in(10 + i as Tick * 3, i);
        }

        let mut fired = Vec::new();
        for now in 0..30 {
            fired.extend(scheduler.advance(now));
        }
        assert_eq!(fired, vec![0, 1, 2, 3, 4]);
        assert_eq!(scheduler.pending(), 0);
    }
}
