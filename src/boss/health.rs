//! Boss health pool and phase escalation
//!
//! Owns every mutation of health and the phase counters. Callers report
//! whether the boss is currently weak (a state the behavior machine owns)
//! and receive an outcome describing what the hit actually did; emitting
//! the matching notifications is the composition root's job.

use crate::core::config::EncounterConfig;
use crate::core::types::{ticks, PhaseNumber, Tick};

/// What one damage application did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DamageOutcome {
    /// Health actually removed after every clamp and gate
    pub applied: i32,
    /// Set when this hit crossed a phase threshold
    pub phase_advanced: Option<PhaseNumber>,
    /// Set when this hit reduced health to zero
    pub defeated: bool,
}

impl DamageOutcome {
    fn rejected() -> Self {
        Self::default()
    }
}

/// Health pool with per-phase damage gating and the weak-state finishing
/// budget
#[derive(Debug, Clone)]
pub struct BossHealth {
    max_health: i32,
    current: i32,

    /// Phase boundaries, highest first; crossing boundary `i` from above
    /// advances phase i+1 -> i+2
    thresholds: Vec<i32>,
    phase: PhaseNumber,

    /// Damage landed since the phase began; hits are ignored once this
    /// reaches the gate
    damage_this_phase: i32,
    phase_damage_gate: i32,

    /// Cumulative finishing damage this weak state
    weak_click_total: i32,
    weak_click_budget: i32,

    invulnerable_until: Tick,
    invulnerable_ticks: Tick,

    defeated: bool,
}

impl BossHealth {
    pub fn from_config(config: &EncounterConfig) -> Self {
        Self::new(
            config.max_health,
            vec![config.phase_two_threshold, config.phase_three_threshold],
            config.phase_damage_gate,
            config.weak_click_budget,
            ticks(config.invulnerable_secs),
        )
    }

    pub fn new(
        max_health: i32,
        thresholds: Vec<i32>,
        phase_damage_gate: i32,
        weak_click_budget: i32,
        invulnerable_ticks: Tick,
    ) -> Self {
        Self {
            max_health,
            current: max_health,
            thresholds,
            phase: 1,
            damage_this_phase: 0,
            phase_damage_gate,
            weak_click_total: 0,
            weak_click_budget,
            invulnerable_until: 0,
            invulnerable_ticks,
            defeated: false,
        }
    }

    /// Apply one hit. `is_finishing` marks the small fixed-value hits only
    /// valid while weak; `in_weak_state` comes from the behavior machine.
    pub fn apply_damage(
        &mut self,
        mut amount: i32,
        is_finishing: bool,
        in_weak_state: bool,
        now: Tick,
    ) -> DamageOutcome {
        if self.defeated || amount <= 0 {
            return DamageOutcome::rejected();
        }

        // Finishing hits exist only inside the weak state
        if is_finishing && !in_weak_state {
            tracing::debug!("finishing hit outside weak state ignored");
            return DamageOutcome::rejected();
        }

        // Ordinary damage is rate-limited by the invulnerability window;
        // the weak state bypasses it
        if !in_weak_state && now < self.invulnerable_until {
            return DamageOutcome::rejected();
        }

        if in_weak_state && is_finishing {
            let remaining = self.weak_click_budget - self.weak_click_total;
            if remaining <= 0 {
                tracing::debug!("weak-state finishing budget exhausted, hit ignored");
                return DamageOutcome::rejected();
            }
            amount = amount.min(remaining);
            self.weak_click_total += amount;
        }

        // Phase damage gate: once the counter reaches the gate, nothing
        // more lands until the phase turns over
        if self.damage_this_phase >= self.phase_damage_gate {
            tracing::debug!(
                phase = self.phase,
                "phase damage gate reached, hit ignored"
            );
            return DamageOutcome::rejected();
        }

        let previous = self.current;
        self.current = (self.current - amount).max(0);
        let applied = previous - self.current;
        self.damage_this_phase += applied;

        if !in_weak_state {
            self.invulnerable_until = now + self.invulnerable_ticks;
        }

        let phase_advanced = self.check_phase_crossing(previous);

        if self.current == 0 {
            self.defeated = true;
            tracing::info!("boss defeated");
        }

        DamageOutcome {
            applied,
            phase_advanced,
            defeated: self.defeated,
        }
    }

    /// Advance at most one phase per hit, and only from the phase that owns
    /// the crossed boundary - the phase number never regresses
    fn check_phase_crossing(&mut self, previous: i32) -> Option<PhaseNumber> {
        let index = self.phase as usize - 1;
        let threshold = *self.thresholds.get(index)?;
        if previous > threshold && self.current <= threshold {
            self.phase += 1;
            self.damage_this_phase = 0;
            tracing::info!(phase = self.phase, health = self.current, "phase advanced");
            return Some(self.phase);
        }
        None
    }

    /// Called on weak-state entry; re-entry signals while already weak must
    /// not call this twice
    pub fn reset_weak_click_budget(&mut self) {
        self.weak_click_total = 0;
    }

    /// Restore health, clamped to max. No-op once defeated.
    pub fn heal(&mut self, amount: i32) {
        if self.defeated || amount <= 0 {
            return;
        }
        self.current = (self.current + amount).min(self.max_health);
    }

    pub fn current_health(&self) -> i32 {
        self.current
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn current_phase(&self) -> PhaseNumber {
        self.phase
    }

    pub fn damage_this_phase(&self) -> i32 {
        self.damage_this_phase
    }

    pub fn weak_click_total(&self) -> i32 {
        self.weak_click_total
    }

    pub fn is_defeated(&self) -> bool {
        self.defeated
    }
}
