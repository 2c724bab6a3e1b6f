//! Boss behavior state machine
//!
//! Owns the behavior state and everything timed: float motion, the
//! prepare/charge/attack cycle, attack sub-sequence choreography, and the
//! preemptible weak state. All waits go through the scheduler so that
//! weak-state entry can invalidate the whole batch at once.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::boss::attacks::{select_attack, AttackKind};
use crate::boss::phases::PhaseParameters;
use crate::boss::projectiles::{ProjectileField, ProjectileTuning};
use crate::core::config::EncounterConfig;
use crate::core::types::{ticks, PhaseNumber, PlayerView, ProjectileId, Tick, Vec2, TICK_DT};
use crate::events::{AnimationCue, Signal, SignalBus};
use crate::scheduler::Scheduler;

/// The one active behavior state of the boss
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BehaviorState {
    Idle,
    Floating,
    PreparingAttack,
    Charging,
    Attacking,
    Weak,
}

/// Timed continuations dispatched by the scheduler
#[derive(Debug, Clone)]
enum AiTask {
    /// Pre-cast delay elapsed: spawn the chosen attack payload, start charging
    BeginCast,
    /// Charge hold elapsed: record the attack, settle
    FinishCharge,
    /// Settle elapsed: back to floating
    FinishAttack,
    /// Release one held bomb of the volley toward the player
    ThrowBomb {
        id: ProjectileId,
        index: usize,
        last: bool,
    },
    /// Spawn one falling fist and fade out its warning marker
    DropFist { slot: usize, x: f32 },
    /// Weak duration elapsed: restore the snapshotted state
    ExitWeak,
    /// Post-phase-change pause elapsed: attacks allowed again
    ResumeAttacks,
}

/// Progress of the float drift between attacks
#[derive(Debug, Clone, Copy)]
enum FloatMotion {
    Travelling {
        from: Vec2,
        target: Vec2,
        elapsed: Tick,
        journey: Tick,
    },
    Pausing {
        until: Tick,
    },
}

/// Cubic ease-in-out, matching the float drift feel
fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// The boss AI: behavior state, attack cycle, and weak-state preemption
pub struct BossAi {
    config: EncounterConfig,
    /// Active phase parameter set, replaced wholesale on phase transitions
    params: PhaseParameters,
    phase: PhaseNumber,

    state: BehaviorState,
    /// State to restore when the weak state expires; recorded exactly once
    /// at interrupt time
    restore_state: Option<BehaviorState>,

    position: Vec2,
    /// Anchor new float targets are rolled around
    float_origin: Vec2,
    motion: FloatMotion,

    /// Tick of the last completed attack; the next one waits out the
    /// phase's cooldown from here
    last_attack_at: Tick,
    attack_enabled: bool,
    /// Set while a phase change waits for the player-grounded signal
    awaiting_grounded: bool,
    /// Set while a ResumeAttacks payload is outstanding, so weak-state
    /// cancellation can reschedule it on exit
    resume_pending: bool,

    selected_attack: Option<AttackKind>,
    confusion_ends_at: Option<Tick>,

    scheduler: Scheduler<AiTask>,
    projectiles: ProjectileField,
    rng: StdRng,
    active: bool,
}

impl BossAi {
    /// Create the AI at its spawn position, activated at tick `now`
    pub fn new(config: &EncounterConfig, spawn_position: Vec2, now: Tick) -> Self {
        Self::with_seed(config, spawn_position, now, 42)
    }

    /// Create with a specific RNG seed for deterministic behavior
    pub fn with_seed(config: &EncounterConfig, spawn_position: Vec2, now: Tick, seed: u64) -> Self {
        let position = config.arena.clamp(spawn_position);
        let params = config.phases.params_for(1).clone();
        let mut ai = Self {
            params,
            phase: 1,
            state: BehaviorState::Floating,
            restore_state: None,
            position,
            float_origin: position,
            motion: FloatMotion::Pausing { until: now },
            last_attack_at: now + ticks(config.initial_attack_delay_secs),
            attack_enabled: true,
            awaiting_grounded: false,
            resume_pending: false,
            selected_attack: None,
            confusion_ends_at: None,
            scheduler: Scheduler::starting_at(now),
            projectiles: ProjectileField::new(ProjectileTuning::from_config(config)),
            rng: StdRng::seed_from_u64(seed),
            active: true,
            config: config.clone(),
        };
        ai.start_float(now);
        ai
    }

    /// Advance one tick: dispatch due continuations first (state
    /// transitions land before this tick's cooldown check), then run the
    /// per-state update, then move the live projectiles.
    pub fn tick(&mut self, now: Tick, player: Option<PlayerView>, bus: &mut SignalBus) {
        if !self.active {
            return;
        }

        for task in self.scheduler.advance(now) {
            self.dispatch(task, now, player, bus);
        }

        self.check_confusion_expiry(now, bus);

        match self.state {
            BehaviorState::Floating => self.update_float(now, player, bus),
            BehaviorState::Weak => self.update_fall(),
            _ => {}
        }

        self.projectiles
            .update(now, player.map(|p| p.position), bus);
    }

    /// Interrupt gateway: force the weak state from whatever is running.
    /// Returns false (and does nothing) if already weak.
    pub fn force_weak_state(&mut self, now: Tick, bus: &mut SignalBus) -> bool {
        if self.state == BehaviorState::Weak {
            tracing::debug!("weak-state signal while already weak, ignored");
            return false;
        }

        // Snapshot before anything else mutates state. The mid-cycle
        // states map to Floating: their scheduled continuations die with
        // the cancellation below, so the cycle restarts from the drift.
        self.restore_state = Some(match self.state {
            BehaviorState::PreparingAttack
            | BehaviorState::Charging
            | BehaviorState::Attacking => BehaviorState::Floating,
            other => other,
        });

        self.scheduler.cancel_all();
        self.projectiles.clear_all();
        self.selected_attack = None;

        self.state = BehaviorState::Weak;
        bus.publish(Signal::BossEnteredWeakState);
        bus.publish(Signal::Animation(AnimationCue::Weak));

        // Scheduled after the cancellation so it survives it
        self.scheduler
            .schedule_in(ticks(self.params.weak_state_secs), AiTask::ExitWeak);

        tracing::info!(tick = now, restore = ?self.restore_state, "boss forced into weak state");
        true
    }

    /// Swap in a new phase's parameter set and pause attacks until the
    /// player grounds and the resume delay passes
    pub fn enter_phase(&mut self, phase: PhaseNumber) {
        self.phase = phase;
        self.params = self.config.phases.params_for(phase).clone();
        self.attack_enabled = false;
        self.awaiting_grounded = true;
        tracing::info!(phase, "boss entered new phase, attacks paused");
    }

    /// Player touched ground: after a phase change this arms the delayed
    /// attack re-enable
    pub fn on_player_grounded(&mut self) {
        if self.awaiting_grounded {
            self.awaiting_grounded = false;
            self.resume_pending = true;
            self.scheduler.schedule_in(
                ticks(self.config.attack_resume_delay_secs),
                AiTask::ResumeAttacks,
            );
        }
    }

    /// External attack toggle
    pub fn set_attack_enabled(&mut self, enabled: bool) {
        self.attack_enabled = enabled;
        tracing::debug!(enabled, "boss attack toggle");
    }

    /// Tear down on defeat: undo a live confusion, drop everything pending
    pub fn shutdown(&mut self, bus: &mut SignalBus) {
        if self.confusion_ends_at.take().is_some() {
            bus.publish(Signal::PlayerControlToggled);
        }
        self.scheduler.cancel_all();
        self.projectiles.clear_all();
        self.state = BehaviorState::Idle;
        self.active = false;
    }

    pub fn behavior_state(&self) -> BehaviorState {
        self.state
    }

    pub fn is_in_weak_state(&self) -> bool {
        self.state == BehaviorState::Weak
    }

    pub fn is_attack_enabled(&self) -> bool {
        self.attack_enabled
    }

    pub fn is_confusion_active(&self) -> bool {
        self.confusion_ends_at.is_some()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn current_phase(&self) -> PhaseNumber {
        self.phase
    }

    pub fn projectiles(&self) -> &ProjectileField {
        &self.projectiles
    }

    /// Outstanding scheduled continuations (timers still pending)
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    // === internals ===

    fn dispatch(&mut self, task: AiTask, now: Tick, player: Option<PlayerView>, bus: &mut SignalBus) {
        match task {
            AiTask::BeginCast => self.begin_cast(now, player, bus),
            AiTask::FinishCharge => self.finish_charge(now, bus),
            AiTask::FinishAttack => self.finish_attack(now),
            AiTask::ThrowBomb { id, index, last } => self.throw_bomb(id, index, last, now, player, bus),
            AiTask::DropFist { slot, x } => {
                self.projectiles
                    .spawn_fist(x, self.config.fist_spawn_height, self.params.fist_drop_speed, now);
                self.projectiles.fade_out_marker(slot, now);
            }
            AiTask::ExitWeak => self.exit_weak(now, bus),
            AiTask::ResumeAttacks => {
                self.resume_pending = false;
                self.attack_enabled = true;
                tracing::info!("boss attacks re-enabled");
            }
        }
    }

    fn check_confusion_expiry(&mut self, now: Tick, bus: &mut SignalBus) {
        if let Some(ends_at) = self.confusion_ends_at {
            if now >= ends_at {
                self.confusion_ends_at = None;
                bus.publish(Signal::PlayerControlToggled);
                tracing::debug!("confusion expired, player controls restored");
            }
        }
    }

    fn update_float(&mut self, now: Tick, player: Option<PlayerView>, bus: &mut SignalBus) {
        match self.motion {
            FloatMotion::Travelling {
                from,
                target,
                elapsed,
                journey,
            } => {
                // Cooldown check happens mid-drift; an elapsed cooldown
                // abandons the current travel immediately
                if let Some(view) = player {
                    if self.attack_ready(now) {
                        self.begin_prepare(now, view, bus);
                        return;
                    }
                }

                let elapsed = elapsed + 1;
                let fraction = (elapsed as f32 / journey.max(1) as f32).min(1.0);
                let eased = ease_in_out(fraction);
                let bob = (fraction * std::f32::consts::TAU).sin() * self.config.float_amplitude;
                let raw = from.lerp(&target, eased) + Vec2::new(0.0, bob);
                self.position = self.config.arena.clamp(raw);

                if fraction >= 1.0 {
                    self.motion = FloatMotion::Pausing {
                        until: now + ticks(self.config.move_wait_secs),
                    };
                } else {
                    self.motion = FloatMotion::Travelling {
                        from,
                        target,
                        elapsed,
                        journey,
                    };
                }
            }
            FloatMotion::Pausing { until } => {
                if now >= until {
                    self.start_float(now);
                }
            }
        }
    }

    fn attack_ready(&self, now: Tick) -> bool {
        self.attack_enabled && now >= self.last_attack_at + ticks(self.params.attack_cooldown_secs)
    }

    /// Teleport above the player, pick the attack, cue the cast
    fn begin_prepare(&mut self, now: Tick, player: PlayerView, bus: &mut SignalBus) {
        self.state = BehaviorState::PreparingAttack;

        let x = self.config.arena.clamp_x(player.position.x);
        let y = self
            .config
            .arena
            .clamp_y(player.position.y + self.config.teleport_height);
        self.position = Vec2::new(x, y);
        self.float_origin = self.position;

        // A confused player can only be bombed; a second confusion is
        // never issued while one is active
        let kind = if self.confusion_ends_at.is_some() {
            AttackKind::Bomb
        } else {
            select_attack(&self.params.weights(), &mut self.rng)
        };
        self.selected_attack = Some(kind);
        tracing::debug!(?kind, "boss preparing attack");

        bus.publish(Signal::Animation(AnimationCue::OpenCloak));
        self.scheduler
            .schedule_in(ticks(self.config.pre_cast_delay_secs), AiTask::BeginCast);
    }

    /// Spawn the selected attack payload and hold the charge
    fn begin_cast(&mut self, now: Tick, player: Option<PlayerView>, bus: &mut SignalBus) {
        match self.selected_attack {
            Some(AttackKind::Bomb) => self.spawn_bomb_volley(now),
            Some(AttackKind::Confusion) => self.apply_confusion(now, bus),
            Some(AttackKind::FistDrop) => self.spawn_fist_warnings(now, player),
            None => tracing::warn!("cast fired with no attack selected, skipping payload"),
        }

        self.state = BehaviorState::Charging;
        self.scheduler
            .schedule_in(ticks(self.config.charge_secs), AiTask::FinishCharge);
    }

    fn spawn_bomb_volley(&mut self, now: Tick) {
        let count = self.params.bombs_per_volley;
        let hold = ticks(self.config.bomb_appear_secs + self.config.bomb_hold_secs);
        let stagger = ticks(self.config.bomb_throw_stagger_secs);

        for i in 0..count {
            // Spread spawn points so bombs do not overlap
            let offset_x = i as f32 * 0.5 - (count as f32 - 1.0) * 0.25;
            let spawn = self.position + Vec2::new(offset_x, 0.0);
            let id = self.projectiles.spawn_bomb(spawn, now);
            self.scheduler.schedule_in(
                hold + stagger * i as Tick,
                AiTask::ThrowBomb {
                    id,
                    index: i,
                    last: i == count - 1,
                },
            );
        }
    }

    fn throw_bomb(
        &mut self,
        id: ProjectileId,
        index: usize,
        last: bool,
        now: Tick,
        player: Option<PlayerView>,
        bus: &mut SignalBus,
    ) {
        let Some(view) = player else {
            tracing::warn!("no player to throw at, bomb stays held");
            return;
        };
        if let Some(bomb_pos) = self.projectiles.bomb_position(id) {
            let base = (view.position - bomb_pos).normalize();
            // Outer bombs of a multi-bomb volley fan out
            let angle = if self.params.bombs_per_volley >= 2 {
                match index {
                    0 => -self.config.bomb_spread_degrees,
                    1 => 0.0,
                    _ => self.config.bomb_spread_degrees,
                }
            } else {
                0.0
            };
            self.projectiles
                .throw_bomb(id, base.rotated(angle), self.config.bomb_throw_speed, now);
        }
        if last {
            bus.publish(Signal::Animation(AnimationCue::CloseCloak));
        }
    }

    fn apply_confusion(&mut self, now: Tick, bus: &mut SignalBus) {
        bus.publish(Signal::PlayerControlToggled);
        self.confusion_ends_at = Some(now + ticks(self.config.confusion_secs));
        tracing::debug!(secs = self.config.confusion_secs, "player controls reversed");
    }

    fn spawn_fist_warnings(&mut self, now: Tick, player: Option<PlayerView>) {
        let Some(view) = player else {
            tracing::warn!("no player to target, fist drop skipped");
            return;
        };

        let warning = ticks(self.config.warning_secs);
        let interval = ticks(self.config.fist_spawn_interval_secs);
        let jitter = self.config.fist_column_jitter;

        for slot in 0..self.params.fist_count {
            let offset = self.rng.gen_range(-jitter..=jitter);
            let x = self.config.arena.clamp_x(view.position.x + offset);
            self.projectiles.spawn_marker(slot, x, now);
            self.scheduler
                .schedule_in(warning + interval * slot as Tick, AiTask::DropFist { slot, x });
        }
    }

    fn finish_charge(&mut self, now: Tick, bus: &mut SignalBus) {
        self.state = BehaviorState::Attacking;
        self.last_attack_at = now;

        // The bomb volley closes the cloak itself when its last bomb leaves
        if matches!(
            self.selected_attack,
            Some(AttackKind::Confusion) | Some(AttackKind::FistDrop)
        ) {
            bus.publish(Signal::Animation(AnimationCue::CloseCloak));
        }

        self.scheduler
            .schedule_in(ticks(self.config.attack_settle_secs), AiTask::FinishAttack);
    }

    fn finish_attack(&mut self, now: Tick) {
        self.selected_attack = None;
        self.state = BehaviorState::Floating;
        self.float_origin = self.position;
        self.start_float(now);
    }

    fn exit_weak(&mut self, now: Tick, bus: &mut SignalBus) {
        bus.publish(Signal::BossExitedWeakState);
        bus.publish(Signal::Animation(AnimationCue::ExitWeak));

        self.state = self.restore_state.take().unwrap_or(BehaviorState::Floating);
        if self.state == BehaviorState::Floating {
            self.float_origin = self.position;
            self.start_float(now);
        }

        // A pending attack re-enable was killed by the cancellation;
        // re-arm it so a phase pause cannot outlive the weak state
        if self.resume_pending {
            self.scheduler.schedule_in(
                ticks(self.config.attack_resume_delay_secs),
                AiTask::ResumeAttacks,
            );
        }

        tracing::info!(state = ?self.state, "boss left weak state");
    }

    /// Roll a fresh float target around the origin and start travelling
    fn start_float(&mut self, _now: Tick) {
        let jx = self.config.float_target_jitter_x;
        let jy = self.config.float_target_jitter_y;
        let target = self.config.arena.clamp(Vec2::new(
            self.float_origin.x + self.rng.gen_range(-jx..=jx),
            self.float_origin.y + self.rng.gen_range(-jy..=jy),
        ));

        let distance = self.position.distance(&target);
        let journey_secs = distance / self.params.float_speed.max(0.0001);
        let journey = ticks(journey_secs).max(1);

        self.motion = FloatMotion::Travelling {
            from: self.position,
            target,
            elapsed: 0,
            journey,
        };
    }

    /// Controlled fall toward the ground while weak; no other motion runs
    fn update_fall(&mut self) {
        let ground = self.config.arena.ground_y;
        if self.position.y > ground {
            self.position.y = (self.position.y - self.config.fall_speed * TICK_DT).max(ground);
        }
    }
}
