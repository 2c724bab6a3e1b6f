//! Encounter composition root
//!
//! Builds the pieces in a fixed order - health model, then the (stateless)
//! attack catalog, then the AI - and wires signal routing only once
//! everything exists. The encounter starts dormant and wakes up on the
//! configured dialog-ended signal, the way the boss appears mid-level.

use crate::boss::ai::BossAi;
use crate::boss::health::{BossHealth, DamageOutcome};
use crate::core::config::EncounterConfig;
use crate::core::error::Result;
use crate::core::types::{PhaseNumber, PlayerView, Tick, Vec2};
use crate::events::{Signal, SignalBus};

/// One boss fight from dormancy to defeat
pub struct Encounter {
    config: EncounterConfig,
    bus: SignalBus,
    health: BossHealth,
    /// Constructed on activation; the boss does not exist before then
    ai: Option<BossAi>,
    now: Tick,
    spawn_position: Vec2,
    seed: u64,
    defeated: bool,
}

impl Encounter {
    pub fn new(config: EncounterConfig, spawn_position: Vec2) -> Result<Self> {
        Self::with_seed(config, spawn_position, 42)
    }

    /// Validates the config up front; a bad weight table or threshold
    /// order never reaches the tick loop
    pub fn with_seed(config: EncounterConfig, spawn_position: Vec2, seed: u64) -> Result<Self> {
        config.validate()?;
        let health = BossHealth::from_config(&config);
        Ok(Self {
            config,
            bus: SignalBus::new(),
            health,
            ai: None,
            now: 0,
            spawn_position,
            seed,
            defeated: false,
        })
    }

    /// Route one incoming signal. The signal is also published so the
    /// fight transcript contains both sides of the conversation.
    pub fn handle_signal(&mut self, signal: Signal) {
        self.bus.publish(signal.clone());
        match signal {
            Signal::DialogEnded { dialog_id } => {
                if dialog_id == self.config.activation_dialog_id {
                    self.activate();
                }
            }
            Signal::CriticalHitLanded { damage } => self.critical_hit(damage),
            Signal::PlayerGrounded => self.player_grounded(),
            other => {
                tracing::debug!(?other, "unrouted signal ignored");
            }
        }
    }

    /// Wake the boss up. Safe to call more than once.
    pub fn activate(&mut self) {
        if self.ai.is_some() || self.defeated {
            return;
        }
        tracing::info!(tick = self.now, "boss activated");
        self.ai = Some(BossAi::with_seed(
            &self.config,
            self.spawn_position,
            self.now,
            self.seed,
        ));
    }

    /// Advance the fight one tick
    pub fn tick(&mut self, player: Option<PlayerView>) {
        self.now += 1;
        if let Some(ai) = self.ai.as_mut() {
            ai.tick(self.now, player, &mut self.bus);
        }
    }

    /// Ordinary (non-finishing) damage from any external source
    pub fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        self.damage(amount, false)
    }

    /// One finishing hit at the configured fixed value; only lands while
    /// the boss is weak
    pub fn finishing_hit(&mut self) -> DamageOutcome {
        self.damage(self.config.finishing_hit_value, true)
    }

    fn damage(&mut self, amount: i32, is_finishing: bool) -> DamageOutcome {
        let Some(ai) = self.ai.as_mut() else {
            tracing::debug!("damage before activation ignored");
            return DamageOutcome::default();
        };

        let outcome =
            self.health
                .apply_damage(amount, is_finishing, ai.is_in_weak_state(), self.now);

        if let Some(phase) = outcome.phase_advanced {
            ai.enter_phase(phase);
            self.bus.publish(Signal::BossPhaseChanged { phase });
        }

        if outcome.defeated {
            self.defeated = true;
            ai.shutdown(&mut self.bus);
            self.bus.publish(Signal::BossDefeated);
        }

        outcome
    }

    /// Interrupt gateway: a critical hit preempts whatever the boss is
    /// doing. The payload is informational; health changes flow through
    /// `apply_damage` separately.
    pub fn critical_hit(&mut self, damage: i32) {
        tracing::debug!(damage, "critical hit landed");
        let Some(ai) = self.ai.as_mut() else {
            return;
        };
        if ai.force_weak_state(self.now, &mut self.bus) {
            // The finishing budget opens fresh on each weak entry; a
            // repeat signal while already weak resets nothing
            self.health.reset_weak_click_budget();
        }
    }

    pub fn player_grounded(&mut self) {
        if let Some(ai) = self.ai.as_mut() {
            ai.on_player_grounded();
        }
    }

    /// Restore boss health (clamped; no-op once defeated)
    pub fn heal(&mut self, amount: i32) {
        self.health.heal(amount);
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    pub fn is_activated(&self) -> bool {
        self.ai.is_some()
    }

    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    pub fn current_phase(&self) -> PhaseNumber {
        self.health.current_phase()
    }

    pub fn health(&self) -> &BossHealth {
        &self.health
    }

    pub fn ai(&self) -> Option<&BossAi> {
        self.ai.as_ref()
    }

    pub fn bus(&self) -> &SignalBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut SignalBus {
        &mut self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boss::ai::BehaviorState;
    use crate::events::SignalKind;

    fn encounter() -> Encounter {
        Encounter::with_seed(EncounterConfig::default(), Vec2::new(0.0, 3.0), 42).unwrap()
    }

    fn player() -> PlayerView {
        PlayerView {
            position: Vec2::new(1.0, -2.5),
        }
    }

    #[test]
    fn test_dormant_until_matching_dialog() {
        let mut fight = encounter();
        assert!(!fight.is_activated());

        fight.handle_signal(Signal::DialogEnded { dialog_id: 7 });
        assert!(!fight.is_activated());

        fight.handle_signal(Signal::DialogEnded { dialog_id: 110 });
        assert!(fight.is_activated());
    }

    #[test]
    fn test_damage_before_activation_ignored() {
        let mut fight = encounter();
        let outcome = fight.apply_damage(50);
        assert_eq!(outcome.applied, 0);
        assert_eq!(fight.health().current_health(), 300);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let mut config = EncounterConfig::default();
        config.phase_two_threshold = 10;
        config.phase_three_threshold = 20;
        assert!(Encounter::new(config, Vec2::default()).is_err());
    }

    #[test]
    fn test_phase_transition_emits_signal_and_pauses_attacks() {
        let mut fight = encounter();
        fight.activate();
        fight.tick(Some(player()));

        let outcome = fight.apply_damage(150);
        assert_eq!(outcome.phase_advanced, Some(2));
        assert_eq!(fight.current_phase(), 2);
        assert_eq!(fight.bus().count(SignalKind::BossPhaseChanged), 1);
        assert!(!fight.ai().unwrap().is_attack_enabled());
    }

    #[test]
    fn test_critical_hit_forces_weak_and_resets_budget() {
        let mut fight = encounter();
        fight.activate();
        fight.tick(Some(player()));

        fight.critical_hit(90);
        assert!(fight.ai().unwrap().is_in_weak_state());
        assert_eq!(fight.bus().count(SignalKind::BossEnteredWeakState), 1);
        // The payload is informational only
        assert_eq!(fight.health().current_health(), 300);

        // Finishing hits now land
        let outcome = fight.finishing_hit();
        assert_eq!(outcome.applied, 1);
    }

    #[test]
    fn test_repeat_critical_hit_is_idempotent() {
        let mut fight = encounter();
        fight.activate();
        fight.tick(Some(player()));

        fight.critical_hit(10);
        for _ in 0..5 {
            fight.finishing_hit();
        }
        assert_eq!(fight.health().weak_click_total(), 5);

        // Re-entry signal must not reopen the budget
        fight.critical_hit(10);
        assert_eq!(fight.health().weak_click_total(), 5);
        assert_eq!(fight.bus().count(SignalKind::BossEnteredWeakState), 1);
    }

    #[test]
    fn test_finishing_hit_outside_weak_does_nothing() {
        let mut fight = encounter();
        fight.activate();
        fight.tick(Some(player()));

        let outcome = fight.finishing_hit();
        assert_eq!(outcome.applied, 0);
        assert_eq!(fight.health().current_health(), 300);
    }

    #[test]
    fn test_defeat_emits_signal_and_stops_the_boss() {
        let mut config = EncounterConfig::default();
        config.max_health = 30;
        config.phase_two_threshold = 20;
        config.phase_three_threshold = 10;
        config.invulnerable_secs = 0.0;
        let mut fight = Encounter::with_seed(config, Vec2::new(0.0, 3.0), 42).unwrap();
        fight.activate();

        for _ in 0..10 {
            fight.tick(Some(player()));
            fight.apply_damage(10);
            if fight.is_defeated() {
                break;
            }
        }

        assert!(fight.is_defeated());
        assert_eq!(fight.bus().count(SignalKind::BossDefeated), 1);
        assert_eq!(
            fight.ai().unwrap().behavior_state(),
            BehaviorState::Idle
        );
    }

    #[test]
    fn test_grounded_signal_routes_to_ai() {
        let mut fight = encounter();
        fight.activate();
        fight.tick(Some(player()));
        fight.apply_damage(150);
        assert!(!fight.ai().unwrap().is_attack_enabled());

        fight.handle_signal(Signal::PlayerGrounded);
        // Resume delay is 1.5s = 90 ticks
        for _ in 0..95 {
            fight.tick(Some(player()));
        }
        assert!(fight.ai().unwrap().is_attack_enabled());
    }

    #[test]
    fn test_heal_is_clamped() {
        let mut fight = encounter();
        fight.activate();
        fight.tick(Some(player()));
        fight.apply_damage(50);
        fight.heal(1000);
        assert_eq!(fight.health().current_health(), 300);
    }
}
