//! Boss encounter integration tests
//!
//! These drive whole fights through the composition root and verify the
//! cross-component behavior: phase escalation, weak-state preemption, the
//! finishing budget, and attack selection statistics.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use cloakfall::boss::ai::BehaviorState;
use cloakfall::boss::attacks::{select_attack, AttackKind, AttackWeights};
use cloakfall::boss::health::BossHealth;
use cloakfall::core::config::EncounterConfig;
use cloakfall::core::types::{PlayerView, Tick, Vec2};
use cloakfall::events::{Signal, SignalKind};
use cloakfall::simulation::Encounter;

fn player() -> PlayerView {
    PlayerView {
        position: Vec2::new(1.0, -2.5),
    }
}

fn active_fight(seed: u64) -> Encounter {
    let mut fight =
        Encounter::with_seed(EncounterConfig::default(), Vec2::new(0.0, 3.0), seed).unwrap();
    fight.activate();
    fight
}

/// Tick until the predicate holds, returning the tick it first held at
fn drive_until(
    fight: &mut Encounter,
    limit: Tick,
    mut pred: impl FnMut(&Encounter) -> bool,
) -> Option<Tick> {
    for _ in 0..limit {
        fight.tick(Some(player()));
        if pred(fight) {
            return Some(fight.now());
        }
    }
    None
}

fn boss_state(fight: &Encounter) -> BehaviorState {
    fight.ai().unwrap().behavior_state()
}

/// Let a phase pause play out: ground the player and wait out the resume
/// delay
fn resume_attacks(fight: &mut Encounter) {
    fight.handle_signal(Signal::PlayerGrounded);
    for _ in 0..95 {
        fight.tick(Some(player()));
    }
    assert!(fight.ai().unwrap().is_attack_enabled());
}

/// Health crossing each threshold advances the phase exactly once,
/// never skipping and never double-firing.
#[test]
fn test_phase_advances_exactly_once_per_crossing() {
    let mut fight = active_fight(42);
    fight.tick(Some(player()));

    let mut advances = Vec::new();
    while !fight.is_defeated() {
        let outcome = fight.apply_damage(10);
        if let Some(phase) = outcome.phase_advanced {
            advances.push(phase);
            resume_attacks(&mut fight);
        }
        // Wait out the invulnerability window between strikes
        for _ in 0..35 {
            fight.tick(Some(player()));
        }
    }

    assert_eq!(advances, vec![2, 3]);
    assert_eq!(fight.bus().count(SignalKind::BossPhaseChanged), 2);
}

/// 300 health, phase-two boundary at 200, a 150 hit in Floating with a
/// fresh phase counter: the hit lands in full and tips the phase.
#[test]
fn test_large_hit_scenario_advances_phase_and_pauses_attacks() {
    let mut fight = active_fight(42);
    fight.tick(Some(player()));
    assert_eq!(boss_state(&fight), BehaviorState::Floating);

    let outcome = fight.apply_damage(150);

    assert_eq!(fight.health().current_health(), 150);
    assert_eq!(outcome.phase_advanced, Some(2));
    assert_eq!(fight.current_phase(), 2);
    assert_eq!(fight.health().damage_this_phase(), 0);
    assert!(!fight.ai().unwrap().is_attack_enabled());

    // Attacks stay paused until the grounded signal plus the delay
    for _ in 0..600 {
        fight.tick(Some(player()));
    }
    assert!(!fight.ai().unwrap().is_attack_enabled());
    resume_attacks(&mut fight);
}

/// Weak entry must work from every behavior state of the attack cycle and
/// leave zero live projectiles behind.
#[test]
fn test_weak_entry_preempts_every_state() {
    let targets = [
        BehaviorState::Floating,
        BehaviorState::PreparingAttack,
        BehaviorState::Charging,
        BehaviorState::Attacking,
    ];

    for target in targets {
        let mut fight = active_fight(42);
        let reached = drive_until(&mut fight, 2000, |f| boss_state(f) == target);
        assert!(reached.is_some(), "never reached {target:?}");

        fight.critical_hit(25);

        let ai = fight.ai().unwrap();
        assert_eq!(ai.behavior_state(), BehaviorState::Weak, "from {target:?}");
        assert!(
            ai.projectiles().is_empty(),
            "projectiles survived preemption from {target:?}"
        );
        assert_eq!(
            ai.pending_timers(),
            1,
            "only the weak-exit timer may survive {target:?}"
        );
    }
}

/// 15 finishing hits of 1 against a budget of 10: exactly 10 damage lands.
#[test]
fn test_finishing_budget_caps_weak_state_damage() {
    let mut fight = active_fight(42);
    fight.tick(Some(player()));
    fight.critical_hit(5);
    assert!(fight.ai().unwrap().is_in_weak_state());

    let mut applied = 0;
    for _ in 0..15 {
        applied += fight.finishing_hit().applied;
    }

    assert_eq!(applied, 10);
    assert_eq!(fight.health().current_health(), 290);
}

/// Observed selection frequencies over 100k seeded draws stay within
/// statistical tolerance of the normalized weights.
#[test]
fn test_attack_selection_frequencies() {
    let weights = AttackWeights {
        confusion: 0.3,
        fist_drop: 0.3,
        bomb: 0.4,
    };
    let mut rng = ChaCha8Rng::seed_from_u64(1234);

    const DRAWS: usize = 100_000;
    let mut counts = [0usize; 3];
    for _ in 0..DRAWS {
        match select_attack(&weights, &mut rng) {
            AttackKind::Confusion => counts[0] += 1,
            AttackKind::FistDrop => counts[1] += 1,
            AttackKind::Bomb => counts[2] += 1,
        }
    }

    let expected = [0.3, 0.3, 0.4];
    for (count, expect) in counts.iter().zip(expected) {
        let observed = *count as f64 / DRAWS as f64;
        assert!(
            (observed - expect).abs() < 0.01,
            "observed {observed:.4}, expected {expect}"
        );
    }
}

/// Control toggles come in cast/restore pairs spaced by exactly the
/// confusion duration: a second confusion is never issued while one is
/// active.
#[test]
fn test_confusion_is_mutually_exclusive_with_itself() {
    // Find a seed whose fight casts confusion at least twice, then check
    // the toggle spacing
    'seeds: for seed in 0..50 {
        let mut fight = active_fight(seed);
        let mut toggle_ticks: Vec<Tick> = Vec::new();
        let mut seen = 0;

        for _ in 0..30_000 {
            fight.tick(Some(player()));
            let count = fight.bus().count(SignalKind::PlayerControlToggled);
            while seen < count {
                seen += 1;
                toggle_ticks.push(fight.now());
            }
            if toggle_ticks.len() >= 4 {
                break;
            }
        }

        if toggle_ticks.len() < 4 {
            continue 'seeds;
        }

        // Confusion duration is 5s = 300 ticks
        for pair in toggle_ticks.chunks(2) {
            assert_eq!(
                pair[1] - pair[0],
                300,
                "reverse/restore toggles must be one confusion apart (seed {seed})"
            );
        }
        return;
    }
    panic!("no seed produced two confusion casts");
}

/// The full interrupt scenario: boss down in phase 3, critical hit lands
/// mid-charge with fist timers pending. Everything cancels, the weak state
/// runs its (phase 3) duration, and the boss resumes from Floating - the
/// interrupted Charging is never restored.
#[test]
fn test_critical_hit_during_charging_restores_floating() {
    'seeds: for seed in 0..60 {
        let mut fight = active_fight(seed);
        fight.tick(Some(player()));

        // Push to phase 3 at 50 health: 150 then 100, letting the phase
        // pauses play out between hits
        assert_eq!(fight.apply_damage(150).phase_advanced, Some(2));
        resume_attacks(&mut fight);
        assert_eq!(fight.apply_damage(100).phase_advanced, Some(3));
        resume_attacks(&mut fight);
        assert_eq!(fight.health().current_health(), 50);

        // Wait for a fist-drop cast: charging with warning markers down
        // and the per-fist timers still pending
        let found = drive_until(&mut fight, 5000, |f| {
            let ai = f.ai().unwrap();
            ai.behavior_state() == BehaviorState::Charging
                && ai.projectiles().live_markers() > 0
                && ai.pending_timers() >= 3
        });
        if found.is_none() {
            continue 'seeds;
        }

        fight.critical_hit(90);

        let ai = fight.ai().unwrap();
        assert_eq!(ai.behavior_state(), BehaviorState::Weak);
        assert!(ai.projectiles().is_empty(), "fist timers must be destroyed");
        assert_eq!(ai.pending_timers(), 1);
        // The interrupt gateway does not touch health
        assert_eq!(fight.health().current_health(), 50);

        // Phase 3 weak duration is 4s = 240 ticks
        for _ in 0..245 {
            fight.tick(Some(player()));
        }
        assert_eq!(boss_state(&fight), BehaviorState::Floating);
        return;
    }
    panic!("no seed produced a fist-drop cast in phase 3");
}

/// Entering and leaving the weak state without damage changes nothing.
#[test]
fn test_weak_round_trip_without_damage_is_lossless() {
    let mut fight = active_fight(42);
    fight.tick(Some(player()));

    fight.critical_hit(40);
    assert!(fight.ai().unwrap().is_in_weak_state());

    // Phase 1 weak duration is 5s = 300 ticks
    for _ in 0..305 {
        fight.tick(Some(player()));
    }

    assert!(!fight.ai().unwrap().is_in_weak_state());
    assert_eq!(fight.health().current_health(), 300);
    assert_eq!(fight.current_phase(), 1);
    assert_eq!(fight.bus().count(SignalKind::BossEnteredWeakState), 1);
    assert_eq!(fight.bus().count(SignalKind::BossExitedWeakState), 1);
}

/// A whole scripted fight reaches defeat and tears down cleanly.
#[test]
fn test_scripted_fight_runs_to_defeat() {
    let mut fight = active_fight(7);

    let mut tick = 0u64;
    while tick < 200_000 && !fight.is_defeated() {
        tick += 1;
        fight.tick(Some(player()));
        if tick % 90 == 0 {
            fight.apply_damage(12);
        }
        if tick % 2400 == 0 {
            fight.critical_hit(12);
        }
        if fight.ai().is_some_and(|ai| ai.is_in_weak_state()) && tick % 15 == 0 {
            fight.finishing_hit();
        }
        if tick % 120 == 0 {
            fight.handle_signal(Signal::PlayerGrounded);
        }
    }

    assert!(fight.is_defeated());
    assert_eq!(fight.bus().count(SignalKind::BossDefeated), 1);
    assert_eq!(fight.bus().count(SignalKind::BossPhaseChanged), 2);
    assert_eq!(boss_state(&fight), BehaviorState::Idle);
    assert_eq!(fight.ai().unwrap().pending_timers(), 0);
}

proptest! {
    /// Arbitrary hit sequences never push health out of range, never make
    /// a hit apply more than its amount, and never regress the phase.
    #[test]
    fn prop_health_bounds_and_phase_monotonicity(
        hits in proptest::collection::vec((1..200i32, any::<bool>()), 1..60)
    ) {
        let mut hp = BossHealth::new(300, vec![200, 100], 100, 10, 5);
        let mut now = 0;
        let mut last_phase = 1;

        for (amount, in_weak) in hits {
            let outcome = hp.apply_damage(amount, in_weak, in_weak, now);
            prop_assert!(outcome.applied >= 0);
            prop_assert!(outcome.applied <= amount);
            prop_assert!(hp.current_health() >= 0);
            prop_assert!(hp.current_health() <= 300);
            prop_assert!(hp.current_phase() >= last_phase);
            last_phase = hp.current_phase();
            now += 100;
        }
    }
}
