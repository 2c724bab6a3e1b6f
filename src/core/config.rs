//! Encounter configuration with documented constants
//!
//! All magic numbers are collected here with explanations of their purpose
//! and how they interact with each other. Durations are in seconds and are
//! converted to logical ticks at the call sites that need them.

use serde::{Deserialize, Serialize};

use crate::boss::phases::PhaseSchedule;
use crate::core::error::{CloakfallError, Result};
use crate::core::types::ArenaBounds;

/// Configuration for one boss encounter
///
/// Defaults reproduce the shipped fight tuning. Changing them will affect
/// pacing and difficulty; `validate` catches combinations that would break
/// the attack cycle outright.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterConfig {
    // === ARENA ===
    /// Rectangle the boss floats within; ground_y is where fists land and
    /// where the weak-state fall stops
    pub arena: ArenaBounds,

    // === FLOAT MOTION ===
    /// Amplitude of the sinusoidal bob layered on top of linear travel
    pub float_amplitude: f32,

    /// Horizontal half-range for rolling a new float target around the
    /// current origin
    pub float_target_jitter_x: f32,

    /// Vertical half-range for rolling a new float target
    pub float_target_jitter_y: f32,

    /// Pause at a reached float target before rolling the next one
    pub move_wait_secs: f32,

    // === ATTACK CYCLE ===
    /// Grace period after activation before the first attack can fire
    pub initial_attack_delay_secs: f32,

    /// Time between the open-cloak cue and the attack payload spawning
    pub pre_cast_delay_secs: f32,

    /// Hold in the charging state; the payload already runs its own timers
    pub charge_secs: f32,

    /// Settle delay after an attack before floating resumes
    pub attack_settle_secs: f32,

    /// Height above the player the boss teleports to when preparing an
    /// attack (ceiling-clamped)
    pub teleport_height: f32,

    /// Delay between the player-grounded signal and attacks re-enabling
    /// after a phase transition
    pub attack_resume_delay_secs: f32,

    // === BOMB ===
    /// Scale/fade-in time of a freshly spawned bomb; it cannot be thrown
    /// or contact-triggered while appearing
    pub bomb_appear_secs: f32,

    /// Extra hold at the spawn point after appearing, before the throw
    pub bomb_hold_secs: f32,

    /// Per-bomb throw offset within a volley so bombs leave one by one
    pub bomb_throw_stagger_secs: f32,

    /// Initial speed of a thrown bomb toward the player
    pub bomb_throw_speed: f32,

    /// Fuse measured from the throw, not from the spawn
    pub bomb_fuse_secs: f32,

    /// Blast radius; only the player takes damage inside it
    pub bomb_blast_radius: f32,

    /// Distance at which a thrown bomb detonates on the player directly
    pub bomb_contact_radius: f32,

    /// Damage dealt by one bomb blast
    pub bomb_damage: i32,

    /// Angular spread of the outer bombs in a three-bomb volley (degrees)
    pub bomb_spread_degrees: f32,

    /// Vertical acceleration applied to bombs once thrown
    pub gravity: f32,

    // === FIST DROP ===
    /// Height fists spawn at above their warning markers
    pub fist_spawn_height: f32,

    /// Horizontal half-range around the player for rolling fist columns
    pub fist_column_jitter: f32,

    /// Spacing between consecutive fist spawns within one volley
    pub fist_spawn_interval_secs: f32,

    /// How long warning markers stay on the ground before fists fall
    pub warning_secs: f32,

    /// Fade-in and fade-out time of a warning marker
    pub marker_fade_secs: f32,

    /// How long a fist rests on the ground before despawning
    pub fist_linger_secs: f32,

    /// Distance at which a falling fist hits the player
    pub fist_hit_radius: f32,

    /// Damage dealt by one fist hit
    pub fist_damage: i32,

    // === CONFUSION ===
    /// How long player controls stay reversed; a second confusion cannot
    /// be issued while one is active
    pub confusion_secs: f32,

    // === WEAK STATE ===
    /// Speed of the controlled fall toward the ground while weak
    pub fall_speed: f32,

    /// Damage value of one finishing hit while weak
    pub finishing_hit_value: i32,

    // === HEALTH & PHASES ===
    /// Immutable health ceiling
    pub max_health: i32,

    /// Crossing this health from above advances phase 1 -> 2
    pub phase_two_threshold: i32,

    /// Crossing this health from above advances phase 2 -> 3
    pub phase_three_threshold: i32,

    /// Once this much damage has landed in a phase, further hits are
    /// ignored until the phase turns over
    pub phase_damage_gate: i32,

    /// Cap on cumulative finishing damage per weak state; resets on
    /// weak-state entry
    pub weak_click_budget: i32,

    /// Post-hit invulnerability window outside the weak state
    pub invulnerable_secs: f32,

    // === ACTIVATION ===
    /// The encounter wakes up when a dialog with this id finishes
    pub activation_dialog_id: i32,

    /// Per-phase tunables, replaced wholesale on each phase transition
    pub phases: PhaseSchedule,
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self {
            arena: ArenaBounds {
                min_x: -10.35,
                max_x: 11.9,
                max_y: 5.31,
                ground_y: -3.0,
            },

            float_amplitude: 0.5,
            float_target_jitter_x: 3.0,
            float_target_jitter_y: 1.0,
            move_wait_secs: 1.0,

            initial_attack_delay_secs: 3.0,
            pre_cast_delay_secs: 0.5,
            charge_secs: 2.0,
            attack_settle_secs: 0.5,
            teleport_height: 7.0,
            attack_resume_delay_secs: 1.5,

            bomb_appear_secs: 1.0,
            bomb_hold_secs: 0.8,
            bomb_throw_stagger_secs: 0.2,
            bomb_throw_speed: 10.0,
            bomb_fuse_secs: 3.0,
            bomb_blast_radius: 2.0,
            bomb_contact_radius: 0.5,
            bomb_damage: 1,
            bomb_spread_degrees: 30.0,
            gravity: -9.81,

            fist_spawn_height: 15.0,
            fist_column_jitter: 6.0,
            fist_spawn_interval_secs: 0.3,
            warning_secs: 0.8,
            marker_fade_secs: 0.3,
            fist_linger_secs: 0.2,
            fist_hit_radius: 0.6,
            fist_damage: 1,

            confusion_secs: 5.0,

            fall_speed: 10.0,
            finishing_hit_value: 1,

            max_health: 300,
            phase_two_threshold: 200,
            phase_three_threshold: 100,
            phase_damage_gate: 100,
            weak_click_budget: 10,
            invulnerable_secs: 0.5,

            activation_dialog_id: 110,

            phases: PhaseSchedule::default(),
        }
    }
}

impl EncounterConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config from a TOML file and validate it
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.arena.min_x >= self.arena.max_x {
            return Err(CloakfallError::InvalidConfig(format!(
                "arena.min_x ({}) must be < arena.max_x ({})",
                self.arena.min_x, self.arena.max_x
            )));
        }
        if self.arena.ground_y >= self.arena.max_y {
            return Err(CloakfallError::InvalidConfig(format!(
                "arena.ground_y ({}) must be < arena.max_y ({})",
                self.arena.ground_y, self.arena.max_y
            )));
        }

        if self.max_health <= 0 {
            return Err(CloakfallError::InvalidConfig(
                "max_health must be positive".into(),
            ));
        }

        // Thresholds must descend strictly so each crossing fires once
        if self.phase_two_threshold >= self.max_health
            || self.phase_three_threshold >= self.phase_two_threshold
            || self.phase_three_threshold <= 0
        {
            return Err(CloakfallError::InvalidConfig(format!(
                "phase thresholds must satisfy max_health > phase_two > phase_three > 0 \
                 (got {} > {} > {} > 0)",
                self.max_health, self.phase_two_threshold, self.phase_three_threshold
            )));
        }

        if self.phase_damage_gate <= 0 {
            return Err(CloakfallError::InvalidConfig(
                "phase_damage_gate must be positive".into(),
            ));
        }
        if self.weak_click_budget <= 0 || self.finishing_hit_value <= 0 {
            return Err(CloakfallError::InvalidConfig(
                "weak_click_budget and finishing_hit_value must be positive".into(),
            ));
        }

        if self.fall_speed <= 0.0 || self.bomb_throw_speed <= 0.0 {
            return Err(CloakfallError::InvalidConfig(
                "fall_speed and bomb_throw_speed must be positive".into(),
            ));
        }

        self.phases.validate()?;

        Ok(())
    }
}
