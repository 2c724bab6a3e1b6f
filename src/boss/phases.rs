//! Per-phase boss tuning
//!
//! Each difficulty tier carries a complete parameter set. A phase
//! transition swaps the whole set at once - there is no partial mutation
//! of individual fields mid-phase.

use serde::{Deserialize, Serialize};

use crate::boss::attacks::AttackWeights;
use crate::core::error::{CloakfallError, Result};
use crate::core::types::PhaseNumber;

/// Tunables for one boss phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseParameters {
    /// Minimum time between attacks (seconds)
    pub attack_cooldown_secs: f32,
    /// Selection weight of the confusion attack
    pub confusion_weight: f32,
    /// Selection weight of the fist-drop attack
    pub fist_drop_weight: f32,
    /// Selection weight of the bomb attack
    pub bomb_weight: f32,
    /// Fists per fist-drop volley
    pub fist_count: usize,
    /// Downward speed of falling fists
    pub fist_drop_speed: f32,
    /// Bombs per bomb volley
    pub bombs_per_volley: usize,
    /// Drift speed while floating
    pub float_speed: f32,
    /// How long the weak state lasts (seconds)
    pub weak_state_secs: f32,
}

impl PhaseParameters {
    pub fn weights(&self) -> AttackWeights {
        AttackWeights {
            confusion: self.confusion_weight,
            fist_drop: self.fist_drop_weight,
            bomb: self.bomb_weight,
        }
    }
}

/// Ordered parameter sets, one per phase, lowest tier first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseSchedule {
    pub phases: Vec<PhaseParameters>,
}

impl Default for PhaseSchedule {
    fn default() -> Self {
        Self {
            phases: vec![
                PhaseParameters {
                    attack_cooldown_secs: 3.0,
                    confusion_weight: 0.3,
                    fist_drop_weight: 0.3,
                    bomb_weight: 0.4,
                    fist_count: 5,
                    fist_drop_speed: 15.0,
                    bombs_per_volley: 1,
                    float_speed: 0.5,
                    weak_state_secs: 5.0,
                },
                // Faster cycle, triple bombs, denser and faster fists
                PhaseParameters {
                    attack_cooldown_secs: 2.5,
                    confusion_weight: 0.3,
                    fist_drop_weight: 0.3,
                    bomb_weight: 0.5,
                    fist_count: 7,
                    fist_drop_speed: 20.0,
                    bombs_per_volley: 3,
                    float_speed: 0.5,
                    weak_state_secs: 5.0,
                },
                // Fastest cycle, selection shifts toward confusion and
                // fists, shorter weak window
                PhaseParameters {
                    attack_cooldown_secs: 2.0,
                    confusion_weight: 0.4,
                    fist_drop_weight: 0.4,
                    bomb_weight: 0.2,
                    fist_count: 7,
                    fist_drop_speed: 20.0,
                    bombs_per_volley: 3,
                    float_speed: 0.8,
                    weak_state_secs: 4.0,
                },
            ],
        }
    }
}

impl PhaseSchedule {
    /// Parameters for a phase number (1-based); phases past the end of the
    /// schedule reuse the final set
    pub fn params_for(&self, phase: PhaseNumber) -> &PhaseParameters {
        let index = (phase.max(1) as usize - 1).min(self.phases.len() - 1);
        &self.phases[index]
    }

    pub fn final_phase(&self) -> PhaseNumber {
        self.phases.len() as PhaseNumber
    }

    pub fn validate(&self) -> Result<()> {
        if self.phases.is_empty() {
            return Err(CloakfallError::InvalidConfig(
                "phase schedule must contain at least one phase".into(),
            ));
        }
        for (i, params) in self.phases.iter().enumerate() {
            let total = params.confusion_weight + params.fist_drop_weight + params.bomb_weight;
            if total <= 0.0 {
                return Err(CloakfallError::InvalidConfig(format!(
                    "phase {}: attack weights must sum to a positive value",
                    i + 1
                )));
            }
            if params.confusion_weight < 0.0
                || params.fist_drop_weight < 0.0
                || params.bomb_weight < 0.0
            {
                return Err(CloakfallError::InvalidConfig(format!(
                    "phase {}: attack weights must be non-negative",
                    i + 1
                )));
            }
            if params.attack_cooldown_secs <= 0.0 || params.weak_state_secs <= 0.0 {
                return Err(CloakfallError::InvalidConfig(format!(
                    "phase {}: cooldown and weak durations must be positive",
                    i + 1
                )));
            }
            if params.float_speed <= 0.0 || params.fist_drop_speed <= 0.0 {
                return Err(CloakfallError::InvalidConfig(format!(
                    "phase {}: speeds must be positive",
                    i + 1
                )));
            }
            if params.fist_count == 0 || params.bombs_per_volley == 0 {
                return Err(CloakfallError::InvalidConfig(format!(
                    "phase {}: volley sizes must be at least 1",
                    i + 1
                )));
            }
        }
        Ok(())
    }
}
