//! Weighted attack selection
//!
//! Stateless: a draw takes the current phase's weights and an RNG, nothing
//! else. The cumulative comparison runs in a fixed order (confusion, fist
//! drop, bomb) so ties break the same way every time.

use rand::Rng;

/// The three attack kinds the boss cycles between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackKind {
    Bomb,
    Confusion,
    FistDrop,
}

/// Selection weights for one draw; need not sum to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackWeights {
    pub confusion: f32,
    pub fist_drop: f32,
    pub bomb: f32,
}

impl AttackWeights {
    pub fn total(&self) -> f32 {
        self.confusion + self.fist_drop + self.bomb
    }
}

/// Draw an attack kind by normalized cumulative threshold
///
/// A non-positive weight total would divide by zero; config validation
/// rejects it up front, and this falls back to a uniform draw so the tick
/// loop survives a bad runtime override anyway.
pub fn select_attack<R: Rng>(weights: &AttackWeights, rng: &mut R) -> AttackKind {
    let total = weights.total();
    let (confusion, fist_drop) = if total > 0.0 {
        (weights.confusion / total, weights.fist_drop / total)
    } else {
        tracing::warn!("attack weights sum to zero, falling back to uniform selection");
        (1.0 / 3.0, 1.0 / 3.0)
    };

    let draw: f32 = rng.gen();
    if draw <= confusion {
        AttackKind::Confusion
    } else if draw <= confusion + fist_drop {
        AttackKind::FistDrop
    } else {
        AttackKind::Bomb
    }
}
