//! Boss combat: behavior state machine, attack choreography, health and
//! phase escalation

pub mod ai;
pub mod attacks;
pub mod health;
pub mod phases;
pub mod projectiles;

pub use ai::{BehaviorState, BossAi};
pub use attacks::{select_attack, AttackKind, AttackWeights};
pub use health::{BossHealth, DamageOutcome};
pub use phases::{PhaseParameters, PhaseSchedule};
pub use projectiles::{ProjectileField, ProjectileTuning};
