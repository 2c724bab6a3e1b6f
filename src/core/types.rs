//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for live projectiles (bombs, fists, warning markers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectileId(pub Uuid);

impl ProjectileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProjectileId {
    fn default() -> Self {
        Self::new()
    }
}

/// Game tick counter (simulation time unit)
pub type Tick = u64;

/// Fixed logical tick rate for the encounter loop
pub const TICKS_PER_SECOND: u64 = 60;

/// Seconds elapsed per tick
pub const TICK_DT: f32 = 1.0 / TICKS_PER_SECOND as f32;

/// Convert a duration in seconds to a whole number of ticks (rounded)
pub fn ticks(seconds: f32) -> Tick {
    (seconds * TICKS_PER_SECOND as f32).round() as Tick
}

/// 2D position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0001 {
            Self { x: self.x / len, y: self.y / len }
        } else {
            Self::default()
        }
    }

    /// Linear interpolation from self toward other by fraction t (unclamped)
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Rotate counter-clockwise by an angle in degrees
    pub fn rotated(&self, angle_degrees: f32) -> Self {
        let rad = angle_degrees.to_radians();
        let (sin, cos) = rad.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

/// Rectangular bounds the boss and its projectiles are confined to
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArenaBounds {
    pub min_x: f32,
    pub max_x: f32,
    /// Ceiling: the boss never floats or teleports above this
    pub max_y: f32,
    /// Floor height for warning markers, fist impacts, and the weak-state fall
    pub ground_y: f32,
}

impl ArenaBounds {
    pub fn clamp_x(&self, x: f32) -> f32 {
        x.clamp(self.min_x, self.max_x)
    }

    pub fn clamp_y(&self, y: f32) -> f32 {
        y.min(self.max_y)
    }

    /// Clamp a position to the arena (x both sides, y against the ceiling)
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        Vec2::new(self.clamp_x(pos.x), self.clamp_y(pos.y))
    }
}

/// Boss difficulty tier selected by health thresholds
pub type PhaseNumber = u8;

/// Snapshot of the player the boss can observe this tick
#[derive(Debug, Clone, Copy)]
pub struct PlayerView {
    pub position: Vec2,
}
