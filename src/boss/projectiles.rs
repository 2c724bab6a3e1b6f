//! Live attack objects: bombs, falling fists, ground warning markers
//!
//! The field owns every in-flight object the boss has spawned and advances
//! them one tick at a time: motion integration, fuse timers, ground and
//! player contact. Weak-state preemption destroys the whole field as a
//! group via `clear_all`.

use crate::core::config::EncounterConfig;
use crate::core::types::{ticks, ProjectileId, Tick, Vec2, TICK_DT};
use crate::events::{Signal, SignalBus, SoundCue};

/// Safety timeout for a fist that somehow never reaches the ground
const FIST_TIMEOUT_SECS: f32 = 5.0;

/// Camera feedback on explosions and fist impacts
const SHAKE_DURATION: f32 = 0.2;
const SHAKE_MAGNITUDE: f32 = 0.3;

/// Tunables the field needs, copied out of the encounter config once
#[derive(Debug, Clone)]
pub struct ProjectileTuning {
    pub appear_ticks: Tick,
    pub fuse_ticks: Tick,
    pub blast_radius: f32,
    pub contact_radius: f32,
    pub bomb_damage: i32,
    pub gravity: f32,
    pub fist_hit_radius: f32,
    pub fist_damage: i32,
    pub fist_linger_ticks: Tick,
    pub marker_fade_ticks: Tick,
    pub ground_y: f32,
}

impl ProjectileTuning {
    pub fn from_config(config: &EncounterConfig) -> Self {
        Self {
            appear_ticks: ticks(config.bomb_appear_secs),
            fuse_ticks: ticks(config.bomb_fuse_secs),
            blast_radius: config.bomb_blast_radius,
            contact_radius: config.bomb_contact_radius,
            bomb_damage: config.bomb_damage,
            gravity: config.gravity,
            fist_hit_radius: config.fist_hit_radius,
            fist_damage: config.fist_damage,
            fist_linger_ticks: ticks(config.fist_linger_secs),
            marker_fade_ticks: ticks(config.marker_fade_secs),
            ground_y: config.arena.ground_y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BombState {
    /// Scaling/fading in at the spawn point; cannot be thrown or
    /// contact-triggered yet
    Appearing,
    /// Fully visible, still held at the spawn point
    Held,
    Thrown,
}

#[derive(Debug, Clone)]
pub struct Bomb {
    pub id: ProjectileId,
    pub position: Vec2,
    velocity: Vec2,
    state: BombState,
    appear_done_at: Tick,
    /// Fuse deadline; set when the bomb is thrown, not when it spawns
    explode_at: Option<Tick>,
}

#[derive(Debug, Clone)]
pub struct Fist {
    pub id: ProjectileId,
    pub position: Vec2,
    velocity: Vec2,
    grounded: bool,
    despawn_at: Tick,
    hit_player: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerState {
    FadingIn,
    Visible,
    FadingOut,
}

/// Ground marker telegraphing where a fist will land
#[derive(Debug, Clone)]
pub struct WarningMarker {
    pub id: ProjectileId,
    /// Volley slot pairing this marker with its fist
    pub slot: usize,
    pub position: Vec2,
    state: MarkerState,
    state_since: Tick,
}

impl WarningMarker {
    /// Current opacity for the render collaborator
    pub fn alpha(&self, now: Tick, fade_ticks: Tick) -> f32 {
        let elapsed = now.saturating_sub(self.state_since) as f32;
        let fade = fade_ticks.max(1) as f32;
        match self.state {
            MarkerState::FadingIn => (elapsed / fade).min(1.0),
            MarkerState::Visible => 1.0,
            MarkerState::FadingOut => (1.0 - elapsed / fade).max(0.0),
        }
    }
}

/// All live attack objects belonging to the boss
#[derive(Debug)]
pub struct ProjectileField {
    tuning: ProjectileTuning,
    bombs: Vec<Bomb>,
    fists: Vec<Fist>,
    markers: Vec<WarningMarker>,
}

impl ProjectileField {
    pub fn new(tuning: ProjectileTuning) -> Self {
        Self {
            tuning,
            bombs: Vec::new(),
            fists: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// Spawn a held bomb; it stays at the spawn point until thrown
    pub fn spawn_bomb(&mut self, position: Vec2, now: Tick) -> ProjectileId {
        let id = ProjectileId::new();
        self.bombs.push(Bomb {
            id,
            position,
            velocity: Vec2::default(),
            state: BombState::Appearing,
            appear_done_at: now + self.tuning.appear_ticks,
            explode_at: None,
        });
        id
    }

    /// Give a held bomb its throw velocity and start the fuse. Returns
    /// false if the bomb is already gone (exploded early or cleared).
    pub fn throw_bomb(&mut self, id: ProjectileId, direction: Vec2, speed: f32, now: Tick) -> bool {
        match self.bombs.iter_mut().find(|b| b.id == id) {
            Some(bomb) => {
                bomb.velocity = direction.normalize() * speed;
                bomb.state = BombState::Thrown;
                bomb.explode_at = Some(now + self.tuning.fuse_ticks);
                true
            }
            None => {
                tracing::debug!(?id, "throw requested for a bomb that no longer exists");
                false
            }
        }
    }

    /// Spawn a fading-in warning marker on the ground at column x
    pub fn spawn_marker(&mut self, slot: usize, x: f32, now: Tick) -> ProjectileId {
        let id = ProjectileId::new();
        self.markers.push(WarningMarker {
            id,
            slot,
            position: Vec2::new(x, self.tuning.ground_y),
            state: MarkerState::FadingIn,
            state_since: now,
        });
        id
    }

    /// Begin the fade-out of the marker paired with a fist slot
    pub fn fade_out_marker(&mut self, slot: usize, now: Tick) -> bool {
        match self.markers.iter_mut().find(|m| m.slot == slot) {
            Some(marker) => {
                marker.state = MarkerState::FadingOut;
                marker.state_since = now;
                true
            }
            None => false,
        }
    }

    /// Spawn a falling fist above column x
    pub fn spawn_fist(&mut self, x: f32, spawn_height: f32, drop_speed: f32, now: Tick) -> ProjectileId {
        let id = ProjectileId::new();
        self.fists.push(Fist {
            id,
            position: Vec2::new(x, spawn_height),
            velocity: Vec2::new(0.0, -drop_speed),
            grounded: false,
            despawn_at: now + ticks(FIST_TIMEOUT_SECS),
            hit_player: false,
        });
        id
    }

    /// Advance every live object one tick
    pub fn update(&mut self, now: Tick, player: Option<Vec2>, bus: &mut SignalBus) {
        self.update_bombs(now, player, bus);
        self.update_fists(now, player, bus);
        self.update_markers(now);
    }

    fn update_bombs(&mut self, now: Tick, player: Option<Vec2>, bus: &mut SignalBus) {
        let tuning = &self.tuning;
        let mut exploding = Vec::new();

        for bomb in &mut self.bombs {
            if bomb.state == BombState::Appearing && now >= bomb.appear_done_at {
                bomb.state = BombState::Held;
            }

            if bomb.state == BombState::Thrown {
                bomb.velocity.y += tuning.gravity * TICK_DT;
                bomb.position = bomb.position + bomb.velocity * TICK_DT;
            }

            let fuse_burned = bomb.explode_at.is_some_and(|at| now >= at);
            let contact = bomb.state != BombState::Appearing
                && player.is_some_and(|p| bomb.position.distance(&p) <= tuning.contact_radius);

            if fuse_burned || contact {
                exploding.push(bomb.id);
            }
        }

        for id in exploding {
            let Some(index) = self.bombs.iter().position(|b| b.id == id) else {
                continue;
            };
            let bomb = self.bombs.remove(index);

            if let Some(p) = player {
                if bomb.position.distance(&p) <= self.tuning.blast_radius {
                    bus.publish(Signal::PlayerHit {
                        damage: self.tuning.bomb_damage,
                    });
                }
            }
            bus.publish(Signal::CameraShake {
                duration: SHAKE_DURATION,
                magnitude: SHAKE_MAGNITUDE,
            });
            bus.publish(Signal::Sound(SoundCue::BombExplosion));
        }
    }

    fn update_fists(&mut self, now: Tick, player: Option<Vec2>, bus: &mut SignalBus) {
        let tuning = &self.tuning;

        for fist in &mut self.fists {
            if !fist.grounded {
                fist.position = fist.position + fist.velocity * TICK_DT;

                if let Some(p) = player {
                    if !fist.hit_player && fist.position.distance(&p) <= tuning.fist_hit_radius {
                        // The fist keeps falling after connecting
                        fist.hit_player = true;
                        bus.publish(Signal::PlayerHit {
                            damage: tuning.fist_damage,
                        });
                    }
                }

                if fist.position.y <= tuning.ground_y {
                    fist.position.y = tuning.ground_y;
                    fist.velocity = Vec2::default();
                    fist.grounded = true;
                    fist.despawn_at = now + tuning.fist_linger_ticks;
                    bus.publish(Signal::CameraShake {
                        duration: SHAKE_DURATION,
                        magnitude: SHAKE_MAGNITUDE,
                    });
                }
            }
        }

        self.fists.retain(|f| now < f.despawn_at);
    }

    fn update_markers(&mut self, now: Tick) {
        let fade = self.tuning.marker_fade_ticks;
        for marker in &mut self.markers {
            if marker.state == MarkerState::FadingIn
                && now.saturating_sub(marker.state_since) >= fade
            {
                marker.state = MarkerState::Visible;
                marker.state_since = now;
            }
        }
        self.markers
            .retain(|m| m.state != MarkerState::FadingOut || now.saturating_sub(m.state_since) < fade);
    }

    /// Destroy every live object as a group
    pub fn clear_all(&mut self) {
        let total = self.bombs.len() + self.fists.len() + self.markers.len();
        if total > 0 {
            tracing::debug!(count = total, "destroying all live attack objects");
        }
        self.bombs.clear();
        self.fists.clear();
        self.markers.clear();
    }

    pub fn live_bombs(&self) -> usize {
        self.bombs.len()
    }

    pub fn live_fists(&self) -> usize {
        self.fists.len()
    }

    pub fn live_markers(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bombs.is_empty() && self.fists.is_empty() && self.markers.is_empty()
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    /// Current position of a live bomb, if it still exists
    pub fn bomb_position(&self, id: ProjectileId) -> Option<Vec2> {
        self.bombs.iter().find(|b| b.id == id).map(|b| b.position)
    }

    pub fn fists(&self) -> &[Fist] {
        &self.fists
    }

    pub fn markers(&self) -> &[WarningMarker] {
        &self.markers
    }
}
