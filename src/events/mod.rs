//! Typed signals exchanged between the boss and its collaborators
//!
//! The bus replaces a global event registry: the composition root builds
//! one and hands it `&mut` to whoever publishes. Subscribers are callbacks
//! keyed by signal kind; every published signal is also retained in a
//! history log so tests and the sim binary can inspect a whole fight.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Named animation triggers consumed by the (out of scope) animation player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationCue {
    OpenCloak,
    CloseCloak,
    Weak,
    ExitWeak,
}

/// Named sound triggers consumed by the (out of scope) audio player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    BombExplosion,
}

/// A signal consumed or emitted by the encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Signal {
    // Consumed
    /// A critical hit landed; forces the weak state from any behavior state
    CriticalHitLanded { damage: i32 },
    /// The player touched ground; re-enables attacks after a phase pause
    PlayerGrounded,
    /// A dialog finished; the encounter activates on its configured id
    DialogEnded { dialog_id: i32 },

    // Emitted
    BossEnteredWeakState,
    BossExitedWeakState,
    BossPhaseChanged { phase: u8 },
    BossDefeated,
    /// Toggle for reversed player controls; published once to reverse and
    /// once more to restore
    PlayerControlToggled,
    PlayerHit { damage: i32 },
    CameraShake { duration: f32, magnitude: f32 },
    Sound(SoundCue),
    Animation(AnimationCue),
}

/// Discriminant used to key subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    CriticalHitLanded,
    PlayerGrounded,
    DialogEnded,
    BossEnteredWeakState,
    BossExitedWeakState,
    BossPhaseChanged,
    BossDefeated,
    PlayerControlToggled,
    PlayerHit,
    CameraShake,
    Sound,
    Animation,
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::CriticalHitLanded { .. } => SignalKind::CriticalHitLanded,
            Signal::PlayerGrounded => SignalKind::PlayerGrounded,
            Signal::DialogEnded { .. } => SignalKind::DialogEnded,
            Signal::BossEnteredWeakState => SignalKind::BossEnteredWeakState,
            Signal::BossExitedWeakState => SignalKind::BossExitedWeakState,
            Signal::BossPhaseChanged { .. } => SignalKind::BossPhaseChanged,
            Signal::BossDefeated => SignalKind::BossDefeated,
            Signal::PlayerControlToggled => SignalKind::PlayerControlToggled,
            Signal::PlayerHit { .. } => SignalKind::PlayerHit,
            Signal::CameraShake { .. } => SignalKind::CameraShake,
            Signal::Sound(_) => SignalKind::Sound,
            Signal::Animation(_) => SignalKind::Animation,
        }
    }
}

type Callback = Box<dyn FnMut(&Signal)>;

/// Publish/subscribe hub for one encounter
#[derive(Default)]
pub struct SignalBus {
    subscribers: AHashMap<SignalKind, Vec<Callback>>,
    history: Vec<Signal>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for one signal kind
    pub fn subscribe<F>(&mut self, kind: SignalKind, callback: F)
    where
        F: FnMut(&Signal) + 'static,
    {
        self.subscribers
            .entry(kind)
            .or_default()
            .push(Box::new(callback));
    }

    /// Publish a signal: invoke subscribers, then retain it in the history
    pub fn publish(&mut self, signal: Signal) {
        if let Some(callbacks) = self.subscribers.get_mut(&signal.kind()) {
            for callback in callbacks.iter_mut() {
                callback(&signal);
            }
        }
        self.history.push(signal);
    }

    pub fn has_subscribers(&self, kind: SignalKind) -> bool {
        self.subscribers
            .get(&kind)
            .is_some_and(|callbacks| !callbacks.is_empty())
    }

    /// Everything published since construction (or the last clear)
    pub fn history(&self) -> &[Signal] {
        &self.history
    }

    /// Count of published signals of one kind
    pub fn count(&self, kind: SignalKind) -> usize {
        self.history.iter().filter(|s| s.kind() == kind).count()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl std::fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalBus")
            .field("subscribed_kinds", &self.subscribers.len())
            .field("history_len", &self.history.len())
            .finish()
    }
}
