//! FaceID State Machine - locked / scanning / unlocked
//!
//! The machine holds exactly one sub-state. Callers drive it with events;
//! the transition table is closed, so any event it does not list for the
//! current sub-state is ignored rather than treated as a self-loop.

use std::fmt;

use pcpos_core::Color;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::symbols::{stage_palette, symbol_pool, FaceIdStage};

/// Fewest symbols ever shown
pub const MIN_SYMBOLS: usize = 5;
/// Extra symbols at full intensity
pub const INTENSITY_SYMBOLS: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockedPhase {
    Idle,
    TapReady,
    Wiggling,
    Alerting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanningPhase {
    Initializing,
    PulsingOrb,
    Analyzing,
    Verifying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnlockedPhase {
    Success,
    Confetti,
    Celebration,
    Settling,
}

/// Current lock state with its sub-state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "stage", content = "phase")]
pub enum FaceIdState {
    Locked(LockedPhase),
    Scanning(ScanningPhase),
    Unlocked(UnlockedPhase),
}

impl Default for FaceIdState {
    fn default() -> Self {
        FaceIdState::Locked(LockedPhase::Idle)
    }
}

impl FaceIdState {
    pub fn stage(&self) -> FaceIdStage {
        match self {
            FaceIdState::Locked(_) => FaceIdStage::Locked,
            FaceIdState::Scanning(_) => FaceIdStage::Scanning,
            FaceIdState::Unlocked(_) => FaceIdStage::Unlocked,
        }
    }

    /// Motion intensity in [0, 1]
    pub fn intensity(&self) -> f32 {
        match self {
            FaceIdState::Locked(phase) => match phase {
                LockedPhase::Idle => 0.1,
                LockedPhase::TapReady => 0.3,
                LockedPhase::Wiggling => 0.5,
                LockedPhase::Alerting => 0.8,
            },
            FaceIdState::Scanning(phase) => match phase {
                ScanningPhase::Initializing => 0.4,
                ScanningPhase::PulsingOrb => 0.6,
                ScanningPhase::Analyzing => 0.8,
                ScanningPhase::Verifying => 1.0,
            },
            FaceIdState::Unlocked(phase) => match phase {
                UnlockedPhase::Success => 0.9,
                UnlockedPhase::Confetti => 1.0,
                UnlockedPhase::Celebration => 0.8,
                UnlockedPhase::Settling => 0.3,
            },
        }
    }

    /// Next sub-state of the same stage; None on the last one
    pub fn advanced(&self) -> Option<FaceIdState> {
        use FaceIdState::*;
        let next = match *self {
            Locked(LockedPhase::Idle) => Locked(LockedPhase::TapReady),
            Locked(LockedPhase::TapReady) => Locked(LockedPhase::Wiggling),
            Locked(LockedPhase::Wiggling) => Locked(LockedPhase::Alerting),
            Scanning(ScanningPhase::Initializing) => Scanning(ScanningPhase::PulsingOrb),
            Scanning(ScanningPhase::PulsingOrb) => Scanning(ScanningPhase::Analyzing),
            Scanning(ScanningPhase::Analyzing) => Scanning(ScanningPhase::Verifying),
            Unlocked(UnlockedPhase::Success) => Unlocked(UnlockedPhase::Confetti),
            Unlocked(UnlockedPhase::Confetti) => Unlocked(UnlockedPhase::Celebration),
            Unlocked(UnlockedPhase::Celebration) => Unlocked(UnlockedPhase::Settling),
            Locked(LockedPhase::Alerting)
            | Scanning(ScanningPhase::Verifying)
            | Unlocked(UnlockedPhase::Settling) => return None,
        };
        Some(next)
    }

    /// Target of `event` from this state, or None when the table has no entry
    pub fn on_event(&self, event: FaceIdEvent) -> Option<FaceIdState> {
        use FaceIdState::*;
        match (*self, event) {
            (_, FaceIdEvent::Lock) => Some(Locked(LockedPhase::Idle)),
            (Locked(LockedPhase::TapReady), FaceIdEvent::Tap) => {
                Some(Scanning(ScanningPhase::Initializing))
            }
            (Locked(_), FaceIdEvent::Tap) => Some(Locked(LockedPhase::TapReady)),
            (_, FaceIdEvent::Advance) => self.advanced(),
            (Scanning(ScanningPhase::Verifying), FaceIdEvent::ScanComplete) => None,
            (Scanning(_), FaceIdEvent::ScanComplete) => Some(Scanning(ScanningPhase::Verifying)),
            (Scanning(_), FaceIdEvent::Verification(true)) => Some(Unlocked(UnlockedPhase::Success)),
            (Scanning(_), FaceIdEvent::Verification(false)) => Some(Locked(LockedPhase::Alerting)),
            _ => None,
        }
    }
}

impl fmt::Display for FaceIdState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceIdState::Locked(phase) => write!(f, "locked.{phase:?}"),
            FaceIdState::Scanning(phase) => write!(f, "scanning.{phase:?}"),
            FaceIdState::Unlocked(phase) => write!(f, "unlocked.{phase:?}"),
        }
    }
}

/// Caller-driven input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceIdEvent {
    Tap,
    Advance,
    ScanComplete,
    Verification(bool),
    Lock,
}

/// Outcome of a handled event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceIdTransition {
    pub from: FaceIdState,
    pub to: FaceIdState,
}

/// FaceID State Machine
#[derive(Debug)]
pub struct FaceIdStateMachine {
    state: FaceIdState,
    rng: StdRng,
    transitions: u64,
}

impl FaceIdStateMachine {
    pub fn new(seed: u64) -> Self {
        Self::with_state(FaceIdState::default(), seed)
    }

    pub fn with_state(state: FaceIdState, seed: u64) -> Self {
        FaceIdStateMachine {
            state,
            rng: StdRng::seed_from_u64(seed),
            transitions: 0,
        }
    }

    pub fn state(&self) -> FaceIdState {
        self.state
    }

    pub fn intensity(&self) -> f32 {
        self.state.intensity()
    }

    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Apply an event; returns the transition when one happened
    pub fn handle(&mut self, event: FaceIdEvent) -> Option<FaceIdTransition> {
        let Some(to) = self.state.on_event(event) else {
            tracing::trace!(state = %self.state, ?event, "face id event ignored");
            return None;
        };
        let from = self.state;
        self.state = to;
        self.transitions += 1;
        tracing::debug!(%from, %to, ?event, "face id transition");
        Some(FaceIdTransition { from, to })
    }

    /// Step to the next sub-state of the current stage
    pub fn advance(&mut self) -> bool {
        self.handle(FaceIdEvent::Advance).is_some()
    }

    /// A fresh random subset of the stage's pool.
    /// `min(intensity * 20 + 5, pool size)` distinct symbols.
    pub fn symbols_for(&mut self, state: FaceIdState, intensity: f32) -> Vec<&'static str> {
        let pool = symbol_pool(state.stage());
        let intensity = if intensity.is_nan() {
            0.0
        } else {
            intensity.clamp(0.0, 1.0)
        };
        let count = ((intensity * INTENSITY_SYMBOLS) as usize + MIN_SYMBOLS).min(pool.len());
        pool.choose_multiple(&mut self.rng, count).copied().collect()
    }

    /// Symbols for the current state at its own intensity
    pub fn current_symbols(&mut self) -> Vec<&'static str> {
        self.symbols_for(self.state, self.state.intensity())
    }

    pub fn palette(&self, state: FaceIdState) -> Vec<Color> {
        stage_palette(state.stage())
    }
}
