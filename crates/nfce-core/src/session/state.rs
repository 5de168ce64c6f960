//! Per-session capture state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a capture session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derived view of a session's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    /// Capture not active.
    Idle,
    /// Capture active, ready to accept a decode.
    Armed,
    /// Capture active, a submission (or its cooldown) is in flight.
    Busy,
}

/// One capture session.
///
/// Owned exclusively by the [`ScanCoordinator`](super::ScanCoordinator);
/// nothing else mutates it. `processing` is the re-entrancy guard: it stays
/// true from the moment a decode is accepted until the submission outcome's
/// cooldown has elapsed.
#[derive(Debug)]
pub struct Session {
    /// Unique session identifier (for log correlation)
    pub id: SessionId,

    /// Whether the capture source is running
    pub active: bool,

    /// Whether a submission or its cooldown is in flight
    pub processing: bool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            active: false,
            processing: false,
        }
    }

    /// Derived phase: `Idle` when inactive, `Busy` while the guard is held.
    pub fn phase(&self) -> SessionPhase {
        if !self.active {
            SessionPhase::Idle
        } else if self.processing {
            SessionPhase::Busy
        } else {
            SessionPhase::Armed
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
