//! Capture capability interface.
//!
//! The coordinator never talks to a camera or a QR decoder directly. It
//! consumes [`ScanEvent`]s from whatever implements [`ScanSource`]: a
//! browser widget, an OpenCV capture loop, or a line-per-payload stdin feed
//! in the terminal front-end. The trait keeps the decoder substitutable
//! with a fake in tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An immutable decoded-QR value produced by the external decoder.
///
/// Consumed once by the coordinator, never retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    /// The decoded payload (for NFCe codes, a receipt URL).
    pub payload: String,
    /// When the decoder fired.
    pub timestamp: DateTime<Utc>,
}

impl ScanEvent {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Device and permission failures from the capture side.
///
/// These are surfaced to the user as-is; the coordinator never retries
/// capture errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("camera access denied - allow camera permission and try again")]
    PermissionDenied,

    #[error("no capture device found")]
    DeviceNotFound,

    #[error("capture device is busy - close other applications using it")]
    DeviceBusy,

    #[error("capture not supported: {0}")]
    NotSupported(String),

    #[error("{0}")]
    Other(String),
}

/// Handler invoked for every successfully decoded payload.
pub type DecodeHandler = Box<dyn Fn(ScanEvent) + Send + Sync>;

/// Handler invoked for capture-side failures.
pub type ErrorHandler = Box<dyn Fn(ScanError) + Send + Sync>;

/// Capability interface over whatever produces decoded payloads.
///
/// Implementations deliver events in device-capture order. `stop` must be
/// an idempotent no-op when the source is not running.
pub trait ScanSource: Send {
    /// Begin capture, delivering decodes and errors to the handlers.
    fn start(
        &mut self,
        on_decoded: DecodeHandler,
        on_error: ErrorHandler,
    ) -> Result<(), ScanError>;

    /// Stop capture. Safe to call when already stopped.
    fn stop(&mut self);
}
