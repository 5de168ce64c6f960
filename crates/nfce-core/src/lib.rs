//! # nfce-core
//!
//! Core logic for the NFCe reader, the QR-receipt capture pipeline.
//!
//! This crate is framework-agnostic and can be used by:
//! - Terminal front-end (stdin-fed scan source)
//! - Desktop capture loop (camera-backed scan source)
//! - Web front-end (via WebSocket event forwarding)
//!
//! ## Key Concepts
//!
//! - **Session**: one active capture session with its re-entrancy guard
//! - **ScanCoordinator**: serializes decode events into at-most-one
//!   concurrent submission and paces re-arming with cooldowns
//! - **UiEvent**: unified feedback event consumed by whatever renders
//!   alerts to the user

pub mod api;
pub mod event_bus;
pub mod journal;
pub mod payload;
pub mod scanner;
pub mod session;

// Re-export commonly used types
pub use api::{ApiClient, ApiError, HttpSubmitter};
pub use event_bus::{AlertLevel, EventBus, UiEvent};
pub use scanner::{ScanError, ScanEvent, ScanSource};
pub use session::{CoordinatorConfig, ReceiptSubmitter, ScanCoordinator, Session, SessionId, SessionPhase};
