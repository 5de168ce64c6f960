//! Session state and the scan workflow coordinator.

pub mod coordinator;
pub mod state;

pub use coordinator::{CoordinatorConfig, ReceiptSubmitter, ScanCoordinator};
pub use state::{Session, SessionId, SessionPhase};
