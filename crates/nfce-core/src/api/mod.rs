//! Client for the scraping backend's REST API.
//!
//! The backend (receipt scraping, CSV storage) is an external collaborator;
//! this module only speaks its observed JSON contracts.

pub mod client;
pub mod types;

pub use client::{ApiClient, ApiError, HttpSubmitter};
pub use types::{ReceiptRow, Stats, StoreCount};
