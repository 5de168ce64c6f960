//! Wire types for the backend's JSON contracts.

use serde::{Deserialize, Serialize};

/// One receipt line item as stored by the backend.
///
/// Field names on the wire are the backend's Portuguese CSV headers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptRow {
    #[serde(rename = "Estabelecimento")]
    pub establishment: String,

    #[serde(rename = "Produto")]
    pub product: String,

    #[serde(rename = "Quantidade")]
    pub quantity: String,

    #[serde(rename = "Unidade")]
    pub unit: String,

    #[serde(rename = "Valor_Total")]
    pub total_value: String,

    /// Empty when the item had no discount.
    #[serde(rename = "Desconto", default)]
    pub discount: String,
}

/// Per-store receipt count in the stats summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCount {
    pub name: String,
    pub count: u64,
}

/// Aggregate statistics over all stored receipts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub total_items: u64,
    pub total_value: f64,
    pub total_discount: f64,
    /// Top stores by item count.
    pub stores: Vec<StoreCount>,
}

/// `GET /api/stats` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct StatsResponse {
    pub success: bool,
    pub stats: Option<Stats>,
    pub message: Option<String>,
}

/// `GET /api/data` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct DataResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Vec<ReceiptRow>,
    pub message: Option<String>,
}

/// `POST /api/process` and `POST /api/clear` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct OutcomeResponse {
    pub success: bool,
    pub message: Option<String>,
}

/// Failure bodies carry either `{"error": …}` or `{"message": …}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}
