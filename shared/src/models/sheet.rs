//! Sheet Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sheet status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetStatus {
    #[default]
    Open,
    Closed,
}

/// 派送单 - a named batch of shipments handed to one courier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub delegate_id: Option<String>,
    #[serde(default)]
    pub status: SheetStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Create sheet payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetCreate {
    pub name: String,
    pub delegate_id: Option<String>,
}

/// Sheet with its shipment count (from the `get_sheet_shipment_count` RPC)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetSummary {
    #[serde(flatten)]
    pub sheet: Sheet,
    pub shipment_count: u64,
}
