//! Store Model

use serde::{Deserialize, Serialize};

/// Pickup location belonging to a shipper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub shipper_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub governorate_id: Option<String>,
}

/// Create store payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCreate {
    pub name: String,
    pub shipper_id: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub governorate_id: Option<String>,
}
