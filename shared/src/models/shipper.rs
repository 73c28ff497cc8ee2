//! Shipper Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 发货商 - the merchant handing shipments over for delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipper {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Create shipper payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipperCreate {
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
}

/// Update shipper payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipperUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
