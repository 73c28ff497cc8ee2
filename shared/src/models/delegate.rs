//! Delegate (courier) Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 快递员
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delegate {
    pub id: String,
    pub name: String,
    pub phone: String,
    /// Auth identity of the courier, when they can sign in
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub governorate_id: Option<String>,
    /// Fee the courier earns per delivered shipment
    #[serde(default, with = "rust_decimal::serde::float")]
    pub commission: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Create delegate payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelegateCreate {
    pub name: String,
    pub phone: String,
    pub governorate_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub commission: Decimal,
}

/// Update delegate payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DelegateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
