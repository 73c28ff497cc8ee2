//! Governorate / Area Models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 省 (governorate)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Governorate {
    pub id: String,
    pub name: String,
    /// Default delivery fee for shipments into this governorate
    #[serde(default, with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,
}

/// Area inside a governorate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub name: String,
    pub governorate_id: String,
}
