//! Shipment Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 货件状态
///
/// Serialized as the raw column text. Values written by other tools that are
/// not in the known set are kept verbatim in [`ShipmentStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShipmentStatus {
    Pending,
    PickedUp,
    Transit,
    Delivered,
    PartiallyDelivered,
    Postponed,
    Returned,
    Cancelled,
    Other(String),
}

impl ShipmentStatus {
    /// Known statuses, in workflow order
    pub const KNOWN: [ShipmentStatus; 8] = [
        ShipmentStatus::Pending,
        ShipmentStatus::PickedUp,
        ShipmentStatus::Transit,
        ShipmentStatus::Delivered,
        ShipmentStatus::PartiallyDelivered,
        ShipmentStatus::Postponed,
        ShipmentStatus::Returned,
        ShipmentStatus::Cancelled,
    ];

    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => Self::Pending,
            "picked_up" => Self::PickedUp,
            "transit" => Self::Transit,
            "delivered" => Self::Delivered,
            "partially_delivered" => Self::PartiallyDelivered,
            "postponed" => Self::Postponed,
            "returned" => Self::Returned,
            "cancelled" => Self::Cancelled,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::PickedUp => "picked_up",
            Self::Transit => "transit",
            Self::Delivered => "delivered",
            Self::PartiallyDelivered => "partially_delivered",
            Self::Postponed => "postponed",
            Self::Returned => "returned",
            Self::Cancelled => "cancelled",
            Self::Other(s) => s.as_str(),
        }
    }

    /// Arabic display label shown in the dashboard and in notifications
    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "قيد الانتظار",
            Self::PickedUp => "تم الاستلام",
            Self::Transit => "قيد التوصيل",
            Self::Delivered => "تم التسليم",
            Self::PartiallyDelivered => "تسليم جزئي",
            Self::Postponed => "مؤجل",
            Self::Returned => "مرتجع",
            Self::Cancelled => "ملغي",
            Self::Other(s) => s.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Terminal statuses close the shipment's delivery cycle
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Delivered | Self::PartiallyDelivered | Self::Returned | Self::Cancelled
        )
    }
}

impl From<String> for ShipmentStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ShipmentStatus> for String {
    fn from(value: ShipmentStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shipment entity (`shipments` row)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: String,
    pub tracking_number: String,
    pub recipient_name: String,
    pub recipient_phone: String,
    #[serde(default)]
    pub recipient_address: Option<String>,
    #[serde(default)]
    pub governorate_id: Option<String>,
    #[serde(default)]
    pub area_id: Option<String>,
    /// 货到付款金额
    #[serde(default, with = "rust_decimal::serde::float")]
    pub cod_amount: Decimal,
    #[serde(default, with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,
    pub status: ShipmentStatus,
    #[serde(default)]
    pub delegate_id: Option<String>,
    #[serde(default)]
    pub shipper_id: Option<String>,
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub sheet_id: Option<String>,
    /// Audit notes appended by the notification function
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Shipment {
    /// Amount the courier hands back after delivery
    pub fn net_collectable(&self) -> Decimal {
        self.cod_amount - self.delivery_fee
    }
}

/// Create shipment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentCreate {
    pub tracking_number: String,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub recipient_address: Option<String>,
    pub governorate_id: Option<String>,
    pub area_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub cod_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,
    pub shipper_id: Option<String>,
    pub store_id: Option<String>,
    pub status: ShipmentStatus,
}

/// Update shipment payload (only set fields are written)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipmentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ShipmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(ShipmentStatus::Transit.label(), "قيد التوصيل");
        assert_eq!(ShipmentStatus::Delivered.label(), "تم التسليم");
        assert_eq!(ShipmentStatus::parse("lost").label(), "lost");
    }

    #[test]
    fn test_status_serde_keeps_unknown_values() {
        let status: ShipmentStatus = serde_json::from_str("\"on_hold\"").unwrap();
        assert_eq!(status, ShipmentStatus::Other("on_hold".into()));
        assert!(!status.is_known());
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"on_hold\"");

        let status: ShipmentStatus = serde_json::from_str("\"picked_up\"").unwrap();
        assert_eq!(status, ShipmentStatus::PickedUp);
    }

    #[test]
    fn test_shipment_row_deserialize() {
        let row = serde_json::json!({
            "id": "s-1",
            "tracking_number": "WS-1001",
            "recipient_name": "Ali",
            "recipient_phone": "07700000000",
            "cod_amount": 25000,
            "delivery_fee": 5000.0,
            "status": "transit",
            "created_at": "2024-05-01T10:00:00Z"
        });
        let shipment: Shipment = serde_json::from_value(row).unwrap();
        assert_eq!(shipment.status, ShipmentStatus::Transit);
        assert_eq!(shipment.net_collectable(), Decimal::from(20000));
        assert!(shipment.delegate_id.is_none());
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let update = ShipmentUpdate {
            status: Some(ShipmentStatus::Delivered),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "delivered" }));
    }
}
