//! In-app notifications
//!
//! [`NotificationCenter`] holds the newest-first list; [`NotificationListener`]
//! feeds it from shipment change events.

mod center;
mod listener;

pub use center::{NotificationCenter, NotificationCounts};
pub use listener::{NotificationListener, notification_for};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewShipment,
    StatusChange,
}

/// One in-app alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub shipment_id: Option<String>,
    #[serde(default)]
    pub tracking_number: Option<String>,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            message: message.into(),
            kind,
            read: false,
            created_at: Utc::now(),
            shipment_id: None,
            tracking_number: None,
        }
    }

    pub fn for_shipment(mut self, shipment_id: Option<&str>, tracking_number: Option<&str>) -> Self {
        self.shipment_id = shipment_id.map(str::to_string);
        self.tracking_number = tracking_number.map(str::to_string);
        self
    }
}
