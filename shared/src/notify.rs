//! 状态通知函数的请求/响应类型
//!
//! Wire format of the `notify-status` function, shared by the dashboard client
//! (caller) and `notify-server` (handler).

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::ShipmentStatus;

/// Request body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NotifyStatusRequest {
    #[validate(length(min = 1, message = "shipment_id is required"))]
    pub shipment_id: String,
    pub new_status: ShipmentStatus,
    #[validate(length(min = 7, max = 20, message = "recipient_phone is invalid"))]
    pub recipient_phone: String,
    #[validate(length(min = 1, max = 120, message = "recipient_name is required"))]
    pub recipient_name: String,
    #[validate(length(min = 1, max = 64, message = "tracking_number is required"))]
    pub tracking_number: String,
}

impl NotifyStatusRequest {
    /// Phone numbers are digits with an optional leading `+`
    pub fn phone_is_well_formed(&self) -> bool {
        let digits = self
            .recipient_phone
            .strip_prefix('+')
            .unwrap_or(&self.recipient_phone);
        !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
    }
}

/// Response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyStatusResponse {
    pub success: bool,
    pub shipment_id: String,
    /// Message text handed to the carrier
    pub message: String,
    /// `false` when the shipment was updated but the carrier step failed
    pub notification_sent: bool,
}
