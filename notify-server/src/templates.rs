//! 状态消息模板
//!
//! Each known shipment status maps to one SMS body addressed to the recipient.
//! Statuses outside the known set have no template.

use shared::models::ShipmentStatus;

fn template(status: &ShipmentStatus) -> Option<&'static str> {
    let text = match status {
        ShipmentStatus::Pending => "مرحباً {name}، تم تسجيل شحنتك رقم {tracking} وهي قيد الانتظار.",
        ShipmentStatus::PickedUp => "مرحباً {name}، تم استلام شحنتك رقم {tracking} من المتجر.",
        ShipmentStatus::Transit => "مرحباً {name}، شحنتك رقم {tracking} في الطريق إليك.",
        ShipmentStatus::Delivered => "مرحباً {name}، تم تسليم شحنتك رقم {tracking} بنجاح. شكراً لك.",
        ShipmentStatus::PartiallyDelivered => {
            "مرحباً {name}، تم تسليم جزء من شحنتك رقم {tracking}."
        }
        ShipmentStatus::Postponed => "مرحباً {name}، تم تأجيل توصيل شحنتك رقم {tracking}.",
        ShipmentStatus::Returned => "مرحباً {name}، تم إرجاع شحنتك رقم {tracking} إلى المرسل.",
        ShipmentStatus::Cancelled => "مرحباً {name}، تم إلغاء شحنتك رقم {tracking}.",
        ShipmentStatus::Other(_) => return None,
    };
    Some(text)
}

/// Render the message for `status`, or `None` when the status has no template
pub fn render(status: &ShipmentStatus, recipient_name: &str, tracking_number: &str) -> Option<String> {
    template(status).map(|t| {
        t.replace("{name}", recipient_name)
            .replace("{tracking}", tracking_number)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_status_has_template() {
        for status in ShipmentStatus::KNOWN.iter() {
            let text = render(status, "Ali", "WS-1").unwrap();
            assert!(text.contains("Ali"));
            assert!(text.contains("WS-1"));
            assert!(!text.contains('{'));
        }
    }

    #[test]
    fn test_unknown_status_has_no_template() {
        assert!(render(&ShipmentStatus::parse("lost"), "Ali", "WS-1").is_none());
    }
}
