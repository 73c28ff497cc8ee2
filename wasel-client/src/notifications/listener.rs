//! Shipment change listener
//!
//! Status-change alerts compare `old_record.status` with `record.status`.
//! The backend only ships the full previous row when the `shipments` table
//! has `REPLICA IDENTITY FULL`; with the default identity the old row holds
//! just the primary key and every status update is skipped (logged at warn).

use shared::models::{ShipmentStatus, tables};
use shared::{ChangeEvent, ChangeKind};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{Notification, NotificationCenter, NotificationKind};
use crate::realtime::{ChangeFeed, ChangeSubscription};

const NEW_SHIPMENT_TITLE: &str = "شحنة جديدة";
const STATUS_CHANGE_TITLE: &str = "تحديث حالة الشحنة";

/// Alert for a shipment change, if it deserves one
///
/// - insert: new shipment
/// - update whose `status` differs between the old and new row: status change
/// - anything else (including updates whose old row carries no status): none
pub fn notification_for(event: &ChangeEvent) -> Option<Notification> {
    let shipment_id = event.field_str("id");
    let tracking = event.field_str("tracking_number");
    let label = tracking.or(shipment_id).unwrap_or("-");

    match event.kind {
        ChangeKind::Insert => Some(
            Notification::new(
                NotificationKind::NewShipment,
                NEW_SHIPMENT_TITLE,
                format!("تمت إضافة شحنة جديدة رقم {label}"),
            )
            .for_shipment(shipment_id, tracking),
        ),
        ChangeKind::Update => {
            let (Some(old), new) = event.changed_str("status")? else {
                tracing::warn!(
                    shipment = label,
                    table = %event.table,
                    "update without previous status skipped, table needs REPLICA IDENTITY FULL"
                );
                return None;
            };
            let old = ShipmentStatus::parse(old);
            let new = ShipmentStatus::parse(new);
            Some(
                Notification::new(
                    NotificationKind::StatusChange,
                    STATUS_CHANGE_TITLE,
                    format!(
                        "تم تغيير حالة الشحنة {label} من {} إلى {}",
                        old.label(),
                        new.label()
                    ),
                )
                .for_shipment(shipment_id, tracking),
            )
        }
        ChangeKind::Delete => None,
    }
}

/// 通知监听器
///
/// Owns one task subscribed to `shipments` changes. Dropping the listener (or
/// calling [`NotificationListener::shutdown`]) unsubscribes.
pub struct NotificationListener {
    shutdown: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl NotificationListener {
    pub fn spawn(feed: &dyn ChangeFeed, center: NotificationCenter) -> Self {
        let subscription = feed.subscribe(tables::SHIPMENTS);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(run(subscription, center, shutdown.clone()));
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for NotificationListener {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run(mut subscription: ChangeSubscription, center: NotificationCenter, shutdown: CancellationToken) {
    tracing::info!(table = subscription.table(), "notification listener started");
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            event = subscription.recv() => {
                let Some(event) = event else {
                    tracing::info!("change feed closed");
                    break;
                };
                if let Some(notification) = notification_for(&event) {
                    tracing::debug!(kind = ?notification.kind, "notification raised");
                    center.push(notification);
                }
            }
        }
    }
    tracing::info!("notification listener stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::MemoryChangeFeed;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_status_change_names_both_labels() {
        let event = ChangeEvent::update(
            tables::SHIPMENTS,
            json!({"id": "s-1", "tracking_number": "WS-1", "status": "transit"}),
            json!({"id": "s-1", "tracking_number": "WS-1", "status": "delivered"}),
        );
        let n = notification_for(&event).unwrap();
        assert_eq!(n.kind, NotificationKind::StatusChange);
        assert!(n.message.contains("قيد التوصيل"));
        assert!(n.message.contains("تم التسليم"));
        assert!(n.message.contains("WS-1"));
        assert_eq!(n.shipment_id.as_deref(), Some("s-1"));
    }

    #[test]
    fn test_ignored_events() {
        let same = ChangeEvent::update(
            tables::SHIPMENTS,
            json!({"id": "s-1", "status": "transit", "notes": "a"}),
            json!({"id": "s-1", "status": "transit", "notes": "b"}),
        );
        assert!(notification_for(&same).is_none());

        let no_old = ChangeEvent::update(tables::SHIPMENTS, json!({"id": "s-1"}), json!({"id": "s-1", "status": "delivered"}));
        assert!(notification_for(&no_old).is_none());

        let deleted = ChangeEvent::delete(tables::SHIPMENTS, json!({"id": "s-1"}));
        assert!(notification_for(&deleted).is_none());
    }

    #[test]
    fn test_unknown_status_is_shown_raw() {
        let event = ChangeEvent::update(
            tables::SHIPMENTS,
            json!({"id": "s-1", "status": "transit"}),
            json!({"id": "s-1", "status": "on_hold"}),
        );
        assert!(notification_for(&event).unwrap().message.contains("on_hold"));
    }

    #[tokio::test]
    async fn test_key_only_old_row_is_skipped_without_stalling() {
        let feed = MemoryChangeFeed::new();
        let center = NotificationCenter::default();
        let listener = NotificationListener::spawn(&feed, center.clone());
        let mut counts = center.subscribe();

        // 默认 replica identity: old_record 只有主键
        feed.publish(ChangeEvent::update(
            tables::SHIPMENTS,
            json!({"id": "s-1"}),
            json!({"id": "s-1", "tracking_number": "WS-1", "status": "delivered"}),
        ));
        feed.publish(ChangeEvent::insert(tables::SHIPMENTS, json!({"id": "s-2"})));
        tokio::time::timeout(Duration::from_secs(1), counts.wait_for(|c| c.total == 1))
            .await
            .unwrap()
            .unwrap();

        let list = center.list();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].kind, NotificationKind::NewShipment);
        assert!(listener.is_running());
        listener.shutdown().await;
    }

    #[tokio::test]
    async fn test_listener_feeds_center_and_stops() {
        let feed = MemoryChangeFeed::new();
        let center = NotificationCenter::default();
        let listener = NotificationListener::spawn(&feed, center.clone());
        let mut counts = center.subscribe();

        feed.publish(ChangeEvent::insert(tables::SHIPMENTS, json!({"id": "s-1", "tracking_number": "WS-1"})));
        tokio::time::timeout(Duration::from_secs(1), counts.wait_for(|c| c.total == 1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(center.list()[0].kind, NotificationKind::NewShipment);

        assert!(listener.is_running());
        listener.shutdown().await;
        assert_eq!(feed.receiver_count(), 0);
    }
}
