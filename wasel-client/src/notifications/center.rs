use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use super::Notification;
use crate::config::DEFAULT_NOTIFICATION_CAPACITY;

/// Counters published on every change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationCounts {
    pub total: usize,
    pub unread: usize,
}

struct Inner {
    items: Mutex<VecDeque<Notification>>,
    capacity: usize,
    counts: watch::Sender<NotificationCounts>,
}

/// 通知中心
///
/// Newest-first bounded list. Once `capacity` is reached the oldest entry is
/// evicted on every push. Clones share the same list.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_NOTIFICATION_CAPACITY)
    }
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("capacity", &self.inner.capacity)
            .field("counts", &self.counts())
            .finish()
    }
}

impl NotificationCenter {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (counts, _) = watch::channel(NotificationCounts::default());
        Self {
            inner: Arc::new(Inner {
                items: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
                capacity,
                counts,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Prepend; evicts the oldest entry when full
    pub fn push(&self, notification: Notification) {
        let mut items = self.inner.items.lock();
        items.push_front(notification);
        if items.len() > self.inner.capacity {
            items.pop_back();
        }
        self.publish(&items);
    }

    /// Snapshot, newest first
    pub fn list(&self) -> Vec<Notification> {
        self.inner.items.lock().iter().cloned().collect()
    }

    pub fn total(&self) -> usize {
        self.inner.items.lock().len()
    }

    pub fn unread(&self) -> usize {
        self.inner.items.lock().iter().filter(|n| !n.read).count()
    }

    pub fn counts(&self) -> NotificationCounts {
        *self.inner.counts.borrow()
    }

    /// Returns false when no notification has that id
    pub fn mark_read(&self, id: &str) -> bool {
        let mut items = self.inner.items.lock();
        let Some(item) = items.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        item.read = true;
        self.publish(&items);
        true
    }

    pub fn mark_all_read(&self) {
        let mut items = self.inner.items.lock();
        items.iter_mut().for_each(|n| n.read = true);
        self.publish(&items);
    }

    pub fn clear_all(&self) {
        let mut items = self.inner.items.lock();
        items.clear();
        self.publish(&items);
    }

    pub fn subscribe(&self) -> watch::Receiver<NotificationCounts> {
        self.inner.counts.subscribe()
    }

    fn publish(&self, items: &VecDeque<Notification>) {
        let counts = NotificationCounts {
            total: items.len(),
            unread: items.iter().filter(|n| !n.read).count(),
        };
        self.inner.counts.send_replace(counts);
    }
}
