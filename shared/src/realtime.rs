//! 实时变更事件
//!
//! Row-level change events delivered by the realtime change feed. The feed
//! sends whole rows as JSON; typed access goes through [`ChangeEvent::record_as`].

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Change type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// One row change on one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: String,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// New row version (empty object for deletes)
    #[serde(default)]
    pub record: Value,
    /// Previous row version; only present for updates/deletes when the
    /// table publishes full replica identity
    #[serde(default)]
    pub old_record: Option<Value>,
    #[serde(default)]
    pub commit_timestamp: Option<DateTime<Utc>>,
}

impl ChangeEvent {
    pub fn insert(table: impl Into<String>, record: Value) -> Self {
        Self {
            table: table.into(),
            kind: ChangeKind::Insert,
            record,
            old_record: None,
            commit_timestamp: Some(Utc::now()),
        }
    }

    pub fn update(table: impl Into<String>, old_record: Value, record: Value) -> Self {
        Self {
            table: table.into(),
            kind: ChangeKind::Update,
            record,
            old_record: Some(old_record),
            commit_timestamp: Some(Utc::now()),
        }
    }

    pub fn delete(table: impl Into<String>, old_record: Value) -> Self {
        Self {
            table: table.into(),
            kind: ChangeKind::Delete,
            record: Value::Object(Default::default()),
            old_record: Some(old_record),
            commit_timestamp: Some(Utc::now()),
        }
    }

    /// String column of the new row
    pub fn field_str(&self, field: &str) -> Option<&str> {
        self.record.get(field).and_then(Value::as_str)
    }

    /// String column of the old row
    pub fn old_field_str(&self, field: &str) -> Option<&str> {
        self.old_record
            .as_ref()
            .and_then(|old| old.get(field))
            .and_then(Value::as_str)
    }

    /// `(old, new)` when the column differs between the two row versions
    pub fn changed_str(&self, field: &str) -> Option<(Option<&str>, &str)> {
        let new = self.field_str(field)?;
        let old = self.old_field_str(field);
        if old == Some(new) {
            return None;
        }
        Some((old, new))
    }

    pub fn record_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_changed_str() {
        let event = ChangeEvent::update(
            "shipments",
            json!({"id": "s-1", "status": "transit"}),
            json!({"id": "s-1", "status": "delivered"}),
        );
        assert_eq!(
            event.changed_str("status"),
            Some((Some("transit"), "delivered"))
        );
        assert_eq!(event.changed_str("id"), None);
    }

    #[test]
    fn test_changed_str_without_old_row() {
        let mut event = ChangeEvent::update("shipments", json!({}), json!({"status": "pending"}));
        event.old_record = None;
        assert_eq!(event.changed_str("status"), Some((None, "pending")));
    }

    #[test]
    fn test_kind_serde() {
        let event: ChangeEvent = serde_json::from_value(json!({
            "table": "shipments",
            "type": "INSERT",
            "record": {"id": "s-2"}
        }))
        .unwrap();
        assert_eq!(event.kind, ChangeKind::Insert);
        assert_eq!(event.field_str("id"), Some("s-2"));
        assert!(event.old_record.is_none());
    }
}
