//! In-process data store

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use serde_json::{Map, Value};

use super::{DataStore, Query};
use crate::{ClientError, ClientResult};

type RpcHandler = Arc<dyn Fn(&MemoryStore, Value) -> ClientResult<Value> + Send + Sync>;

/// DashMap-backed store
///
/// Rows without an `id` get a UUID; `created_at`/`updated_at` are stamped on
/// write. Tables can be switched into a failing mode to exercise error paths.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<DashMap<String, Vec<Value>>>,
    procedures: Arc<DashMap<String, RpcHandler>>,
    failing: Arc<DashSet<String>>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("tables", &self.tables.len())
            .field("procedures", &self.procedures.len())
            .finish()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stored procedure
    pub fn register_rpc<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&MemoryStore, Value) -> ClientResult<Value> + Send + Sync + 'static,
    {
        self.procedures.insert(name.into(), Arc::new(handler));
    }

    /// Make every call touching `table` fail with an internal error
    pub fn set_failing(&self, table: &str, failing: bool) {
        if failing {
            self.failing.insert(table.to_string());
        } else {
            self.failing.remove(table);
        }
    }

    /// Synchronous row read (for procedures and test assertions)
    pub fn rows(&self, table: &str, query: &Query) -> Vec<Value> {
        self.tables
            .get(table)
            .map(|rows| query.apply(rows.iter().cloned()))
            .unwrap_or_default()
    }

    fn check(&self, table: &str) -> ClientResult<()> {
        if self.failing.contains(table) {
            return Err(ClientError::Internal(format!("{table} unavailable")));
        }
        Ok(())
    }
}

fn now_rfc3339() -> Value {
    Value::String(chrono::Utc::now().to_rfc3339())
}

fn as_object(row: Value) -> ClientResult<Map<String, Value>> {
    match row {
        Value::Object(map) => Ok(map),
        _ => Err(ClientError::Validation("row payload must be an object".into())),
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn select(&self, table: &str, query: &Query) -> ClientResult<Vec<Value>> {
        self.check(table)?;
        Ok(self.rows(table, query))
    }

    async fn select_one(&self, table: &str, query: &Query) -> ClientResult<Option<Value>> {
        self.check(table)?;
        let mut rows = self.rows(table, &query.clone().limit(2));
        match rows.len() {
            0 => Ok(None),
            1 => Ok(rows.pop()),
            _ => Err(ClientError::InvalidResponse(format!(
                "expected at most one row from {table}"
            ))),
        }
    }

    async fn insert(&self, table: &str, row: Value) -> ClientResult<Value> {
        self.check(table)?;
        let mut map = as_object(row)?;
        let id = match map.get("id") {
            Some(Value::String(id)) => id.clone(),
            _ => {
                let id = uuid::Uuid::new_v4().to_string();
                map.insert("id".into(), Value::String(id.clone()));
                id
            }
        };
        map.entry("created_at").or_insert_with(now_rfc3339);

        let mut rows = self.tables.entry(table.to_string()).or_default();
        if rows.iter().any(|r| r.get("id").and_then(Value::as_str) == Some(id.as_str())) {
            return Err(ClientError::Conflict(format!("{table}.id {id} already exists")));
        }
        let row = Value::Object(map);
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> ClientResult<Vec<Value>> {
        self.check(table)?;
        let patch = as_object(patch)?;
        let Some(mut rows) = self.tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let mut updated = Vec::new();
        for row in rows.iter_mut().filter(|r| query.matches(r)) {
            if let Value::Object(map) = row {
                for (k, v) in &patch {
                    map.insert(k.clone(), v.clone());
                }
                map.insert("updated_at".into(), now_rfc3339());
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, query: &Query) -> ClientResult<u64> {
        self.check(table)?;
        let Some(mut rows) = self.tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !query.matches(r));
        Ok((before - rows.len()) as u64)
    }

    async fn count(&self, table: &str, query: &Query) -> ClientResult<u64> {
        self.check(table)?;
        Ok(self.rows(table, &Query { limit: None, ..query.clone() }).len() as u64)
    }

    async fn rpc(&self, function: &str, args: Value) -> ClientResult<Value> {
        let handler = self
            .procedures
            .get(function)
            .map(|h| Arc::clone(h.value()))
            .ok_or_else(|| ClientError::NotFound(format!("function {function}")))?;
        handler(self, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_id_and_rejects_duplicates() {
        let store = MemoryStore::new();
        let row = store.insert("sheets", json!({"name": "A"})).await.unwrap();
        let id = row["id"].as_str().unwrap().to_string();
        assert!(row.get("created_at").is_some());

        let err = store
            .insert("sheets", json!({"id": id, "name": "B"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_delete_count() {
        let store = MemoryStore::new();
        for (id, status) in [("s1", "pending"), ("s2", "pending"), ("s3", "delivered")] {
            store
                .insert("shipments", json!({"id": id, "status": status}))
                .await
                .unwrap();
        }
        let pending = Query::new().eq("status", "pending");
        assert_eq!(store.count("shipments", &pending).await.unwrap(), 2);

        let updated = store
            .update("shipments", &Query::new().eq("id", "s1"), json!({"status": "transit"}))
            .await
            .unwrap();
        assert_eq!(updated[0]["status"], "transit");
        assert!(updated[0].get("updated_at").is_some());

        assert_eq!(store.delete("shipments", &pending).await.unwrap(), 1);
        assert_eq!(store.count("shipments", &Query::new()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_select_one_rejects_multiple_rows() {
        let store = MemoryStore::new();
        store.insert("user_roles", json!({"user_id": "u", "role": "manager"})).await.unwrap();
        store.insert("user_roles", json!({"user_id": "u", "role": "courier"})).await.unwrap();
        let query = Query::new().eq("user_id", "u");
        assert!(store.select_one("user_roles", &query).await.is_err());
        assert!(store
            .select_one("user_roles", &Query::new().eq("user_id", "x"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_failing_table_and_rpc() {
        let store = MemoryStore::new();
        store.set_failing("user_roles", true);
        assert!(store.select("user_roles", &Query::new()).await.is_err());
        store.set_failing("user_roles", false);
        assert!(store.select("user_roles", &Query::new()).await.is_ok());

        store.register_rpc("echo", |_, args| Ok(args));
        assert_eq!(store.rpc("echo", json!({"a": 1})).await.unwrap(), json!({"a": 1}));
        assert!(matches!(
            store.rpc("missing", Value::Null).await,
            Err(ClientError::NotFound(_))
        ));
    }
}
