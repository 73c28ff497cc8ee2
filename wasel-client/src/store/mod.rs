//! Data store access
//!
//! [`DataStore`] is the seam between the dashboard and the hosted relational
//! store. Rows travel as JSON objects; repositories in `hooks` decode them into
//! `shared::models` types.
//!
//! - [`RestStore`]: PostgREST-style HTTP implementation
//! - [`MemoryStore`]: in-process implementation (tests, offline demos)

mod memory;
mod query;
mod rest;

pub use memory::MemoryStore;
pub use query::{Filter, Order, Query};
pub use rest::RestStore;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{ClientError, ClientResult};

/// Relational data store
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Rows of `table` matching `query`
    async fn select(&self, table: &str, query: &Query) -> ClientResult<Vec<Value>>;

    /// Zero or one row; more than one match is an error
    async fn select_one(&self, table: &str, query: &Query) -> ClientResult<Option<Value>>;

    /// Insert one row, returns the stored row (with generated columns)
    async fn insert(&self, table: &str, row: Value) -> ClientResult<Value>;

    /// Patch every row matching `query`, returns the updated rows
    async fn update(&self, table: &str, query: &Query, patch: Value) -> ClientResult<Vec<Value>>;

    /// Delete every row matching `query`, returns the number removed
    async fn delete(&self, table: &str, query: &Query) -> ClientResult<u64>;

    /// Exact row count
    async fn count(&self, table: &str, query: &Query) -> ClientResult<u64>;

    /// Call a stored procedure
    async fn rpc(&self, function: &str, args: Value) -> ClientResult<Value>;
}

/// Decode one row
pub fn decode<T: DeserializeOwned>(row: Value) -> ClientResult<T> {
    serde_json::from_value(row).map_err(Into::into)
}

/// Decode a list of rows
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> ClientResult<Vec<T>> {
    rows.into_iter().map(decode).collect()
}

/// Encode a payload as a JSON object row
pub fn encode<T: Serialize>(payload: &T) -> ClientResult<Value> {
    let value = serde_json::to_value(payload)?;
    if !value.is_object() {
        return Err(ClientError::Validation("row payload must be an object".into()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_rejects_non_objects() {
        assert!(encode(&json!({"a": 1})).is_ok());
        assert!(matches!(encode(&42), Err(ClientError::Validation(_))));
    }

    #[test]
    fn test_decode_rows() {
        #[derive(serde::Deserialize)]
        struct Row {
            id: String,
        }
        let rows: Vec<Row> = decode_rows(vec![json!({"id": "a"}), json!({"id": "b"})]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].id, "b");
    }
}
