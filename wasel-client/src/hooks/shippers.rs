//! Shippers (merchants)

use std::sync::Arc;

use shared::ErrorCode;
use shared::models::{Shipper, ShipperCreate, ShipperUpdate, tables};

use super::QueryHook;
use crate::store::{DataStore, Query, decode, decode_rows, encode};
use crate::{ClientError, ClientResult};

#[derive(Clone)]
pub struct ShipperRepository {
    store: Arc<dyn DataStore>,
}

impl ShipperRepository {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Sorted by name
    pub async fn list(&self, active_only: bool) -> ClientResult<Vec<Shipper>> {
        let mut query = Query::new().order_by("name", true);
        if active_only {
            query = query.eq("is_active", true);
        }
        decode_rows(self.store.select(tables::SHIPPERS, &query).await?)
    }

    pub async fn get(&self, id: &str) -> ClientResult<Shipper> {
        self.store
            .select_one(tables::SHIPPERS, &Query::new().eq("id", id))
            .await?
            .map(decode)
            .transpose()?
            .ok_or_else(|| ClientError::row_missing(ErrorCode::ShipperNotFound, id))
    }

    /// Shipper record of a signed-in merchant
    pub async fn find_by_user(&self, user_id: &str) -> ClientResult<Option<Shipper>> {
        self.store
            .select_one(tables::SHIPPERS, &Query::new().eq("user_id", user_id))
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn create(&self, payload: &ShipperCreate) -> ClientResult<Shipper> {
        if payload.name.trim().is_empty() || payload.phone.trim().is_empty() {
            return Err(ClientError::Validation("name and phone are required".into()));
        }
        let mut row = encode(payload)?;
        row["is_active"] = true.into();
        decode(self.store.insert(tables::SHIPPERS, row).await?)
    }

    pub async fn update(&self, id: &str, patch: &ShipperUpdate) -> ClientResult<Shipper> {
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ClientError::Validation("name must not be empty".into()));
        }
        let mut rows = self
            .store
            .update(tables::SHIPPERS, &Query::new().eq("id", id), encode(patch)?)
            .await?;
        decode(
            rows.pop()
                .ok_or_else(|| ClientError::row_missing(ErrorCode::ShipperNotFound, id))?,
        )
    }

    pub fn hook(&self, active_only: bool) -> QueryHook<Vec<Shipper>> {
        let repo = self.clone();
        QueryHook::new(move || {
            let repo = repo.clone();
            async move { repo.list(active_only).await }
        })
    }
}
