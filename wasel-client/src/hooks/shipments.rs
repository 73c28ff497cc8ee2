//! Shipments

use std::sync::Arc;

use serde_json::json;
use shared::ErrorCode;
use shared::models::{Shipment, ShipmentCreate, ShipmentStatus, ShipmentUpdate, tables};

use super::QueryHook;
use crate::store::{DataStore, Query, decode, decode_rows, encode};
use crate::{ClientError, ClientResult};

/// List filter; unset fields do not constrain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipmentFilter {
    pub status: Option<ShipmentStatus>,
    pub delegate_id: Option<String>,
    pub shipper_id: Option<String>,
    pub sheet_id: Option<String>,
    pub limit: Option<usize>,
}

impl ShipmentFilter {
    fn to_query(&self) -> Query {
        let mut query = Query::new();
        if let Some(status) = &self.status {
            query = query.eq("status", status.as_str());
        }
        if let Some(id) = &self.delegate_id {
            query = query.eq("delegate_id", id.as_str());
        }
        if let Some(id) = &self.shipper_id {
            query = query.eq("shipper_id", id.as_str());
        }
        if let Some(id) = &self.sheet_id {
            query = query.eq("sheet_id", id.as_str());
        }
        query = query.order_by("created_at", false);
        match self.limit {
            Some(limit) => query.limit(limit),
            None => query,
        }
    }
}

#[derive(Clone)]
pub struct ShipmentRepository {
    store: Arc<dyn DataStore>,
}

impl ShipmentRepository {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Newest first
    pub async fn list(&self, filter: &ShipmentFilter) -> ClientResult<Vec<Shipment>> {
        let rows = self.store.select(tables::SHIPMENTS, &filter.to_query()).await?;
        decode_rows(rows)
    }

    pub async fn get(&self, id: &str) -> ClientResult<Shipment> {
        let row = self
            .store
            .select_one(tables::SHIPMENTS, &Query::new().eq("id", id))
            .await?
            .ok_or_else(|| ClientError::row_missing(ErrorCode::ShipmentNotFound, id))?;
        decode(row)
    }

    pub async fn find_by_tracking(&self, tracking_number: &str) -> ClientResult<Option<Shipment>> {
        let query = Query::new().eq("tracking_number", tracking_number);
        self.store
            .select_one(tables::SHIPMENTS, &query)
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn create(&self, payload: &ShipmentCreate) -> ClientResult<Shipment> {
        if payload.tracking_number.trim().is_empty() {
            return Err(ClientError::Validation("tracking_number is required".into()));
        }
        let row = self.store.insert(tables::SHIPMENTS, encode(payload)?).await?;
        decode(row)
    }

    pub async fn update(&self, id: &str, patch: &ShipmentUpdate) -> ClientResult<Shipment> {
        let mut rows = self
            .store
            .update(tables::SHIPMENTS, &Query::new().eq("id", id), encode(patch)?)
            .await?;
        let row = rows
            .pop()
            .ok_or_else(|| ClientError::row_missing(ErrorCode::ShipmentNotFound, id))?;
        decode(row)
    }

    pub async fn update_status(&self, id: &str, status: ShipmentStatus) -> ClientResult<Shipment> {
        tracing::debug!(shipment_id = id, %status, "updating shipment status");
        self.update(
            id,
            &ShipmentUpdate {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// Hand a shipment to a courier
    pub async fn assign_delegate(&self, id: &str, delegate_id: &str) -> ClientResult<Shipment> {
        self.update(
            id,
            &ShipmentUpdate {
                delegate_id: Some(delegate_id.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn assign_sheet(&self, id: &str, sheet_id: &str) -> ClientResult<Shipment> {
        self.update(
            id,
            &ShipmentUpdate {
                sheet_id: Some(sheet_id.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        match self.store.delete(tables::SHIPMENTS, &Query::new().eq("id", id)).await? {
            0 => Err(ClientError::row_missing(ErrorCode::ShipmentNotFound, id)),
            _ => Ok(()),
        }
    }

    /// Shipments on a sheet, via the `get_sheet_shipment_count` procedure
    pub async fn count_by_sheet(&self, sheet_id: &str) -> ClientResult<u64> {
        let value = self
            .store
            .rpc("get_sheet_shipment_count", json!({ "sheet_id": sheet_id }))
            .await?;
        value
            .as_u64()
            .ok_or_else(|| ClientError::InvalidResponse(format!("non-numeric count: {value}")))
    }

    /// Hook over `list(filter)`
    pub fn hook(&self, filter: ShipmentFilter) -> QueryHook<Vec<Shipment>> {
        let repo = self.clone();
        QueryHook::new(move || {
            let repo = repo.clone();
            let filter = filter.clone();
            async move { repo.list(&filter).await }
        })
    }
}
