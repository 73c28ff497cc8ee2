//! Delivery sheets

use std::sync::Arc;

use serde_json::json;
use shared::ErrorCode;
use shared::models::{Sheet, SheetCreate, SheetStatus, SheetSummary, tables};

use super::{QueryHook, ShipmentRepository};
use crate::store::{DataStore, Query, decode, decode_rows, encode};
use crate::{ClientError, ClientResult};

#[derive(Clone)]
pub struct SheetRepository {
    store: Arc<dyn DataStore>,
    shipments: ShipmentRepository,
}

impl SheetRepository {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        let shipments = ShipmentRepository::new(Arc::clone(&store));
        Self { store, shipments }
    }

    /// Newest first
    pub async fn list(&self, delegate_id: Option<&str>) -> ClientResult<Vec<Sheet>> {
        let mut query = Query::new().order_by("created_at", false);
        if let Some(id) = delegate_id {
            query = query.eq("delegate_id", id);
        }
        decode_rows(self.store.select(tables::SHEETS, &query).await?)
    }

    pub async fn get(&self, id: &str) -> ClientResult<Sheet> {
        self.store
            .select_one(tables::SHEETS, &Query::new().eq("id", id))
            .await?
            .map(decode)
            .transpose()?
            .ok_or_else(|| ClientError::row_missing(ErrorCode::SheetNotFound, id))
    }

    pub async fn create(&self, payload: &SheetCreate) -> ClientResult<Sheet> {
        if payload.name.trim().is_empty() {
            return Err(ClientError::Validation("sheet name is required".into()));
        }
        let mut row = encode(payload)?;
        row["status"] = json!(SheetStatus::Open);
        decode(self.store.insert(tables::SHEETS, row).await?)
    }

    pub async fn close(&self, id: &str) -> ClientResult<Sheet> {
        let mut rows = self
            .store
            .update(
                tables::SHEETS,
                &Query::new().eq("id", id),
                json!({ "status": SheetStatus::Closed }),
            )
            .await?;
        decode(
            rows.pop()
                .ok_or_else(|| ClientError::row_missing(ErrorCode::SheetNotFound, id))?,
        )
    }

    /// Sheets with their shipment counts; one count call per sheet
    pub async fn summaries(&self, delegate_id: Option<&str>) -> ClientResult<Vec<SheetSummary>> {
        let sheets = self.list(delegate_id).await?;
        let mut out = Vec::with_capacity(sheets.len());
        for sheet in sheets {
            let shipment_count = self.shipments.count_by_sheet(&sheet.id).await?;
            out.push(SheetSummary {
                sheet,
                shipment_count,
            });
        }
        Ok(out)
    }

    pub fn hook(&self, delegate_id: Option<String>) -> QueryHook<Vec<SheetSummary>> {
        let repo = self.clone();
        QueryHook::new(move || {
            let repo = repo.clone();
            let delegate_id = delegate_id.clone();
            async move { repo.summaries(delegate_id.as_deref()).await }
        })
    }
}
