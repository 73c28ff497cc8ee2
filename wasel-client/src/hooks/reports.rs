//! Shipment reports

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{Shipment, ShipmentStatus, tables};

use super::QueryHook;
use crate::store::{DataStore, Query, decode_rows};
use crate::ClientResult;

/// Shipment counts per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub total: u64,
    /// Known statuses in workflow order
    pub by_status: Vec<(ShipmentStatus, u64)>,
}

impl StatusReport {
    pub fn count(&self, status: &ShipmentStatus) -> u64 {
        self.by_status
            .iter()
            .find(|(s, _)| s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Delivered (fully or partially) share of all shipments, in percent
    pub fn delivery_rate(&self) -> Decimal {
        if self.total == 0 {
            return Decimal::ZERO;
        }
        let delivered = self.count(&ShipmentStatus::Delivered)
            + self.count(&ShipmentStatus::PartiallyDelivered);
        (Decimal::from(delivered) * Decimal::ONE_HUNDRED / Decimal::from(self.total)).round_dp(2)
    }
}

#[derive(Clone)]
pub struct ReportRepository {
    store: Arc<dyn DataStore>,
}

impl ReportRepository {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Counts for all shipments, or one courier's
    pub async fn status_report(&self, delegate_id: Option<&str>) -> ClientResult<StatusReport> {
        let base = match delegate_id {
            Some(id) => Query::new().eq("delegate_id", id),
            None => Query::new(),
        };
        let total = self.store.count(tables::SHIPMENTS, &base).await?;
        let mut by_status = Vec::with_capacity(ShipmentStatus::KNOWN.len());
        for status in ShipmentStatus::KNOWN {
            let query = base.clone().eq("status", status.as_str());
            let n = self.store.count(tables::SHIPMENTS, &query).await?;
            by_status.push((status, n));
        }
        Ok(StatusReport { total, by_status })
    }

    /// COD collected on delivered shipments
    pub async fn collected_cod(&self, delegate_id: Option<&str>) -> ClientResult<Decimal> {
        let mut query = Query::new().eq("status", ShipmentStatus::Delivered.as_str());
        if let Some(id) = delegate_id {
            query = query.eq("delegate_id", id);
        }
        let shipments: Vec<Shipment> =
            decode_rows(self.store.select(tables::SHIPMENTS, &query).await?)?;
        Ok(shipments.iter().map(|s| s.cod_amount).sum())
    }

    pub fn hook(&self, delegate_id: Option<String>) -> QueryHook<StatusReport> {
        let repo = self.clone();
        QueryHook::new(move || {
            let repo = repo.clone();
            let delegate_id = delegate_id.clone();
            async move { repo.status_report(delegate_id.as_deref()).await }
        })
    }
}
