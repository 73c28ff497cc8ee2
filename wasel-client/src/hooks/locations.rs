//! Governorates and areas (read-only reference data)

use std::sync::Arc;

use shared::models::{Area, Governorate, tables};

use crate::ClientResult;
use crate::store::{DataStore, Query, decode_rows};

#[derive(Clone)]
pub struct LocationRepository {
    store: Arc<dyn DataStore>,
}

impl LocationRepository {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub async fn governorates(&self) -> ClientResult<Vec<Governorate>> {
        let query = Query::new().order_by("name", true);
        decode_rows(self.store.select(tables::GOVERNORATES, &query).await?)
    }

    pub async fn areas(&self, governorate_id: &str) -> ClientResult<Vec<Area>> {
        let query = Query::new()
            .eq("governorate_id", governorate_id)
            .order_by("name", true);
        decode_rows(self.store.select(tables::AREAS, &query).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[tokio::test]
    async fn test_reference_data() {
        let store = MemoryStore::new();
        store
            .insert(tables::GOVERNORATES, json!({"id": "g-1", "name": "Basra", "delivery_fee": 6000}))
            .await
            .unwrap();
        store
            .insert(tables::GOVERNORATES, json!({"id": "g-2", "name": "Baghdad", "delivery_fee": 5000}))
            .await
            .unwrap();
        store
            .insert(tables::AREAS, json!({"name": "Karrada", "governorate_id": "g-2"}))
            .await
            .unwrap();

        let repo = LocationRepository::new(Arc::new(store));
        let govs = repo.governorates().await.unwrap();
        assert_eq!(govs[0].name, "Baghdad");
        assert_eq!(govs[0].delivery_fee, Decimal::from(5000));
        assert_eq!(repo.areas("g-2").await.unwrap().len(), 1);
        assert!(repo.areas("g-1").await.unwrap().is_empty());
    }
}
