//! Shipper stores (pickup points)

use std::sync::Arc;

use shared::ErrorCode;
use shared::models::{Store, StoreCreate, tables};

use super::QueryHook;
use crate::store::{DataStore, Query, decode, decode_rows, encode};
use crate::{ClientError, ClientResult};

#[derive(Clone)]
pub struct StoreRepository {
    store: Arc<dyn DataStore>,
}

impl StoreRepository {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// All stores, or one shipper's
    pub async fn list(&self, shipper_id: Option<&str>) -> ClientResult<Vec<Store>> {
        let mut query = Query::new().order_by("name", true);
        if let Some(id) = shipper_id {
            query = query.eq("shipper_id", id);
        }
        decode_rows(self.store.select(tables::STORES, &query).await?)
    }

    pub async fn create(&self, payload: &StoreCreate) -> ClientResult<Store> {
        if payload.name.trim().is_empty() {
            return Err(ClientError::Validation("store name is required".into()));
        }
        decode(self.store.insert(tables::STORES, encode(payload)?).await?)
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        match self.store.delete(tables::STORES, &Query::new().eq("id", id)).await? {
            0 => Err(ClientError::row_missing(ErrorCode::StoreNotFound, id)),
            _ => Ok(()),
        }
    }

    pub fn hook(&self, shipper_id: Option<String>) -> QueryHook<Vec<Store>> {
        let repo = self.clone();
        QueryHook::new(move || {
            let repo = repo.clone();
            let shipper_id = shipper_id.clone();
            async move { repo.list(shipper_id.as_deref()).await }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_list_by_shipper() {
        let repo = StoreRepository::new(Arc::new(MemoryStore::new()));
        for (name, shipper) in [("B", "sh-1"), ("A", "sh-1"), ("C", "sh-2")] {
            repo.create(&StoreCreate {
                name: name.into(),
                shipper_id: Some(shipper.into()),
                phone: None,
                address: None,
                governorate_id: None,
            })
            .await
            .unwrap();
        }
        let names: Vec<_> = repo
            .list(Some("sh-1"))
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);

        let hook = repo.hook(None);
        assert_eq!(hook.refetch().await.data.len(), 3);
    }

    #[tokio::test]
    async fn test_delete_missing_store() {
        let repo = StoreRepository::new(Arc::new(MemoryStore::new()));
        let err = repo.delete("st-404").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::StoreNotFound);
    }
}
