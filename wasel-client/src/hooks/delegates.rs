//! Delegates (couriers)

use std::sync::Arc;

use shared::ErrorCode;
use shared::models::{Delegate, DelegateCreate, DelegateUpdate, tables};

use super::QueryHook;
use crate::store::{DataStore, Query, decode, decode_rows, encode};
use crate::{ClientError, ClientResult};

#[derive(Clone)]
pub struct DelegateRepository {
    store: Arc<dyn DataStore>,
}

impl DelegateRepository {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Sorted by name
    pub async fn list(&self, active_only: bool) -> ClientResult<Vec<Delegate>> {
        let mut query = Query::new().order_by("name", true);
        if active_only {
            query = query.eq("is_active", true);
        }
        decode_rows(self.store.select(tables::DELEGATES, &query).await?)
    }

    pub async fn get(&self, id: &str) -> ClientResult<Delegate> {
        self.store
            .select_one(tables::DELEGATES, &Query::new().eq("id", id))
            .await?
            .map(decode)
            .transpose()?
            .ok_or_else(|| ClientError::row_missing(ErrorCode::DelegateNotFound, id))
    }

    /// Delegate record of a signed-in courier
    pub async fn find_by_user(&self, user_id: &str) -> ClientResult<Option<Delegate>> {
        self.store
            .select_one(tables::DELEGATES, &Query::new().eq("user_id", user_id))
            .await?
            .map(decode)
            .transpose()
    }

    pub async fn create(&self, payload: &DelegateCreate) -> ClientResult<Delegate> {
        if payload.name.trim().is_empty() || payload.phone.trim().is_empty() {
            return Err(ClientError::Validation("name and phone are required".into()));
        }
        let mut row = encode(payload)?;
        row["is_active"] = true.into();
        decode(self.store.insert(tables::DELEGATES, row).await?)
    }

    pub async fn update(&self, id: &str, patch: &DelegateUpdate) -> ClientResult<Delegate> {
        let mut rows = self
            .store
            .update(tables::DELEGATES, &Query::new().eq("id", id), encode(patch)?)
            .await?;
        decode(
            rows.pop()
                .ok_or_else(|| ClientError::row_missing(ErrorCode::DelegateNotFound, id))?,
        )
    }

    /// Soft delete; shipments keep pointing at the row
    pub async fn deactivate(&self, id: &str) -> ClientResult<Delegate> {
        self.update(
            id,
            &DelegateUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    pub fn hook(&self, active_only: bool) -> QueryHook<Vec<Delegate>> {
        let repo = self.clone();
        QueryHook::new(move || {
            let repo = repo.clone();
            async move { repo.list(active_only).await }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;

    fn payload(name: &str) -> DelegateCreate {
        DelegateCreate {
            name: name.into(),
            phone: "07800000000".into(),
            governorate_id: None,
            commission: Decimal::from(1_000),
        }
    }

    #[tokio::test]
    async fn test_deactivate_hides_from_active_list() {
        let repo = DelegateRepository::new(Arc::new(MemoryStore::new()));
        let karim = repo.create(&payload("Karim")).await.unwrap();
        repo.create(&payload("Ahmed")).await.unwrap();

        let names: Vec<_> = repo.list(false).await.unwrap().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Ahmed", "Karim"]);

        let karim = repo.deactivate(&karim.id).await.unwrap();
        assert!(!karim.is_active);
        assert_eq!(repo.list(true).await.unwrap().len(), 1);
        assert_eq!(repo.get(&karim.id).await.unwrap().commission, Decimal::from(1_000));
    }

    #[tokio::test]
    async fn test_missing_delegate() {
        let repo = DelegateRepository::new(Arc::new(MemoryStore::new()));
        let err = repo.get("d-404").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::DelegateNotFound);

        let err = repo.deactivate("d-404").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::RowMissing { code: ErrorCode::DelegateNotFound, ref id } if id == "d-404"
        ));
    }

    #[tokio::test]
    async fn test_hook_refetch() {
        let store = Arc::new(MemoryStore::new());
        let repo = DelegateRepository::new(store.clone());
        let hook = repo.hook(true);
        assert!(hook.refetch().await.data.is_empty());

        hook.mutate(repo.create(&payload("Sara"))).await.unwrap();
        assert_eq!(hook.state().data.len(), 1);

        store.set_failing(tables::DELEGATES, true);
        let state = hook.refetch().await;
        assert!(state.error.is_some());
        assert_eq!(state.data.len(), 1);
    }
}
