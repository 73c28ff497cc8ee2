//! Balance transactions

use std::sync::Arc;

use shared::models::{BalanceSummary, BalanceTransaction, NewBalanceTransaction, tables};

use super::QueryHook;
use crate::store::{DataStore, Query, decode, decode_rows, encode};
use crate::ClientResult;

/// Owner of a balance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceOwner {
    Delegate(String),
    Shipper(String),
}

impl BalanceOwner {
    fn query(&self) -> Query {
        match self {
            Self::Delegate(id) => Query::new().eq("delegate_id", id.as_str()),
            Self::Shipper(id) => Query::new().eq("shipper_id", id.as_str()),
        }
    }
}

#[derive(Clone)]
pub struct BalanceRepository {
    store: Arc<dyn DataStore>,
}

impl BalanceRepository {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Newest first
    pub async fn transactions(&self, owner: &BalanceOwner) -> ClientResult<Vec<BalanceTransaction>> {
        let query = owner.query().order_by("created_at", false);
        decode_rows(self.store.select(tables::BALANCE_TRANSACTIONS, &query).await?)
    }

    pub async fn record(&self, tx: &NewBalanceTransaction) -> ClientResult<BalanceTransaction> {
        tx.validate()?;
        let row = self
            .store
            .insert(tables::BALANCE_TRANSACTIONS, encode(tx)?)
            .await?;
        decode(row)
    }

    pub async fn summary(&self, owner: &BalanceOwner) -> ClientResult<BalanceSummary> {
        let txs = self.transactions(owner).await?;
        Ok(BalanceSummary::from_transactions(&txs))
    }

    pub fn hook(&self, owner: BalanceOwner) -> QueryHook<Vec<BalanceTransaction>> {
        let repo = self.clone();
        QueryHook::new(move || {
            let repo = repo.clone();
            let owner = owner.clone();
            async move { repo.transactions(&owner).await }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::ClientError;
    use rust_decimal::Decimal;
    use shared::models::TransactionKind;

    fn tx(kind: TransactionKind, amount: i64) -> NewBalanceTransaction {
        NewBalanceTransaction {
            delegate_id: Some("d-1".into()),
            shipper_id: None,
            amount: Decimal::from(amount),
            kind,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_record_and_summary() {
        let repo = BalanceRepository::new(Arc::new(MemoryStore::new()));
        repo.record(&tx(TransactionKind::Collection, 40_000)).await.unwrap();
        repo.record(&tx(TransactionKind::Settlement, 15_000)).await.unwrap();

        let owner = BalanceOwner::Delegate("d-1".into());
        let summary = repo.summary(&owner).await.unwrap();
        assert_eq!(summary.balance, Decimal::from(25_000));
        assert!(repo
            .summary(&BalanceOwner::Shipper("d-1".into()))
            .await
            .unwrap()
            .credit
            .is_zero());
    }

    #[tokio::test]
    async fn test_invalid_amount_never_reaches_store() {
        let store = Arc::new(MemoryStore::new());
        let repo = BalanceRepository::new(store.clone());
        let err = repo.record(&tx(TransactionKind::Deposit, -5)).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(store.rows(tables::BALANCE_TRANSACTIONS, &Query::new()).is_empty());
    }
}
