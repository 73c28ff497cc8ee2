//! Data hooks
//!
//! Per-entity repositories over [`DataStore`](crate::store::DataStore) plus
//! [`QueryHook`], which wraps one fetch and publishes a loading/error/data
//! triple for views to render.
//!
//! - fetch errors land in `QueryState::error`; there is no retry
//! - mutations return their error to the caller and re-fetch only on success

mod balances;
mod delegates;
mod locations;
mod reports;
mod sheets;
mod shipments;
mod shippers;
mod stores;

pub use balances::{BalanceOwner, BalanceRepository};
pub use delegates::DelegateRepository;
pub use locations::LocationRepository;
pub use reports::{ReportRepository, StatusReport};
pub use sheets::SheetRepository;
pub use shipments::{ShipmentFilter, ShipmentRepository};
pub use shippers::ShipperRepository;
pub use stores::StoreRepository;

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use shared::error::AppError;
use tokio::sync::watch;

use crate::ClientResult;

/// 查询状态
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub loading: bool,
    pub error: Option<AppError>,
    pub data: T,
}

impl<T: Default> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            error: None,
            data: T::default(),
        }
    }
}

impl<T> QueryState<T> {
    pub fn is_ok(&self) -> bool {
        !self.loading && self.error.is_none()
    }
}

type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, ClientResult<T>> + Send + Sync>;

/// One fetch with published state
///
/// Cloning shares the state channel.
pub struct QueryHook<T> {
    state: Arc<watch::Sender<QueryState<T>>>,
    fetch: Fetcher<T>,
}

impl<T> Clone for QueryHook<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            fetch: Arc::clone(&self.fetch),
        }
    }
}

impl<T> QueryHook<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    pub fn new<F, Fut>(fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let (tx, _) = watch::channel(QueryState::default());
        Self {
            state: Arc::new(tx),
            fetch: Arc::new(move || Box::pin(fetch())),
        }
    }

    pub fn state(&self) -> QueryState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.state.subscribe()
    }

    /// Run the fetch; previous data stays visible while loading
    pub async fn refetch(&self) -> QueryState<T> {
        self.state.send_modify(|s| s.loading = true);
        let result = (self.fetch)().await;
        self.state.send_modify(|s| {
            s.loading = false;
            match result {
                Ok(data) => {
                    s.data = data;
                    s.error = None;
                }
                Err(e) => {
                    tracing::warn!("query failed: {e}");
                    s.error = Some(e.into());
                }
            }
        });
        self.state()
    }

    /// Run a mutation, re-fetch when it succeeds
    pub async fn mutate<R, Fut>(&self, mutation: Fut) -> ClientResult<R>
    where
        Fut: Future<Output = ClientResult<R>>,
    {
        let output = mutation.await?;
        self.refetch().await;
        Ok(output)
    }
}
