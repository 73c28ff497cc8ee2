//! Dashboard client wiring
//!
//! [`WaselClient`] builds the HTTP stack once and hands out the long-lived
//! pieces: the session provider, the notification center and listener, and
//! the entity repositories.

use std::sync::Arc;

use crate::auth::{AuthProvider, HttpAuthProvider};
use crate::functions::FunctionsClient;
use crate::guard::RouteGuard;
use crate::hooks::{
    BalanceRepository, DelegateRepository, LocationRepository, ReportRepository, SheetRepository,
    ShipmentRepository, ShipperRepository, StoreRepository,
};
use crate::http::HttpClient;
use crate::notifications::{NotificationCenter, NotificationListener};
use crate::realtime::{ChangeFeed, RealtimeSocket};
use crate::session::SessionProvider;
use crate::store::{DataStore, RestStore};
use crate::{ClientConfig, ClientResult};

/// Tables the dashboard listens to
const REALTIME_TABLES: [&str; 1] = [shared::models::tables::SHIPMENTS];

pub struct WaselClient {
    config: ClientConfig,
    store: Arc<dyn DataStore>,
    functions: Option<FunctionsClient>,
    session: SessionProvider,
    notifications: NotificationCenter,
    guard: RouteGuard,
    listener: NotificationListener,
    feed: Arc<dyn ChangeFeed>,
}

impl WaselClient {
    /// Connect to the hosted backend
    pub fn connect(config: ClientConfig) -> ClientResult<Self> {
        let http = HttpClient::new(&config)?;
        let store: Arc<dyn DataStore> = Arc::new(RestStore::new(http.clone()));
        let auth: Arc<dyn AuthProvider> = Arc::new(HttpAuthProvider::new(http.clone()));
        let feed: Arc<dyn ChangeFeed> = Arc::new(RealtimeSocket::spawn(
            &config,
            http.token_slot().clone(),
            &REALTIME_TABLES,
        ));
        let mut client = Self::with_parts(config, store, auth, feed);
        client.functions = Some(FunctionsClient::new(http));
        tracing::info!(base_url = %client.config.base_url, "wasel client connected");
        Ok(client)
    }

    /// Assemble from explicit parts (in-memory backends, tests)
    pub fn with_parts(
        config: ClientConfig,
        store: Arc<dyn DataStore>,
        auth: Arc<dyn AuthProvider>,
        feed: Arc<dyn ChangeFeed>,
    ) -> Self {
        let session = SessionProvider::start(auth, Arc::clone(&store));
        let notifications = NotificationCenter::with_capacity(config.notification_capacity);
        let listener = NotificationListener::spawn(feed.as_ref(), notifications.clone());
        Self {
            config,
            store,
            functions: None,
            session,
            notifications,
            guard: RouteGuard::default(),
            listener,
            feed,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionProvider {
        &self.session
    }

    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn feed(&self) -> &Arc<dyn ChangeFeed> {
        &self.feed
    }

    /// `None` for clients assembled without an HTTP backend
    pub fn functions(&self) -> Option<&FunctionsClient> {
        self.functions.as_ref()
    }

    pub fn listener(&self) -> &NotificationListener {
        &self.listener
    }

    pub fn shipments(&self) -> ShipmentRepository {
        ShipmentRepository::new(Arc::clone(&self.store))
    }

    pub fn delegates(&self) -> DelegateRepository {
        DelegateRepository::new(Arc::clone(&self.store))
    }

    pub fn shippers(&self) -> ShipperRepository {
        ShipperRepository::new(Arc::clone(&self.store))
    }

    pub fn stores(&self) -> StoreRepository {
        StoreRepository::new(Arc::clone(&self.store))
    }

    pub fn sheets(&self) -> SheetRepository {
        SheetRepository::new(Arc::clone(&self.store))
    }

    pub fn balances(&self) -> BalanceRepository {
        BalanceRepository::new(Arc::clone(&self.store))
    }

    pub fn reports(&self) -> ReportRepository {
        ReportRepository::new(Arc::clone(&self.store))
    }

    pub fn locations(&self) -> LocationRepository {
        LocationRepository::new(Arc::clone(&self.store))
    }

    /// Stop background tasks
    pub async fn shutdown(self) {
        self.session.shutdown().await;
        self.listener.shutdown().await;
        tracing::info!("wasel client stopped");
    }
}
