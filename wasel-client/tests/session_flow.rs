//! Session/role provider end-to-end against in-memory backends

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use shared::models::tables;
use wasel_client::auth::{AuthProvider, MemoryAuthProvider};
use wasel_client::guard::{COURIER_HOME, GuardDecision, RouteGuard, RoutePolicy, SIGN_IN_PATH, evaluate};
use wasel_client::session::{RoleSource, SessionProvider, SessionState};
use wasel_client::store::{DataStore, MemoryStore};
use wasel_client::AppRole;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn backend() -> (Arc<MemoryAuthProvider>, Arc<MemoryStore>) {
    let auth = MemoryAuthProvider::new();
    auth.add_account("courier@wasel.iq", "pw", "u-courier");
    auth.add_account("nobody@wasel.iq", "pw", "u-nobody");
    auth.add_account("boss@wasel.iq", "pw", "u-boss");

    let store = MemoryStore::new();
    for (user_id, role) in [("u-courier", "courier"), ("u-boss", "head_manager")] {
        store
            .insert(tables::USER_ROLES, json!({"user_id": user_id, "role": role}))
            .await
            .unwrap();
    }
    (Arc::new(auth), Arc::new(store))
}

#[tokio::test]
async fn sign_in_resolves_role_and_guard_redirects_courier() {
    let (auth, store) = backend().await;
    let provider = SessionProvider::start(auth.clone(), store);

    // Record every published state from the start
    let mut rx = provider.subscribe();
    assert!(rx.borrow().loading);
    let recorder = tokio::spawn(async move {
        let mut seen = vec![rx.borrow_and_update().clone()];
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            let done = state.role == Some(AppRole::Courier);
            seen.push(state);
            if done {
                break;
            }
        }
        seen
    });

    let initial = tokio::time::timeout(TIMEOUT, provider.ready()).await.unwrap();
    assert!(!initial.is_authenticated());

    let state = provider.sign_in("courier@wasel.iq", "pw").await.unwrap();
    assert_eq!(state.role, Some(AppRole::Courier));
    assert_eq!(state.role_source, Some(RoleSource::Resolved));

    let seen = tokio::time::timeout(TIMEOUT, recorder).await.unwrap().unwrap();
    // loading goes true -> false exactly once and never comes back
    let first_done = seen.iter().position(|s| !s.loading).unwrap();
    assert!(seen[..first_done].iter().all(|s| s.loading));
    assert!(seen[first_done..].iter().all(|s| !s.loading));

    let manager_only = RoutePolicy::roles(&[AppRole::Manager]);
    let decision = evaluate(&provider.snapshot(), "/shipments", &manager_only);
    assert_eq!(decision.redirect().unwrap().to, COURIER_HOME);

    provider.shutdown().await;
}

#[tokio::test]
async fn missing_role_row_resolves_to_user() {
    let (auth, store) = backend().await;
    let provider = SessionProvider::start(auth, store);
    provider.ready().await;

    let state = provider.sign_in("nobody@wasel.iq", "pw").await.unwrap();
    assert_eq!(state.role, Some(AppRole::User));
    assert!(state.role_source.unwrap().is_defaulted());
}

#[tokio::test]
async fn role_lookup_failure_resolves_to_user() {
    let (auth, store) = backend().await;
    store.set_failing(tables::USER_ROLES, true);
    let provider = SessionProvider::start(auth, store);
    provider.ready().await;

    let state = provider.sign_in("courier@wasel.iq", "pw").await.unwrap();
    assert_eq!(state.role, Some(AppRole::User));
    assert!(matches!(state.role_source, Some(RoleSource::Defaulted { .. })));
}

#[tokio::test]
async fn existing_session_is_resolved_at_start() {
    let (auth, store) = backend().await;
    auth.restore_session("boss@wasel.iq").unwrap();
    let provider = SessionProvider::start(auth, store);
    let state = tokio::time::timeout(TIMEOUT, provider.ready()).await.unwrap();
    assert_eq!(state.role, Some(AppRole::HeadManager));

    let guard = RouteGuard::default();
    assert!(guard.check(&state, "/users").is_allowed());
    assert!(guard.check(&state, "/courier-dashboard").is_allowed());
}

#[tokio::test]
async fn sign_out_clears_local_state_even_when_remote_fails() {
    let (auth, store) = backend().await;
    let provider = SessionProvider::start(auth.clone(), store);
    provider.ready().await;
    provider.sign_in("courier@wasel.iq", "pw").await.unwrap();

    auth.set_fail_sign_out(true);
    assert!(provider.sign_out().await.is_err());

    let state = provider.snapshot();
    assert_eq!(state, SessionState::signed_out());
    let decision = RouteGuard::default().check(&state, "/sheets");
    assert_eq!(decision.redirect().unwrap().to, SIGN_IN_PATH);
}

#[tokio::test]
async fn sign_out_lands_after_queued_auth_events() {
    let (auth, store) = backend().await;
    let provider = SessionProvider::start(auth.clone(), store);
    provider.ready().await;
    provider.sign_in("courier@wasel.iq", "pw").await.unwrap();

    // A refresh event still queued when sign-out runs must not win
    auth.refresh_session().await.unwrap();
    provider.sign_out().await.unwrap();
    assert_eq!(provider.snapshot(), SessionState::signed_out());

    let mut rx = provider.subscribe();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!rx.has_changed().unwrap());
    assert!(!rx.borrow_and_update().is_authenticated());
}

#[tokio::test]
async fn sign_out_after_shutdown_still_clears() {
    let (auth, store) = backend().await;
    let provider = SessionProvider::start(auth.clone(), store);
    provider.ready().await;
    provider.sign_in("courier@wasel.iq", "pw").await.unwrap();

    provider.shutdown().await;
    provider.sign_out().await.unwrap();
    assert_eq!(provider.snapshot(), SessionState::signed_out());
}

#[tokio::test]
async fn token_refresh_re_resolves_role() {
    let (auth, store) = backend().await;
    let provider = SessionProvider::start(auth.clone(), store.clone());
    provider.ready().await;
    provider.sign_in("courier@wasel.iq", "pw").await.unwrap();

    // Promote the courier, then refresh
    store
        .update(
            tables::USER_ROLES,
            &wasel_client::store::Query::new().eq("user_id", "u-courier"),
            json!({"role": "manager"}),
        )
        .await
        .unwrap();
    let state = provider.refresh_session().await.unwrap();
    assert_eq!(state.role, Some(AppRole::Manager));
    assert!(!state.loading);
}

#[tokio::test]
async fn guard_reports_loading_before_resolution() {
    let (auth, store) = backend().await;
    let provider = SessionProvider::start(auth, store);
    let decision = evaluate(
        &SessionState::loading(),
        "/shipments",
        &RoutePolicy::roles(&[AppRole::Manager]),
    );
    assert_eq!(decision, GuardDecision::Loading);
    provider.shutdown().await;
}

#[tokio::test]
async fn client_hands_out_shipper_repository() {
    use shared::models::ShipperCreate;
    use wasel_client::realtime::MemoryChangeFeed;
    use wasel_client::{ClientConfig, WaselClient};

    let (auth, store) = backend().await;
    let client = WaselClient::with_parts(
        ClientConfig::new("http://localhost:54321", "anon"),
        store.clone(),
        auth,
        Arc::new(MemoryChangeFeed::new()),
    );

    let shipper = client
        .shippers()
        .create(&ShipperCreate {
            name: "Noor".into(),
            phone: "07500000000".into(),
            business_name: None,
        })
        .await
        .unwrap();
    let rows = store.rows(tables::SHIPPERS, &wasel_client::store::Query::new());
    assert_eq!(rows.len(), 1);
    assert_eq!(client.shippers().get(&shipper.id).await.unwrap().name, "Noor");

    client.shutdown().await;
}
