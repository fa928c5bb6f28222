//! Mock API tests for the authenticated request client.
//!
//! These tests use wiremock to simulate the HR/attendance API and exercise
//! token renewal end to end without network access.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::join_all;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use timeclock_core::error::{AuthError, Error, ProtocolError};
use timeclock_core::{
    AccessToken, ApiUrl, CredentialPair, KeyValueScope, LoginCredentials, Navigator,
    RefreshToken, Scope,
};
use timeclock_http::{
    AuthClient, BroadcastNotifier, ClientConfig, CredentialStore, MemoryScope, SessionState,
    WatchNavigator,
};

const ATTENDANCE: &str = "/api/attendance/";
const REFRESH: &str = "/api/token/refresh/";
const PROFILE: &str = "/api/auth/me/permissions/";

#[derive(Default)]
struct CountingNavigator {
    redirects: AtomicUsize,
}

impl Navigator for CountingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

impl CountingNavigator {
    fn count(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

struct Harness {
    client: AuthClient,
    navigator: Arc<CountingNavigator>,
    notifier: BroadcastNotifier,
    persistent: Arc<MemoryScope>,
    session: Arc<MemoryScope>,
}

/// Helper to build a client against a mock server.
fn harness(server: &MockServer) -> Harness {
    let persistent = Arc::new(MemoryScope::new(Scope::Persistent));
    let session = Arc::new(MemoryScope::new(Scope::Session));
    let navigator = Arc::new(CountingNavigator::default());
    let notifier = BroadcastNotifier::default();

    let config = ClientConfig::new(ApiUrl::new(server.uri()).unwrap());
    let client = AuthClient::builder(config)
        .store(CredentialStore::new(persistent.clone(), session.clone()))
        .navigator(navigator.clone())
        .notifier(Arc::new(notifier.clone()))
        .build()
        .unwrap();

    Harness {
        client,
        navigator,
        notifier,
        persistent,
        session,
    }
}

fn pair(access: &str, refresh: Option<&str>) -> CredentialPair {
    CredentialPair::new(AccessToken::new(access), refresh.map(RefreshToken::new))
}

fn token_not_valid() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "detail": "Given token not valid for any token type",
        "code": "token_not_valid"
    }))
}

/// Mount an endpoint that accepts only `token` and answers 401 otherwise.
/// `expect` counts the accepted calls.
async fn mount_protected(server: &MockServer, route: &str, token: &str, expect: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "employee": 42,
            "status": "present"
        })))
        .with_priority(1)
        .expect(expect)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(token_not_valid())
        .with_priority(5)
        .mount(server)
        .await;
}

async fn mount_refresh(
    server: &MockServer,
    refresh: &str,
    response: ResponseTemplate,
    expect: u64,
) {
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .and(body_json(json!({ "refresh": refresh })))
        .respond_with(response.set_delay(Duration::from_millis(300)))
        .expect(expect)
        .mount(server)
        .await;
}

async fn mount_profile(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(PROFILE))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn fire(client: &AuthClient, n: usize) -> Vec<Result<Value, Error>> {
    join_all((0..n).map(|_| client.get::<Value>("api/attendance/"))).await
}

// ============================================================================
// Single-flight renewal
// ============================================================================

#[tokio::test]
async fn test_concurrent_401s_trigger_one_renewal_and_replay_with_new_token() {
    let server = MockServer::start().await;
    mount_protected(&server, ATTENDANCE, "T2", 5).await;
    mount_refresh(
        &server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({ "access": "T2" })),
        1,
    )
    .await;
    mount_profile(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "role": "employee", "permissions": [] })),
    )
    .await;

    let h = harness(&server);
    h.client
        .establish(&pair("T1", Some("R1")), Scope::Persistent)
        .unwrap();

    let results = fire(&h.client, 5).await;

    for result in results {
        assert_eq!(result.unwrap()["status"], "present");
    }
    assert_eq!(
        h.persistent.get("access_token").unwrap().as_deref(),
        Some("T2")
    );
    assert!(!h.client.is_renewing());
    assert_eq!(h.navigator.count(), 0);
}

#[tokio::test]
async fn test_explicit_renewals_join_the_flight() {
    let server = MockServer::start().await;
    mount_refresh(
        &server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({ "access": "T2" })),
        1,
    )
    .await;
    mount_profile(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let h = harness(&server);
    h.client
        .establish(&pair("T1", Some("R1")), Scope::Session)
        .unwrap();

    let (a, b, c) = tokio::join!(h.client.renew(), h.client.renew(), h.client.renew());
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
}

#[tokio::test]
async fn test_renewal_completes_when_its_initiator_is_cancelled() {
    let server = MockServer::start().await;
    mount_protected(&server, ATTENDANCE, "T2", 1).await;
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .and(body_json(json!({ "refresh": "R1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access": "T2" }))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_profile(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let h = harness(&server);
    h.client
        .establish(&pair("T1", Some("R1")), Scope::Persistent)
        .unwrap();

    // The first caller starts the renewal and gives up before it settles;
    // the second joins the renewal while it is in flight.
    let initiator = tokio::time::timeout(
        Duration::from_millis(150),
        h.client.get::<Value>("api/attendance/"),
    );
    let queued = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        h.client.get::<Value>("api/attendance/").await
    };
    let (initiator, queued) = tokio::join!(initiator, queued);

    assert!(initiator.is_err(), "initiator should have timed out");
    assert_eq!(queued.unwrap()["status"], "present");
    assert_eq!(
        h.persistent.get("access_token").unwrap().as_deref(),
        Some("T2")
    );
    assert!(!h.client.is_renewing());
    assert_eq!(h.navigator.count(), 0);
}

// ============================================================================
// Termination
// ============================================================================

#[tokio::test]
async fn test_replay_rejected_again_is_not_retried() {
    let server = MockServer::start().await;

    // Account revoked: renewal works but the API still refuses the user.
    Mock::given(method("GET"))
        .and(path(ATTENDANCE))
        .respond_with(token_not_valid())
        .expect(2)
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({ "access": "T2" })),
        1,
    )
    .await;
    mount_profile(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let h = harness(&server);
    h.client
        .establish(&pair("T1", Some("R1")), Scope::Persistent)
        .unwrap();

    let err = h.client.get::<Value>("api/attendance/").await.unwrap_err();

    assert!(matches!(
        err,
        Error::Protocol(ProtocolError { status: 401, .. })
    ));
    assert_eq!(h.navigator.count(), 0);
}

#[tokio::test]
async fn test_non_401_errors_pass_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/audits/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "detail": "You do not have permission to perform this action."
        })))
        .mount(&server)
        .await;
    mount_refresh(
        &server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({ "access": "T2" })),
        0,
    )
    .await;

    let h = harness(&server);
    h.client
        .establish(&pair("T1", Some("R1")), Scope::Persistent)
        .unwrap();

    let err = h.client.get::<Value>("api/audits/").await.unwrap_err();
    match err {
        Error::Protocol(protocol) => {
            assert_eq!(protocol.status, 403);
            assert!(protocol.detail.unwrap().contains("permission"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_error_does_not_trigger_renewal() {
    // Nothing listens on port 1.
    let navigator = Arc::new(CountingNavigator::default());
    let config = ClientConfig::new(ApiUrl::new("http://127.0.0.1:1").unwrap())
        .with_timeout(Duration::from_secs(2));
    let client = AuthClient::builder(config)
        .navigator(navigator.clone())
        .build()
        .unwrap();
    client
        .establish(&pair("T1", Some("R1")), Scope::Persistent)
        .unwrap();

    let err = client.get::<Value>("api/attendance/").await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(navigator.count(), 0);
    assert!(client.store().read().unwrap().is_some());
}

// ============================================================================
// Renewal failure
// ============================================================================

#[tokio::test]
async fn test_missing_refresh_token_rejects_everyone_and_signs_out() {
    let server = MockServer::start().await;
    mount_protected(&server, ATTENDANCE, "T2", 0).await;
    mount_refresh(
        &server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({ "access": "T2" })),
        0,
    )
    .await;

    let h = harness(&server);
    h.client.establish(&pair("T1", None), Scope::Session).unwrap();

    let results = fire(&h.client, 3).await;

    for result in results {
        assert!(matches!(
            result,
            Err(Error::Auth(AuthError::RefreshTokenMissing))
        ));
    }
    assert!(h.client.store().read().unwrap().is_none());
    assert_eq!(h.navigator.count(), 1);
}

#[tokio::test]
async fn test_rejected_renewal_drains_queue_with_same_error() {
    let server = MockServer::start().await;
    mount_protected(&server, ATTENDANCE, "T2", 0).await;
    mount_refresh(&server, "R1", token_not_valid(), 1).await;

    let h = harness(&server);
    h.client
        .establish(&pair("T1", Some("R1")), Scope::Persistent)
        .unwrap();

    let results = fire(&h.client, 3).await;

    for result in results {
        match result {
            Err(Error::Auth(AuthError::RefreshRejected(protocol))) => {
                assert_eq!(protocol.status, 401);
                assert_eq!(protocol.code.as_deref(), Some("token_not_valid"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert!(h.persistent.get("refresh_token").unwrap().is_none());
    assert!(h.session.get("refresh_token").unwrap().is_none());
    assert_eq!(h.navigator.count(), 1);
    assert!(!h.client.is_renewing());
}

#[tokio::test]
async fn test_watch_navigator_reports_login_required() {
    let server = MockServer::start().await;
    mount_protected(&server, ATTENDANCE, "T2", 0).await;
    mount_refresh(&server, "R1", ResponseTemplate::new(400), 1).await;

    let navigator = Arc::new(WatchNavigator::new());
    let mut state = navigator.subscribe();
    let config = ClientConfig::new(ApiUrl::new(server.uri()).unwrap());
    let client = AuthClient::builder(config)
        .navigator(navigator.clone())
        .build()
        .unwrap();
    client
        .establish(&pair("T1", Some("R1")), Scope::Persistent)
        .unwrap();

    assert!(client.get::<Value>("api/attendance/").await.is_err());

    state.changed().await.unwrap();
    assert_eq!(*state.borrow(), SessionState::LoginRequired);
}

#[tokio::test]
async fn test_watch_navigator_returns_to_active_on_login() {
    let server = MockServer::start().await;
    mount_protected(&server, ATTENDANCE, "T2", 0).await;
    mount_refresh(&server, "R1", ResponseTemplate::new(400), 1).await;

    let navigator = Arc::new(WatchNavigator::new());
    let config = ClientConfig::new(ApiUrl::new(server.uri()).unwrap());
    let client = AuthClient::builder(config)
        .navigator(navigator.clone())
        .build()
        .unwrap();
    client
        .establish(&pair("T1", Some("R1")), Scope::Persistent)
        .unwrap();

    assert!(client.get::<Value>("api/attendance/").await.is_err());
    assert_eq!(navigator.state(), SessionState::LoginRequired);

    let mut state = navigator.subscribe();
    client
        .establish(&pair("T3", Some("R3")), Scope::Session)
        .unwrap();

    assert!(state.has_changed().unwrap());
    assert_eq!(*state.borrow_and_update(), SessionState::Active);
    assert!(!client.invalidation().is_signalled());
}

// ============================================================================
// Permission broadcast
// ============================================================================

#[tokio::test]
async fn test_profile_failure_does_not_affect_replayed_requests() {
    let server = MockServer::start().await;
    mount_protected(&server, ATTENDANCE, "T2", 5).await;
    mount_refresh(
        &server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({ "access": "T2" })),
        1,
    )
    .await;
    mount_profile(&server, ResponseTemplate::new(500)).await;

    let h = harness(&server);
    h.client
        .establish(&pair("T1", Some("R1")), Scope::Persistent)
        .unwrap();

    let results = fire(&h.client, 5).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(h.navigator.count(), 0);
}

#[tokio::test]
async fn test_profile_is_broadcast_after_renewal() {
    let server = MockServer::start().await;
    mount_protected(&server, ATTENDANCE, "T2", 1).await;
    mount_refresh(
        &server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({ "access": "T2" })),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path(PROFILE))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "role": "manager",
            "permissions": ["leave.approve", "attendance.view_team"]
        })))
        .mount(&server)
        .await;

    let h = harness(&server);
    let mut events = h.notifier.subscribe();
    h.client
        .establish(&pair("T1", Some("R1")), Scope::Persistent)
        .unwrap();

    h.client.get::<Value>("api/attendance/").await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("no permissions-refreshed event")
        .unwrap();
    assert_eq!(event.profile.role.as_deref(), Some("manager"));
    assert!(event.profile.has("leave.approve"));
}

// ============================================================================
// Scope integrity
// ============================================================================

#[tokio::test]
async fn test_renewed_token_stays_in_session_scope() {
    let server = MockServer::start().await;
    mount_protected(&server, ATTENDANCE, "T2", 1).await;
    mount_refresh(
        &server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({ "access": "T2" })),
        1,
    )
    .await;
    mount_profile(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let h = harness(&server);
    h.client
        .establish(&pair("T1", Some("R1")), Scope::Session)
        .unwrap();

    h.client.get::<Value>("api/attendance/").await.unwrap();

    assert_eq!(h.session.get("access_token").unwrap().as_deref(), Some("T2"));
    assert_eq!(h.session.get("refresh_token").unwrap().as_deref(), Some("R1"));
    assert!(h.persistent.get("access_token").unwrap().is_none());
    assert!(h.persistent.get("refresh_token").unwrap().is_none());
}

#[tokio::test]
async fn test_rotated_refresh_token_is_written_to_same_scope() {
    let server = MockServer::start().await;
    mount_protected(&server, ATTENDANCE, "T2", 1).await;
    mount_refresh(
        &server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({ "access": "T2", "refresh": "R2" })),
        1,
    )
    .await;
    mount_profile(&server, ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let h = harness(&server);
    h.client
        .establish(&pair("T1", Some("R1")), Scope::Persistent)
        .unwrap();

    h.client.get::<Value>("api/attendance/").await.unwrap();

    let stored = h.client.store().read().unwrap().unwrap();
    assert_eq!(stored.scope, Scope::Persistent);
    assert_eq!(stored.pair.refresh, Some(RefreshToken::new("R2")));
    assert!(h.session.get("refresh_token").unwrap().is_none());
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_stores_pair_in_requested_scope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({ "username": "jdoe", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "A1",
            "refresh": "R1"
        })))
        .mount(&server)
        .await;

    let h = harness(&server);
    h.client
        .login(&LoginCredentials::new("jdoe", "hunter2"), Scope::Session)
        .await
        .unwrap();

    assert_eq!(h.session.get("access_token").unwrap().as_deref(), Some("A1"));
    assert_eq!(h.session.get("refresh_token").unwrap().as_deref(), Some("R1"));
    assert!(h.persistent.get("access_token").unwrap().is_none());
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&server)
        .await;

    let h = harness(&server);
    let err = h
        .client
        .login(&LoginCredentials::new("jdoe", "wrong"), Scope::Persistent)
        .await
        .unwrap_err();

    match err {
        Error::Auth(AuthError::InvalidCredentials(detail)) => {
            assert!(detail.contains("No active account"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(h.client.store().read().unwrap().is_none());
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[tokio::test]
async fn test_non_json_error_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/"))
        .respond_with(
            ResponseTemplate::new(502)
                .set_body_string("<html>Bad Gateway</html>")
                .insert_header("content-type", "text/html"),
        )
        .mount(&server)
        .await;

    let h = harness(&server);
    h.client
        .establish(&pair("T1", Some("R1")), Scope::Persistent)
        .unwrap();

    let err = h.client.get::<Value>("api/reports/").await.unwrap_err();
    assert!(err.to_string().contains("502"));
}
