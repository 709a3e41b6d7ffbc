mod auth_support;

use std::fs;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use copilot_auth::auth::token::now_epoch_secs;
use copilot_auth::auth::{
    AccessToken, AuthError, CopilotTokens, CredentialStore, FileCredentialStore, StoredAuth,
    TokenManager, TokenSource,
};
use copilot_auth::config::StorePaths;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use auth_support::{
    copilot_auth, fixed_source, recording_hook, InMemoryCredentialStore, RecordingDelay,
    EXCHANGE_PATH,
};

fn exchange_response(token: &str, expires_at: i64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "token": token,
        "expires_at": expires_at
    }))
}

fn stored_with_token(token: &str, expires_at: i64) -> StoredAuth {
    StoredAuth {
        github_token: "ghu_123".to_string(),
        copilot_token: Some(token.to_string()),
        copilot_token_expires_at: Some(expires_at),
        enterprise_url: None,
    }
}

fn manager(server: &MockServer, source: TokenSource) -> TokenManager {
    TokenManager::new(copilot_auth(server, RecordingDelay::new()), source)
}

#[tokio::test]
async fn valid_stored_token_needs_no_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXCHANGE_PATH))
        .respond_with(exchange_response("unused", now_epoch_secs() + 3600))
        .expect(0)
        .mount(&server)
        .await;

    let expires_at = now_epoch_secs() + 3600;
    let store = InMemoryCredentialStore::seeded(stored_with_token("cop_cached", expires_at));
    let manager = manager(&server, TokenSource::Store(store));

    let first = manager.current_token().await.expect("first");
    let second = manager.current_token().await.expect("second");

    assert_eq!(first, AccessToken::new("cop_cached", expires_at));
    assert_eq!(second, first);
    assert_eq!(manager.cached(), Some(first));
}

#[tokio::test]
async fn cached_token_hit_skips_token_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXCHANGE_PATH))
        .respond_with(exchange_response("cop_fresh", now_epoch_secs() + 3600))
        .expect(1)
        .mount(&server)
        .await;

    let (source, calls) = fixed_source(CopilotTokens::github("ghu_123"));
    let manager = manager(&server, TokenSource::Callback(source));

    manager.current_token().await.expect("exchange");
    manager.current_token().await.expect("cache hit");
    manager.current_token().await.expect("cache hit");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn token_inside_margin_is_exchanged_once_and_reported() {
    let server = MockServer::start().await;
    let fresh_expiry = now_epoch_secs() + 1800;
    Mock::given(method("GET"))
        .and(path(EXCHANGE_PATH))
        .and(header("authorization", "Bearer ghu_123"))
        .respond_with(exchange_response("cop_fresh", fresh_expiry))
        .expect(1)
        .mount(&server)
        .await;

    let near_expiry = AccessToken::new("cop_stale", now_epoch_secs() + 30);
    let (source, _) = fixed_source(CopilotTokens::github("ghu_123").with_access_token(&near_expiry));
    let (hook, seen) = recording_hook();
    let manager = manager(&server, TokenSource::Callback(source)).with_refresh_hook(hook);

    let token = manager.current_token().await.expect("refresh");

    assert_eq!(token, AccessToken::new("cop_fresh", fresh_expiry));
    let seen = seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![CopilotTokens {
            github_token: "ghu_123".to_string(),
            access_token: Some("cop_fresh".to_string()),
            expires_at: Some(fresh_expiry),
        }]
    );
}

#[tokio::test]
async fn cached_token_entering_margin_triggers_one_more_exchange() {
    let server = MockServer::start().await;
    let short_expiry = now_epoch_secs() + 30;
    let long_expiry = now_epoch_secs() + 1800;
    Mock::given(method("GET"))
        .and(path(EXCHANGE_PATH))
        .respond_with(exchange_response("cop_short", short_expiry))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(EXCHANGE_PATH))
        .respond_with(exchange_response("cop_long", long_expiry))
        .expect(1)
        .mount(&server)
        .await;

    let (source, _) = fixed_source(CopilotTokens::github("ghu_123"));
    let (hook, seen) = recording_hook();
    let manager = manager(&server, TokenSource::Callback(source)).with_refresh_hook(hook);

    let first = manager.current_token().await.expect("first");
    assert_eq!(first.token, "cop_short");
    assert_eq!(manager.cached(), Some(first));

    let second = manager.current_token().await.expect("second");
    assert_eq!(second, AccessToken::new("cop_long", long_expiry));

    let hook_tokens: Vec<_> = seen
        .lock()
        .unwrap()
        .iter()
        .map(|t| t.access_token.clone().unwrap())
        .collect();
    assert_eq!(hook_tokens, vec!["cop_short", "cop_long"]);
}

#[tokio::test]
async fn valid_token_from_callback_is_adopted_without_hook() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXCHANGE_PATH))
        .respond_with(exchange_response("unused", now_epoch_secs() + 3600))
        .expect(0)
        .mount(&server)
        .await;

    let external = AccessToken::new("cop_external", now_epoch_secs() + 900);
    let (source, _) = fixed_source(CopilotTokens::github("ghu_123").with_access_token(&external));
    let (hook, seen) = recording_hook();
    let manager = manager(&server, TokenSource::Callback(source)).with_refresh_hook(hook);

    assert_eq!(manager.current_token().await.expect("adopt"), external);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_credential_is_unauthenticated() {
    let server = MockServer::start().await;
    let manager = manager(&server, TokenSource::Store(InMemoryCredentialStore::new()));

    let result = manager.current_token().await;

    assert!(matches!(result, Err(AuthError::Unauthenticated)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn revoked_credential_surfaces_invalid_credential() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXCHANGE_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let (source, _) = fixed_source(CopilotTokens::github("ghu_revoked"));
    let (hook, seen) = recording_hook();
    let manager = manager(&server, TokenSource::Callback(source)).with_refresh_hook(hook);

    let err = manager.current_token().await.expect_err("revoked");

    assert!(matches!(err, AuthError::InvalidCredential));
    assert!(err.requires_login());
    assert_eq!(manager.cached(), None);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn exchange_failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXCHANGE_PATH))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let (source, _) = fixed_source(CopilotTokens::github("ghu_123"));
    let manager = manager(&server, TokenSource::Callback(source));

    let result = manager.current_token().await;

    assert!(matches!(result, Err(AuthError::AuthServer { status: 502, .. })));
}

#[tokio::test]
async fn refreshed_token_is_written_back_to_owned_store() {
    let server = MockServer::start().await;
    let fresh_expiry = now_epoch_secs() + 1800;
    Mock::given(method("GET"))
        .and(path(EXCHANGE_PATH))
        .respond_with(exchange_response("cop_fresh", fresh_expiry))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileCredentialStore::new(StorePaths::in_dir(dir.path())));
    let mut initial = stored_with_token("cop_old", now_epoch_secs() - 10);
    initial.enterprise_url = Some("https://ghe.corp".to_string());
    store.save(&initial).unwrap();

    let manager = manager(&server, TokenSource::Store(store.clone()));
    assert!(manager.writes_back());
    manager.current_token().await.expect("refresh");

    let saved = store.load().unwrap().unwrap();
    assert_eq!(
        saved,
        StoredAuth {
            github_token: "ghu_123".to_string(),
            copilot_token: Some("cop_fresh".to_string()),
            copilot_token_expires_at: Some(fresh_expiry),
            enterprise_url: Some("https://ghe.corp".to_string()),
        }
    );
}

#[tokio::test]
async fn companion_credentials_are_never_written() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXCHANGE_PATH))
        .and(header("authorization", "Bearer ghu_companion"))
        .respond_with(exchange_response("cop_fresh", now_epoch_secs() + 1800))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let companion = dir.path().join("opencode-auth.json");
    let companion_body =
        r#"{"github-copilot":{"type":"oauth","refresh":"ghu_companion","access":"old","expires":1000}}"#;
    fs::write(&companion, companion_body).unwrap();
    let paths = StorePaths::in_dir(dir.path().join("own")).with_companion(&companion);
    let store = Arc::new(FileCredentialStore::new(paths.clone()));

    let manager = manager(&server, TokenSource::Store(store));
    assert!(!manager.writes_back());
    assert_eq!(manager.current_token().await.expect("refresh").token, "cop_fresh");

    assert!(!paths.auth_file.exists());
    assert_eq!(fs::read_to_string(&companion).unwrap(), companion_body);
}

#[tokio::test]
async fn refresh_after_logout_does_not_recreate_primary_from_companion() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXCHANGE_PATH))
        .and(header("authorization", "Bearer ghu_companion"))
        .respond_with(exchange_response("cop_fresh", now_epoch_secs() + 1800))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let companion = dir.path().join("opencode-auth.json");
    let companion_body =
        r#"{"github-copilot":{"type":"oauth","refresh":"ghu_companion","access":"old","expires":1000}}"#;
    fs::write(&companion, companion_body).unwrap();
    let paths = StorePaths::in_dir(dir.path().join("own")).with_companion(&companion);
    let store = Arc::new(FileCredentialStore::new(paths.clone()));
    store.save(&StoredAuth::new("ghu_own")).unwrap();

    let manager = manager(&server, TokenSource::Store(store.clone()));
    assert!(manager.writes_back());
    store.clear().unwrap();

    let token = manager.current_token().await.expect("refresh from companion");

    assert_eq!(token.token, "cop_fresh");
    assert!(!paths.auth_file.exists());
    assert_eq!(store.load_primary().unwrap(), None);
    assert_eq!(fs::read_to_string(&companion).unwrap(), companion_body);
}

#[tokio::test]
async fn in_memory_store_write_back_counts_one_save_per_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXCHANGE_PATH))
        .respond_with(exchange_response("cop_fresh", now_epoch_secs() + 1800))
        .expect(1)
        .mount(&server)
        .await;

    let store = InMemoryCredentialStore::seeded(StoredAuth::new("ghu_123"));
    let manager = manager(&server, TokenSource::Store(store.clone()));

    manager.current_token().await.expect("refresh");
    manager.current_token().await.expect("cache hit");

    assert_eq!(store.save_count(), 1);
    assert_eq!(
        store.get().unwrap().copilot_token.as_deref(),
        Some("cop_fresh")
    );
}

#[tokio::test]
async fn write_back_can_be_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXCHANGE_PATH))
        .respond_with(exchange_response("cop_fresh", now_epoch_secs() + 1800))
        .expect(1)
        .mount(&server)
        .await;

    let store = InMemoryCredentialStore::seeded(StoredAuth::new("ghu_123"));
    let manager = manager(&server, TokenSource::Store(store.clone())).without_write_back();

    manager.current_token().await.expect("refresh");

    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn invalidate_forces_next_call_to_consult_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EXCHANGE_PATH))
        .respond_with(exchange_response("cop_fresh", now_epoch_secs() + 1800))
        .expect(2)
        .mount(&server)
        .await;

    let (source, calls) = fixed_source(CopilotTokens::github("ghu_123"));
    let manager = manager(&server, TokenSource::Callback(source));

    manager.current_token().await.expect("first");
    manager.invalidate();
    assert_eq!(manager.cached(), None);
    manager.current_token().await.expect("second");

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
