#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use copilot_auth::auth::providers::github_copilot::GitHubCopilotAuth;
use copilot_auth::auth::{
    AuthError, CopilotTokens, CredentialStore, GetTokensFn, PollDelay, StoredAuth, TokenRefreshFn,
};
use copilot_auth::config::Endpoints;
use futures::FutureExt;
use wiremock::MockServer;

pub const DEVICE_CODE_PATH: &str = "/login/device/code";
pub const ACCESS_TOKEN_PATH: &str = "/login/oauth/access_token";
pub const EXCHANGE_PATH: &str = "/api/v3/copilot_internal/v2/token";

/// Enterprise-style endpoints rooted at the mock server.
pub fn endpoints(server: &MockServer) -> Endpoints {
    Endpoints::enterprise(&server.uri())
}

pub fn copilot_auth(server: &MockServer, delay: Arc<RecordingDelay>) -> GitHubCopilotAuth {
    GitHubCopilotAuth::new(endpoints(server)).with_delay(delay)
}

/// Records requested waits and returns immediately.
#[derive(Default)]
pub struct RecordingDelay {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn waits_secs(&self) -> Vec<u64> {
        self.waits
            .lock()
            .expect("delay lock poisoned")
            .iter()
            .map(Duration::as_secs)
            .collect()
    }
}

#[async_trait]
impl PollDelay for RecordingDelay {
    async fn wait(&self, interval: Duration) {
        self.waits
            .lock()
            .expect("delay lock poisoned")
            .push(interval);
    }
}

#[derive(Default)]
pub struct InMemoryCredentialStore {
    record: Mutex<Option<StoredAuth>>,
    saves: AtomicUsize,
}

impl InMemoryCredentialStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seeded(auth: StoredAuth) -> Arc<Self> {
        let store = Self::default();
        *store.record.lock().expect("store lock poisoned") = Some(auth);
        Arc::new(store)
    }

    pub fn get(&self) -> Option<StoredAuth> {
        self.record.lock().expect("store lock poisoned").clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> Result<Option<StoredAuth>, AuthError> {
        Ok(self.get())
    }

    fn load_primary(&self) -> Result<Option<StoredAuth>, AuthError> {
        Ok(self.get())
    }

    fn save(&self, auth: &StoredAuth) -> Result<(), AuthError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.record.lock().expect("store lock poisoned") = Some(auth.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.record.lock().expect("store lock poisoned") = None;
        Ok(())
    }

    fn primary_exists(&self) -> bool {
        self.get().is_some()
    }
}

/// Token source returning a fixed snapshot and counting invocations.
pub fn fixed_source(tokens: CopilotTokens) -> (GetTokensFn, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let source: GetTokensFn = Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        let tokens = tokens.clone();
        async move { Ok::<_, AuthError>(tokens) }.boxed()
    });
    (source, calls)
}

/// Refresh hook collecting every snapshot it receives.
pub fn recording_hook() -> (TokenRefreshFn, Arc<Mutex<Vec<CopilotTokens>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let hook: TokenRefreshFn = Arc::new(move |tokens: CopilotTokens| {
        sink.lock().expect("hook lock poisoned").push(tokens);
        async { Ok::<_, AuthError>(()) }.boxed()
    });
    (hook, seen)
}
