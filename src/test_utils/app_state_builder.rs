//! Test app state builder for HTTP-level integration testing.
//!
//! `TestAppStateBuilder` creates a minimal `AppState` backed by in-memory
//! mocks, so routes can be exercised without Postgres or Cognito.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;

use crate::{
    adapters::http::app_state::AppState,
    entities::waitlist_entry::WaitlistEntry,
    identity::{AuthUser, IdentityVerifier},
    infra::config::AppConfig,
    test_utils::{InMemoryWaitlistRepo, StaticIdentityVerifier},
    use_cases::waitlist::{WaitlistRepo, WaitlistUseCases},
};

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let entry = create_test_entry(|e| e.email = "ada@example.com".to_string());
///
/// let (app_state, repo) = TestAppStateBuilder::new()
///     .with_entry(entry)
///     .with_user("admin-token", create_test_admin())
///     .build_with_repo();
/// ```
pub struct TestAppStateBuilder {
    entries: Vec<WaitlistEntry>,
    tokens: Vec<(String, AuthUser)>,
    repo: Option<Arc<dyn WaitlistRepo>>,
    identity: Option<Arc<dyn IdentityVerifier>>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            entries: vec![],
            tokens: vec![],
            repo: None,
            identity: None,
        }
    }

    /// Seed the in-memory repo with an entry.
    pub fn with_entry(mut self, entry: WaitlistEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Accept `token` as a bearer token for `user`.
    pub fn with_user(mut self, token: &str, user: AuthUser) -> Self {
        self.tokens.push((token.to_string(), user));
        self
    }

    /// Replace the in-memory repo (e.g. with a failing one).
    pub fn with_repo(mut self, repo: Arc<dyn WaitlistRepo>) -> Self {
        self.repo = Some(repo);
        self
    }

    /// Replace the static token verifier.
    pub fn with_identity(mut self, identity: Arc<dyn IdentityVerifier>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Build the state and hand back the in-memory repo for assertions.
    pub fn build_with_repo(self) -> (AppState, Arc<InMemoryWaitlistRepo>) {
        let repo = Arc::new(InMemoryWaitlistRepo::with_entries(self.entries.clone()));
        let app_state = Self {
            repo: Some(repo.clone()),
            ..self
        }
        .build();
        (app_state, repo)
    }

    pub fn build(self) -> AppState {
        let repo: Arc<dyn WaitlistRepo> = self
            .repo
            .unwrap_or_else(|| Arc::new(InMemoryWaitlistRepo::with_entries(self.entries)));

        let identity: Arc<dyn IdentityVerifier> = self.identity.unwrap_or_else(|| {
            let verifier = self
                .tokens
                .into_iter()
                .fold(StaticIdentityVerifier::new(), |v, (token, user)| {
                    v.with_token(&token, user)
                });
            Arc::new(verifier)
        });

        // Create minimal config for testing
        let config = Arc::new(AppConfig {
            database_url: SecretString::new("postgres://unused".into()),
            database_max_connections: 1,
            run_migrations: false,
            bind_addr: "127.0.0.1:4000".parse::<SocketAddr>().unwrap(),
            cors_origin: HeaderValue::from_static("http://localhost:5173"),
            user_pool_id: "us-east-1_TestPool".to_string(),
            user_pool_client_id: "test-client-id".to_string(),
            log_file: None,
        });

        AppState {
            config,
            waitlist_use_cases: Arc::new(WaitlistUseCases::new(repo)),
            identity,
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
