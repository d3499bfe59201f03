//! Mock directory server using wiremock for integration testing.
//!
//! Simulates the provider's GoTrue-style admin API with various response
//! scenarios (creation, conflicts, filtered query, paginated listing).

#![allow(dead_code)]

use guest_directory::{
    AccountHandle, Directory, DirectoryClient, DirectoryConfig, HandleCache, NoCache,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SERVICE_KEY: &str = "test-service-key";

/// Conflict message as the provider phrases it.
pub const ALREADY_REGISTERED_MSG: &str =
    "A user with this email address has already been registered";

/// A mock identity directory with helpers for mounting admin API responses.
pub struct MockDirectory {
    server: MockServer,
}

impl MockDirectory {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Config pointing at this mock server, with small scan bounds so tests
    /// stay fast.
    pub fn config(&self) -> DirectoryConfig {
        DirectoryConfig::new(self.uri(), SERVICE_KEY)
            .with_scan_page_size(2)
            .with_scan_max_pages(3)
    }

    /// A `DirectoryClient` configured to talk to this mock server.
    pub fn client(&self) -> DirectoryClient {
        DirectoryClient::with_http_client(
            self.uri(),
            SERVICE_KEY.to_string(),
            reqwest::Client::new(),
        )
    }

    /// The full provisioner/resetter stack with no local cache.
    pub fn directory(&self) -> Directory {
        self.directory_with_cache(Arc::new(NoCache))
    }

    /// The full stack with a caller-supplied local cache.
    pub fn directory_with_cache(&self, cache: Arc<dyn HandleCache>) -> Directory {
        Directory::from_client(self.client(), cache, &self.config())
    }

    // =========================================================================
    // Create mocks
    // =========================================================================

    /// Successful account creation returning the given handle.
    pub async fn mock_create_success(&self, handle: &str, email: &str) {
        Mock::given(method("POST"))
            .and(path("/admin/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": handle,
                "email": email,
                "email_confirmed_at": "2026-01-10T08:00:00Z",
            })))
            .mount(&self.server)
            .await;
    }

    /// Creation rejected because the email is already registered (422 with
    /// the provider's message).
    pub async fn mock_create_conflict(&self) {
        Mock::given(method("POST"))
            .and(path("/admin/users"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_json(json!({ "code": 422, "msg": ALREADY_REGISTERED_MSG })),
            )
            .mount(&self.server)
            .await;
    }

    /// Creation failing with an arbitrary provider error.
    pub async fn mock_create_error(&self, status: u16, msg: &str) {
        Mock::given(method("POST"))
            .and(path("/admin/users"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "msg": msg })))
            .mount(&self.server)
            .await;
    }

    /// Assert that no creation request is ever made.
    pub async fn expect_no_create(&self) {
        Mock::given(method("POST"))
            .and(path("/admin/users"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Update mocks
    // =========================================================================

    /// Successful account update for the given handle.
    pub async fn mock_update_success(&self, handle: &str) {
        Mock::given(method("PUT"))
            .and(path(format!("/admin/users/{handle}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": handle })))
            .mount(&self.server)
            .await;
    }

    /// Update failing with an arbitrary provider error.
    pub async fn mock_update_error(&self, handle: &str, status: u16, msg: &str) {
        Mock::given(method("PUT"))
            .and(path(format!("/admin/users/{handle}")))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "msg": msg })))
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Lookup mocks (filtered query and paginated listing)
    // =========================================================================

    /// Filtered query returning the given accounts.
    pub async fn mock_query(&self, filter: &str, users: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/admin/users"))
            .and(query_param("filter", filter))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": users })))
            .mount(&self.server)
            .await;
    }

    /// Filtered query endpoint erroring (provider without filter support).
    pub async fn mock_query_unsupported(&self, filter: &str) {
        Mock::given(method("GET"))
            .and(path("/admin/users"))
            .and(query_param("filter", filter))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "msg": "unsupported query parameter: filter" })),
            )
            .mount(&self.server)
            .await;
    }

    /// One page of the account listing.
    pub async fn mock_list_page(&self, page: u32, users: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/admin/users"))
            .and(query_param("page", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": users })))
            .mount(&self.server)
            .await;
    }

    /// Assert that no lookup (query or scan) request is ever made.
    pub async fn expect_no_lookup(&self) {
        Mock::given(method("GET"))
            .and(path("/admin/users"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Health mocks
    // =========================================================================

    pub async fn mock_health(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}

/// Build one account record as the listing returns it.
pub fn user_json(handle: &str, email: &str) -> Value {
    json!({
        "id": handle,
        "email": email,
        "user_metadata": { "role": "guest" },
    })
}

/// Fixed email → handle mapping standing in for the application's
/// system-of-record.
pub struct StaticCache {
    entries: HashMap<String, AccountHandle>,
}

impl StaticCache {
    pub fn with_entry(email: &str, handle: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(email.to_string(), AccountHandle::from(handle));
        Self { entries }
    }
}

#[async_trait::async_trait]
impl HandleCache for StaticCache {
    async fn handle_for_email(&self, email: &str) -> Option<AccountHandle> {
        self.entries.get(email).cloned()
    }
}
