//! Directory admin HTTP client (reqwest-based).
//!
//! Wraps the identity provider's GoTrue-style admin API with the create,
//! update, and lookup operations the reconciliation flow needs. Conflict
//! classification for create happens here, once, so callers branch on
//! [`CreateOutcome`] instead of matching provider error text.

use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, DirectoryResult};
use crate::model::{AccountHandle, AccountUpdate, CreateOutcome, IdentityRecord, NewAccount};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Provider phrase identifying a uniqueness conflict in error payloads.
///
/// Some provider versions report a taken email with a generic status code,
/// so the message text is part of the classification.
const ALREADY_REGISTERED_PHRASE: &str = "already registered";

/// Error payload shape returned by the admin API.
///
/// Providers are inconsistent about the field name; all observed spellings
/// are accepted.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiErrorBody {
    fn into_message(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Paginated account listing response.
#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    users: Vec<IdentityRecord>,
}

/// Health check result from the directory.
#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    /// Whether the directory is reachable and responding.
    pub healthy: bool,
    /// Timestamp of the check.
    pub checked_at: chrono::DateTime<chrono::Utc>,
    /// Error message if unhealthy.
    pub error: Option<String>,
}

/// Admin client for the external identity directory.
///
/// All operations are remote calls authenticated with the privileged
/// service-role key; none are idempotent at the transport level, so the
/// orchestration above treats "already exists" as an expected branch.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    /// Base URL of the admin API (e.g. "<https://project.example.co/auth/v1>").
    base_url: String,
    /// Privileged service-role key.
    service_key: String,
    /// Underlying HTTP client.
    http_client: Client,
}

impl DirectoryClient {
    /// Create a new directory client from configuration.
    pub fn new(config: &DirectoryConfig) -> DirectoryResult<Self> {
        config
            .validate()
            .map_err(|e| DirectoryError::InvalidConfig(e.to_string()))?;

        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent("guest-directory/0.1")
            .build()
            .map_err(|e| {
                DirectoryError::InvalidConfig(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self::with_http_client(
            config.base_url.clone(),
            config.service_key.clone(),
            http_client,
        ))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(base_url: String, service_key: String, http_client: Client) -> Self {
        // Normalize base URL: strip trailing slash.
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            service_key,
            http_client,
        }
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn admin_users_url(&self) -> String {
        format!("{}/admin/users", self.base_url)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
    }

    // ── Account Operations ────────────────────────────────────────────

    /// Create an account (POST /admin/users).
    ///
    /// Returns [`CreateOutcome::Conflict`] when the directory reports the
    /// email as already registered; any other non-success response is a
    /// [`DirectoryError::Api`].
    pub async fn create_account(&self, account: &NewAccount) -> DirectoryResult<CreateOutcome> {
        let url = self.admin_users_url();
        debug!(url = %url, email = %account.email, "directory POST create account");

        let response = self
            .authed(self.http_client.post(&url))
            .json(account)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let record: IdentityRecord = Self::decode(response).await?;
            return Ok(CreateOutcome::Created(record.id));
        }

        let message = Self::error_message(response).await;
        if Self::is_conflict(status, &message) {
            debug!(email = %account.email, "directory reported email already registered");
            return Ok(CreateOutcome::Conflict);
        }

        Err(DirectoryError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Overwrite fields on an existing account (PUT /admin/users/:id).
    ///
    /// Fields present in `update` replace the directory's copy wholesale.
    pub async fn update_account(
        &self,
        handle: &AccountHandle,
        update: &AccountUpdate,
    ) -> DirectoryResult<()> {
        let url = format!("{}/{}", self.admin_users_url(), handle);
        debug!(url = %url, "directory PUT update account");

        let response = self
            .authed(self.http_client.put(&url))
            .json(update)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = Self::error_message(response).await;
            Err(DirectoryError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Query the admin listing filtered by email (GET /admin/users?filter=).
    ///
    /// Returns the first record whose email matches case-insensitively. Not
    /// every provider deployment supports the filter parameter; callers that
    /// can fall back to a scan should treat failures here as skippable.
    pub async fn query_by_email(&self, email: &str) -> DirectoryResult<Option<IdentityRecord>> {
        let url = self.admin_users_url();
        debug!(url = %url, email = %email, "directory GET query by email");

        let response = self
            .authed(self.http_client.get(&url))
            .query(&[("filter", email)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let list: ListResponse = Self::decode(response).await?;
        let wanted = email.to_lowercase();
        Ok(list
            .users
            .into_iter()
            .find(|u| matches_email(u, &wanted)))
    }

    /// Fetch one page of the account listing (GET /admin/users?page=&per_page=).
    ///
    /// Pages are 1-based.
    pub async fn list_accounts(
        &self,
        page: u32,
        per_page: u32,
    ) -> DirectoryResult<Vec<IdentityRecord>> {
        let url = self.admin_users_url();
        debug!(url = %url, page, per_page, "directory GET list accounts");

        let response = self
            .authed(self.http_client.get(&url))
            .query(&[("page", page.to_string()), ("per_page", per_page.to_string())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            return Err(DirectoryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let list: ListResponse = Self::decode(response).await?;
        Ok(list.users)
    }

    /// Probe the directory's health endpoint (GET /health).
    pub async fn health_check(&self) -> HealthCheckResult {
        let checked_at = chrono::Utc::now();
        let url = format!("{}/health", self.base_url);

        let result = async {
            let response = self.authed(self.http_client.get(&url)).send().await?;
            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(DirectoryError::Api {
                    status: status.as_u16(),
                    message: Self::error_message(response).await,
                })
            }
        }
        .await;

        match result {
            Ok(()) => HealthCheckResult {
                healthy: true,
                checked_at,
                error: None,
            },
            Err(e) => HealthCheckResult {
                healthy: false,
                checked_at,
                error: Some(e.to_string()),
            },
        }
    }

    // ── Response Handling ─────────────────────────────────────────────

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> DirectoryResult<T> {
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| DirectoryError::Parse(format!("failed to parse response: {e}")))
    }

    /// Extract the provider's message from an error response body, falling
    /// back to the raw body when it is not the expected JSON shape.
    async fn error_message(response: reqwest::Response) -> String {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());

        match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(parsed) => parsed.into_message().unwrap_or(body),
            Err(_) => body,
        }
    }

    /// Classify a failed create response as a uniqueness conflict.
    fn is_conflict(status: StatusCode, message: &str) -> bool {
        status == StatusCode::CONFLICT
            || status == StatusCode::UNPROCESSABLE_ENTITY
            || message.to_lowercase().contains(ALREADY_REGISTERED_PHRASE)
    }
}

/// Case-insensitive email match against a record, tolerating records with no
/// email at all.
fn matches_email(record: &IdentityRecord, wanted_lowercase: &str) -> bool {
    record
        .email
        .as_deref()
        .is_some_and(|e| e.to_lowercase() == wanted_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conflict_classification_by_status() {
        assert!(DirectoryClient::is_conflict(StatusCode::CONFLICT, ""));
        assert!(DirectoryClient::is_conflict(
            StatusCode::UNPROCESSABLE_ENTITY,
            "email_exists"
        ));
        assert!(!DirectoryClient::is_conflict(
            StatusCode::INTERNAL_SERVER_ERROR,
            "boom"
        ));
    }

    #[test]
    fn test_conflict_classification_by_message() {
        assert!(DirectoryClient::is_conflict(
            StatusCode::BAD_REQUEST,
            "A user with this email address has already been registered"
        ));
        assert!(!DirectoryClient::is_conflict(
            StatusCode::BAD_REQUEST,
            "invalid email format"
        ));
    }

    #[test]
    fn test_error_body_field_fallbacks() {
        let body: ApiErrorBody =
            serde_json::from_value(json!({ "msg": "primary" })).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("primary"));

        let body: ApiErrorBody =
            serde_json::from_value(json!({ "error_description": "fallback" })).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("fallback"));

        let body: ApiErrorBody = serde_json::from_value(json!({})).unwrap();
        assert!(body.into_message().is_none());
    }

    #[test]
    fn test_base_url_normalization() {
        let client = DirectoryClient::with_http_client(
            "https://dir.example.com/auth/v1/".to_string(),
            "key".to_string(),
            Client::new(),
        );
        assert_eq!(client.base_url(), "https://dir.example.com/auth/v1");
        assert_eq!(
            client.admin_users_url(),
            "https://dir.example.com/auth/v1/admin/users"
        );
    }

    #[test]
    fn test_email_match_tolerates_missing_email() {
        let record: IdentityRecord = serde_json::from_value(json!({ "id": "h1" })).unwrap();
        assert!(!matches_email(&record, "a@x.com"));

        let record: IdentityRecord =
            serde_json::from_value(json!({ "id": "h1", "email": "A@X.com" })).unwrap();
        assert!(matches_email(&record, "a@x.com"));
    }
}
