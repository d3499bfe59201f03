//! Account data structures exchanged with the directory admin API.

use serde::{Deserialize, Serialize};

/// Opaque stable identifier for an account, assigned by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountHandle(pub String);

impl AccountHandle {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AccountHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountHandle {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Guest attributes written to the account's user metadata.
///
/// Serialized wholesale on every create and update; the directory copy is
/// always a full overwrite, never a merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestMetadata {
    /// Fixed provider tag for guest accounts.
    pub provider: String,
    /// Fixed role for guest accounts.
    pub role: String,
    /// Guest record in the event-management application.
    pub guest_id: String,
    /// Event the guest is attached to.
    pub event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    /// Guest emails are treated as pre-verified.
    pub email_verified: bool,
}

impl GuestMetadata {
    /// Build guest metadata with the fixed role/provider tags applied.
    #[must_use]
    pub fn new(
        guest_id: impl Into<String>,
        event_id: impl Into<String>,
        first_name: Option<String>,
        last_name: Option<String>,
        company_id: Option<String>,
    ) -> Self {
        Self {
            provider: "guest".to_string(),
            role: "guest".to_string(),
            guest_id: guest_id.into(),
            event_id: event_id.into(),
            first_name,
            last_name,
            company_id,
            email_verified: true,
        }
    }
}

/// App-level metadata accompanying every guest account write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMetadata {
    pub provider: String,
    pub providers: Vec<String>,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            provider: "email".to_string(),
            providers: vec!["email".to_string(), "guest".to_string()],
        }
    }
}

/// Request body for account creation (POST /admin/users).
#[derive(Debug, Clone, Serialize)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    /// Skip the confirmation email; guests are provisioned pre-verified.
    pub email_confirm: bool,
    pub user_metadata: GuestMetadata,
    pub app_metadata: AppMetadata,
}

/// Request body for account mutation (PUT /admin/users/:id).
///
/// Fields present are overwritten wholesale on the directory side; absent
/// fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<GuestMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_metadata: Option<AppMetadata>,
}

impl AccountUpdate {
    /// Credential-only update, as used by password reset.
    #[must_use]
    pub fn password(password: impl Into<String>) -> Self {
        Self {
            password: Some(password.into()),
            ..Self::default()
        }
    }
}

/// One account as read back from list/query responses.
///
/// The credential is write-only and never appears here.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityRecord {
    pub id: AccountHandle,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<serde_json::Value>,
}

/// Structured result of an account-creation attempt.
///
/// Conflict classification is computed once at the client boundary, so
/// callers branch on this enum instead of matching provider error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The account was created; the directory assigned this handle.
    Created(AccountHandle),
    /// The directory reported the email as already registered.
    Conflict,
}
