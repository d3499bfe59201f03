//! Password reset orchestrator.
//!
//! Updates the credential of an existing account located by the lookup
//! strategy chain. Never creates an account: an unresolvable email is a
//! [`DirectoryError::NotFound`], surfaced distinctly from generic failure.

use crate::client::DirectoryClient;
use crate::error::{DirectoryError, DirectoryResult};
use crate::model::{AccountHandle, AccountUpdate};
use crate::resolver::{normalize_email, EmailResolver};
use tracing::info;

/// Orchestrates credential updates for existing guest accounts.
pub struct PasswordResetter {
    client: DirectoryClient,
    resolver: EmailResolver,
}

impl PasswordResetter {
    #[must_use]
    pub fn new(client: DirectoryClient, resolver: EmailResolver) -> Self {
        Self { client, resolver }
    }

    /// Set a new credential on the account registered for `email`.
    ///
    /// The email is normalized (trimmed, lowercased) before resolution.
    /// Repeated calls with the same credential converge to the same
    /// directory state.
    pub async fn reset_password(
        &self,
        email: &str,
        new_credential: &str,
    ) -> DirectoryResult<AccountHandle> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(DirectoryError::MissingInput { field: "email" });
        }
        if new_credential.is_empty() {
            return Err(DirectoryError::MissingInput { field: "credential" });
        }

        let Some(handle) = self.resolver.resolve(&email).await? else {
            return Err(DirectoryError::NotFound { email });
        };

        self.client
            .update_account(&handle, &AccountUpdate::password(new_credential))
            .await?;

        info!(handle = %handle, "credential updated");
        Ok(handle)
    }
}
