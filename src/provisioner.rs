//! Guest account provisioning orchestrator.
//!
//! Ensures exactly one directory account exists for a guest's email, with
//! the requested credential and metadata, and returns its handle. Creation
//! conflicts are reconciled by resolving the existing account and
//! overwriting it in place, so repeated calls for the same email are safe
//! and last-write-wins.

use crate::client::DirectoryClient;
use crate::error::{DirectoryError, DirectoryResult};
use crate::model::{
    AccountHandle, AccountUpdate, AppMetadata, CreateOutcome, GuestMetadata, NewAccount,
};
use crate::resolver::{normalize_email, EmailResolver};
use tracing::{error, info, warn};

/// Inputs for one provisioning invocation.
///
/// `email`, `credential`, `guest_id`, and `event_id` are required and must
/// be non-empty; the remaining fields pass through into metadata verbatim.
#[derive(Debug, Clone)]
pub struct GuestProvisionRequest {
    pub email: String,
    pub credential: String,
    pub guest_id: String,
    pub event_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_id: Option<String>,
}

impl GuestProvisionRequest {
    fn validate(&self) -> DirectoryResult<()> {
        for (field, value) in [
            ("email", &self.email),
            ("credential", &self.credential),
            ("guest_id", &self.guest_id),
            ("event_id", &self.event_id),
        ] {
            if value.trim().is_empty() {
                return Err(DirectoryError::MissingInput { field });
            }
        }
        Ok(())
    }

    fn metadata(&self) -> GuestMetadata {
        GuestMetadata::new(
            self.guest_id.clone(),
            self.event_id.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.company_id.clone(),
        )
    }
}

/// Orchestrates create-or-claim provisioning of guest accounts.
pub struct GuestProvisioner {
    client: DirectoryClient,
    resolver: EmailResolver,
}

impl GuestProvisioner {
    #[must_use]
    pub fn new(client: DirectoryClient, resolver: EmailResolver) -> Self {
        Self { client, resolver }
    }

    /// Ensure an account exists for the request's email and return its
    /// handle.
    ///
    /// 1. Attempt creation with the full metadata.
    /// 2. On a uniqueness conflict, resolve the existing account by email
    ///    and overwrite its credential and metadata wholesale, claiming it
    ///    as a guest account.
    /// 3. A conflict that no lookup strategy can resolve is a directory
    ///    consistency failure and is fatal, not retried.
    pub async fn provision(
        &self,
        request: &GuestProvisionRequest,
    ) -> DirectoryResult<AccountHandle> {
        request.validate()?;

        let metadata = request.metadata();
        let account = NewAccount {
            email: request.email.clone(),
            password: request.credential.clone(),
            email_confirm: true,
            user_metadata: metadata.clone(),
            app_metadata: AppMetadata::default(),
        };

        match self.client.create_account(&account).await? {
            CreateOutcome::Created(handle) => {
                info!(
                    guest_id = %request.guest_id,
                    event_id = %request.event_id,
                    handle = %handle,
                    "guest account created"
                );
                Ok(handle)
            }
            CreateOutcome::Conflict => {
                warn!(
                    guest_id = %request.guest_id,
                    "email already registered, claiming existing account"
                );
                self.claim_existing(request, metadata).await
            }
        }
    }

    /// Conflict path: locate the pre-existing account and overwrite its
    /// credential and metadata with this request's values.
    async fn claim_existing(
        &self,
        request: &GuestProvisionRequest,
        metadata: GuestMetadata,
    ) -> DirectoryResult<AccountHandle> {
        let email = normalize_email(&request.email);

        let Some(handle) = self.resolver.resolve(&email).await? else {
            error!(
                guest_id = %request.guest_id,
                "directory reported a conflict but no account could be resolved"
            );
            return Err(DirectoryError::Unresolvable { email });
        };

        let update = AccountUpdate {
            password: Some(request.credential.clone()),
            user_metadata: Some(metadata),
            app_metadata: Some(AppMetadata::default()),
        };
        self.client.update_account(&handle, &update).await?;

        info!(
            guest_id = %request.guest_id,
            event_id = %request.event_id,
            handle = %handle,
            "existing account claimed and synchronized"
        );
        Ok(handle)
    }
}
