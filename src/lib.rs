//! Guest identity provisioning against an external directory service.
//!
//! The event-management application hands out "guest" logins backed by a
//! third-party identity provider with a GoTrue-style admin API. The provider
//! has no find-or-create-by-email primitive, so this crate implements the
//! reconciliation around it:
//!
//! - [`GuestProvisioner`] ensures exactly one account exists per email
//!   (create, or claim-and-overwrite on conflict) and returns its handle.
//! - [`PasswordResetter`] updates the credential of an existing account,
//!   never creating one.
//!
//! Both locate accounts through [`EmailResolver`], which tries a local
//! system-of-record hint, then the provider's filtered query, then a bounded
//! paginated scan.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod provisioner;
pub mod reset;
pub mod resolver;

pub use cache::{HandleCache, NoCache};
pub use client::{DirectoryClient, HealthCheckResult};
pub use config::{ConfigError, DirectoryConfig};
pub use error::{DirectoryError, DirectoryResult};
pub use model::{AccountHandle, AccountUpdate, CreateOutcome, GuestMetadata, NewAccount};
pub use provisioner::{GuestProvisionRequest, GuestProvisioner};
pub use reset::PasswordResetter;
pub use resolver::{EmailResolver, LookupStrategy, Resolution};

use std::sync::Arc;

/// Bundled provisioner and resetter sharing one client and resolver chain.
///
/// This is the single shared construction path, so every caller gets the
/// same strategy order and the same conflict classification.
pub struct Directory {
    pub provisioner: GuestProvisioner,
    pub resetter: PasswordResetter,
    pub client: DirectoryClient,
}

impl Directory {
    /// Build the full stack from configuration and an optional local
    /// system-of-record cache.
    pub fn from_config(
        config: &DirectoryConfig,
        cache: Arc<dyn HandleCache>,
    ) -> DirectoryResult<Self> {
        let client = DirectoryClient::new(config)?;
        Ok(Self::from_client(client, cache, config))
    }

    /// Build from a pre-constructed client (for testing).
    #[must_use]
    pub fn from_client(
        client: DirectoryClient,
        cache: Arc<dyn HandleCache>,
        config: &DirectoryConfig,
    ) -> Self {
        let resolver = |cache: Arc<dyn HandleCache>| {
            EmailResolver::new(
                client.clone(),
                cache,
                config.scan_page_size,
                config.scan_max_pages,
            )
        };
        Self {
            provisioner: GuestProvisioner::new(client.clone(), resolver(cache.clone())),
            resetter: PasswordResetter::new(client.clone(), resolver(cache)),
            client,
        }
    }
}
