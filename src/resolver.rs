//! Email → handle resolution.
//!
//! The directory offers no guaranteed "get account by email" primitive, so
//! resolution runs an ordered list of lookup strategies and stops at the
//! first decisive answer:
//!
//! 1. Local system-of-record hint ([`CacheHint`]) — cheapest, trusted as-is.
//! 2. Direct provider query ([`DirectQuery`]) — the admin listing filtered
//!    by email; provider support varies, so failures are absorbed.
//! 3. Paginated exhaustive scan ([`PaginatedScan`]) — bounded by a hard page
//!    ceiling so it always terminates.
//!
//! A strategy answers [`Resolution::Skipped`] when it has nothing decisive
//! to say (cache miss, unsupported filter endpoint); the resolver then moves
//! on to the next strategy. [`Resolution::NotFound`] is authoritative and
//! ends the chain.

use crate::cache::HandleCache;
use crate::client::DirectoryClient;
use crate::error::DirectoryResult;
use crate::model::AccountHandle;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Normalize an email for comparison and storage: trim and lowercase.
///
/// The directory treats emails as case-insensitive unique keys; every
/// comparison in this crate goes through this normalization.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Outcome of one lookup strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The strategy located the account.
    Found(AccountHandle),
    /// The strategy is authoritative that no account exists.
    NotFound,
    /// The strategy could not answer; try the next one.
    Skipped,
}

/// One way of resolving an email to an account handle.
#[async_trait]
pub trait LookupStrategy: Send + Sync {
    /// Strategy name for log output.
    fn name(&self) -> &'static str;

    /// Attempt to resolve `email` (already normalized) to a handle.
    async fn try_resolve(&self, email: &str) -> DirectoryResult<Resolution>;
}

/// Strategy 1: local system-of-record hint.
///
/// A stored handle is used directly, without re-validating existence against
/// the directory. A miss is never treated as "account does not exist".
pub struct CacheHint {
    cache: Arc<dyn HandleCache>,
}

impl CacheHint {
    #[must_use]
    pub fn new(cache: Arc<dyn HandleCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl LookupStrategy for CacheHint {
    fn name(&self) -> &'static str {
        "cache_hint"
    }

    async fn try_resolve(&self, email: &str) -> DirectoryResult<Resolution> {
        match self.cache.handle_for_email(email).await {
            Some(handle) => Ok(Resolution::Found(handle)),
            None => Ok(Resolution::Skipped),
        }
    }
}

/// Strategy 2: direct provider query scoped by email.
///
/// Not every provider deployment supports the filter parameter, and the
/// match it performs is not authoritative, so both errors and empty results
/// fall through to the scan.
pub struct DirectQuery {
    client: DirectoryClient,
}

impl DirectQuery {
    #[must_use]
    pub fn new(client: DirectoryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LookupStrategy for DirectQuery {
    fn name(&self) -> &'static str {
        "direct_query"
    }

    async fn try_resolve(&self, email: &str) -> DirectoryResult<Resolution> {
        match self.client.query_by_email(email).await {
            Ok(Some(record)) => Ok(Resolution::Found(record.id)),
            Ok(None) => Ok(Resolution::Skipped),
            Err(e) => {
                // The query endpoint is optional; its failure is absorbed
                // and resolution falls through to the scan.
                warn!(
                    email = %email,
                    error = %e,
                    "direct email query unavailable, falling back to scan"
                );
                Ok(Resolution::Skipped)
            }
        }
    }
}

/// Strategy 3: paginated exhaustive scan of the account listing.
///
/// Iterates fixed-size pages comparing emails case-insensitively until a
/// match, a short page (end of data), or the page ceiling. The ceiling
/// guarantees termination even if the provider never returns a short page.
pub struct PaginatedScan {
    client: DirectoryClient,
    page_size: u32,
    max_pages: u32,
}

impl PaginatedScan {
    #[must_use]
    pub fn new(client: DirectoryClient, page_size: u32, max_pages: u32) -> Self {
        Self {
            client,
            page_size,
            max_pages,
        }
    }
}

#[async_trait]
impl LookupStrategy for PaginatedScan {
    fn name(&self) -> &'static str {
        "paginated_scan"
    }

    async fn try_resolve(&self, email: &str) -> DirectoryResult<Resolution> {
        for page in 1..=self.max_pages {
            let accounts = self.client.list_accounts(page, self.page_size).await?;
            let page_len = accounts.len();

            // First match wins; directory-enforced uniqueness should make
            // duplicates impossible, but the scan does not rely on it.
            let found = accounts.into_iter().find(|record| {
                record
                    .email
                    .as_deref()
                    .is_some_and(|e| normalize_email(e) == email)
            });
            if let Some(record) = found {
                debug!(email = %email, page, "scan located account");
                return Ok(Resolution::Found(record.id));
            }

            // Short page signals the end of data.
            if page_len < self.page_size as usize {
                return Ok(Resolution::NotFound);
            }
        }

        warn!(
            email = %email,
            max_pages = self.max_pages,
            "scan reached page ceiling without a match"
        );
        Ok(Resolution::NotFound)
    }
}

/// Runs the lookup strategies in priority order.
pub struct EmailResolver {
    strategies: Vec<Box<dyn LookupStrategy>>,
}

impl EmailResolver {
    /// Build the standard chain: cache hint → direct query → paginated scan.
    #[must_use]
    pub fn new(
        client: DirectoryClient,
        cache: Arc<dyn HandleCache>,
        scan_page_size: u32,
        scan_max_pages: u32,
    ) -> Self {
        Self {
            strategies: vec![
                Box::new(CacheHint::new(cache)),
                Box::new(DirectQuery::new(client.clone())),
                Box::new(PaginatedScan::new(client, scan_page_size, scan_max_pages)),
            ],
        }
    }

    /// Build a resolver from an explicit strategy list (for testing and
    /// custom deployments).
    #[must_use]
    pub fn with_strategies(strategies: Vec<Box<dyn LookupStrategy>>) -> Self {
        Self { strategies }
    }

    /// Resolve a normalized email to a handle.
    ///
    /// Returns `None` when every strategy either skipped or answered
    /// not-found; directory errors from a non-optional strategy propagate.
    pub async fn resolve(&self, email: &str) -> DirectoryResult<Option<AccountHandle>> {
        for strategy in &self.strategies {
            match strategy.try_resolve(email).await? {
                Resolution::Found(handle) => {
                    debug!(
                        email = %email,
                        strategy = strategy.name(),
                        handle = %handle,
                        "resolved email to handle"
                    );
                    return Ok(Some(handle));
                }
                Resolution::NotFound => {
                    debug!(
                        email = %email,
                        strategy = strategy.name(),
                        "strategy is authoritative: no such account"
                    );
                    return Ok(None);
                }
                Resolution::Skipped => {
                    debug!(email = %email, strategy = strategy.name(), "strategy skipped");
                }
            }
        }
        Ok(None)
    }
}
