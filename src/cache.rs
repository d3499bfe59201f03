//! Local system-of-record handle cache.
//!
//! The guest directory application may already store the directory handle it
//! observed for an email. That mapping is a lookup hint only: a miss never
//! means the account does not exist, and this crate never writes to it.

use crate::model::AccountHandle;
use async_trait::async_trait;

/// Read-only view of the application's email → handle mapping.
#[async_trait]
pub trait HandleCache: Send + Sync {
    /// Return the previously observed handle for this email, if any.
    ///
    /// `email` is already normalized (trimmed, lowercased) by the caller.
    async fn handle_for_email(&self, email: &str) -> Option<AccountHandle>;
}

/// Null cache for deployments without a local system-of-record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

#[async_trait]
impl HandleCache for NoCache {
    async fn handle_for_email(&self, _email: &str) -> Option<AccountHandle> {
        None
    }
}
