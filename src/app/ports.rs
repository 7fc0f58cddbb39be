use async_trait::async_trait;

use crate::types::{EntityReference, LookupFailure};

/// Reference-data lookup keyed by LEI.
///
/// `Ok(None)` is a successful "no match" answer; `Err` means the registry
/// could not be asked at all.
#[async_trait]
pub trait EntityLookupPort: Send + Sync {
    async fn lookup(&self, lei: &str) -> Result<Option<EntityReference>, LookupFailure>;
}
