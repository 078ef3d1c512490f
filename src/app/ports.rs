use async_trait::async_trait;

use crate::common::error::Result;
use crate::domain::{CanonicalContact, RawContactData};

/// Paginated source of raw contacts. `None` is the collaborator's explicit
/// no-more-pages signal; the pagination cursor lives behind the adapter,
/// never in the core.
#[async_trait]
pub trait ContactSourcePort: Send + Sync {
    async fn next_page(&self) -> Result<Option<Vec<RawContactData>>>;
}

/// Per-record destination for canonical contacts. Status-code inspection
/// and remote field mapping are the adapter's concern.
#[async_trait]
pub trait ContactSinkPort: Send + Sync {
    async fn upload(&self, contact: &CanonicalContact) -> Result<()>;
}
