//! Collection orchestration.
//!
//! Runs the locator once, then reads each source strictly sequentially. A
//! broken system database fails the whole collection; a broken per-user
//! database only loses that user's contribution. Nothing is cached between
//! calls; every invocation re-scans the filesystem.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::CollectError;
use crate::locator::{AccountResolver, Locator, SourcePaths, SystemAccounts};
use crate::reader::read_records;
use crate::record::{Origin, PermissionRecord};

/// Produces a fresh permission snapshot on every call.
pub struct Collector {
    locator: Locator,
}

impl Default for Collector {
    /// Scans the standard macOS locations, resolving accounts through the OS.
    fn default() -> Self {
        Self::new(SourcePaths::default(), SystemAccounts)
    }
}

impl Collector {
    pub fn new(paths: SourcePaths, resolver: impl AccountResolver + 'static) -> Self {
        Self {
            locator: Locator::new(paths, resolver),
        }
    }

    /// Gather records from every readable source: system records first, then
    /// per-user records in locator order.
    pub async fn collect_all(&self) -> Result<Vec<PermissionRecord>, CollectError> {
        let sources = self.locator.discover()?;
        let mut records = Vec::new();

        for source in &sources {
            match read_records(source).await {
                Ok(mut rows) => records.append(&mut rows),
                Err(err) if source.origin == Origin::System => {
                    return Err(CollectError::System {
                        path: source.path.clone(),
                        source: err,
                    });
                }
                Err(err) => {
                    warn!(
                        path = %source.path.display(),
                        user = %source.username,
                        error = %err,
                        "skipping unreadable user TCC database"
                    );
                }
            }
        }

        debug!(records = records.len(), sources = sources.len(), "collection complete");
        Ok(records)
    }

    /// The host-facing zero-argument operation: [`Self::collect_all`]
    /// rendered as flat string rows. Cancellation is dropping the future.
    pub async fn generate(&self) -> Result<Vec<BTreeMap<String, String>>, CollectError> {
        let records = self.collect_all().await?;
        Ok(records.into_iter().map(PermissionRecord::into_row).collect())
    }
}
