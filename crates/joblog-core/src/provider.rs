//! Fetch boundary: turns a job key into displayable log text.

use crate::{parse_log, FetchError, JoblogError, LogCache, Result};
use joblog_types::JobLogKey;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Shown instead of the log when the source reports it expired.
pub const EXPIRED_MESSAGE: &str = "Could not open logs, they are expired.";

/// Where raw job logs come from.
pub trait LogSource: Send + Sync {
    /// Whether the source can serve logs for the key's repository at all.
    fn has_context(&self, key: &JobLogKey) -> impl Future<Output = bool> + Send;

    /// Fetch the raw log text for one job.
    fn fetch(
        &self,
        key: &JobLogKey,
    ) -> impl Future<Output = std::result::Result<String, FetchError>> + Send;
}

/// Fetches logs, builds their models, and keeps the cache current.
#[derive(Debug)]
pub struct LogDocumentProvider<S> {
    source: S,
    cache: Arc<LogCache>,
}

impl<S: LogSource> LogDocumentProvider<S> {
    pub fn new(source: S, cache: Arc<LogCache>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &Arc<LogCache> {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Produce the document text for `key`.
    ///
    /// Fails only when the source has no context for the repository; every
    /// fetch outcome is turned into a displayable string.
    pub async fn provide(&self, key: &JobLogKey) -> Result<String> {
        if !self.source.has_context(key).await {
            warn!(target: "joblog::fetch", "No log source context for {}", key);
            return Err(JoblogError::NoContext {
                owner: key.owner.clone(),
                repo: key.repo.clone(),
            });
        }

        match self.source.fetch(key).await {
            Ok(raw) => {
                let info = parse_log(&raw);
                debug!(
                    target: "joblog::fetch",
                    "Fetched log for {}: {} raw bytes, {} sections",
                    key,
                    raw.len(),
                    info.sections.len()
                );
                let text = info.updated_log.clone();
                self.cache.set(key.clone(), info);
                Ok(text)
            }
            Err(FetchError::Gone) => {
                debug!(target: "joblog::fetch", "Log for {} has expired", key);
                self.cache.clear(key.clone());
                Ok(EXPIRED_MESSAGE.to_string())
            }
            Err(FetchError::Failed(message)) => {
                error!(target: "joblog::fetch", "Error loading logs for {}: {}", key, message);
                Ok(format!("Could not open logs, unhandled error. {message}"))
            }
        }
    }
}
