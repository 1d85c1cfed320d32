//! Shared application state.

use crate::config::Config;
use joblog_core::{DirectoryLogSource, LogCache, LogDocumentProvider, LogPresenter};
use std::sync::Arc;

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    pub provider: LogDocumentProvider<DirectoryLogSource>,
    pub presenter: LogPresenter,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> joblog_core::Result<Self> {
        let source = DirectoryLogSource::open(&config.logs_dir)?;
        let cache = Arc::new(LogCache::new());

        Ok(Self {
            provider: LogDocumentProvider::new(source, Arc::clone(&cache)),
            presenter: LogPresenter::new(cache),
            config,
        })
    }
}
