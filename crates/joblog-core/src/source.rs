//! Log source backed by a directory tree of downloaded job logs.
//!
//! Layout: `<root>/<owner>/<repo>/<job_id>.log`.

use crate::{FetchError, LogSource, Result};
use joblog_types::JobLogKey;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct DirectoryLogSource {
    root: PathBuf,
}

impl DirectoryLogSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the root directory if needed and return a source over it.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            info!(target: "joblog::fetch", "Creating logs directory {}", root.display());
        }
        std::fs::create_dir_all(&root)?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the logs of one repository.
    ///
    /// `None` when owner or repo could escape the root.
    pub fn repo_dir(&self, key: &JobLogKey) -> Option<PathBuf> {
        if !is_plain_segment(&key.owner) || !is_plain_segment(&key.repo) {
            return None;
        }
        Some(self.root.join(&key.owner).join(&key.repo))
    }

    pub fn log_path(&self, key: &JobLogKey) -> Option<PathBuf> {
        self.repo_dir(key)
            .map(|dir| dir.join(format!("{}.log", key.job_id)))
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
}

impl LogSource for DirectoryLogSource {
    async fn has_context(&self, key: &JobLogKey) -> bool {
        let Some(dir) = self.repo_dir(key) else {
            return false;
        };
        tokio::fs::metadata(&dir)
            .await
            .is_ok_and(|metadata| metadata.is_dir())
    }

    async fn fetch(&self, key: &JobLogKey) -> std::result::Result<String, FetchError> {
        let Some(path) = self.log_path(key) else {
            return Err(FetchError::Failed(format!("Invalid log key: {key}")));
        };

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(String::from_utf8(bytes)
                .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(target: "joblog::fetch", "No log file at {}", path.display());
                Err(FetchError::Gone)
            }
            Err(e) => Err(FetchError::Failed(e.to_string())),
        }
    }
}
