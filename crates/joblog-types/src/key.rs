//! Identifier for one job's log document.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifies the log of a single CI job: `owner/repo/job_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobLogKey {
    pub owner: String,
    pub repo: String,
    pub job_id: u64,
}

impl JobLogKey {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, job_id: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            job_id,
        }
    }
}

impl fmt::Display for JobLogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.repo, self.job_id)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("Expected owner/repo/job_id, got '{0}'")]
    Malformed(String),

    #[error("Invalid job id: '{0}'")]
    InvalidJobId(String),
}

impl FromStr for JobLogKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim_matches('/').split('/');
        let (Some(owner), Some(repo), Some(job), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(KeyParseError::Malformed(s.to_string()));
        };

        if owner.is_empty() || repo.is_empty() {
            return Err(KeyParseError::Malformed(s.to_string()));
        }

        let job_id = job
            .parse::<u64>()
            .map_err(|_| KeyParseError::InvalidJobId(job.to_string()))?;

        Ok(Self::new(owner, repo, job_id))
    }
}
