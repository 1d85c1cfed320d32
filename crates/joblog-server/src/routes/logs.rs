//! Job log routes.

use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use joblog_core::{JoblogError, LogDecorations};
use joblog_types::{JobLogKey, LogInfo};
use std::sync::Arc;
use tracing::{error, info};

type LogPath = Path<(String, String, String)>;

fn parse_key((owner, repo, job_id): (String, String, String)) -> joblog_core::Result<JobLogKey> {
    Ok(format!("{owner}/{repo}/{job_id}").parse::<JobLogKey>()?)
}

fn key_from_path(path: LogPath) -> Result<JobLogKey, (StatusCode, String)> {
    parse_key(path.0).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))
}

/// Fetch the log, rebuild its model, and return the cleaned text.
pub async fn document(
    State(state): State<Arc<AppState>>,
    path: LogPath,
) -> Result<Response, (StatusCode, String)> {
    let key = key_from_path(path)?;
    info!(target: "joblog::api", "Loading log document {}", key);

    match state.provider.provide(&key).await {
        Ok(text) => Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            text,
        )
            .into_response()),
        Err(JoblogError::NoContext { .. }) => {
            Err((StatusCode::NOT_FOUND, "Could not load logs".to_string()))
        }
        Err(e) => {
            error!(target: "joblog::api", "Failed to load log {}: {}", key, e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Editor decorations for a previously loaded log.
pub async fn decorations(
    State(state): State<Arc<AppState>>,
    path: LogPath,
) -> Result<Json<LogDecorations>, (StatusCode, String)> {
    let key = key_from_path(path)?;
    state
        .presenter
        .decorations(&key)
        .map(Json)
        .ok_or_else(|| not_loaded(&key))
}

/// The raw model for a previously loaded log.
pub async fn model(
    State(state): State<Arc<AppState>>,
    path: LogPath,
) -> Result<Json<LogInfo>, (StatusCode, String)> {
    let key = key_from_path(path)?;
    state
        .provider
        .cache()
        .get(&key)
        .map(|info| Json(LogInfo::clone(&info)))
        .ok_or_else(|| not_loaded(&key))
}

fn not_loaded(key: &JobLogKey) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("Log {} has not been loaded", key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_from_segments() {
        let key = parse_key(("octo".into(), "widgets".into(), "12".into())).unwrap();
        assert_eq!(key, JobLogKey::new("octo", "widgets", 12));
    }

    #[test]
    fn test_parse_key_rejects_bad_job_id() {
        let err = parse_key(("octo".into(), "widgets".into(), "twelve".into())).unwrap_err();
        assert!(matches!(err, JoblogError::InvalidKey(_)));
    }
}
