//! The published log model.

use crate::ColorFormatSpan;
use serde::{Deserialize, Serialize};

/// A foldable range of lines opened by `##[group]` and closed by `##[endgroup]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogSection {
    /// First line of the section (0-based).
    pub start_line: usize,
    /// Last line of the section, inclusive.
    pub end_line: usize,
    pub title: String,
    /// Number of sections enclosing this one.
    pub nesting_level: usize,
}

/// Workflow command that marks a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Error,
    Warning,
    Notice,
    Debug,
    Command,
}

impl AnnotationKind {
    /// Parse the keyword between `##[` and `]`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "error" => Some(AnnotationKind::Error),
            "warning" => Some(AnnotationKind::Warning),
            "notice" => Some(AnnotationKind::Notice),
            "debug" => Some(AnnotationKind::Debug),
            "command" => Some(AnnotationKind::Command),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::Error => "error",
            AnnotationKind::Warning => "warning",
            AnnotationKind::Notice => "notice",
            AnnotationKind::Debug => "debug",
            AnnotationKind::Command => "command",
        }
    }
}

/// A line tagged by a workflow command marker such as `##[error]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogAnnotation {
    pub line: usize,
    pub kind: AnnotationKind,
}

/// Cleaned log text plus everything derived from the directives stripped out of it.
///
/// Built once per fetch and never mutated afterwards; a re-fetch replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInfo {
    pub color_formats: Vec<ColorFormatSpan>,
    pub sections: Vec<LogSection>,
    #[serde(default)]
    pub annotations: Vec<LogAnnotation>,
    pub updated_log: String,
}

impl LogInfo {
    /// The sentinel stored for a log the source no longer has.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True for the empty sentinel.
    pub fn is_unavailable(&self) -> bool {
        self.updated_log.is_empty()
            && self.color_formats.is_empty()
            && self.sections.is_empty()
            && self.annotations.is_empty()
    }

    /// Number of lines in the cleaned text, counted like [`str::lines`].
    pub fn line_count(&self) -> usize {
        self.updated_log.lines().count()
    }
}
