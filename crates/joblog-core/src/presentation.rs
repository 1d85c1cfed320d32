//! Editor-facing view of cached log models.
//!
//! Spans in [`LogInfo`] are byte offsets into the whole cleaned text. Editors
//! want line/column ranges that never cross a line break, so this module
//! splits spans per line and counts columns in characters.

use crate::LogCache;
use joblog_types::{JobLogKey, LogAnnotation, LogInfo, LogSection, TextFormat};
use serde::Serialize;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Part of a color span that lies on a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyledRange {
    pub line: usize,
    /// First character column, 0-based.
    pub start_column: usize,
    /// Column one past the last character.
    pub end_column: usize,
    pub format: TextFormat,
}

/// A collapsible region for the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoldRange {
    pub start_line: usize,
    pub end_line: usize,
    pub title: String,
    pub nesting_level: usize,
}

impl From<&LogSection> for FoldRange {
    fn from(section: &LogSection) -> Self {
        Self {
            start_line: section.start_line,
            end_line: section.end_line,
            title: section.title.clone(),
            nesting_level: section.nesting_level,
        }
    }
}

/// Everything a display layer needs to decorate one log document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogDecorations {
    pub styled_ranges: Vec<StyledRange>,
    pub folds: Vec<FoldRange>,
    pub annotations: Vec<LogAnnotation>,
    /// The log was fetched but the source reported it expired.
    pub unavailable: bool,
}

/// Resolves decorations for cached logs.
pub struct LogPresenter<K = JobLogKey> {
    cache: Arc<LogCache<K>>,
}

impl<K: Eq + Hash + fmt::Debug> LogPresenter<K> {
    pub fn new(cache: Arc<LogCache<K>>) -> Self {
        Self { cache }
    }

    /// Cleaned text for `key`, if it was ever fetched.
    pub fn text(&self, key: &K) -> Option<String> {
        self.cache.get(key).map(|info| info.updated_log.clone())
    }

    /// Decorations for `key`, if it was ever fetched.
    pub fn decorations(&self, key: &K) -> Option<LogDecorations> {
        self.cache.get(key).map(|info| resolve_decorations(&info))
    }
}

impl<K> fmt::Debug for LogPresenter<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogPresenter").finish_non_exhaustive()
    }
}

/// Convert a model's offsets into line/column decorations.
pub fn resolve_decorations(info: &LogInfo) -> LogDecorations {
    let text = info.updated_log.as_str();
    let line_starts = line_starts(text);

    let mut styled_ranges = Vec::with_capacity(info.color_formats.len());
    for span in &info.color_formats {
        let first_line = line_of(&line_starts, span.start_offset);
        let last_line = line_of(&line_starts, span.end_offset);

        for line in first_line..=last_line {
            let line_start = line_starts[line];
            let line_end = line_starts
                .get(line + 1)
                .map_or(text.len(), |next| next - 1);

            let start = span.start_offset.max(line_start);
            let end = span.end_offset.min(line_end);
            if end <= start {
                continue;
            }

            let start_column = text[line_start..start].chars().count();
            styled_ranges.push(StyledRange {
                line,
                start_column,
                end_column: start_column + text[start..end].chars().count(),
                format: span.format,
            });
        }
    }

    LogDecorations {
        styled_ranges,
        folds: info.sections.iter().map(FoldRange::from).collect(),
        annotations: info.annotations.clone(),
        unavailable: info.is_unavailable(),
    }
}

/// Byte offset at which each line starts.
fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(index, _)| index + 1))
        .collect()
}

/// Index of the line containing byte `offset`.
fn line_of(line_starts: &[usize], offset: usize) -> usize {
    line_starts.partition_point(|start| *start <= offset) - 1
}
