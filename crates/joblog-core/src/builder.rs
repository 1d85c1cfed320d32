//! Builds a [`LogInfo`] from scanned tokens.

use crate::scanner::{Scanner, Token};
use joblog_types::{
    AnnotationKind, ColorFormatSpan, LogAnnotation, LogInfo, LogSection, SgrCode, TextFormat,
};
use std::borrow::Cow;
use tracing::{debug, trace};

/// A `##[group]` waiting for its `##[endgroup]`.
#[derive(Debug)]
struct OpenSection {
    start_line: usize,
    title: String,
    nesting_level: usize,
}

/// Folds a token stream into cleaned text, color spans, sections and annotations.
///
/// Directive bytes never reach the output, so every offset and line index
/// recorded here refers to the cleaned text.
#[derive(Debug, Default)]
pub struct LogBuilder {
    output: String,
    /// Newlines emitted so far
    line: usize,
    /// Attributes currently in effect
    format: TextFormat,
    /// Output offset where the current non-plain format took effect
    span_start: Option<usize>,
    color_formats: Vec<ColorFormatSpan>,
    open_sections: Vec<OpenSection>,
    sections: Vec<LogSection>,
    annotations: Vec<LogAnnotation>,
}

impl LogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder that expects roughly `capacity` bytes of output.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            output: String::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Feed one token.
    pub fn push(&mut self, token: Token<'_>) {
        match token {
            Token::Literal { text, .. } => self.push_text(text),
            Token::Format { codes, .. } => self.apply_format(&codes),
            Token::FoldStart { title, .. } => self.open_section(title),
            Token::FoldEnd { span } => {
                if !self.close_section() {
                    debug!(
                        target: "joblog::parser",
                        "Ignoring endgroup without open group at byte {}",
                        span.start
                    );
                }
            }
            Token::Marker { kind, .. } => self.annotate(kind),
        }
    }

    /// Close whatever is still open and return the finished model.
    pub fn finish(mut self) -> LogInfo {
        self.close_span();

        if !self.open_sections.is_empty() {
            debug!(
                target: "joblog::parser",
                "Closing {} unterminated group(s) at end of log",
                self.open_sections.len()
            );
        }
        while self.close_section() {}

        trace!(
            target: "joblog::parser",
            "Built log model: {} bytes, {} spans, {} sections, {} annotations",
            self.output.len(),
            self.color_formats.len(),
            self.sections.len(),
            self.annotations.len()
        );

        LogInfo {
            color_formats: self.color_formats,
            sections: self.sections,
            annotations: self.annotations,
            updated_log: self.output,
        }
    }

    fn push_text(&mut self, text: &str) {
        self.line += text.bytes().filter(|b| *b == b'\n').count();
        self.output.push_str(text);
    }

    fn apply_format(&mut self, codes: &[SgrCode]) {
        let next = self.format.apply(codes);
        if next == self.format {
            return;
        }

        self.close_span();
        self.format = next;
        if !next.is_plain() {
            self.span_start = Some(self.output.len());
        }
    }

    /// End the current span at the output cursor. Zero-width spans are dropped.
    fn close_span(&mut self) {
        let Some(start) = self.span_start.take() else {
            return;
        };
        let end = self.output.len();
        if end > start {
            self.color_formats.push(ColorFormatSpan {
                start_offset: start,
                end_offset: end,
                format: self.format,
            });
        }
    }

    fn open_section(&mut self, title: Cow<'_, str>) {
        self.open_sections.push(OpenSection {
            start_line: self.line,
            title: title.into_owned(),
            nesting_level: self.open_sections.len(),
        });
    }

    /// Close the innermost open section. Returns false when none is open.
    fn close_section(&mut self) -> bool {
        let Some(open) = self.open_sections.pop() else {
            return false;
        };
        let end_line = self.last_content_line(open.start_line);
        self.sections.push(LogSection {
            start_line: open.start_line,
            end_line,
            title: open.title,
            nesting_level: open.nesting_level,
        });
        true
    }

    /// Line holding the most recent output, never before `start_line`.
    ///
    /// A trailing newline belongs to the line it ends, so a section closed
    /// right after one ends on the previous line.
    fn last_content_line(&self, start_line: usize) -> usize {
        if self.line > start_line && self.output.ends_with('\n') {
            self.line - 1
        } else {
            self.line
        }
    }

    fn annotate(&mut self, kind: AnnotationKind) {
        self.annotations.push(LogAnnotation {
            line: self.line,
            kind,
        });
    }
}

/// Build a model from an already scanned token stream.
pub fn build<'a>(tokens: impl IntoIterator<Item = Token<'a>>) -> LogInfo {
    let mut builder = LogBuilder::new();
    for token in tokens {
        builder.push(token);
    }
    builder.finish()
}

/// Scan and build in one pass.
pub fn parse_log(raw: &str) -> LogInfo {
    let mut builder = LogBuilder::with_capacity(raw.len());
    for token in Scanner::new(raw) {
        builder.push(token);
    }
    builder.finish()
}
