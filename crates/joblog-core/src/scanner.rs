//! Escape scanner for raw job logs.
//!
//! Splits raw log text into literal runs and the directives embedded in it:
//! - SGR color/format sequences (`ESC [ params m`)
//! - fold markers (`##[group]title`, `##[endgroup]`) at the start of a line
//! - single-line workflow command markers (`##[error]`, `##[warning]`, ...)
//!
//! Anything that does not match one of these grammars is literal text.

use joblog_types::{AnnotationKind, Color, SgrCode};
use std::borrow::Cow;
use std::ops::Range;

const ESC: u8 = 0x1b;

/// Prefix shared by every workflow command marker.
const COMMAND_PREFIX: &str = "##[";

/// Longest parameter list accepted inside an SGR sequence.
const MAX_SGR_PARAMS_LEN: usize = 64;

/// Longest keyword accepted between `##[` and `]`.
const MAX_KEYWORD_LEN: usize = 16;

/// A piece of scanned log text. Every variant carries the byte range of the
/// source it was scanned from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text copied to the output unchanged.
    Literal { text: &'a str, span: Range<usize> },
    /// Color/format change.
    Format { codes: Vec<SgrCode>, span: Range<usize> },
    /// `##[group]`, including the rest of its line. The title has its color
    /// sequences removed.
    FoldStart { title: Cow<'a, str>, span: Range<usize> },
    /// `##[endgroup]`, including the rest of its line.
    FoldEnd { span: Range<usize> },
    /// A line marker such as `##[error]`; only the bracketed prefix is consumed.
    Marker { kind: AnnotationKind, span: Range<usize> },
}

impl Token<'_> {
    pub fn span(&self) -> &Range<usize> {
        match self {
            Token::Literal { span, .. }
            | Token::Format { span, .. }
            | Token::FoldStart { span, .. }
            | Token::FoldEnd { span }
            | Token::Marker { span, .. } => span,
        }
    }
}

/// Scanner states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Copying literal bytes
    Normal,
    /// Positioned on an ESC byte
    InEscape,
    /// Positioned on `#` at the start of a line
    InFoldKeyword,
}

/// Lazy token iterator over a raw log.
#[derive(Debug)]
pub struct Scanner<'a> {
    raw: &'a str,
    pos: usize,
    state: State,
    /// Start of the literal run not yet emitted
    literal_start: Option<usize>,
    /// No literal byte seen since the last line break
    at_line_start: bool,
    /// Directive held back while the literal run before it is emitted
    pending: Option<Token<'a>>,
}

impl<'a> Scanner<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            pos: 0,
            state: State::Normal,
            literal_start: None,
            at_line_start: true,
            pending: None,
        }
    }

    /// Consume the byte at the cursor as literal text.
    fn take_literal_byte(&mut self) {
        let byte = self.raw.as_bytes()[self.pos];
        self.literal_start.get_or_insert(self.pos);
        self.at_line_start = byte == b'\n';
        self.pos += 1;
    }

    /// Close the pending literal run at `end`.
    fn take_literal(&mut self, end: usize) -> Option<Token<'a>> {
        let start = self.literal_start.take()?;
        let raw = self.raw;
        Some(Token::Literal {
            text: &raw[start..end],
            span: start..end,
        })
    }

    /// Emit a directive, flushing any literal run that precedes it first.
    fn emit(&mut self, token: Token<'a>) -> Option<Token<'a>> {
        match self.take_literal(token.span().start) {
            Some(literal) => {
                self.pending = Some(token);
                Some(literal)
            }
            None => Some(token),
        }
    }

    /// Try the workflow command grammar at the cursor.
    fn match_command(&self) -> Option<Token<'a>> {
        let raw = self.raw;
        let start = self.pos;
        let rest = raw[start..].strip_prefix(COMMAND_PREFIX)?;
        let close = rest.bytes().take(MAX_KEYWORD_LEN + 1).position(|b| b == b']')?;
        let keyword = &rest[..close];
        let after = start + COMMAND_PREFIX.len() + close + 1;

        if let Some(kind) = AnnotationKind::from_keyword(keyword) {
            return Some(Token::Marker {
                kind,
                span: start..after,
            });
        }

        let (line_end, consumed_end) = match raw[after..].find('\n') {
            Some(newline) => (after + newline, after + newline + 1),
            None => (raw.len(), raw.len()),
        };

        match keyword {
            "group" => Some(Token::FoldStart {
                title: fold_title(&raw[after..line_end]),
                span: start..consumed_end,
            }),
            "endgroup" => Some(Token::FoldEnd {
                span: start..consumed_end,
            }),
            _ => None,
        }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }

        let raw = self.raw;
        let bytes = raw.as_bytes();
        loop {
            match self.state {
                State::Normal => {
                    let Some(&byte) = bytes.get(self.pos) else {
                        return self.take_literal(raw.len());
                    };
                    if byte == ESC {
                        self.state = State::InEscape;
                    } else if byte == b'#' && self.at_line_start {
                        self.state = State::InFoldKeyword;
                    } else {
                        self.take_literal_byte();
                    }
                }
                State::InEscape => {
                    self.state = State::Normal;
                    match parse_sgr(&bytes[self.pos..]) {
                        Some((len, codes)) => {
                            let start = self.pos;
                            self.pos += len;
                            return self.emit(Token::Format {
                                codes,
                                span: start..self.pos,
                            });
                        }
                        None => self.take_literal_byte(),
                    }
                }
                State::InFoldKeyword => {
                    self.state = State::Normal;
                    match self.match_command() {
                        Some(token) => {
                            self.pos = token.span().end;
                            // Fold markers swallow their line break; markers leave
                            // the rest of their line as content.
                            self.at_line_start = !matches!(token, Token::Marker { .. });
                            return self.emit(token);
                        }
                        None => self.take_literal_byte(),
                    }
                }
            }
        }
    }
}

/// Scan a raw log into tokens.
pub fn scan(raw: &str) -> Vec<Token<'_>> {
    Scanner::new(raw).collect()
}

/// Group title with SGR sequences removed and trailing whitespace trimmed.
fn fold_title(line: &str) -> Cow<'_, str> {
    let bytes = line.as_bytes();
    if !bytes.contains(&ESC) {
        return Cow::Borrowed(line.trim_end());
    }

    let mut title = String::with_capacity(line.len());
    let mut copied = 0;
    let mut pos = 0;
    while let Some(offset) = bytes[pos..].iter().position(|&b| b == ESC) {
        let at = pos + offset;
        match parse_sgr(&bytes[at..]) {
            Some((len, _)) => {
                title.push_str(&line[copied..at]);
                pos = at + len;
                copied = pos;
            }
            None => pos = at + 1,
        }
    }
    title.push_str(&line[copied..]);
    title.truncate(title.trim_end().len());
    Cow::Owned(title)
}

/// Match `ESC [ params m` at the start of `bytes`.
///
/// Returns the sequence length and its recognized codes.
fn parse_sgr(bytes: &[u8]) -> Option<(usize, Vec<SgrCode>)> {
    if bytes.len() < 3 || bytes[0] != ESC || bytes[1] != b'[' {
        return None;
    }

    let params_len = bytes[2..]
        .iter()
        .take(MAX_SGR_PARAMS_LEN + 1)
        .position(|b| !(b.is_ascii_digit() || *b == b';'))?;
    if params_len > MAX_SGR_PARAMS_LEN || bytes[2 + params_len] != b'm' {
        return None;
    }

    // Only digits and ';' were accepted above.
    let params = std::str::from_utf8(&bytes[2..2 + params_len]).ok()?;
    Some((params_len + 3, sgr_codes(params)))
}

/// Translate SGR parameters into codes, dropping the ones we don't render.
fn sgr_codes(params: &str) -> Vec<SgrCode> {
    let mut values = params
        .split(';')
        .map(|p| if p.is_empty() { Some(0) } else { p.parse::<u16>().ok() });

    let mut codes = Vec::new();
    while let Some(value) = values.next() {
        let Some(value) = value else { continue };
        let code = match value {
            0 => SgrCode::Reset,
            1 => SgrCode::Bold,
            2 => SgrCode::Dim,
            4 => SgrCode::Underline,
            22 => SgrCode::NormalIntensity,
            24 => SgrCode::NoUnderline,
            30..=37 => match Color::from_index(value - 30) {
                Some(color) => SgrCode::Foreground(color),
                None => continue,
            },
            39 => SgrCode::DefaultForeground,
            40..=47 => match Color::from_index(value - 40) {
                Some(color) => SgrCode::Background(color),
                None => continue,
            },
            49 => SgrCode::DefaultBackground,
            38 | 48 => {
                // 256-color (`5;n`) and truecolor (`2;r;g;b`) forms
                match values.next() {
                    Some(Some(5)) => {
                        values.next();
                    }
                    Some(Some(2)) => {
                        values.nth(2);
                    }
                    _ => {}
                }
                continue;
            }
            _ => continue,
        };
        codes.push(code);
    }
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(text: &str, start: usize) -> Token<'_> {
        Token::Literal {
            text,
            span: start..start + text.len(),
        }
    }

    #[test]
    fn test_plain_text_is_one_literal() {
        let tokens = scan("hello\nworld\n");
        assert_eq!(tokens, vec![literal("hello\nworld\n", 0)]);
    }

    #[test]
    fn test_empty_input() {
        assert!(scan("").is_empty());
    }

    #[test]
    fn test_color_sequence() {
        let tokens = scan("A\x1b[31mB\x1b[0mC");
        assert_eq!(
            tokens,
            vec![
                literal("A", 0),
                Token::Format {
                    codes: vec![SgrCode::Foreground(Color::Red)],
                    span: 1..6,
                },
                literal("B", 6),
                Token::Format {
                    codes: vec![SgrCode::Reset],
                    span: 7..11,
                },
                literal("C", 11),
            ]
        );
    }

    #[test]
    fn test_multiple_params_and_empty_params() {
        let tokens = scan("\x1b[1;4;42m\x1b[m\x1b[;1m");
        assert_eq!(
            tokens,
            vec![
                Token::Format {
                    codes: vec![
                        SgrCode::Bold,
                        SgrCode::Underline,
                        SgrCode::Background(Color::Green),
                    ],
                    span: 0..9,
                },
                Token::Format {
                    codes: vec![SgrCode::Reset],
                    span: 9..12,
                },
                Token::Format {
                    codes: vec![SgrCode::Reset, SgrCode::Bold],
                    span: 12..17,
                },
            ]
        );
    }

    #[test]
    fn test_unknown_codes_are_ignored() {
        let tokens = scan("\x1b[5;36;99999m");
        assert_eq!(
            tokens,
            vec![Token::Format {
                codes: vec![SgrCode::Foreground(Color::Cyan)],
                span: 0..13,
            }]
        );
    }

    #[test]
    fn test_extended_color_subparams_are_skipped() {
        // 38;5;1 must not be read as "1 = bold"; 48;2;4;4;4 must not read "4 = underline"
        let tokens = scan("\x1b[38;5;1;48;2;4;4;4;32m");
        match &tokens[..] {
            [Token::Format { codes, .. }] => {
                assert_eq!(codes, &vec![SgrCode::Foreground(Color::Green)]);
            }
            other => panic!("Expected one format token, got {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_or_foreign_escapes_are_literal() {
        // Cursor movement, lone ESC, and a truncated SGR all fall back to text
        let raw = "a\x1b[2Kb\x1bc\x1b[31";
        assert_eq!(scan(raw), vec![literal(raw, 0)]);
    }

    #[test]
    fn test_overlong_params_are_literal() {
        let raw = format!("\x1b[{}m", "1;".repeat(40));
        assert_eq!(scan(&raw), vec![literal(&raw, 0)]);
    }

    #[test]
    fn test_group_markers() {
        let raw = "##[group]Build\nstep1\n##[endgroup]\nC";
        assert_eq!(
            scan(raw),
            vec![
                Token::FoldStart {
                    title: "Build".into(),
                    span: 0..15,
                },
                literal("step1\n", 15),
                Token::FoldEnd { span: 21..34 },
                literal("C", 34),
            ]
        );
    }

    #[test]
    fn test_group_title_trims_carriage_return() {
        let tokens = scan("##[group]Run tests  \r\nok");
        assert_eq!(
            tokens[0],
            Token::FoldStart {
                title: "Run tests".into(),
                span: 0..22,
            }
        );
    }

    #[test]
    fn test_group_title_drops_color_sequences() {
        let tokens = scan("##[group]\x1b[36mRun\x1b[0m tests \x1b[0m\nok\n");
        match &tokens[0] {
            Token::FoldStart { title, span } => {
                assert_eq!(title, "Run tests");
                assert_eq!(*span, 0..33);
            }
            other => panic!("Expected fold start, got {:?}", other),
        }
        assert_eq!(tokens[1], literal("ok\n", 33));
    }

    #[test]
    fn test_group_title_keeps_foreign_escapes() {
        let tokens = scan("##[group]a\x1b[2Kb\x1b[1mc\n");
        match &tokens[0] {
            Token::FoldStart { title, .. } => assert_eq!(title, "a\x1b[2Kbc"),
            other => panic!("Expected fold start, got {:?}", other),
        }
    }

    #[test]
    fn test_group_marker_at_end_of_input() {
        let tokens = scan("x\n##[group]Tail");
        assert_eq!(
            tokens,
            vec![
                literal("x\n", 0),
                Token::FoldStart {
                    title: "Tail".into(),
                    span: 2..15,
                },
            ]
        );
    }

    #[test]
    fn test_markers_only_at_line_start() {
        let raw = "echo ##[group]not a fold\n";
        assert_eq!(scan(raw), vec![literal(raw, 0)]);
    }

    #[test]
    fn test_marker_after_color_still_at_line_start() {
        let tokens = scan("\x1b[36m##[group]Colored\n");
        assert_eq!(
            tokens,
            vec![
                Token::Format {
                    codes: vec![SgrCode::Foreground(Color::Cyan)],
                    span: 0..5,
                },
                Token::FoldStart {
                    title: "Colored".into(),
                    span: 5..22,
                },
            ]
        );
    }

    #[test]
    fn test_unknown_keyword_is_literal() {
        let raw = "##[section]Starting\n##[group\n";
        assert_eq!(scan(raw), vec![literal(raw, 0)]);
    }

    #[test]
    fn test_line_markers() {
        let tokens = scan("##[error]boom\n##[command]cargo test\n");
        assert_eq!(
            tokens,
            vec![
                Token::Marker {
                    kind: AnnotationKind::Error,
                    span: 0..9,
                },
                literal("boom\n", 9),
                Token::Marker {
                    kind: AnnotationKind::Command,
                    span: 14..25,
                },
                literal("cargo test\n", 25),
            ]
        );
    }

    #[test]
    fn test_marker_content_is_not_line_start() {
        let raw = "##[warning]##[group]x\n";
        let tokens = scan(raw);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1], literal("##[group]x\n", 11));
    }

    #[test]
    fn test_multibyte_text_around_directives() {
        let tokens = scan("✓ \x1b[32mok✓\x1b[0m");
        assert_eq!(tokens[0], literal("✓ ", 0));
        assert_eq!(tokens[2], literal("ok✓", 9));
    }
}
