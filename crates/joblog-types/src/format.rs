//! Text color and style attributes.

use serde::{Deserialize, Serialize};

/// One of the eight standard terminal colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    /// Map a 0-7 palette index (the last digit of `3x`/`4x` codes) to a color.
    pub fn from_index(index: u16) -> Option<Self> {
        match index {
            0 => Some(Color::Black),
            1 => Some(Color::Red),
            2 => Some(Color::Green),
            3 => Some(Color::Yellow),
            4 => Some(Color::Blue),
            5 => Some(Color::Magenta),
            6 => Some(Color::Cyan),
            7 => Some(Color::White),
            _ => None,
        }
    }
}

/// A single recognized SGR (select graphic rendition) parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgrCode {
    /// `0`: clear every attribute.
    Reset,
    /// `1`
    Bold,
    /// `2`
    Dim,
    /// `4`
    Underline,
    /// `22`: clears both bold and dim.
    NormalIntensity,
    /// `24`
    NoUnderline,
    /// `30`-`37`
    Foreground(Color),
    /// `39`
    DefaultForeground,
    /// `40`-`47`
    Background(Color),
    /// `49`
    DefaultBackground,
}

/// The set of attributes active for a run of text.
///
/// The default value is the plain (reset) format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub dim: bool,
    #[serde(default)]
    pub underline: bool,
}

impl TextFormat {
    /// Format with only a foreground color set.
    pub fn foreground(color: Color) -> Self {
        Self {
            foreground: Some(color),
            ..Self::default()
        }
    }

    /// True when no attribute is set.
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }

    /// Apply codes in order on top of this format.
    ///
    /// Attributes accumulate: a later code only replaces the attribute it
    /// names, and only `Reset` clears everything.
    pub fn apply(mut self, codes: &[SgrCode]) -> Self {
        for code in codes {
            match *code {
                SgrCode::Reset => self = Self::default(),
                SgrCode::Bold => self.bold = true,
                SgrCode::Dim => self.dim = true,
                SgrCode::Underline => self.underline = true,
                SgrCode::NormalIntensity => {
                    self.bold = false;
                    self.dim = false;
                }
                SgrCode::NoUnderline => self.underline = false,
                SgrCode::Foreground(color) => self.foreground = Some(color),
                SgrCode::DefaultForeground => self.foreground = None,
                SgrCode::Background(color) => self.background = Some(color),
                SgrCode::DefaultBackground => self.background = None,
            }
        }
        self
    }
}

/// A run of cleaned text rendered with one format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorFormatSpan {
    /// Byte offset of the first character of the run.
    pub start_offset: usize,
    /// Byte offset one past the end of the run.
    pub end_offset: usize,
    pub format: TextFormat,
}

impl ColorFormatSpan {
    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    pub fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }
}
