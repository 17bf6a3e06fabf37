//! # Box Renderer
//!
//! Assembles the framed text from a [`BoxSpec`]:
//!
//! ```text
//! /*                 ← only when is_comment
//! ┏━━━━━━━━┓         ← top edge
//! ┃        ┃         ← top padding row
//! ┃   Hi   ┃         ← one row per content line
//! ┃        ┃         ← bottom padding row
//! ┗━━━━━━━━┛         ← bottom edge
//! */
//! ```
//!
//! Widths are counted in code points; every code point is assumed to occupy
//! one terminal cell.

use crate::glyph::{CornerPosition, Direction, GlyphError, SideSpec, corner, straight};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Minimum width used when none is given.
pub const DEFAULT_MIN_WIDTH: usize = 100;

/// Horizontal padding used when none is given.
pub const DEFAULT_PADDING: usize = 2;

const COMMENT_OPEN: &str = "/*";
const COMMENT_CLOSE: &str = "*/";

// ─────────────────────────────────────────────────────────────────────────────
// Line Endings
// ─────────────────────────────────────────────────────────────────────────────

/// Separator placed between rendered rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// The host's convention: `\r\n` on Windows, `\n` elsewhere
    #[default]
    Native,
    /// `\n`
    Lf,
    /// `\r\n`
    #[value(name = "crlf")]
    CrLf,
}

impl LineEnding {
    /// The separator text.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Native => {
                if cfg!(windows) {
                    "\r\n"
                } else {
                    "\n"
                }
            }
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Box Specification
// ─────────────────────────────────────────────────────────────────────────────

/// Everything needed to render one box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxSpec {
    /// Top edge
    pub top: SideSpec,
    /// Bottom edge
    pub bottom: SideSpec,
    /// Left edge
    pub left: SideSpec,
    /// Right edge
    pub right: SideSpec,
    /// Smallest total width, borders included
    pub min_width: usize,
    /// Spaces between the borders and the longest line
    pub padding: usize,
    /// Center each line instead of left-aligning it
    pub is_centered: bool,
    /// Wrap the box in `/*` and `*/`
    pub is_comment: bool,
    /// Separator between rows
    pub line_ending: LineEnding,
    /// Newline-separated text to frame
    pub content: String,
}

impl BoxSpec {
    /// A heavy, centered, commented box around `content`.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            top: SideSpec::heavy(),
            bottom: SideSpec::heavy(),
            left: SideSpec::heavy(),
            right: SideSpec::heavy(),
            min_width: DEFAULT_MIN_WIDTH,
            padding: DEFAULT_PADDING,
            is_centered: true,
            is_comment: true,
            line_ending: LineEnding::default(),
            content: content.into(),
        }
    }

    /// Use `side` for all four edges.
    pub fn with_all_sides(mut self, side: SideSpec) -> Self {
        self.top = side;
        self.bottom = side;
        self.left = side;
        self.right = side;
        self
    }
}

impl Default for BoxSpec {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// The eight glyphs a box is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BorderGlyphs {
    /// Top-left corner
    pub upper_left: char,
    /// Top-right corner
    pub upper_right: char,
    /// Bottom-left corner
    pub lower_left: char,
    /// Bottom-right corner
    pub lower_right: char,
    /// Top edge fill
    pub top: char,
    /// Bottom edge fill
    pub bottom: char,
    /// Left edge
    pub left: char,
    /// Right edge
    pub right: char,
}

impl BorderGlyphs {
    /// Resolve every glyph of `spec`.
    pub fn resolve(spec: &BoxSpec) -> Result<Self, GlyphError> {
        Ok(Self {
            upper_left: corner(CornerPosition::UpperLeft, spec.top, spec.left)?,
            upper_right: corner(CornerPosition::UpperRight, spec.top, spec.right)?,
            lower_left: corner(CornerPosition::LowerLeft, spec.bottom, spec.left)?,
            lower_right: corner(CornerPosition::LowerRight, spec.bottom, spec.right)?,
            top: straight(Direction::Horizontal, spec.top)?,
            bottom: straight(Direction::Horizontal, spec.bottom)?,
            left: straight(Direction::Vertical, spec.left)?,
            right: straight(Direction::Vertical, spec.right)?,
        })
    }
}

/// Dimensions of a rendered box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoxMetrics {
    /// Columns per box row
    pub width: usize,
    /// Box rows: content rows plus two edges and two padding rows
    pub height: usize,
    /// Rows carrying content
    pub content_rows: usize,
    /// All emitted rows, comment markers included
    pub total_rows: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Content Measurement
// ─────────────────────────────────────────────────────────────────────────────

/// Split content into lines on `\n`, dropping a trailing `\r` from each.
///
/// Empty content has no lines; any other content has one more line than it
/// has newlines.
pub fn content_lines(content: &str) -> Vec<&str> {
    if content.is_empty() {
        return Vec::new();
    }
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

fn line_len(line: &str) -> usize {
    line.chars().count()
}

/// `max(min_width, longest + 2·padding + 2)`, saturating instead of
/// overflowing.
fn actual_width(min_width: usize, padding: usize, lines: &[&str]) -> usize {
    let longest = lines.iter().map(|line| line_len(line)).max().unwrap_or(0);
    longest
        .saturating_add(padding.saturating_mul(2))
        .saturating_add(2)
        .max(min_width)
}

/// Width, height and row counts `render` would produce for `spec`.
pub fn measure(spec: &BoxSpec) -> BoxMetrics {
    let lines = content_lines(&spec.content);
    let content_rows = lines.len();
    let height = content_rows + 4;
    BoxMetrics {
        width: actual_width(spec.min_width, spec.padding, &lines),
        height,
        content_rows,
        total_rows: if spec.is_comment { height + 2 } else { height },
    }
}

/// Expand tabs to spaces, one column per code point.
pub fn expand_tabs(line: &str, tab_width: usize) -> String {
    if tab_width == 0 {
        return line.replace('\t', "");
    }

    let mut result = String::with_capacity(line.len());
    let mut col = 0;

    for c in line.chars() {
        if c == '\t' {
            let spaces = tab_width - (col % tab_width);
            result.extend(std::iter::repeat_n(' ', spaces));
            col += spaces;
        } else {
            result.push(c);
            col += 1;
        }
    }

    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Bytes needed for `cells` characters of `cell_len` bytes plus `extra` bytes.
fn row_capacity(cells: usize, cell_len: usize, extra: usize) -> usize {
    cells.saturating_mul(cell_len).saturating_add(extra)
}

fn edge_row(start: char, fill: char, end: char, inner: usize) -> String {
    let mut row = String::with_capacity(row_capacity(
        inner,
        fill.len_utf8(),
        start.len_utf8() + end.len_utf8(),
    ));
    row.push(start);
    row.extend(std::iter::repeat_n(fill, inner));
    row.push(end);
    row
}

fn framed_row(left: char, before: usize, text: &str, after: usize, right: char) -> String {
    let mut row = String::with_capacity(row_capacity(
        before.saturating_add(after),
        1,
        text.len() + left.len_utf8() + right.len_utf8(),
    ));
    row.push(left);
    row.extend(std::iter::repeat_n(' ', before));
    row.push_str(text);
    row.extend(std::iter::repeat_n(' ', after));
    row.push(right);
    row
}

fn content_row(spec: &BoxSpec, glyphs: &BorderGlyphs, inner: usize, line: &str) -> String {
    if spec.is_centered {
        let text = line.trim();
        let slack = inner.saturating_sub(line_len(text));
        let before = slack / 2;
        framed_row(glyphs.left, before, text, slack - before, glyphs.right)
    } else {
        let after = inner
            .saturating_sub(spec.padding)
            .saturating_sub(line_len(line));
        framed_row(glyphs.left, spec.padding, line, after, glyphs.right)
    }
}

/// Render `spec` as a list of rows, comment markers included.
pub fn render_lines(spec: &BoxSpec) -> Result<Vec<String>, GlyphError> {
    let glyphs = BorderGlyphs::resolve(spec)?;
    let lines = content_lines(&spec.content);
    let width = actual_width(spec.min_width, spec.padding, &lines);
    let inner = width.saturating_sub(2);

    let mut rows = Vec::with_capacity(lines.len() + 6);
    if spec.is_comment {
        rows.push(COMMENT_OPEN.to_string());
    }

    rows.push(edge_row(glyphs.upper_left, glyphs.top, glyphs.upper_right, inner));
    rows.push(framed_row(glyphs.left, inner, "", 0, glyphs.right));
    rows.extend(
        lines
            .iter()
            .map(|line| content_row(spec, &glyphs, inner, line)),
    );
    rows.push(framed_row(glyphs.left, inner, "", 0, glyphs.right));
    rows.push(edge_row(glyphs.lower_left, glyphs.bottom, glyphs.lower_right, inner));

    if spec.is_comment {
        rows.push(COMMENT_CLOSE.to_string());
    }

    Ok(rows)
}

/// Render `spec` to a single string, rows joined by its line ending.
///
/// Only fails if the glyph resolver rejects a side combination, which none of
/// the public [`SideSpec`] values can produce.
///
/// ```
/// use commentbox::{render, BoxSpec, LineEnding, SideSpec};
///
/// let spec = BoxSpec {
///     min_width: 6,
///     padding: 1,
///     is_comment: false,
///     line_ending: LineEnding::Lf,
///     ..BoxSpec::new("x").with_all_sides(SideSpec::light())
/// };
/// assert_eq!(render(&spec).unwrap(), "┌────┐\n│    │\n│ x  │\n│    │\n└────┘");
/// ```
pub fn render(spec: &BoxSpec) -> Result<String, GlyphError> {
    Ok(render_lines(spec)?.join(spec.line_ending.as_str()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
