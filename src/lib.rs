//! # Comment Box Generator (commentbox)
//!
//! Frames text in a border drawn from Unicode box-drawing characters and
//! optionally wraps the result as a `/* … */` block comment.
//!
//! ## Key Components
//!
//! - **Glyph Resolver** ([`glyph`]): picks the code point for every corner and
//!   edge from each side's style (solid, dashed, double) and thickness
//!   (light, heavy).
//! - **Box Renderer** ([`render`](mod@render)): lays out the top edge, padding
//!   rows, centered or left-aligned content rows, and the bottom edge.
//!
//! ## Example
//!
//! ```
//! use commentbox::{render, BoxSpec, LineEnding};
//!
//! let spec = BoxSpec {
//!     min_width: 10,
//!     is_comment: false,
//!     line_ending: LineEnding::Lf,
//!     ..BoxSpec::new("Hi")
//! };
//! let text = render(&spec).unwrap();
//! assert_eq!(text.lines().nth(2), Some("┃   Hi   ┃"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod glyph;
pub mod render;

pub use glyph::{
    BOX_DRAWING_END, BOX_DRAWING_START, CornerPosition, Direction, GlyphError, LineStyle,
    LineThickness, SideSpec, box_char, corner, straight,
};
pub use render::{
    BorderGlyphs, BoxMetrics, BoxSpec, DEFAULT_MIN_WIDTH, DEFAULT_PADDING, LineEnding,
    content_lines, expand_tabs, measure, render, render_lines,
};
