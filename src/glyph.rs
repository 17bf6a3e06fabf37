//! # Glyph Resolver
//!
//! Maps a side's style and thickness, plus a position on the box, to a
//! character in the Unicode Box Drawing block (U+2500..U+257F).
//!
//! The block is regular enough that most glyphs can be reached by adding small
//! offsets to `U+2500`:
//!
//! ```text
//! U+2500 ─  U+2501 ━  U+2502 │  U+2503 ┃     solid straights   (+thickness)
//! U+2504 ┄  U+2505 ┅  U+2506 ┆  U+2507 ┇     triple dash       (+4)
//! U+2508 ┈  U+2509 ┉  U+250A ┊  U+250B ┋     quadruple dash    (+8)
//! U+250C ┌  U+250D ┍  U+250E ┎  U+250F ┏     upper-left corners
//! U+2510 ┐  U+2511 ┑  U+2512 ┒  U+2513 ┓     upper-right corners
//! U+2514 └  U+2515 ┕  U+2516 ┖  U+2517 ┗     lower-left corners
//! U+2518 ┘  U+2519 ┙  U+251A ┚  U+251B ┛     lower-right corners
//! ```
//!
//! Within a corner group bit 0 selects a heavy horizontal arm and bit 1 a
//! heavy vertical arm. Two-dash and double lines sit further up the block
//! (U+254C.., U+2550..) and are resolved from their own bases.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// First code point of the Box Drawing block.
pub const BOX_DRAWING_START: u32 = 0x2500;

/// Last code point of the Box Drawing block.
pub const BOX_DRAWING_END: u32 = 0x257F;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failure to map a request onto the Box Drawing block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphError {
    /// The computed offset lands outside U+2500..U+257F.
    InvalidCombination {
        /// Offset from U+2500 that was requested
        offset: u32,
    },
}

impl fmt::Display for GlyphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCombination { offset } => write!(
                f,
                "invalid box-drawing combination: offset 0x{:02X} resolves to U+{:04X}, outside U+{:04X}..U+{:04X}",
                offset,
                BOX_DRAWING_START.saturating_add(*offset),
                BOX_DRAWING_START,
                BOX_DRAWING_END
            ),
        }
    }
}

impl std::error::Error for GlyphError {}

// ─────────────────────────────────────────────────────────────────────────────
// Side Description
// ─────────────────────────────────────────────────────────────────────────────

/// Line pattern used along a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineStyle {
    /// Continuous line (`─`, `━`)
    #[default]
    Solid,
    /// Two dashes per cell (`╌`, `╍`)
    DoubleDash,
    /// Three dashes per cell (`┄`, `┅`)
    TripleDash,
    /// Four dashes per cell (`┈`, `┉`)
    QuadrupleDash,
    /// Two parallel lines (`═`, `║`); always light
    #[value(alias = "double")]
    #[serde(alias = "double")]
    DoubleLine,
}

impl LineStyle {
    /// Offset added to a straight segment's position base.
    ///
    /// Only meaningful for the styles laid out next to the solid lines.
    fn dash_offset(self) -> u32 {
        match self {
            Self::TripleDash => 0x04,
            Self::QuadrupleDash => 0x08,
            Self::Solid | Self::DoubleDash | Self::DoubleLine => 0x00,
        }
    }
}

/// Stroke weight of a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineThickness {
    /// Thin stroke
    #[default]
    Light,
    /// Bold stroke
    Heavy,
}

impl LineThickness {
    fn bit(self) -> u32 {
        match self {
            Self::Light => 0,
            Self::Heavy => 1,
        }
    }
}

/// Style and thickness of one side of the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SideSpec {
    /// Line pattern
    pub style: LineStyle,
    /// Stroke weight, ignored for [`LineStyle::DoubleLine`]
    pub thickness: LineThickness,
}

impl SideSpec {
    /// Build a side. `DoubleLine` has no heavy variant, so its thickness is
    /// stored as light.
    pub const fn new(style: LineStyle, thickness: LineThickness) -> Self {
        let thickness = match style {
            LineStyle::DoubleLine => LineThickness::Light,
            _ => thickness,
        };
        Self { style, thickness }
    }

    /// Light solid line.
    pub const fn light() -> Self {
        Self::new(LineStyle::Solid, LineThickness::Light)
    }

    /// Heavy solid line.
    pub const fn heavy() -> Self {
        Self::new(LineStyle::Solid, LineThickness::Heavy)
    }

    /// Double line.
    pub const fn double() -> Self {
        Self::new(LineStyle::DoubleLine, LineThickness::Light)
    }

    /// Thickness after collapsing `DoubleLine + Heavy` to light.
    pub fn effective_thickness(self) -> LineThickness {
        if self.is_double() {
            LineThickness::Light
        } else {
            self.thickness
        }
    }

    /// True for [`LineStyle::DoubleLine`].
    pub fn is_double(self) -> bool {
        self.style == LineStyle::DoubleLine
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Positions
// ─────────────────────────────────────────────────────────────────────────────

/// Orientation of a straight segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Top and bottom edges
    Horizontal,
    /// Left and right edges
    Vertical,
}

impl Direction {
    fn base(self) -> u32 {
        match self {
            Self::Horizontal => 0x00,
            Self::Vertical => 0x02,
        }
    }
}

/// One of the four corners of the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CornerPosition {
    /// Top-left (`┌`)
    UpperLeft,
    /// Top-right (`┐`)
    UpperRight,
    /// Bottom-left (`└`)
    LowerLeft,
    /// Bottom-right (`┘`)
    LowerRight,
}

impl CornerPosition {
    /// All corners, in reading order.
    pub const ALL: [CornerPosition; 4] = [
        Self::UpperLeft,
        Self::UpperRight,
        Self::LowerLeft,
        Self::LowerRight,
    ];

    /// Base of the light/heavy corner group.
    fn base(self) -> u32 {
        match self {
            Self::UpperLeft => 0x0C,
            Self::UpperRight => 0x10,
            Self::LowerLeft => 0x14,
            Self::LowerRight => 0x18,
        }
    }

    /// Base of the single/double corner group (`╒╓╔`, `╕╖╗`, `╘╙╚`, `╛╜╝`).
    fn double_base(self) -> u32 {
        match self {
            Self::UpperLeft => 0x52,
            Self::UpperRight => 0x55,
            Self::LowerLeft => 0x58,
            Self::LowerRight => 0x5B,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Convert an offset from U+2500 into a Box Drawing character.
pub fn box_char(offset: u32) -> Result<char, GlyphError> {
    if offset > BOX_DRAWING_END - BOX_DRAWING_START {
        return Err(GlyphError::InvalidCombination { offset });
    }
    char::from_u32(BOX_DRAWING_START + offset).ok_or(GlyphError::InvalidCombination { offset })
}

/// Glyph for a straight segment of `side` running in `direction`.
///
/// ```
/// use commentbox::{straight, Direction, LineStyle, LineThickness, SideSpec};
///
/// let side = SideSpec::new(LineStyle::QuadrupleDash, LineThickness::Light);
/// assert_eq!(straight(Direction::Horizontal, side), Ok('┈'));
/// ```
pub fn straight(direction: Direction, side: SideSpec) -> Result<char, GlyphError> {
    box_char(straight_offset(direction, side))
}

fn straight_offset(direction: Direction, side: SideSpec) -> u32 {
    let thickness = side.effective_thickness().bit();
    match side.style {
        LineStyle::DoubleLine => match direction {
            Direction::Horizontal => 0x50,
            Direction::Vertical => 0x51,
        },
        LineStyle::DoubleDash => 0x4C + direction.base() + thickness,
        LineStyle::Solid | LineStyle::TripleDash | LineStyle::QuadrupleDash => {
            direction.base() + side.style.dash_offset() + thickness
        }
    }
}

/// Glyph for the corner where `horizontal` (top or bottom side) meets
/// `vertical` (left or right side).
///
/// Dashing is ignored at corners because Unicode has no dashed corners.
/// When either arm is a double line the single/double family is used and a
/// heavy single arm is drawn light.
///
/// ```
/// use commentbox::{corner, CornerPosition, SideSpec};
///
/// let glyph = corner(CornerPosition::UpperRight, SideSpec::light(), SideSpec::heavy());
/// assert_eq!(glyph, Ok('┒'));
/// ```
pub fn corner(
    position: CornerPosition,
    horizontal: SideSpec,
    vertical: SideSpec,
) -> Result<char, GlyphError> {
    box_char(corner_offset(position, horizontal, vertical))
}

fn corner_offset(position: CornerPosition, horizontal: SideSpec, vertical: SideSpec) -> u32 {
    match (horizontal.is_double(), vertical.is_double()) {
        (false, false) => {
            position.base()
                + horizontal.effective_thickness().bit()
                + (vertical.effective_thickness().bit() << 1)
        }
        (true, false) => position.double_base(),
        (false, true) => position.double_base() + 1,
        (true, true) => position.double_base() + 2,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: [LineStyle; 5] = [
        LineStyle::Solid,
        LineStyle::DoubleDash,
        LineStyle::TripleDash,
        LineStyle::QuadrupleDash,
        LineStyle::DoubleLine,
    ];

    const THICKNESSES: [LineThickness; 2] = [LineThickness::Light, LineThickness::Heavy];

    fn all_sides() -> Vec<SideSpec> {
        STYLES
            .iter()
            .flat_map(|&style| {
                THICKNESSES.iter().map(move |&thickness| SideSpec { style, thickness })
            })
            .collect()
    }

    fn side(style: LineStyle, thickness: LineThickness) -> SideSpec {
        SideSpec::new(style, thickness)
    }

    // =========================================================================
    // box_char()
    // =========================================================================

    #[test]
    fn test_box_char_bounds() {
        assert_eq!(box_char(0x00), Ok('─'));
        assert_eq!(box_char(0x7F), Ok('╿'));
    }

    #[test]
    fn test_box_char_out_of_range() {
        assert_eq!(
            box_char(0x80),
            Err(GlyphError::InvalidCombination { offset: 0x80 })
        );
        assert!(box_char(u32::MAX).is_err());
    }

    #[test]
    fn test_glyph_error_display() {
        let msg = GlyphError::InvalidCombination { offset: 0x80 }.to_string();
        assert!(msg.contains("U+2580"), "message was: {}", msg);
        assert!(msg.contains("U+2500..U+257F"), "message was: {}", msg);
    }

    // =========================================================================
    // SideSpec
    // =========================================================================

    #[test]
    fn test_side_spec_double_collapses_heavy() {
        let s = side(LineStyle::DoubleLine, LineThickness::Heavy);
        assert_eq!(s.thickness, LineThickness::Light);
    }

    #[test]
    fn test_side_spec_literal_double_heavy_resolves_light() {
        let s = SideSpec {
            style: LineStyle::DoubleLine,
            thickness: LineThickness::Heavy,
        };
        assert_eq!(s.effective_thickness(), LineThickness::Light);
        assert_eq!(straight(Direction::Horizontal, s), Ok('═'));
        assert_eq!(straight(Direction::Vertical, s), Ok('║'));
    }

    #[test]
    fn test_side_spec_keeps_heavy_for_dashes() {
        let s = side(LineStyle::TripleDash, LineThickness::Heavy);
        assert_eq!(s.thickness, LineThickness::Heavy);
    }

    // =========================================================================
    // straight()
    // =========================================================================

    #[test]
    fn test_straight_solid() {
        use Direction::*;
        assert_eq!(straight(Horizontal, SideSpec::light()), Ok('─'));
        assert_eq!(straight(Horizontal, SideSpec::heavy()), Ok('━'));
        assert_eq!(straight(Vertical, SideSpec::light()), Ok('│'));
        assert_eq!(straight(Vertical, SideSpec::heavy()), Ok('┃'));
    }

    #[test]
    fn test_straight_triple_dash() {
        use Direction::*;
        use LineThickness::*;
        assert_eq!(straight(Horizontal, side(LineStyle::TripleDash, Light)), Ok('┄'));
        assert_eq!(straight(Horizontal, side(LineStyle::TripleDash, Heavy)), Ok('┅'));
        assert_eq!(straight(Vertical, side(LineStyle::TripleDash, Light)), Ok('┆'));
        assert_eq!(straight(Vertical, side(LineStyle::TripleDash, Heavy)), Ok('┇'));
    }

    #[test]
    fn test_straight_quadruple_dash() {
        use Direction::*;
        use LineThickness::*;
        assert_eq!(straight(Horizontal, side(LineStyle::QuadrupleDash, Light)), Ok('┈'));
        assert_eq!(straight(Horizontal, side(LineStyle::QuadrupleDash, Heavy)), Ok('┉'));
        assert_eq!(straight(Vertical, side(LineStyle::QuadrupleDash, Light)), Ok('┊'));
        assert_eq!(straight(Vertical, side(LineStyle::QuadrupleDash, Heavy)), Ok('┋'));
    }

    #[test]
    fn test_straight_double_dash() {
        use Direction::*;
        use LineThickness::*;
        assert_eq!(straight(Horizontal, side(LineStyle::DoubleDash, Light)), Ok('╌'));
        assert_eq!(straight(Horizontal, side(LineStyle::DoubleDash, Heavy)), Ok('╍'));
        assert_eq!(straight(Vertical, side(LineStyle::DoubleDash, Light)), Ok('╎'));
        assert_eq!(straight(Vertical, side(LineStyle::DoubleDash, Heavy)), Ok('╏'));
    }

    #[test]
    fn test_straight_double_line() {
        assert_eq!(straight(Direction::Horizontal, SideSpec::double()), Ok('═'));
        assert_eq!(straight(Direction::Vertical, SideSpec::double()), Ok('║'));
    }

    // =========================================================================
    // corner()
    // =========================================================================

    #[test]
    fn test_corner_all_light() {
        let l = SideSpec::light();
        assert_eq!(corner(CornerPosition::UpperLeft, l, l), Ok('┌'));
        assert_eq!(corner(CornerPosition::UpperRight, l, l), Ok('┐'));
        assert_eq!(corner(CornerPosition::LowerLeft, l, l), Ok('└'));
        assert_eq!(corner(CornerPosition::LowerRight, l, l), Ok('┘'));
    }

    #[test]
    fn test_corner_all_heavy() {
        let h = SideSpec::heavy();
        assert_eq!(corner(CornerPosition::UpperLeft, h, h), Ok('┏'));
        assert_eq!(corner(CornerPosition::UpperRight, h, h), Ok('┓'));
        assert_eq!(corner(CornerPosition::LowerLeft, h, h), Ok('┗'));
        assert_eq!(corner(CornerPosition::LowerRight, h, h), Ok('┛'));
    }

    #[test]
    fn test_corner_heavy_horizontal_arm() {
        let (l, h) = (SideSpec::light(), SideSpec::heavy());
        // right heavy, down light
        assert_eq!(corner(CornerPosition::UpperLeft, h, l), Ok('┍'));
        // left heavy, down light
        assert_eq!(corner(CornerPosition::UpperRight, h, l), Ok('┑'));
        assert_eq!(corner(CornerPosition::LowerLeft, h, l), Ok('┕'));
        assert_eq!(corner(CornerPosition::LowerRight, h, l), Ok('┙'));
    }

    #[test]
    fn test_corner_heavy_vertical_arm() {
        let (l, h) = (SideSpec::light(), SideSpec::heavy());
        assert_eq!(corner(CornerPosition::UpperLeft, l, h), Ok('┎'));
        assert_eq!(corner(CornerPosition::UpperRight, l, h), Ok('┒'));
        assert_eq!(corner(CornerPosition::LowerLeft, l, h), Ok('┖'));
        assert_eq!(corner(CornerPosition::LowerRight, l, h), Ok('┚'));
    }

    #[test]
    fn test_corner_ignores_dashing() {
        let dashed = side(LineStyle::QuadrupleDash, LineThickness::Light);
        let heavy_dashed = side(LineStyle::TripleDash, LineThickness::Heavy);
        assert_eq!(corner(CornerPosition::UpperLeft, dashed, dashed), Ok('┌'));
        assert_eq!(
            corner(CornerPosition::LowerRight, heavy_dashed, heavy_dashed),
            Ok('┛')
        );
        assert_eq!(
            corner(CornerPosition::UpperRight, dashed, heavy_dashed),
            Ok('┒')
        );
    }

    #[test]
    fn test_corner_all_double() {
        let d = SideSpec::double();
        assert_eq!(corner(CornerPosition::UpperLeft, d, d), Ok('╔'));
        assert_eq!(corner(CornerPosition::UpperRight, d, d), Ok('╗'));
        assert_eq!(corner(CornerPosition::LowerLeft, d, d), Ok('╚'));
        assert_eq!(corner(CornerPosition::LowerRight, d, d), Ok('╝'));
    }

    #[test]
    fn test_corner_double_horizontal_single_vertical() {
        let (d, l) = (SideSpec::double(), SideSpec::light());
        assert_eq!(corner(CornerPosition::UpperLeft, d, l), Ok('╒'));
        assert_eq!(corner(CornerPosition::UpperRight, d, l), Ok('╕'));
        assert_eq!(corner(CornerPosition::LowerLeft, d, l), Ok('╘'));
        assert_eq!(corner(CornerPosition::LowerRight, d, l), Ok('╛'));
    }

    #[test]
    fn test_corner_single_horizontal_double_vertical() {
        let (d, l) = (SideSpec::double(), SideSpec::light());
        assert_eq!(corner(CornerPosition::UpperLeft, l, d), Ok('╓'));
        assert_eq!(corner(CornerPosition::UpperRight, l, d), Ok('╖'));
        assert_eq!(corner(CornerPosition::LowerLeft, l, d), Ok('╙'));
        assert_eq!(corner(CornerPosition::LowerRight, l, d), Ok('╜'));
    }

    #[test]
    fn test_corner_double_meets_heavy_draws_single() {
        let (d, h) = (SideSpec::double(), SideSpec::heavy());
        assert_eq!(corner(CornerPosition::UpperLeft, d, h), Ok('╒'));
        assert_eq!(corner(CornerPosition::LowerRight, h, d), Ok('╜'));
    }

    // =========================================================================
    // Exhaustive range check
    // =========================================================================

    #[test]
    fn test_every_combination_in_box_drawing_block() {
        let sides = all_sides();
        for &s in &sides {
            for direction in [Direction::Horizontal, Direction::Vertical] {
                let c = straight(direction, s).expect("straight should resolve");
                assert!(
                    ('\u{2500}'..='\u{257F}').contains(&c),
                    "{:?} {:?} -> {:?}",
                    direction,
                    s,
                    c
                );
            }
            for &other in &sides {
                for position in CornerPosition::ALL {
                    let c = corner(position, s, other).expect("corner should resolve");
                    assert!(
                        ('\u{2500}'..='\u{257F}').contains(&c),
                        "{:?} {:?} {:?} -> {:?}",
                        position,
                        s,
                        other,
                        c
                    );
                }
            }
        }
    }

    #[test]
    fn test_vertical_glyphs_differ_from_horizontal() {
        for s in all_sides() {
            assert_ne!(
                straight(Direction::Horizontal, s),
                straight(Direction::Vertical, s),
                "{:?}",
                s
            );
        }
    }
}
