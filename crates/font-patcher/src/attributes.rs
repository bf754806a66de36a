//! Per-symbol layout attributes: alignment, stretching and overlap.

use std::fmt::{self, Display, Formatter};

/// Horizontal alignment of a symbol within its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// How a symbol may be stretched to fill the cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stretch {
    /// Stretch horizontally to the cell width.
    pub x: bool,
    /// Stretch vertically to the cell height.
    pub y: bool,
    /// Target two cells instead of one (`xy2`).
    pub double: bool,
    /// Scale uniformly to the biggest size that fits (`pa`).
    pub preserve_aspect: bool,
}

impl Stretch {
    pub const NONE: Self = Self { x: false, y: false, double: false, preserve_aspect: false };
    pub const PRESERVE_ASPECT: Self =
        Self { x: false, y: false, double: false, preserve_aspect: true };
    pub const XY: Self = Self { x: true, y: true, double: false, preserve_aspect: false };
    pub const XY2: Self = Self { x: true, y: true, double: true, preserve_aspect: false };

    /// Parse the short notation (`pa`, `xy`, `xy2`, `x`, ...).
    pub fn parse(s: &str) -> Self {
        Self {
            x: s.contains('x'),
            y: s.contains('y'),
            double: s.contains('2'),
            preserve_aspect: s.contains("pa"),
        }
    }

    /// The same stretch limited to a single cell.
    pub const fn single_cell(self) -> Self {
        Self { double: false, ..self }
    }
}

impl Display for Stretch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.preserve_aspect {
            f.write_str("pa")?;
        }
        if self.x {
            f.write_str("x")?;
        }
        if self.y {
            f.write_str("y")?;
        }
        if self.double {
            f.write_str("2")?;
        }
        Ok(())
    }
}

/// Layout attributes of one symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymbolAttributes {
    pub align: Option<Align>,
    /// Center the symbol vertically on the cell.
    pub valign_center: bool,
    pub stretch: Stretch,
    /// Fraction of the cell width the symbol bleeds into its neighbours.
    pub overlap: Option<f64>,
    /// Upper limit for the width to height ratio after scaling.
    pub max_xy_ratio: Option<f64>,
    /// Never overwrite an existing glyph with this symbol.
    pub careful: bool,
}

impl SymbolAttributes {
    pub const fn new(align: Option<Align>, valign_center: bool, stretch: Stretch) -> Self {
        Self { align, valign_center, stretch, overlap: None, max_xy_ratio: None, careful: false }
    }

    pub const fn with_overlap(mut self, overlap: f64) -> Self {
        self.overlap = Some(overlap);
        self
    }

    pub const fn with_xy_ratio(mut self, ratio: f64) -> Self {
        self.max_xy_ratio = Some(ratio);
        self
    }

    /// The overlap, treating zero as no overlap.
    pub fn overlap(&self) -> Option<f64> {
        self.overlap.filter(|o| *o != 0.0)
    }
}

/// Default attributes plus per-codepoint overrides.
#[derive(Debug)]
pub struct AttributeTable {
    pub name: &'static str,
    pub default: SymbolAttributes,
    pub overrides: &'static [(u32, SymbolAttributes)],
}

impl AttributeTable {
    /// Attributes for a symbol codepoint.
    pub fn lookup(&self, codepoint: u32) -> SymbolAttributes {
        self.overrides
            .iter()
            .find_map(|(cp, attrs)| (*cp == codepoint).then_some(*attrs))
            .unwrap_or(self.default)
    }
}

const CENTERED: SymbolAttributes =
    SymbolAttributes::new(Some(Align::Center), true, Stretch::PRESERVE_ASPECT);
const LEFT_XY: SymbolAttributes = SymbolAttributes::new(Some(Align::Left), true, Stretch::XY);
const RIGHT_XY: SymbolAttributes = SymbolAttributes::new(Some(Align::Right), true, Stretch::XY);
const LEFT_XY2: SymbolAttributes = SymbolAttributes::new(Some(Align::Left), true, Stretch::XY2);
const RIGHT_XY2: SymbolAttributes = SymbolAttributes::new(Some(Align::Right), true, Stretch::XY2);

pub static DEFAULT_ATTRIBUTES: AttributeTable =
    AttributeTable { name: "default", default: CENTERED, overrides: &[] };

pub static POWERLINE_ATTRIBUTES: AttributeTable = AttributeTable {
    name: "powerline",
    default: CENTERED,
    overrides: &[
        // Arrow tips
        (0xE0B0, LEFT_XY.with_overlap(0.02).with_xy_ratio(0.7)),
        (0xE0B1, LEFT_XY.with_xy_ratio(0.7)),
        (0xE0B2, RIGHT_XY.with_overlap(0.02).with_xy_ratio(0.7)),
        (0xE0B3, RIGHT_XY.with_xy_ratio(0.7)),
        // Rounded arcs
        (0xE0B4, LEFT_XY.with_overlap(0.01).with_xy_ratio(0.59)),
        (0xE0B5, LEFT_XY.with_xy_ratio(0.5)),
        (0xE0B6, RIGHT_XY.with_overlap(0.01).with_xy_ratio(0.59)),
        (0xE0B7, RIGHT_XY.with_xy_ratio(0.5)),
        // Bottom triangles
        (0xE0B8, LEFT_XY2.with_overlap(0.02)),
        (0xE0B9, LEFT_XY2),
        (0xE0BA, RIGHT_XY2.with_overlap(0.02)),
        (0xE0BB, RIGHT_XY2),
        // Top triangles
        (0xE0BC, LEFT_XY2.with_overlap(0.02)),
        (0xE0BD, LEFT_XY2),
        (0xE0BE, RIGHT_XY2.with_overlap(0.02)),
        (0xE0BF, RIGHT_XY2),
        // Flames
        (0xE0C0, LEFT_XY2.with_overlap(0.01)),
        (0xE0C1, LEFT_XY2),
        (0xE0C2, RIGHT_XY2.with_overlap(0.01)),
        (0xE0C3, RIGHT_XY2),
        // Small and bigger squares
        (0xE0C4, LEFT_XY),
        (0xE0C5, RIGHT_XY),
        (0xE0C6, LEFT_XY),
        (0xE0C7, RIGHT_XY),
        // Waveform
        (0xE0C8, LEFT_XY2.with_overlap(0.01)),
        (0xE0CA, RIGHT_XY2.with_overlap(0.01)),
        // Hexagons
        (0xE0CC, LEFT_XY.with_overlap(0.02)),
        (0xE0CD, LEFT_XY),
        // Legos
        (0xE0CE, LEFT_XY),
        (0xE0CF, SymbolAttributes::new(Some(Align::Center), true, Stretch::XY)),
        (0xE0D1, LEFT_XY.with_overlap(0.02)),
        // Top and bottom trapezoid
        (0xE0D2, LEFT_XY.with_overlap(0.02).with_xy_ratio(0.7)),
        (0xE0D4, RIGHT_XY.with_overlap(0.02).with_xy_ratio(0.7)),
    ],
};

const FONTA_NO_VALIGN: SymbolAttributes =
    SymbolAttributes::new(Some(Align::Center), false, Stretch::PRESERVE_ASPECT);

pub static FONTA_ATTRIBUTES: AttributeTable = AttributeTable {
    name: "fontawesome",
    default: CENTERED,
    // Sort arrows keep their vertical position
    overrides: &[(0xF0DC, FONTA_NO_VALIGN), (0xF0DD, FONTA_NO_VALIGN), (0xF0DE, FONTA_NO_VALIGN)],
};

pub static CUSTOM_ATTRIBUTES: AttributeTable = AttributeTable {
    name: "custom",
    default: SymbolAttributes::new(Some(Align::Center), false, Stretch::NONE),
    overrides: &[],
};
