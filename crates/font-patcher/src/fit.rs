//! Scaling and alignment of a symbol into the cell.
//!
//! Everything here is plain arithmetic on boxes; the glyph itself is only touched by the
//! caller once the factors and offsets are known.

use crate::{
    attributes::{Align, Stretch, SymbolAttributes},
    geometry::GlyphDimensions,
    metrics::CellMetrics,
};

/// Patch mode flags that influence the fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FitMode {
    /// Strictly monospaced output (`--mono`).
    pub single_width: bool,
    /// Keep the symbols' own advance widths (`--variable-width-glyphs`).
    pub variable_width: bool,
}

/// Scale factors `(sx, sy)` that fit a symbol of the given size into the cell.
pub fn scale_factors(
    cell: &CellMetrics,
    sym: &GlyphDimensions,
    stretch: Stretch,
    single_width: bool,
) -> (f64, f64) {
    if sym.width() == 0.0 || sym.height() == 0.0 {
        return (1.0, 1.0);
    }

    let relative_width =
        if single_width || (!stretch.preserve_aspect && !stretch.double) { 1.0 } else { 2.0 };
    let mut sx = cell.width * relative_width / sym.width();
    let mut sy = cell.height / sym.height();

    if stretch.preserve_aspect {
        sx = sx.min(sy);
        if !single_width {
            // Only shrink, never grow
            sx = sx.min(1.0);
        }
        sy = sx;
    } else {
        if !stretch.x {
            sx = 1.0;
        }
        if !stretch.y {
            sy = 1.0;
        }
    }
    (sx, sy)
}

/// Enlarge the scale so the symbol bleeds `overlap` of a cell into its neighbours.
///
/// Vertical overlap is capped at 1%.
pub fn apply_overlap(
    cell: &CellMetrics,
    sym: &GlyphDimensions,
    (sx, sy): (f64, f64),
    overlap: f64,
) -> (f64, f64) {
    let sx = sx * (1.0 + cell.width / (sym.width() * sx) * overlap);
    let sy = sy * (1.0 + cell.height / (sym.height() * sy) * overlap.min(0.01));
    (sx, sy)
}

/// Narrow the horizontal scale so the scaled symbol is at most `max_ratio` wide per unit of
/// height.
pub fn limit_xy_ratio(sym: &GlyphDimensions, (sx, sy): (f64, f64), max_ratio: f64) -> (f64, f64) {
    let ratio = sym.width() * sx / (sym.height() * sy);
    if ratio > max_ratio { (sx * max_ratio / ratio, sy) } else { (sx, sy) }
}

/// Translation `(dx, dy)` that aligns an already scaled symbol in the cell.
pub fn alignment_offset(
    cell: &CellMetrics,
    sym: &GlyphDimensions,
    attrs: &SymbolAttributes,
    mode: FitMode,
) -> (f64, f64) {
    let dy = if attrs.valign_center {
        (cell.ymax - cell.height / 2.0) - (sym.ymax - sym.height() / 2.0)
    } else {
        0.0
    };

    let mut dx = 0.0;
    if mode.variable_width && sym.advance.is_none() {
        dx = -sym.xmin;
    } else if let Some(align) = attrs.align {
        dx = cell.xmin - sym.xmin;
        match align {
            Align::Left => {}
            Align::Center => dx += cell.width / 2.0 - sym.width() / 2.0,
            Align::Right => {
                dx += cell.width - sym.width();
                if !mode.single_width && attrs.stretch.double {
                    dx += cell.width;
                }
            }
        }
    }

    if let Some(overlap) = attrs.overlap() {
        let overlap_width = cell.width * overlap;
        match attrs.align {
            Some(Align::Left) => dx -= overlap_width,
            // Variable width symbols are left aligned by definition
            Some(Align::Right) if !mode.variable_width => dx += overlap_width,
            _ => {}
        }
    }

    (dx, dy)
}

/// Advance width a patched symbol gets.
pub fn symbol_advance(
    cell: &CellMetrics,
    sym: &GlyphDimensions,
    attrs: &SymbolAttributes,
    variable_width: bool,
) -> i32 {
    if !variable_width {
        return cell.width as i32;
    }
    let mut width = sym.advance.unwrap_or_else(|| sym.width());
    if let Some(overlap) = attrs.overlap()
        && matches!(attrs.align, Some(Align::Left | Align::Right))
    {
        width -= cell.width * overlap;
    }
    width as i32
}
