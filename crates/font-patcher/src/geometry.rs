//! Bounding-box arithmetic over glyph outlines.

use kurbo::Rect;
use log::debug;

/// Ink extents of one glyph (or a group of glyphs) plus an optional shared advance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphDimensions {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    /// Advance width, only known for groups whose members all share one advance.
    pub advance: Option<f64>,
}

impl GlyphDimensions {
    pub fn from_bounds(bounds: Rect, advance: Option<f64>) -> Self {
        Self { xmin: bounds.x0, ymin: bounds.y0, xmax: bounds.x1, ymax: bounds.y1, advance }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Scale the box, truncating every coordinate toward zero.
    ///
    /// Simulates what happens to a glyph that is scaled by the same factors, so a group box
    /// can stand in for its member after transformation.
    pub fn scaled(&self, scale_x: f64, scale_y: f64) -> Self {
        Self {
            xmin: (self.xmin * scale_x).trunc(),
            ymin: (self.ymin * scale_y).trunc(),
            xmax: (self.xmax * scale_x).trunc(),
            ymax: (self.ymax * scale_y).trunc(),
            advance: self.advance.map(|a| (a * scale_x).trunc()),
        }
    }
}

/// A glyph as measured for grouping: its ink bounds and its advance width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasuredGlyph {
    pub bounds: Rect,
    pub advance: f64,
}

impl MeasuredGlyph {
    pub fn new(bounds: Rect, advance: f64) -> Self {
        Self { bounds, advance }
    }

    fn is_empty(&self) -> bool {
        self.bounds.x0 == self.bounds.x1 && self.bounds.y0 == self.bounds.y1
    }
}

/// Combine several glyphs into one bounding box.
///
/// `None` entries are glyphs named by a group but missing from the font. They are skipped,
/// but still count as members when deciding whether empty glyphs are ignored.
pub fn combined_dimensions(glyphs: &[Option<MeasuredGlyph>]) -> Option<GlyphDimensions> {
    let multiple = glyphs.len() > 1;
    let mut bounds: Option<Rect> = None;
    let mut advance: Option<f64> = None;
    let mut uniform = true;
    let mut count = 0usize;

    for glyph in glyphs.iter().flatten() {
        if multiple && glyph.is_empty() {
            continue;
        }
        bounds = Some(match bounds {
            None => glyph.bounds,
            Some(b) => b.union(glyph.bounds),
        });
        match advance {
            None => advance = Some(glyph.advance),
            Some(a) if a != glyph.advance => uniform = false,
            Some(_) => {}
        }
        count += 1;
    }

    let shared_advance = advance.filter(|a| count > 1 && uniform && *a != 0.0);
    bounds.map(|b| GlyphDimensions::from_bounds(b, shared_advance))
}

/// Split a line gap into the part added above the ascender (`top`) or below the descender.
pub fn half_gap(gap: i32, top: bool) -> i32 {
    if gap <= 0 {
        return 0;
    }
    let gap_top = gap / 2;
    let gap_bottom = gap - gap_top;
    if top {
        debug!("Redistributing line gap of {gap} ({gap_top} top and {gap_bottom} bottom)");
        gap_top
    } else {
        gap_bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(x0: f64, y0: f64, x1: f64, y1: f64, advance: f64) -> Option<MeasuredGlyph> {
        Some(MeasuredGlyph::new(Rect::new(x0, y0, x1, y1), advance))
    }

    #[test]
    fn test_single_glyph_has_no_advance() {
        let dim = combined_dimensions(&[glyph(10.0, -20.0, 110.0, 80.0, 120.0)]).unwrap();
        assert_eq!(dim.width(), 100.0);
        assert_eq!(dim.height(), 100.0);
        assert_eq!(dim.advance, None);
    }

    #[test]
    fn test_union_with_shared_advance() {
        let dim = combined_dimensions(&[
            glyph(10.0, 0.0, 50.0, 100.0, 200.0),
            glyph(0.0, -50.0, 40.0, 60.0, 200.0),
        ])
        .unwrap();
        assert_eq!((dim.xmin, dim.ymin, dim.xmax, dim.ymax), (0.0, -50.0, 50.0, 100.0));
        assert_eq!(dim.advance, Some(200.0));
    }

    #[test]
    fn test_differing_advances_drop_advance() {
        let dim = combined_dimensions(&[
            glyph(0.0, 0.0, 50.0, 100.0, 200.0),
            glyph(0.0, 0.0, 40.0, 60.0, 300.0),
            glyph(0.0, 0.0, 40.0, 60.0, 200.0),
        ])
        .unwrap();
        assert_eq!(dim.advance, None);
    }

    #[test]
    fn test_empty_glyphs_ignored_in_groups() {
        let dim = combined_dimensions(&[
            glyph(0.0, 0.0, 0.0, 0.0, 500.0),
            glyph(100.0, 100.0, 200.0, 300.0, 400.0),
            None,
        ])
        .unwrap();
        assert_eq!((dim.xmin, dim.ymin, dim.xmax, dim.ymax), (100.0, 100.0, 200.0, 300.0));
        assert_eq!(dim.advance, None);
    }

    #[test]
    fn test_empty_single_glyph_is_kept() {
        let dim = combined_dimensions(&[glyph(0.0, 0.0, 0.0, 0.0, 500.0)]).unwrap();
        assert_eq!(dim.width(), 0.0);
        assert_eq!(dim.height(), 0.0);
    }

    #[test]
    fn test_no_glyphs() {
        assert_eq!(combined_dimensions(&[None, None]), None);
        assert_eq!(combined_dimensions(&[]), None);
    }

    #[test]
    fn test_scaled_truncates_toward_zero() {
        let dim = GlyphDimensions {
            xmin: -10.0,
            ymin: -15.0,
            xmax: 33.0,
            ymax: 47.0,
            advance: Some(101.0),
        };
        let scaled = dim.scaled(1.5, 0.5);
        assert_eq!(scaled.xmin, -15.0);
        assert_eq!(scaled.ymin, -7.0);
        assert_eq!(scaled.xmax, 49.0);
        assert_eq!(scaled.ymax, 23.0);
        assert_eq!(scaled.advance, Some(151.0));
    }

    #[test]
    fn test_half_gap() {
        assert_eq!(half_gap(0, true), 0);
        assert_eq!(half_gap(-10, false), 0);
        assert_eq!(half_gap(101, true), 50);
        assert_eq!(half_gap(101, false), 51);
        assert_eq!(half_gap(100, true) + half_gap(100, false), 100);
    }
}
