//! Conversion between drawn outlines and TrueType glyph data.

use kurbo::{BezPath, CubicBez, PathEl, Point, Rect};
use read_fonts::tables::glyf::{CurvePoint, SimpleGlyph as ReadSimpleGlyph};
use skrifa::outline::OutlinePen;
use write_fonts::tables::glyf::{Bbox, Contour, Glyph, SimpleGlyph};

/// Maximum distance, in font units, between a cubic and its quadratic approximation.
const CUBIC_TO_QUAD_ACCURACY: f64 = 0.5;

/// Pen that collects a skrifa outline into a kurbo path.
#[derive(Debug, Default)]
pub struct PathPen(pub BezPath);

impl OutlinePen for PathPen {
    #[inline]
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to((x, y));
    }

    #[inline]
    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to((x, y));
    }

    #[inline]
    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        self.0.quad_to((cx, cy), (x, y));
    }

    #[inline]
    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.0.curve_to((cx0, cy0), (cx1, cy1), (x, y));
    }

    #[inline]
    fn close(&mut self) {
        self.0.close_path();
    }
}

fn on_curve(p: Point) -> CurvePoint {
    CurvePoint { x: round_i16(p.x), y: round_i16(p.y), on_curve: true }
}

fn off_curve(p: Point) -> CurvePoint {
    CurvePoint { x: round_i16(p.x), y: round_i16(p.y), on_curve: false }
}

fn round_i16(v: f64) -> i16 {
    v.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// Convert a path into TrueType contours.
///
/// Cubic segments are approximated by quadratics and all coordinates are rounded.
pub fn to_contours(path: &BezPath) -> Vec<Vec<CurvePoint>> {
    let mut contours = Vec::new();
    let mut current: Vec<CurvePoint> = Vec::new();
    let mut last = Point::ZERO;

    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                finish_contour(&mut contours, &mut current);
                current.push(on_curve(p));
                last = p;
            }
            PathEl::LineTo(p) => {
                current.push(on_curve(p));
                last = p;
            }
            PathEl::QuadTo(c, p) => {
                current.push(off_curve(c));
                current.push(on_curve(p));
                last = p;
            }
            PathEl::CurveTo(c0, c1, p) => {
                for (_, _, quad) in CubicBez::new(last, c0, c1, p).to_quads(CUBIC_TO_QUAD_ACCURACY)
                {
                    current.push(off_curve(quad.p1));
                    current.push(on_curve(quad.p2));
                }
                last = p;
            }
            PathEl::ClosePath => finish_contour(&mut contours, &mut current),
        }
    }
    finish_contour(&mut contours, &mut current);
    contours
}

fn finish_contour(contours: &mut Vec<Vec<CurvePoint>>, current: &mut Vec<CurvePoint>) {
    if current.len() > 1 && current.first() == current.last() {
        current.pop();
    }
    if current.len() > 1 {
        contours.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

/// An editable TrueType glyph outline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleOutline {
    pub contours: Vec<Vec<CurvePoint>>,
    pub instructions: Vec<u8>,
}

impl SimpleOutline {
    pub fn from_path(path: &BezPath) -> Self {
        Self { contours: to_contours(path), instructions: Vec::new() }
    }

    pub fn from_glyph(glyph: &ReadSimpleGlyph) -> Self {
        let points: Vec<CurvePoint> = glyph.points().collect();
        let mut contours = Vec::new();
        let mut start = 0usize;
        for end in glyph.end_pts_of_contours() {
            let end = (end.get() as usize + 1).min(points.len());
            if start < end {
                contours.push(points[start..end].to_vec());
            }
            start = end;
        }
        Self { contours, instructions: glyph.instructions().to_vec() }
    }

    pub fn is_empty(&self) -> bool {
        self.contours.iter().all(Vec::is_empty)
    }

    pub fn point_count(&self) -> usize {
        self.contours.iter().map(Vec::len).sum()
    }

    /// Control box of all points; `None` for an empty outline.
    pub fn bounds(&self) -> Option<Rect> {
        let mut points = self.contours.iter().flatten();
        let first = points.next()?;
        let init = Rect::new(first.x as f64, first.y as f64, first.x as f64, first.y as f64);
        Some(points.fold(init, |r, p| r.union_pt(Point::new(p.x as f64, p.y as f64))))
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        if dx == 0 && dy == 0 {
            return;
        }
        for point in self.contours.iter_mut().flatten() {
            point.x = round_i16(point.x as f64 + dx as f64);
            point.y = round_i16(point.y as f64 + dy as f64);
        }
        // Hints refer to the old positions
        self.instructions.clear();
    }

    /// Reverse the direction of every contour, keeping its start point.
    pub fn reverse_contours(&mut self) {
        for contour in &mut self.contours {
            if contour.len() > 2 {
                contour[1..].reverse();
            }
        }
    }

    pub fn to_glyph(&self) -> Glyph {
        let Some(bounds) = self.bounds() else {
            return Glyph::Empty;
        };
        Glyph::Simple(SimpleGlyph {
            bbox: Bbox {
                x_min: bounds.x0 as i16,
                y_min: bounds.y0 as i16,
                x_max: bounds.x1 as i16,
                y_max: bounds.y1 as i16,
            },
            contours: self.contours.iter().cloned().map(Contour::from).collect(),
            instructions: self.instructions.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> BezPath {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((0.0, 100.0));
        path.line_to((100.0, 100.0));
        path.line_to((100.0, 0.0));
        path.line_to((0.0, 0.0));
        path.close_path();
        path
    }

    #[test]
    fn test_closing_point_dropped() {
        let contours = to_contours(&square());
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 4);
        assert!(contours[0].iter().all(|p| p.on_curve));
    }

    #[test]
    fn test_quad_keeps_control_point() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.quad_to((50.4, 100.6), (100.0, 0.0));
        path.close_path();
        let contours = to_contours(&path);
        assert_eq!(
            contours[0],
            vec![
                CurvePoint { x: 0, y: 0, on_curve: true },
                CurvePoint { x: 50, y: 101, on_curve: false },
                CurvePoint { x: 100, y: 0, on_curve: true },
            ]
        );
    }

    #[test]
    fn test_cubic_becomes_quads() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.curve_to((0.0, 500.0), (1000.0, 500.0), (1000.0, 0.0));
        path.close_path();
        let contours = to_contours(&path);
        let points = &contours[0];
        assert!(points.len() > 3);
        assert!(points.iter().any(|p| !p.on_curve));
        assert_eq!(points.last().map(|p| (p.x, p.y)), Some((1000, 0)));
    }

    #[test]
    fn test_degenerate_contours_dropped() {
        let mut path = BezPath::new();
        path.move_to((10.0, 10.0));
        path.close_path();
        path.move_to((20.0, 20.0));
        assert!(to_contours(&path).is_empty());
    }

    #[test]
    fn test_bounds_and_translate() {
        let mut outline = SimpleOutline::from_path(&square());
        outline.instructions = vec![0xB0, 0x00];
        assert_eq!(outline.bounds(), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
        outline.translate(-10, 25);
        assert_eq!(outline.bounds(), Some(Rect::new(-10.0, 25.0, 90.0, 125.0)));
        assert!(outline.instructions.is_empty());
    }

    #[test]
    fn test_reverse_keeps_start() {
        let mut outline = SimpleOutline::from_path(&square());
        outline.reverse_contours();
        let coords: Vec<_> = outline.contours[0].iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(coords, [(0, 0), (100, 0), (100, 100), (0, 100)]);
    }

    #[test]
    fn test_empty_outline_is_empty_glyph() {
        let outline = SimpleOutline::default();
        assert!(outline.is_empty());
        assert_eq!(outline.bounds(), None);
        assert!(matches!(outline.to_glyph(), Glyph::Empty));
    }
}
