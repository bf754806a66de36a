//! Cell metrics: the box every symbol is fitted into.
//!
//! A font describes its line spacing three times (hhea, OS/2 typo and OS/2 win). The cell is
//! derived from whichever set is authoritative, then all three are rewritten to describe the
//! same cell so every platform lays out the patched font identically.

use log::{debug, warn};
use read_fonts::{FontRef, TableProvider};

use crate::{
    Result,
    error::Error,
    geometry::half_gap,
};

const USE_TYPO_METRICS: u16 = 1 << 7;

/// Codepoints that may legitimately be wider than the cell.
pub const WIDE_EXCEPTIONS: &[u32] = &[
    0x132, 0x133, // IJ, ij
    0x022, 0x027, 0x060, // quotes
    0x0D0, 0x10F, 0x110, 0x111, 0x127, 0x13E, 0x140, 0x165, // stroke and caron
    0x02D, // hyphen
];

/// Which vertical metrics set the cell is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsSource {
    Typo,
    Win,
}

/// Baseline-to-baseline distances of the three metric sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineToBaseline {
    pub hhea: i32,
    pub typo: i32,
    pub win: i32,
    /// The line gap implied by the win metrics.
    pub win_gap: i32,
}

/// Vertical metrics as stored in hhea and OS/2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerticalMetrics {
    pub hhea_ascent: i32,
    pub hhea_descent: i32,
    pub hhea_line_gap: i32,
    pub typo_ascent: i32,
    pub typo_descent: i32,
    pub typo_line_gap: i32,
    pub win_ascent: i32,
    pub win_descent: i32,
    pub use_typo_metrics: bool,
}

impl VerticalMetrics {
    /// Read the metrics of a font. Without OS/2 the typo and win sets mirror hhea.
    pub fn from_font(font: &FontRef) -> Result<Self> {
        let hhea = font.hhea()?;
        let hhea_ascent = hhea.ascender().to_i16() as i32;
        let hhea_descent = hhea.descender().to_i16() as i32;
        let hhea_line_gap = hhea.line_gap().to_i16() as i32;

        Ok(match font.os2() {
            Ok(os2) => Self {
                hhea_ascent,
                hhea_descent,
                hhea_line_gap,
                typo_ascent: os2.s_typo_ascender() as i32,
                typo_descent: os2.s_typo_descender() as i32,
                typo_line_gap: os2.s_typo_line_gap() as i32,
                win_ascent: os2.us_win_ascent() as i32,
                win_descent: os2.us_win_descent() as i32,
                use_typo_metrics: os2.fs_selection().bits() & USE_TYPO_METRICS != 0,
            },
            Err(_) => Self {
                hhea_ascent,
                hhea_descent,
                hhea_line_gap,
                typo_ascent: hhea_ascent,
                typo_descent: hhea_descent,
                typo_line_gap: hhea_line_gap,
                win_ascent: hhea_ascent,
                win_descent: -hhea_descent,
                use_typo_metrics: false,
            },
        })
    }

    pub fn baseline_to_baseline(&self) -> BaselineToBaseline {
        let hhea_height = self.hhea_ascent - self.hhea_descent;
        let typo_height = self.typo_ascent - self.typo_descent;
        let win_height = self.win_ascent + self.win_descent;
        let win_gap = (self.hhea_line_gap - win_height + hhea_height).max(0);

        BaselineToBaseline {
            hhea: hhea_height + self.hhea_line_gap,
            typo: typo_height + self.typo_line_gap,
            win: win_height + win_gap,
            win_gap,
        }
    }

    /// Pick the metric set that describes the line spacing.
    ///
    /// A conforming font has its preferred set agree with hhea. Otherwise win is trusted.
    pub fn select_source(&self) -> MetricsSource {
        let btb = self.baseline_to_baseline();
        let (ours, source) = if self.use_typo_metrics {
            (btb.typo, MetricsSource::Typo)
        } else {
            (btb.win, MetricsSource::Win)
        };
        if ours == btb.hhea {
            return source;
        }
        warn!(
            "Font vertical metrics inconsistent (HHEA {} / TYPO {} / WIN {}), using WIN",
            btb.hhea, btb.typo, btb.win
        );
        MetricsSource::Win
    }

    /// The vertical extent of the cell as `(ymin, ymax)`, line gap included.
    ///
    /// The gap widens the cell on both sides: its bottom half goes below the descender.
    pub fn cell_extent(&self) -> (i32, i32) {
        match self.select_source() {
            MetricsSource::Typo => (
                self.typo_descent - half_gap(self.typo_line_gap, false),
                self.typo_ascent + half_gap(self.typo_line_gap, true),
            ),
            MetricsSource::Win => {
                let win_gap = self.baseline_to_baseline().win_gap;
                (
                    -self.win_descent - half_gap(win_gap, false),
                    self.win_ascent + half_gap(win_gap, true),
                )
            }
        }
    }

    /// All three metric sets describing exactly `ymin..ymax` without line gap.
    pub fn unified(ymin: i32, ymax: i32) -> Self {
        Self {
            hhea_ascent: ymax,
            hhea_descent: ymin,
            hhea_line_gap: 0,
            typo_ascent: ymax,
            typo_descent: ymin,
            typo_line_gap: 0,
            win_ascent: ymax,
            win_descent: -ymin,
            use_typo_metrics: true,
        }
    }

    /// Make the total line height even, which centers powerline separators more evenly.
    pub fn even_line_height(&mut self) {
        if (self.win_ascent + self.win_descent) % 2 != 0 {
            self.hhea_ascent += 1;
            self.typo_ascent += 1;
            self.win_ascent += 1;
        }
    }
}

/// The cell symbols are fitted into, in font units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub width: f64,
    pub height: f64,
}

impl CellMetrics {
    /// Cell spanning `ymin..ymax` with no width yet.
    ///
    /// An empty font (zero height) gets an em-sized cell instead.
    pub fn from_extent(ymin: i32, ymax: i32, units_per_em: u16) -> Result<Self> {
        let height = ymax - ymin;
        if height < 0 {
            return Err(Error::InsaneFontHeight { ymin, ymax });
        }
        if height == 0 {
            let em = units_per_em as f64;
            let ascent = (em * 0.8).round();
            debug!("Empty font, assuming an em sized cell");
            return Ok(Self {
                xmin: 0.0,
                ymin: ascent - em,
                xmax: em,
                ymax: ascent,
                width: em,
                height: em,
            });
        }
        Ok(Self {
            xmin: 0.0,
            ymin: ymin as f64,
            xmax: 0.0,
            ymax: ymax as f64,
            width: 0.0,
            height: height as f64,
        })
    }

    /// Grow the cell to the widest basic glyph.
    ///
    /// `glyphs` yields `(codepoint, advance, ink xmax)` for existing glyphs. Returns the
    /// first codepoint above `z` that widened the cell, which usually means the font is not
    /// really monospaced.
    pub fn widen(&mut self, glyphs: impl IntoIterator<Item = (u32, f64, f64)>) -> Option<u32> {
        let mut widened_by_extended = None;
        for (codepoint, advance, xmax) in glyphs {
            if !is_cell_reference(codepoint) {
                continue;
            }
            if self.width < advance {
                self.width = advance;
                if codepoint > 0x7A && widened_by_extended.is_none() {
                    widened_by_extended = Some(codepoint);
                }
            }
            if xmax > self.xmax {
                self.xmax = xmax;
            }
        }
        widened_by_extended
    }

    /// Very wide and short cells get no double-width symbols.
    pub fn is_extra_wide(&self) -> bool {
        self.height * 1.8 < self.width * 2.0
    }
}

/// Whether a codepoint takes part in measuring the cell width.
pub fn is_cell_reference(codepoint: u32) -> bool {
    (0x21..0x17F).contains(&codepoint)
        && !(0x7F..0xBF).contains(&codepoint)
        && !WIDE_EXCEPTIONS.contains(&codepoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conforming() -> VerticalMetrics {
        VerticalMetrics {
            hhea_ascent: 800,
            hhea_descent: -200,
            hhea_line_gap: 0,
            typo_ascent: 800,
            typo_descent: -200,
            typo_line_gap: 0,
            win_ascent: 800,
            win_descent: 200,
            use_typo_metrics: false,
        }
    }

    #[test]
    fn test_conforming_font_uses_win() {
        let metrics = conforming();
        assert_eq!(metrics.select_source(), MetricsSource::Win);
        assert_eq!(metrics.cell_extent(), (-200, 800));
    }

    #[test]
    fn test_typo_with_line_gap() {
        let metrics = VerticalMetrics {
            hhea_ascent: 800,
            hhea_descent: -200,
            hhea_line_gap: 101,
            typo_ascent: 800,
            typo_descent: -200,
            typo_line_gap: 101,
            win_ascent: 1000,
            win_descent: 300,
            use_typo_metrics: true,
        };
        assert_eq!(metrics.select_source(), MetricsSource::Typo);
        // 50 above, 51 below
        assert_eq!(metrics.cell_extent(), (-251, 850));
    }

    #[test]
    fn test_win_gap_from_hhea() {
        let metrics = VerticalMetrics { hhea_line_gap: 100, ..conforming() };
        let btb = metrics.baseline_to_baseline();
        assert_eq!(btb.win_gap, 100);
        assert_eq!(btb.win, btb.hhea);
        assert_eq!(metrics.cell_extent(), (-250, 850));
    }

    #[test]
    fn test_inconsistent_metrics_fall_back_to_win() {
        let metrics = VerticalMetrics {
            typo_ascent: 700,
            win_ascent: 900,
            use_typo_metrics: true,
            ..conforming()
        };
        assert_eq!(metrics.select_source(), MetricsSource::Win);
        assert_eq!(metrics.cell_extent(), (-200, 900));
    }

    #[test]
    fn test_unified_metrics_agree() {
        let metrics = VerticalMetrics::unified(-250, 850);
        let btb = metrics.baseline_to_baseline();
        assert_eq!(btb.hhea, 1100);
        assert_eq!(btb.typo, 1100);
        assert_eq!(btb.win, 1100);
        assert!(metrics.use_typo_metrics);
        assert_eq!(metrics.select_source(), MetricsSource::Typo);
    }

    #[test]
    fn test_even_line_height() {
        let mut metrics = VerticalMetrics::unified(-200, 801);
        metrics.even_line_height();
        assert_eq!(metrics.win_ascent, 802);
        assert_eq!(metrics.typo_ascent, 802);
        assert_eq!(metrics.hhea_ascent, 802);

        let mut even = VerticalMetrics::unified(-200, 800);
        even.even_line_height();
        assert_eq!(even.win_ascent, 800);
    }

    #[test]
    fn test_negative_height_is_an_error() {
        assert!(matches!(
            CellMetrics::from_extent(100, -100, 1000),
            Err(Error::InsaneFontHeight { .. })
        ));
    }

    #[test]
    fn test_empty_font_gets_em_cell() {
        let cell = CellMetrics::from_extent(0, 0, 2048).unwrap();
        assert_eq!(cell.width, 2048.0);
        assert_eq!(cell.height, 2048.0);
        assert_eq!(cell.ymax, 1638.0);
        assert_eq!(cell.ymin, -410.0);
    }

    #[test]
    fn test_widen_skips_exceptions() {
        let mut cell = CellMetrics::from_extent(-200, 800, 1000).unwrap();
        let widened = cell.widen([
            (0x41, 600.0, 580.0),
            (0x2D, 900.0, 880.0),
            (0xBC, 1200.0, 1100.0),
            (0x20, 2000.0, 0.0),
        ]);
        assert_eq!(widened, None);
        assert_eq!(cell.width, 600.0);
        assert_eq!(cell.xmax, 580.0);
    }

    #[test]
    fn test_widen_reports_extended_glyph() {
        let mut cell = CellMetrics::from_extent(-200, 800, 1000).unwrap();
        let widened = cell.widen([(0x41, 600.0, 580.0), (0x100, 700.0, 690.0)]);
        assert_eq!(widened, Some(0x100));
        assert_eq!(cell.width, 700.0);
    }

    #[test]
    fn test_extra_wide() {
        let mut cell = CellMetrics::from_extent(-200, 800, 1000).unwrap();
        cell.width = 600.0;
        assert!(!cell.is_extra_wide());
        cell.width = 950.0;
        assert!(cell.is_extra_wide());
    }
}
