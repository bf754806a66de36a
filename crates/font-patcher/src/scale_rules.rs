//! Scale rules: groups of symbols that share one scale factor.
//!
//! Icons of one family often look best when they keep their relative sizes. A rule lists
//! such groups; every member is scaled with the biggest factor that lets the whole group
//! (the union of its boxes) fit the cell.

use log::{debug, warn};

use crate::{
    attributes::Stretch,
    fit::scale_factors,
    geometry::{GlyphDimensions, MeasuredGlyph, combined_dimensions},
    metrics::CellMetrics,
};

/// One member of a scale group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphSelector {
    Single(u32),
    /// Inclusive range of codepoints.
    Range(u32, u32),
}

impl GlyphSelector {
    pub fn contains(&self, codepoint: u32) -> bool {
        match *self {
            Self::Single(cp) => cp == codepoint,
            Self::Range(start, end) => (start..=end).contains(&codepoint),
        }
    }

    fn codepoints(&self) -> impl Iterator<Item = u32> {
        match *self {
            Self::Single(cp) => cp..=cp,
            Self::Range(start, end) => start..=end,
        }
    }
}

use GlyphSelector::{Range, Single};

/// The scale factor of a whole group is taken from one reference glyph.
#[derive(Debug)]
pub struct ScaleGlyph {
    pub reference: u32,
    pub members: &'static [GlyphSelector],
    /// Members are also positioned by the reference glyph's box.
    pub shift: bool,
}

/// A static scale rule description.
#[derive(Debug)]
pub struct ScaleRuleSpec {
    pub name: &'static str,
    pub groups: &'static [&'static [GlyphSelector]],
    pub scale_glyph: Option<ScaleGlyph>,
}

pub static DEVI_RULES: ScaleRuleSpec = ScaleRuleSpec {
    name: "devicons",
    groups: &[],
    scale_glyph: Some(ScaleGlyph {
        reference: 0xE60E,
        members: &[Range(0xE6BD, 0xE6C3)],
        shift: false,
    }),
};

pub static FONTA_RULES: ScaleRuleSpec = ScaleRuleSpec {
    name: "fontawesome",
    groups: &[
        // Stars
        &[Single(0xF005), Single(0xF006), Single(0xF089)],
        // Speakers
        &[Range(0xF026, 0xF028)],
        // Bookmarks
        &[Range(0xF02B, 0xF02C)],
        // Alignments
        &[Range(0xF031, 0xF035)],
        &[Range(0xF044, 0xF046)],
        // Media control
        &[Range(0xF048, 0xF052)],
        // Arrows
        &[Range(0xF060, 0xF063)],
        &[Single(0xF053), Single(0xF054), Single(0xF077), Single(0xF078)],
        &[Range(0xF07D, 0xF07E)],
        // Hands
        &[Range(0xF0A4, 0xF0A7)],
        // Carets
        &[
            Single(0xF0D7),
            Single(0xF0D8),
            Single(0xF0D9),
            Single(0xF0DA),
            Single(0xF0DC),
            Single(0xF0DD),
            Single(0xF0DE),
        ],
        // Angles
        &[Range(0xF100, 0xF107)],
        &[Range(0xF130, 0xF131)],
        &[Range(0xF141, 0xF142)],
        &[Range(0xF153, 0xF15A)],
        &[Range(0xF175, 0xF178)],
        &[Range(0xF182, 0xF183)],
        &[Range(0xF221, 0xF22D)],
        // Files
        &[Range(0xF255, 0xF25B)],
    ],
    scale_glyph: None,
};

pub static OCTI_RULES: ScaleRuleSpec = ScaleRuleSpec {
    name: "octicons",
    groups: &[],
    scale_glyph: Some(ScaleGlyph {
        reference: 0xF02E,
        members: &[
            Range(0xF03D, 0xF040),
            Single(0xF044),
            Single(0xF05A),
            Single(0xF05B),
            Single(0xF0AA),
            Range(0xF051, 0xF053),
            Single(0xF071),
            Single(0xF09F),
            Single(0xF0A0),
            Single(0xF0A1),
            Single(0xF078),
            Single(0xF0A2),
            Single(0xF0A3),
            Single(0xF0A4),
            Single(0xF0CA),
        ],
        shift: false,
    }),
};

pub static WEATH_RULES: ScaleRuleSpec = ScaleRuleSpec {
    name: "weather",
    groups: &[
        // Moon phases
        &[Range(0xF095, 0xF0B0)],
        // Wind strength
        &[Range(0xF0B7, 0xF0C3)],
        // Thermometer
        &[Range(0xF053, 0xF055)],
        &[Single(0xF06E), Single(0xF070)],
        &[Single(0xF042), Single(0xF045)],
    ],
    scale_glyph: None,
};

pub static MDI_RULES: ScaleRuleSpec = ScaleRuleSpec {
    name: "material",
    groups: &[],
    scale_glyph: Some(ScaleGlyph {
        reference: 0xF068D,
        members: &[Range(0xF0000, 0xFFFFF)],
        shift: true,
    }),
};

/// Access to donor glyph sizes, measured at the target em.
pub trait GlyphMeasure {
    fn measure(&self, codepoint: u32) -> Option<MeasuredGlyph>;
}

#[derive(Debug, Clone)]
struct PreparedGroup {
    members: Vec<GlyphSelector>,
    scale: f64,
    bounds: Option<GlyphDimensions>,
}

/// Scale rules resolved against one donor font and one cell.
#[derive(Debug, Clone, Default)]
pub struct ScaleRules {
    groups: Vec<PreparedGroup>,
}

impl ScaleRules {
    /// Resolve a rule; with `single_width` every group is fitted into one cell.
    pub fn prepare(
        spec: &ScaleRuleSpec,
        donor: &impl GlyphMeasure,
        cell: &CellMetrics,
        single_width: bool,
    ) -> Self {
        let fit = |bounds: &GlyphDimensions| {
            scale_factors(cell, bounds, Stretch::PRESERVE_ASPECT, single_width).0
        };
        let mut groups = Vec::new();

        for group in spec.groups {
            let measured: Vec<_> = group
                .iter()
                .flat_map(GlyphSelector::codepoints)
                .map(|cp| donor.measure(cp))
                .collect();
            let Some(bounds) = combined_dimensions(&measured) else {
                warn!("Scale group {group:X?} of {} has no glyphs, ignoring", spec.name);
                continue;
            };
            let scale = fit(&bounds);
            groups.push(PreparedGroup { members: group.to_vec(), scale, bounds: Some(bounds) });
        }

        if let Some(scale_glyph) = &spec.scale_glyph {
            match donor.measure(scale_glyph.reference) {
                Some(glyph) => {
                    let bounds = GlyphDimensions::from_bounds(glyph.bounds, None);
                    groups.push(PreparedGroup {
                        members: scale_glyph.members.to_vec(),
                        scale: fit(&bounds),
                        bounds: scale_glyph.shift.then_some(bounds),
                    });
                }
                None => warn!(
                    "Scale glyph U+{:04X} of {} not found, ignoring",
                    scale_glyph.reference, spec.name
                ),
            }
        }

        debug!("Prepared {} scale groups for {}", groups.len(), spec.name);
        Self { groups }
    }

    /// Scale factor and optional shared box of the first group containing `codepoint`.
    pub fn lookup(&self, codepoint: u32) -> Option<(f64, Option<GlyphDimensions>)> {
        self.groups
            .iter()
            .find(|g| g.members.iter().any(|m| m.contains(codepoint)))
            .map(|g| (g.scale, g.bounds))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use kurbo::Rect;

    use super::*;

    struct FakeDonor(HashMap<u32, MeasuredGlyph>);

    impl GlyphMeasure for FakeDonor {
        fn measure(&self, codepoint: u32) -> Option<MeasuredGlyph> {
            self.0.get(&codepoint).copied()
        }
    }

    fn donor(glyphs: &[(u32, Rect)]) -> FakeDonor {
        FakeDonor(glyphs.iter().map(|(cp, r)| (*cp, MeasuredGlyph::new(*r, 1000.0))).collect())
    }

    fn cell() -> CellMetrics {
        CellMetrics {
            xmin: 0.0,
            ymin: -200.0,
            xmax: 600.0,
            ymax: 800.0,
            width: 600.0,
            height: 1000.0,
        }
    }

    #[test]
    fn test_group_uses_union() {
        static SPEC: ScaleRuleSpec = ScaleRuleSpec {
            name: "test",
            groups: &[&[Single(0x10), Single(0x11)]],
            scale_glyph: None,
        };
        let donor = donor(&[
            (0x10, Rect::new(0.0, 0.0, 1000.0, 500.0)),
            (0x11, Rect::new(0.0, 0.0, 500.0, 1000.0)),
        ]);
        let rules = ScaleRules::prepare(&SPEC, &donor, &cell(), false);
        let (scale, bounds) = rules.lookup(0x11).unwrap();
        // Union is 1000x1000, two cells wide available: height limits at 1.0
        assert_eq!(scale, 1.0);
        let bounds = bounds.unwrap();
        assert_eq!(bounds.width(), 1000.0);
        assert_eq!(bounds.advance, Some(1000.0));
        assert_eq!(rules.lookup(0x12), None);
    }

    #[test]
    fn test_missing_group_is_dropped() {
        static SPEC: ScaleRuleSpec =
            ScaleRuleSpec { name: "test", groups: &[&[Range(0x20, 0x22)]], scale_glyph: None };
        let rules = ScaleRules::prepare(&SPEC, &donor(&[]), &cell(), false);
        assert!(rules.is_empty());
    }

    #[test]
    fn test_scale_glyph_without_shift_has_no_box() {
        let donor = donor(&[(0xF02E, Rect::new(0.0, 0.0, 2000.0, 2000.0))]);
        let rules = ScaleRules::prepare(&OCTI_RULES, &donor, &cell(), false);
        assert_eq!(rules.len(), 1);
        let (scale, bounds) = rules.lookup(0xF03E).unwrap();
        assert_eq!(scale, 0.5);
        assert!(bounds.is_none());
        assert!(rules.lookup(0xF02E).is_none());
    }

    #[test]
    fn test_scale_glyph_with_shift_keeps_box() {
        let donor = donor(&[(0xF068D, Rect::new(0.0, -100.0, 1000.0, 900.0))]);
        let rules = ScaleRules::prepare(&MDI_RULES, &donor, &cell(), false);
        let (_, bounds) = rules.lookup(0xF0001).unwrap();
        let bounds = bounds.unwrap();
        assert_eq!((bounds.ymin, bounds.ymax), (-100.0, 900.0));
        assert_eq!(bounds.advance, None);
    }

    #[test]
    fn test_single_width_fits_one_cell() {
        static SPEC: ScaleRuleSpec = ScaleRuleSpec {
            name: "test",
            groups: &[&[Single(0x40), Single(0x41)]],
            scale_glyph: None,
        };
        let square = Rect::new(0.0, 0.0, 1000.0, 1000.0);
        let donor = donor(&[(0x40, square), (0x41, square), (0xE60E, square)]);

        let double = ScaleRules::prepare(&SPEC, &donor, &cell(), false);
        assert_eq!(double.lookup(0x41).unwrap().0, 1.0);
        let single = ScaleRules::prepare(&SPEC, &donor, &cell(), true);
        assert_eq!(single.lookup(0x41).unwrap().0, 0.6);

        let devicons = ScaleRules::prepare(&DEVI_RULES, &donor, &cell(), true);
        assert_eq!(devicons.lookup(0xE6BD).unwrap().0, 0.6);
    }

    #[test]
    fn test_first_match_wins() {
        static SPEC: ScaleRuleSpec = ScaleRuleSpec {
            name: "test",
            groups: &[&[Single(0x30)], &[Range(0x30, 0x31)]],
            scale_glyph: None,
        };
        let donor = donor(&[
            (0x30, Rect::new(0.0, 0.0, 4000.0, 4000.0)),
            (0x31, Rect::new(0.0, 0.0, 100.0, 100.0)),
        ]);
        let rules = ScaleRules::prepare(&SPEC, &donor, &cell(), false);
        let (scale, _) = rules.lookup(0x30).unwrap();
        assert_eq!(scale, 0.25);
    }
}
