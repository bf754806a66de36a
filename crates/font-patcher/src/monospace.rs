//! Detecting and enforcing monospaced fonts.

use std::fmt::{self, Display, Formatter};

use log::{info, warn};

use crate::{Result, error::Error, target::TargetFont, types::Codepoint};

/// Glyphs compared by the width check: `I M W a i m .`
const SAMPLE_GLYPHS: [u32; 7] = [0x49, 0x4D, 0x57, 0x61, 0x69, 0x6D, 0x2E];

/// Sample glyphs that are allowed to be narrower than the rest: `i .`
const NARROW_EXCEPTIONS: [u32; 2] = [0x69, 0x2E];

/// What the panose classification says about the pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanoseCheck {
    Invalid,
    Monospaced,
    Proportional,
}

impl Display for PanoseCheck {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => f.write_str("Panose is invalid"),
            Self::Monospaced => f.write_str("Panose says \"monospaced\""),
            Self::Proportional => f.write_str("Panose says \"not monospaced\""),
        }
    }
}

pub fn check_panose_monospaced(panose: &[u8; 10]) -> PanoseCheck {
    let (kind, proportion) = (panose[0], panose[3]);
    if !(2..=5).contains(&kind) {
        return PanoseCheck::Invalid;
    }
    if (kind == 2 && proportion == 9) || (kind == 3 && proportion == 3) {
        PanoseCheck::Monospaced
    } else {
        PanoseCheck::Proportional
    }
}

fn panose_check(font: &TargetFont) -> PanoseCheck {
    font.panose().map_or(PanoseCheck::Invalid, |p| check_panose_monospaced(&p))
}

/// Spot check the advance widths.
///
/// Returns whether the font looks monospaced and, if not, the first offending codepoint.
/// Fonts missing one of the sample glyphs are judged by their panose.
pub fn is_monospaced(font: &TargetFont) -> (bool, Option<u32>) {
    let mut reference: Option<u16> = None;
    for cp in SAMPLE_GLYPHS {
        let Some(advance) = font.advance_of(cp) else {
            return (panose_check(font) == PanoseCheck::Monospaced, None);
        };
        let Some(width) = reference else {
            reference = Some(advance);
            continue;
        };
        if advance == width {
            continue;
        }
        if NARROW_EXCEPTIONS.contains(&cp) {
            if width > advance {
                continue;
            }
            let ink = font.bounds_of(cp).map_or(0.0, |b| b.width());
            if (width as f64) > ink {
                continue;
            }
        }
        return (false, Some(cp));
    }
    (true, None)
}

/// Smallest or largest non-zero advance of the basic (or extended) glyphs; 0 if there are
/// none.
pub fn advance_width(font: &TargetFont, extended: bool, minimum: bool) -> u16 {
    let end = if extended { 0x17F } else { 0x7E };
    let advances = (0x21..end)
        .filter(|cp| !(0x7F..0xBF).contains(cp))
        .filter_map(|cp| font.advance_of(cp))
        .filter(|&advance| advance != 0);
    let width = if minimum { advances.min() } else { advances.max() };
    width.unwrap_or(0)
}

pub fn report_advance_widths(font: &TargetFont) -> String {
    format!(
        "Advance widths (base/extended): {} - {} / {} - {}",
        advance_width(font, true, true),
        advance_width(font, false, true),
        advance_width(font, false, false),
        advance_width(font, true, false),
    )
}

/// Check that a font asked to be patched in `--mono` mode is monospaced.
///
/// `single_count` is how often `--mono` was given; twice or more forces patching.
pub fn assert_monospace(font: &TargetFont, single_count: u8) -> Result<()> {
    let (width_mono, offending) = is_monospaced(font);
    let panose = panose_check(font);

    if (width_mono && panose == PanoseCheck::Proportional)
        || (!width_mono && panose == PanoseCheck::Monospaced)
    {
        warn!("Monospaced check: Panose assumed to be wrong");
        warn!("{} and {panose}", report_advance_widths(font));
    }
    if width_mono {
        return Ok(());
    }

    warn!("Font is not monospaced, forcing it to monospace is not advisable");
    if let Some(cp) = offending {
        warn!("Offending char: {}", Codepoint::new(cp));
    }
    if single_count <= 1 {
        return Err(Error::NotMonospaced { offending: Codepoint::new(offending.unwrap_or(0)) });
    }
    Ok(())
}

/// Give every glyph the cell width and mark the font monospaced.
///
/// Zero-width glyphs are meant to be drawn over their neighbour and keep their bearings.
pub fn enforce_monospace(font: &mut TargetFont, cell_width: u16) {
    let mut changed = 0usize;
    for gid in 0..font.num_glyphs() as u32 {
        let advance = font.advance(gid).unwrap_or(0);
        if advance == cell_width {
            continue;
        }
        if advance != 0 {
            font.remove_negative_bearings(gid);
        }
        font.set_advance(gid, cell_width);
        changed += 1;
    }
    info!("Set the advance width of {changed} glyphs to {cell_width}");

    if let Some(mut panose) = font.panose()
        && (panose[0] == 0 || panose[0] == 2)
    {
        panose[0] = 2;
        panose[3] = 9;
        font.set_panose(panose);
    }
    font.set_fixed_pitch();
}
