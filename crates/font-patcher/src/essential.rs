//! Codepoints a patch must never overwrite.
//!
//! Basic Latin and Latin Extended-A glyphs are essential, and so is everything they are
//! built from or substituted by: the glyphs of composites and the outputs of single and
//! ligature substitutions that start at a basic glyph.

use std::collections::{BTreeSet, HashSet};

use log::debug;
use read_fonts::{
    TableProvider,
    tables::gsub::{LigatureSubstFormat1, SingleSubst, SubstitutionSubtables},
};

use crate::{Result, target::TargetFont};

/// First and last basic codepoint.
const BASIC_RANGE: (u32, u32) = (0x21, 0x17F);

/// Codepoints that must keep their glyphs.
pub fn essential_codepoints(font: &TargetFont) -> Result<BTreeSet<u32>> {
    let basic: BTreeSet<u32> =
        (BASIC_RANGE.0..=BASIC_RANGE.1).filter(|&cp| font.contains(cp)).collect();
    let basic_glyphs: HashSet<u32> = basic.iter().filter_map(|&cp| font.glyph_for(cp)).collect();

    let mut glyphs: BTreeSet<u32> = basic_glyphs.iter().copied().collect();
    glyphs.extend(substitution_outputs(font, &basic_glyphs)?);

    let mut essential = BTreeSet::new();
    let mut pending: Vec<u32> = glyphs.into_iter().collect();
    let mut seen: HashSet<u32> = HashSet::new();
    while let Some(gid) = pending.pop() {
        if !seen.insert(gid) {
            continue;
        }
        essential.extend(font.codepoints_of(gid));
        pending.extend(font.components_of(gid));
    }

    debug!("{} essential codepoints ({} basic)", essential.len(), basic.len());
    Ok(essential)
}

/// Output glyphs of single and ligature substitutions applied to `inputs`.
fn substitution_outputs(font: &TargetFont, inputs: &HashSet<u32>) -> Result<BTreeSet<u32>> {
    let mut outputs = BTreeSet::new();
    let Ok(gsub) = font.source().gsub() else {
        return Ok(outputs);
    };
    let lookups = gsub.lookup_list()?;

    for lookup in lookups.lookups().iter().flatten() {
        match lookup.subtables()? {
            SubstitutionSubtables::Single(tables) => {
                for table in tables.iter().flatten() {
                    single_outputs(&table, inputs, &mut outputs)?;
                }
            }
            SubstitutionSubtables::Ligature(tables) => {
                for table in tables.iter().flatten() {
                    ligature_outputs(&table, inputs, &mut outputs)?;
                }
            }
            _ => {}
        }
    }
    Ok(outputs)
}

fn single_outputs(
    subtable: &SingleSubst<'_>,
    inputs: &HashSet<u32>,
    outputs: &mut BTreeSet<u32>,
) -> Result<()> {
    match subtable {
        SingleSubst::Format1(fmt) => {
            let delta = fmt.delta_glyph_id() as i32;
            for gid in fmt.coverage()?.iter() {
                let gid = gid.to_u32();
                if inputs.contains(&gid) {
                    outputs.insert((gid as i32 + delta).rem_euclid(0x10000) as u32);
                }
            }
        }
        SingleSubst::Format2(fmt) => {
            let subs = fmt.substitute_glyph_ids();
            for (gid, new) in fmt.coverage()?.iter().zip(subs) {
                if inputs.contains(&gid.to_u32()) {
                    outputs.insert(new.get().to_u32());
                }
            }
        }
    }
    Ok(())
}

fn ligature_outputs(
    subtable: &LigatureSubstFormat1<'_>,
    inputs: &HashSet<u32>,
    outputs: &mut BTreeSet<u32>,
) -> Result<()> {
    let coverage = subtable.coverage()?;
    for (gid, set) in coverage.iter().zip(subtable.ligature_sets().iter()) {
        if !inputs.contains(&gid.to_u32()) {
            continue;
        }
        let Ok(set) = set else { continue };
        for ligature in set.ligatures().iter().flatten() {
            outputs.insert(ligature.ligature_glyph().to_u32());
        }
    }
    Ok(())
}
