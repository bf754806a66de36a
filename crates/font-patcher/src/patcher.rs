//! The patch pipeline: prepare the target, then copy every enabled symbol range into it.

use std::{
    collections::{BTreeSet, HashMap},
    path::{Path, PathBuf},
};

use font_types::Tag;
use indexmap::IndexMap;
use kurbo::Affine;
use log::{debug, info, warn};
use read_fonts::{FileRef, FontRef};

use crate::{
    Result,
    error::Error,
    essential::essential_codepoints,
    fit::{
        FitMode, alignment_offset, apply_overlap, limit_xy_ratio, scale_factors, symbol_advance,
    },
    geometry::GlyphDimensions,
    metrics::{CellMetrics, VerticalMetrics},
    monospace::{assert_monospace, enforce_monospace, report_advance_widths},
    options::PatchOptions,
    patch_set::{SymbolRange, patch_set},
    scale_rules::ScaleRules,
    symbol::{SymbolFont, SymbolGlyphs},
    target::TargetFont,
    types::Codepoint,
};

/// Everything `copy_glyphs` needs to know about the prepared target.
#[derive(Debug)]
struct Layout {
    cell: CellMetrics,
    essential: BTreeSet<u32>,
    extra_wide: bool,
    mode: FitMode,
}

/// Patches symbol glyphs into fonts.
#[derive(Debug, Clone)]
pub struct Patcher {
    options: PatchOptions,
    ranges: Vec<SymbolRange>,
}

impl Patcher {
    pub fn new(options: PatchOptions) -> Self {
        let ranges = patch_set(&options.sets, options.custom.as_ref());
        Self { options, ranges }
    }

    pub fn options(&self) -> &PatchOptions {
        &self.options
    }

    /// The enabled symbol ranges, in patching order.
    pub fn ranges(&self) -> &[SymbolRange] {
        &self.ranges
    }

    /// Location of a range's symbol font.
    pub fn donor_path(&self, range: &SymbolRange) -> PathBuf {
        self.options.glyph_dir.join(&range.filename)
    }

    /// Check that the glyph directory and every needed symbol font exist.
    pub fn check_sources(&self) -> Result<()> {
        if !self.options.glyph_dir.is_dir() {
            return Err(Error::MissingGlyphDir(self.options.glyph_dir.clone()));
        }
        for range in &self.ranges {
            let path = self.donor_path(range);
            if !path.is_file() {
                return Err(Error::MissingSymbolFont { set: range.name.to_string(), path });
            }
        }
        Ok(())
    }

    /// Patch a single font file.
    pub fn patch(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.patch_font(FontRef::new(data)?)
    }

    /// Patch a font file or every face of a collection.
    pub fn patch_collection(&self, data: &[u8]) -> Result<Vec<Vec<u8>>> {
        match FileRef::new(data)? {
            FileRef::Font(font) => Ok(vec![self.patch_font(font)?]),
            FileRef::Collection(collection) => {
                let count = collection.len();
                collection
                    .iter()
                    .enumerate()
                    .map(|(i, font)| {
                        info!("Patching face {}/{count}", i + 1);
                        self.patch_font(font?)
                    })
                    .collect()
            }
        }
    }

    pub fn patch_font(&self, font: FontRef) -> Result<Vec<u8>> {
        if font.table_data(Tag::new(b"fvar")).is_some() {
            warn!("Font is a variable font, patching its default instance only");
        }

        let mut target = TargetFont::new(font)?;
        if let Some(ligatures) = &self.options.ligatures {
            let removed = target.remove_ligatures(ligatures);
            info!("Removed {removed} ligature lookup references");
        }
        let essential = essential_codepoints(&target)?;
        if self.options.is_single_width() {
            assert_monospace(&target, self.options.single_width)?;
        }

        let layout = self.prepare(&mut target, essential)?;
        if self.options.is_single_width() {
            enforce_monospace(&mut target, layout.cell.width as u16);
        }

        self.check_sources()?;
        let fonts: IndexMap<PathBuf, SymbolFont> = self
            .ranges
            .iter()
            .map(|range| self.donor_path(range))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|path| -> Result<_> { Ok((path.clone(), SymbolFont::open(&path)?)) })
            .collect::<Result<_>>()?;
        let upem = target.units_per_em();
        let donors: IndexMap<&Path, SymbolGlyphs<'_>> = fonts
            .iter()
            .map(|(path, font)| -> Result<_> { Ok((path.as_path(), font.glyphs(upem)?)) })
            .collect::<Result<_>>()?;

        // Keyed by rule name; the fit mode is fixed per patcher
        let mut rules: HashMap<&'static str, ScaleRules> = HashMap::new();
        let mut added = 0;
        for range in &self.ranges {
            let path = self.donor_path(range);
            let Some(donor) = donors.get(path.as_path()) else {
                return Err(Error::MissingSymbolFont { set: range.name.to_string(), path });
            };
            let range_rules = match range.scale_rules {
                Some(spec) => Some(
                    &*rules.entry(spec.name).or_insert_with(|| {
                        ScaleRules::prepare(spec, donor, &layout.cell, layout.mode.single_width)
                    }),
                ),
                None => None,
            };
            added += copy_glyphs(&mut target, donor, range, range_rules, &layout, &self.options)?;
        }
        info!("Added {added} glyphs, {} glyphs total", target.num_glyphs());

        target.build()
    }

    /// Measure the cell and unify the vertical metrics.
    fn prepare(&self, target: &mut TargetFont, essential: BTreeSet<u32>) -> Result<Layout> {
        let mode = self.options.fit_mode();
        let units_per_em = target.units_per_em();
        let (ymin, ymax) = VerticalMetrics::from_font(target.source())?.cell_extent();
        let mut cell = CellMetrics::from_extent(ymin, ymax, units_per_em)?;

        let mut vertical = VerticalMetrics::unified(cell.ymin as i32, cell.ymax as i32);
        if self.options.adjust_line_height {
            vertical.even_line_height();
        }
        target.set_vertical_metrics(vertical);

        if cell.widen(target.basic_extents()).is_some() && !mode.variable_width {
            warn!("Extended glyphs wider than basic glyphs, results might be useless");
            warn!("{}", report_advance_widths(target));
        }
        if cell.width <= 0.0 {
            warn!("Font has no basic glyphs, using the em as cell width");
            cell.width = units_per_em as f64;
            cell.xmax = cell.xmax.max(cell.width);
        }
        debug!(
            "Cell {}x{} (y {}..{}, xmax {})",
            cell.width, cell.height, cell.ymin, cell.ymax, cell.xmax
        );

        let extra_wide = cell.is_extra_wide();
        if extra_wide {
            info!("Very wide and short font, disabling 2 cell Powerline glyphs");
        }
        Ok(Layout { cell, essential, extra_wide, mode })
    }
}

/// Copy the symbols of one range into the target.
///
/// Returns the number of glyphs added.
fn copy_glyphs(
    target: &mut TargetFont,
    donor: &SymbolGlyphs,
    range: &SymbolRange,
    rules: Option<&ScaleRules>,
    layout: &Layout,
    options: &PatchOptions,
) -> Result<usize> {
    let cell = &layout.cell;
    let mode = layout.mode;
    let careful = options.careful || range.careful || range.selects_all();
    let selected = donor.select(range.sym_start, range.sym_end);
    info!("Adding {} glyphs from {} set", selected.len().max(1), range.name);

    let mut previous: Option<u32> = None;
    let mut counter = 0;
    let mut added = 0;
    for symbol in &selected {
        let mut attrs = range.attributes.lookup(symbol.codepoint);
        if layout.extra_wide {
            attrs.stretch = attrs.stretch.single_cell();
        }

        let destination = if range.exact {
            let next = symbol.codepoints().filter(|&cp| previous.is_none_or(|p| cp > p)).min();
            let Some(cp) = next else {
                let codepoint = Codepoint::new(symbol.codepoint);
                warn!("Can not determine codepoint of {codepoint}, skipping");
                continue;
            };
            previous = Some(cp);
            cp
        } else {
            counter += 1;
            range.destination_start() + counter - 1
        };

        let essential = layout.essential.contains(&destination);
        if (careful || attrs.careful || essential) && target.contains(destination) {
            let kind = if essential { "essential" } else { "existing" };
            info!("Found {kind} glyph at {}, skipping", Codepoint::new(destination));
            continue;
        }
        debug!(
            "Updating glyph {} (glyph {}) putting at {}",
            Codepoint::new(symbol.codepoint),
            symbol.glyph.to_u32(),
            Codepoint::new(destination)
        );

        let drawn = donor.outline(symbol.glyph)?;
        let group = rules.and_then(|r| r.lookup(symbol.codepoint));

        let own = GlyphDimensions::from_bounds(drawn.bounds, None);
        let (dims, mut scale) = match group {
            Some((factor, bounds)) => (bounds.unwrap_or(own), (factor, factor)),
            None => (own, scale_factors(cell, &own, attrs.stretch, mode.single_width)),
        };
        let has_area = dims.width() > 0.0 && dims.height() > 0.0;
        let overlap = attrs.overlap();
        if let Some(overlap) = overlap
            && has_area
        {
            scale = apply_overlap(cell, &dims, scale, overlap);
        }
        if let Some(max_ratio) = attrs.max_xy_ratio
            && has_area
        {
            scale = limit_xy_ratio(&dims, scale, max_ratio);
        }

        let mut path = drawn.path;
        if scale != (1.0, 1.0) {
            path.apply_affine(Affine::scale_non_uniform(scale.0, scale.1));
        }
        let mut outline = donor.to_simple(&path);

        // Align by the scaled glyph, or by the scaled group box
        let scaled = outline.bounds().map_or_else(GlyphDimensions::default, |b| {
            GlyphDimensions::from_bounds(b, None)
        });
        let sym = match group {
            Some((_, Some(bounds))) => {
                let mut group_box = bounds.scaled(scale.0, scale.1);
                if group_box.advance.is_none() {
                    group_box.xmin = scaled.xmin;
                    group_box.xmax = scaled.xmax;
                }
                group_box
            }
            _ => scaled,
        };
        let (dx, dy) = alignment_offset(cell, &sym, &attrs, mode);
        outline.translate(dx.round() as i32, dy.round() as i32);

        let pasted_advance = drawn.advance.round().clamp(0.0, u16::MAX as f64) as u16;
        let name = drawn.name.as_deref();
        let gid = target.insert_symbol(destination, outline, pasted_advance, name)?;
        if overlap.is_none() {
            target.remove_negative_bearings(gid);
        }
        let advance = symbol_advance(cell, &sym, &attrs, mode.variable_width);
        target.set_advance(gid, advance.clamp(0, u16::MAX as i32) as u16);
        added += 1;

        if mode.single_width
            && let Some(bounds) = target.bounds(gid)
        {
            let limit = cell.width * (1.0 + overlap.unwrap_or(0.0));
            let width = bounds.width() as i32;
            if width as f64 > limit {
                warn!(
                    "Scaled glyph {} wider than one monospace width ({width} / {} (overlap {}))",
                    Codepoint::new(destination),
                    cell.width,
                    overlap.unwrap_or(0.0)
                );
            }
        }
    }
    Ok(added)
}
