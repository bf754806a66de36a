//! Donor fonts that symbols are copied from.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
};

use font_types::{GlyphId, GlyphId16, Tag};
use kurbo::{BezPath, Rect, Shape};
use log::debug;
use read_fonts::{FontRef, TableProvider};
use skrifa::{
    MetadataProvider,
    instance::{LocationRef, Size},
    outline::DrawSettings,
};

use crate::{
    Result,
    error::Error,
    geometry::MeasuredGlyph,
    outline::{PathPen, SimpleOutline},
    scale_rules::GlyphMeasure,
};

/// Raw bytes of a donor font.
#[derive(Debug, Clone)]
pub struct SymbolFont {
    pub path: PathBuf,
    data: Vec<u8>,
}

impl SymbolFont {
    pub fn open(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        Ok(Self { path: path.to_path_buf(), data })
    }

    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Self {
        Self { path: path.into(), data }
    }

    /// Parse the font, with outlines scaled to `target_upem`.
    pub fn glyphs(&self, target_upem: u16) -> Result<SymbolGlyphs<'_>> {
        SymbolGlyphs::new(FontRef::new(&self.data)?, target_upem)
    }
}

/// A glyph picked from a donor range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedGlyph {
    /// Lowest codepoint of the glyph within the selection.
    pub codepoint: u32,
    pub glyph: GlyphId,
    /// Further codepoints of the same glyph within the selection.
    pub alternates: Vec<u32>,
}

impl SelectedGlyph {
    /// All selected codepoints of the glyph, ascending.
    pub fn codepoints(&self) -> impl Iterator<Item = u32> + '_ {
        std::iter::once(self.codepoint).chain(self.alternates.iter().copied())
    }
}

/// A donor glyph drawn at the target em.
#[derive(Debug, Clone)]
pub struct SymbolOutline {
    pub path: BezPath,
    pub bounds: Rect,
    pub advance: f64,
    pub name: Option<String>,
}

/// Parsed donor font.
pub struct SymbolGlyphs<'a> {
    font: FontRef<'a>,
    charmap: BTreeMap<u32, GlyphId>,
    size: Size,
    cubic: bool,
}

impl<'a> SymbolGlyphs<'a> {
    pub fn new(font: FontRef<'a>, target_upem: u16) -> Result<Self> {
        let charmap: BTreeMap<u32, GlyphId> = font.charmap().mappings().collect();
        let cubic = font.table_data(Tag::new(b"CFF ")).is_some()
            || font.table_data(Tag::new(b"CFF2")).is_some();
        debug!(
            "Symbol font: {} encoded glyphs, {} outlines, em {}",
            charmap.len(),
            if cubic { "CFF" } else { "TrueType" },
            font.head()?.units_per_em()
        );
        Ok(Self { font, charmap, size: Size::new(target_upem as f32), cubic })
    }

    pub fn glyph_for(&self, codepoint: u32) -> Option<GlyphId> {
        self.charmap.get(&codepoint).copied()
    }

    /// Encoded glyphs in `start..=end`, each glyph once, in codepoint order.
    ///
    /// `0..=0` selects every encoded glyph.
    pub fn select(&self, start: u32, end: u32) -> Vec<SelectedGlyph> {
        let range = if start == 0 && end == 0 { 0..=u32::MAX } else { start..=end };
        let mut selected: Vec<SelectedGlyph> = Vec::new();
        let mut index: HashMap<GlyphId, usize> = HashMap::new();

        for (&codepoint, &glyph) in self.charmap.range(range) {
            if glyph == GlyphId::NOTDEF {
                continue;
            }
            match index.get(&glyph) {
                Some(&i) => selected[i].alternates.push(codepoint),
                None => {
                    index.insert(glyph, selected.len());
                    selected.push(SelectedGlyph { codepoint, glyph, alternates: Vec::new() });
                }
            }
        }
        selected
    }

    /// Draw a glyph at the target em.
    pub fn outline(&self, glyph: GlyphId) -> Result<SymbolOutline> {
        let mut pen = PathPen::default();
        if let Some(outline) = self.font.outline_glyphs().get(glyph) {
            outline
                .draw(DrawSettings::unhinted(self.size, LocationRef::default()), &mut pen)
                .map_err(|e| Error::Draw { glyph: glyph.to_u32(), message: e.to_string() })?;
        }
        let path = pen.0;
        let bounds = if path.elements().is_empty() { Rect::ZERO } else { path.bounding_box() };
        let advance = self
            .font
            .glyph_metrics(self.size, LocationRef::default())
            .advance_width(glyph)
            .unwrap_or(0.0) as f64;

        Ok(SymbolOutline { path, bounds, advance, name: self.glyph_name(glyph) })
    }

    /// Convert a drawn outline to TrueType contours with TrueType winding.
    pub fn to_simple(&self, path: &BezPath) -> SimpleOutline {
        let mut outline = SimpleOutline::from_path(path);
        if self.cubic {
            outline.reverse_contours();
        }
        outline
    }

    fn glyph_name(&self, glyph: GlyphId) -> Option<String> {
        let post = self.font.post().ok()?;
        let gid = GlyphId16::new(u16::try_from(glyph.to_u32()).ok()?);
        post.glyph_name(gid).filter(|n| !n.is_empty()).map(str::to_owned)
    }
}

impl GlyphMeasure for SymbolGlyphs<'_> {
    fn measure(&self, codepoint: u32) -> Option<MeasuredGlyph> {
        let glyph = self.glyph_for(codepoint)?;
        let outline = self.outline(glyph).ok()?;
        Some(MeasuredGlyph::new(outline.bounds, outline.advance))
    }
}
