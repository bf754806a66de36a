//! The font being patched, held in an editable form.
//!
//! Glyph ids of the source font never change: new symbols are appended, and a codepoint
//! that already had a glyph is simply pointed at the new one. Layout tables that reference
//! the old glyph stay valid.

use std::collections::{BTreeMap, HashSet};

use font_types::{GlyphId, GlyphId16, Tag, Version16Dot16};
use kurbo::Rect;
use log::{debug, warn};
use read_fonts::{
    FontRef, TableProvider,
    tables::glyf::{Anchor as ReadAnchor, Glyph as ReadGlyph},
};
use skrifa::MetadataProvider;
use write_fonts::{
    FontBuilder,
    from_obj::ToOwnedTable,
    tables::{
        cmap::Cmap,
        glyf::{
            Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, GlyfLocaBuilder, Glyph,
            Transform,
        },
        gsub::Gsub,
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        maxp::Maxp,
        os2::{Os2, SelectionFlags},
        post::Post,
    },
};

use crate::{
    Result, error::Error, ligatures::LigatureConfig, metrics::VerticalMetrics,
    outline::SimpleOutline, types::Codepoint,
};

/// Tables that go stale when glyphs are added and are not regenerated.
pub const DROPPED_TABLES: [Tag; 13] = [
    Tag::new(b"hdmx"),
    Tag::new(b"LTSH"),
    Tag::new(b"DSIG"),
    Tag::new(b"vhea"),
    Tag::new(b"vmtx"),
    Tag::new(b"fvar"),
    Tag::new(b"gvar"),
    Tag::new(b"avar"),
    Tag::new(b"cvar"),
    Tag::new(b"HVAR"),
    Tag::new(b"MVAR"),
    Tag::new(b"VVAR"),
    Tag::new(b"STAT"),
];

const USE_TYPO_METRICS: u16 = 1 << 7;
// OS/2 unicode range bits 60 (Private Use Area) and 90 (Private Use planes 15 and 16)
const PUA_BIT: u32 = 1 << (60 - 32);
const PUA_PLANES_BIT: u32 = 1 << (90 - 64);
const MAX_COMPONENT_DEPTH: usize = 16;

/// A composite glyph, kept as its components.
#[derive(Debug, Clone)]
pub struct CompositeOutline {
    pub components: Vec<Component>,
    pub bbox: Bbox,
}

/// One glyph of the target font.
#[derive(Debug, Clone)]
pub enum EditGlyph {
    Empty,
    Simple(SimpleOutline),
    Composite(CompositeOutline),
}

impl EditGlyph {
    fn from_read(glyph: &ReadGlyph) -> Self {
        match glyph {
            ReadGlyph::Simple(simple) => Self::Simple(SimpleOutline::from_glyph(simple)),
            ReadGlyph::Composite(composite) => {
                let components: Vec<Component> = composite
                    .components()
                    .map(|comp| Component {
                        glyph: comp.glyph,
                        anchor: match comp.anchor {
                            ReadAnchor::Offset { x, y } => Anchor::Offset { x, y },
                            ReadAnchor::Point { base, component } => {
                                Anchor::Point { base, component }
                            }
                        },
                        transform: Transform {
                            xx: comp.transform.xx,
                            yx: comp.transform.yx,
                            xy: comp.transform.xy,
                            yy: comp.transform.yy,
                        },
                        flags: ComponentFlags::from(comp.flags),
                    })
                    .collect();
                if components.is_empty() {
                    return Self::Empty;
                }
                let bbox = Bbox {
                    x_min: composite.x_min(),
                    y_min: composite.y_min(),
                    x_max: composite.x_max(),
                    y_max: composite.y_max(),
                };
                Self::Composite(CompositeOutline { components, bbox })
            }
        }
    }

    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Self::Empty => None,
            Self::Simple(outline) => outline.bounds(),
            Self::Composite(c) => Some(Rect::new(
                c.bbox.x_min as f64,
                c.bbox.y_min as f64,
                c.bbox.x_max as f64,
                c.bbox.y_max as f64,
            )),
        }
    }

    fn translate(&mut self, dx: i32, dy: i32) {
        match self {
            Self::Empty => {}
            Self::Simple(outline) => outline.translate(dx, dy),
            Self::Composite(c) => {
                let mut moved = false;
                for comp in &mut c.components {
                    if let Anchor::Offset { x, y } = &mut comp.anchor {
                        *x = x.saturating_add(dx as i16);
                        *y = y.saturating_add(dy as i16);
                        moved = true;
                    }
                }
                if moved {
                    c.bbox.x_min = c.bbox.x_min.saturating_add(dx as i16);
                    c.bbox.x_max = c.bbox.x_max.saturating_add(dx as i16);
                    c.bbox.y_min = c.bbox.y_min.saturating_add(dy as i16);
                    c.bbox.y_max = c.bbox.y_max.saturating_add(dy as i16);
                } else {
                    debug!("Composite glyph positioned by points, not moved");
                }
            }
        }
    }

    fn to_glyph(&self) -> Glyph {
        match self {
            Self::Empty => Glyph::Empty,
            Self::Simple(outline) => outline.to_glyph(),
            Self::Composite(c) => {
                let mut components = c.components.iter().cloned();
                let Some(first) = components.next() else {
                    return Glyph::Empty;
                };
                let mut composite = CompositeGlyph::new(first, c.bbox);
                for comp in components {
                    composite.add_component(comp, c.bbox);
                }
                Glyph::Composite(composite)
            }
        }
    }
}

/// The font being patched.
pub struct TargetFont<'a> {
    font: FontRef<'a>,
    glyphs: Vec<EditGlyph>,
    advances: Vec<u16>,
    /// Glyph names, when the source stores them in `post`.
    names: Option<Vec<String>>,
    charmap: BTreeMap<u32, u32>,
    units_per_em: u16,
    vertical: Option<VerticalMetrics>,
    panose: Option<[u8; 10]>,
    fixed_pitch: bool,
    /// Replaces the source GSUB when set.
    gsub: Option<Gsub>,
}

impl<'a> TargetFont<'a> {
    pub fn new(font: FontRef<'a>) -> Result<Self> {
        let (Ok(glyf), Ok(loca)) = (font.glyf(), font.loca(None)) else {
            return Err(Error::UnsupportedOutlines);
        };
        let num_glyphs = font.maxp()?.num_glyphs() as u32;
        let hmtx = font.hmtx()?;

        let mut glyphs = Vec::with_capacity(num_glyphs as usize);
        let mut advances = Vec::with_capacity(num_glyphs as usize);
        for gid in 0..num_glyphs {
            let glyph_id = GlyphId::new(gid);
            let glyph = match loca.get_glyf(glyph_id, &glyf) {
                Ok(Some(glyph)) => EditGlyph::from_read(&glyph),
                Ok(None) => EditGlyph::Empty,
                Err(e) => {
                    warn!("Glyph {gid} is broken ({e}), replacing it with an empty glyph");
                    EditGlyph::Empty
                }
            };
            glyphs.push(glyph);
            advances.push(hmtx.advance(glyph_id).unwrap_or(0));
        }

        let names = font.post().ok().and_then(|post| {
            let version = post.version();
            if version != Version16Dot16::VERSION_1_0 && version != Version16Dot16::VERSION_2_0 {
                return None;
            }
            Some(
                (0..num_glyphs)
                    .map(|gid| {
                        u16::try_from(gid)
                            .ok()
                            .and_then(|gid| post.glyph_name(GlyphId16::new(gid)))
                            .map(str::to_owned)
                            .unwrap_or_else(|| format!("glyph{gid}"))
                    })
                    .collect(),
            )
        });

        let charmap = font
            .charmap()
            .mappings()
            .filter(|(_, gid)| gid.to_u32() < num_glyphs)
            .map(|(cp, gid)| (cp, gid.to_u32()))
            .collect();

        Ok(Self {
            units_per_em: font.head()?.units_per_em(),
            font,
            glyphs,
            advances,
            names,
            charmap,
            vertical: None,
            panose: None,
            fixed_pitch: false,
            gsub: None,
        })
    }

    /// The unmodified source font.
    pub fn source(&self) -> &FontRef<'a> {
        &self.font
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    pub fn num_glyphs(&self) -> usize {
        self.glyphs.len()
    }

    pub fn glyph_for(&self, codepoint: u32) -> Option<u32> {
        self.charmap.get(&codepoint).copied()
    }

    pub fn contains(&self, codepoint: u32) -> bool {
        self.charmap.contains_key(&codepoint)
    }

    /// Every encoded codepoint with its glyph.
    pub fn mappings(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.charmap.iter().map(|(&cp, &gid)| (cp, gid))
    }

    pub fn codepoints_of(&self, gid: u32) -> Vec<u32> {
        self.mappings().filter(|&(_, g)| g == gid).map(|(cp, _)| cp).collect()
    }

    /// Glyphs referenced by a composite glyph.
    pub fn components_of(&self, gid: u32) -> Vec<u32> {
        match self.glyphs.get(gid as usize) {
            Some(EditGlyph::Composite(c)) => {
                c.components.iter().map(|comp| comp.glyph.to_u16() as u32).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn bounds(&self, gid: u32) -> Option<Rect> {
        self.glyphs.get(gid as usize).and_then(EditGlyph::bounds)
    }

    pub fn advance(&self, gid: u32) -> Option<u16> {
        self.advances.get(gid as usize).copied()
    }

    pub fn glyph_name(&self, gid: u32) -> Option<&str> {
        self.names.as_ref()?.get(gid as usize).map(String::as_str)
    }

    /// Advance of the glyph mapped to a codepoint.
    pub fn advance_of(&self, codepoint: u32) -> Option<u16> {
        self.glyph_for(codepoint).and_then(|gid| self.advance(gid))
    }

    /// Ink bounds of the glyph mapped to a codepoint.
    pub fn bounds_of(&self, codepoint: u32) -> Option<Rect> {
        self.glyph_for(codepoint).and_then(|gid| self.bounds(gid))
    }

    /// `(codepoint, advance, ink xmax)` of every encoded glyph in `0x21..0x17F`.
    pub fn basic_extents(&self) -> impl Iterator<Item = (u32, f64, f64)> + '_ {
        self.charmap.range(0x21..0x17F).map(|(&cp, &gid)| {
            let advance = self.advance(gid).unwrap_or(0) as f64;
            let xmax = self.bounds(gid).map_or(0.0, |b| b.x1);
            (cp, advance, xmax)
        })
    }

    /// The panose classification as it will be written.
    pub fn panose(&self) -> Option<[u8; 10]> {
        self.panose.or_else(|| {
            let os2 = self.font.os2().ok()?;
            os2.panose_10().try_into().ok()
        })
    }

    pub fn set_panose(&mut self, panose: [u8; 10]) {
        self.panose = Some(panose);
    }

    pub fn set_fixed_pitch(&mut self) {
        self.fixed_pitch = true;
    }

    pub fn set_vertical_metrics(&mut self, metrics: VerticalMetrics) {
        self.vertical = Some(metrics);
    }

    /// Disconnect the configured ligature lookups from the GSUB features.
    ///
    /// Returns the number of removed feature to lookup references.
    pub fn remove_ligatures(&mut self, config: &LigatureConfig) -> usize {
        let Ok(gsub) = self.font.gsub() else {
            debug!("Font has no GSUB table, no ligatures to remove");
            return 0;
        };
        let mut gsub: Gsub = gsub.to_owned_table();
        let removed = config.apply(&mut gsub);
        if removed > 0 {
            self.gsub = Some(gsub);
        }
        removed
    }

    /// Add a glyph for `codepoint`, replacing the mapping of an existing one.
    pub fn insert_symbol(
        &mut self,
        codepoint: u32,
        outline: SimpleOutline,
        advance: u16,
        name: Option<&str>,
    ) -> Result<u32> {
        let gid = self.glyphs.len();
        if gid > u16::MAX as usize {
            return Err(Error::TooManyGlyphs(gid + 1));
        }
        let gid = gid as u32;

        if let Some(names) = &mut self.names {
            let base = name.map_or_else(|| Codepoint::new(codepoint).glyph_name(), str::to_owned);
            let unique = unique_name(names, base);
            names.push(unique);
        }
        self.glyphs.push(EditGlyph::Simple(outline));
        self.advances.push(advance);
        if let Some(old) = self.charmap.insert(codepoint, gid) {
            debug!("Repointing {} from glyph {old} to {gid}", Codepoint::new(codepoint));
        }
        Ok(gid)
    }

    pub fn translate(&mut self, gid: u32, dx: i32, dy: i32) {
        if let Some(glyph) = self.glyphs.get_mut(gid as usize) {
            glyph.translate(dx, dy);
        }
    }

    pub fn set_advance(&mut self, gid: u32, advance: u16) {
        if let Some(slot) = self.advances.get_mut(gid as usize) {
            *slot = advance;
        }
    }

    /// Move ink that sticks out on the left inside, and widen the glyph if the ink sticks
    /// out on the right.
    pub fn remove_negative_bearings(&mut self, gid: u32) {
        let (Some(bounds), Some(advance)) = (self.bounds(gid), self.advance(gid)) else {
            return;
        };
        let mut advance = advance as i32;
        let xmin = bounds.x0 as i32;
        let mut xmax = bounds.x1 as i32;
        if xmin < 0 {
            self.translate(gid, -xmin, 0);
            advance -= xmin;
            xmax -= xmin;
        }
        if advance < xmax {
            advance = xmax;
        }
        self.set_advance(gid, advance.clamp(0, u16::MAX as i32) as u16);
    }

    /// Serialize the patched font.
    pub fn build(&self) -> Result<Vec<u8>> {
        let num_glyphs = self.glyphs.len();
        if num_glyphs > u16::MAX as usize {
            return Err(Error::TooManyGlyphs(num_glyphs));
        }

        let mut builder = FontBuilder::new();
        for record in self.font.table_directory.table_records() {
            let tag = record.tag();
            if DROPPED_TABLES.contains(&tag) {
                debug!("Dropping table {tag}");
                continue;
            }
            if let Some(data) = self.font.table_data(tag) {
                builder.add_raw(tag, data);
            }
        }

        let mut glyf_builder = GlyfLocaBuilder::new();
        for (gid, glyph) in self.glyphs.iter().enumerate() {
            if let Err(e) = glyf_builder.add_glyph(&glyph.to_glyph()) {
                warn!("Glyph {gid} could not be written ({e:?}), writing it empty");
                let _ = glyf_builder.add_glyph(&Glyph::Empty);
            }
        }
        let (glyf, loca, loca_format) = glyf_builder.build();
        builder.add_table(&glyf)?;
        builder.add_table(&loca)?;

        let bounds: Vec<Option<Rect>> = self.glyphs.iter().map(EditGlyph::bounds).collect();
        let font_box = bounds.iter().flatten().copied().reduce(|a, b| a.union(b));

        let mut head: Head = self.font.head()?.to_owned_table();
        head.index_to_loc_format = loca_format as i16;
        if let Some(b) = font_box {
            head.x_min = b.x0 as i16;
            head.y_min = b.y0 as i16;
            head.x_max = b.x1 as i16;
            head.y_max = b.y1 as i16;
        }
        builder.add_table(&head)?;

        let hmtx = Hmtx::new(
            self.advances
                .iter()
                .zip(&bounds)
                .map(|(&advance, b)| LongMetric {
                    advance,
                    side_bearing: b.map_or(0, |b| b.x0 as i16),
                })
                .collect(),
            Vec::new(),
        );
        builder.add_table(&hmtx)?;
        builder.add_table(&self.hhea(&bounds)?)?;
        builder.add_table(&self.maxp()?)?;
        builder.add_table(&self.cmap()?)?;
        if let Some(gsub) = &self.gsub {
            builder.add_table(gsub)?;
        }

        if let Ok(post) = self.font.post() {
            let mut post: Post = post.to_owned_table();
            if let Some(names) = &self.names {
                let v2 = Post::new_v2(names.iter().map(String::as_str));
                post.version = v2.version;
                post.num_glyphs = v2.num_glyphs;
                post.glyph_name_index = v2.glyph_name_index;
                post.string_data = v2.string_data;
            }
            if self.fixed_pitch {
                post.is_fixed_pitch = 1;
            }
            builder.add_table(&post)?;
        }

        if let Ok(os2) = self.font.os2() {
            let version = os2.version();
            let mut os2: Os2 = os2.to_owned_table();
            self.update_os2(&mut os2, version);
            builder.add_table(&os2)?;
        }

        Ok(builder.build())
    }

    fn hhea(&self, bounds: &[Option<Rect>]) -> Result<Hhea> {
        let mut hhea: Hhea = self.font.hhea()?.to_owned_table();
        let mut min_lsb = i16::MAX;
        let mut min_rsb = i16::MAX;
        let mut max_extent = i16::MIN;
        for (&advance, b) in self.advances.iter().zip(bounds) {
            let Some(b) = b else { continue };
            min_lsb = min_lsb.min(b.x0 as i16);
            min_rsb = min_rsb.min((advance as f64 - b.x1) as i16);
            max_extent = max_extent.max(b.x1 as i16);
        }
        if max_extent != i16::MIN {
            hhea.min_left_side_bearing = min_lsb.into();
            hhea.min_right_side_bearing = min_rsb.into();
            hhea.x_max_extent = max_extent.into();
        }
        hhea.advance_width_max = self.advances.iter().copied().max().unwrap_or(0).into();
        hhea.number_of_h_metrics = self.advances.len() as u16;
        if let Some(v) = &self.vertical {
            hhea.ascender = (v.hhea_ascent as i16).into();
            hhea.descender = (v.hhea_descent as i16).into();
            hhea.line_gap = (v.hhea_line_gap as i16).into();
        }
        Ok(hhea)
    }

    fn maxp(&self) -> Result<Maxp> {
        let mut maxp: Maxp = self.font.maxp()?.to_owned_table();
        maxp.num_glyphs = self.glyphs.len() as u16;

        let mut points = 0usize;
        let mut contours = 0usize;
        let mut composite_points = 0usize;
        let mut composite_contours = 0usize;
        let mut component_elements = 0usize;
        let mut component_depth = 0usize;
        for (gid, glyph) in self.glyphs.iter().enumerate() {
            match glyph {
                EditGlyph::Empty => {}
                EditGlyph::Simple(outline) => {
                    points = points.max(outline.point_count());
                    contours = contours.max(outline.contours.len());
                }
                EditGlyph::Composite(c) => {
                    let (p, n, depth) = self.composite_stats(gid as u32, 0);
                    composite_points = composite_points.max(p);
                    composite_contours = composite_contours.max(n);
                    component_depth = component_depth.max(depth);
                    component_elements = component_elements.max(c.components.len());
                }
            }
        }
        let clamp = |v: usize| Some(v.min(u16::MAX as usize) as u16);
        maxp.max_points = clamp(points);
        maxp.max_contours = clamp(contours);
        maxp.max_composite_points = clamp(composite_points);
        maxp.max_composite_contours = clamp(composite_contours);
        maxp.max_component_elements = clamp(component_elements);
        maxp.max_component_depth = clamp(component_depth);
        Ok(maxp)
    }

    /// Total points, total contours and nesting depth of a glyph.
    fn composite_stats(&self, gid: u32, depth: usize) -> (usize, usize, usize) {
        if depth > MAX_COMPONENT_DEPTH {
            return (0, 0, depth);
        }
        match self.glyphs.get(gid as usize) {
            Some(EditGlyph::Simple(outline)) => {
                (outline.point_count(), outline.contours.len(), depth)
            }
            Some(EditGlyph::Composite(c)) => {
                c.components.iter().fold((0, 0, depth + 1), |acc, comp| {
                    let (p, n, d) = self.composite_stats(comp.glyph.to_u16() as u32, depth + 1);
                    (acc.0 + p, acc.1 + n, acc.2.max(d))
                })
            }
            _ => (0, 0, depth),
        }
    }

    fn cmap(&self) -> Result<Cmap> {
        let mappings = self
            .charmap
            .iter()
            .filter_map(|(&cp, &gid)| Some((char::from_u32(cp)?, GlyphId::new(gid))));
        Cmap::from_mappings(mappings).map_err(|e| Error::Cmap(format!("{e:?}")))
    }

    fn update_os2(&self, os2: &mut Os2, version: u16) {
        if let Some(v) = &self.vertical {
            os2.s_typo_ascender = v.typo_ascent as i16;
            os2.s_typo_descender = v.typo_descent as i16;
            os2.s_typo_line_gap = v.typo_line_gap as i16;
            os2.us_win_ascent = v.win_ascent.clamp(0, u16::MAX as i32) as u16;
            os2.us_win_descent = v.win_descent.clamp(0, u16::MAX as i32) as u16;
            if v.use_typo_metrics {
                if version >= 4 {
                    let bits = os2.fs_selection.bits() | USE_TYPO_METRICS;
                    os2.fs_selection = SelectionFlags::from_bits_truncate(bits);
                } else {
                    debug!("OS/2 version {version} has no USE_TYPO_METRICS bit");
                }
            }
        }
        if let Some(panose) = self.panose {
            os2.panose_10 = panose;
        }
        if let (Some(first), Some(last)) =
            (self.charmap.keys().next(), self.charmap.keys().next_back())
        {
            os2.us_first_char_index = (*first).min(0xFFFF) as u16;
            os2.us_last_char_index = (*last).min(0xFFFF) as u16;
        }
        let codepoints = self.charmap.keys().map(|&cp| Codepoint::new(cp));
        let (mut bmp, mut planes) = (false, false);
        for cp in codepoints.filter(|cp| cp.is_private_use()) {
            if cp.to_u32() <= 0xFFFF {
                bmp = true;
            } else {
                planes = true;
            }
        }
        if bmp {
            os2.ul_unicode_range_2 |= PUA_BIT;
        }
        if planes {
            os2.ul_unicode_range_3 |= PUA_PLANES_BIT;
        }
    }
}

fn unique_name(names: &[String], base: String) -> String {
    let taken: HashSet<&str> = names.iter().map(String::as_str).collect();
    if !taken.contains(base.as_str()) {
        return base;
    }
    (1..)
        .map(|n| format!("{base}.{n}"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or(base)
}
