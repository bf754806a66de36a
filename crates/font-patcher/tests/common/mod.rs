//! In-memory test fonts.

#![allow(dead_code)]

use std::{fs, path::Path};

use read_fonts::{tables::glyf::CurvePoint, types::GlyphId};
use tempfile::TempDir;
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::Cmap,
        glyf::{
            Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, Contour, GlyfLocaBuilder,
            Glyph, SimpleGlyph, Transform,
        },
        gsub::{Gsub, SubstitutionLookup},
        head::Head,
        hhea::Hhea,
        layout::{Feature, FeatureList, FeatureRecord, LookupList, ScriptList},
        hmtx::{Hmtx, LongMetric},
        maxp::Maxp,
        os2::Os2,
        post::Post,
    },
};

const EMPTY_BBOX: Bbox = Bbox { x_min: 0, y_min: 0, x_max: 0, y_max: 0 };

/// Outline of a test glyph.
#[derive(Debug, Clone)]
pub enum Shape {
    Empty,
    /// A rectangle `(x_min, y_min, x_max, y_max)`.
    Rect(i16, i16, i16, i16),
    /// Components as `(glyph index, x offset, y offset)`.
    Composite(Vec<(u16, i16, i16)>),
}

#[derive(Debug, Clone)]
pub struct TestGlyph {
    pub name: String,
    pub codepoints: Vec<u32>,
    pub shape: Shape,
    pub advance: u16,
}

/// Builds small TrueType fonts.
#[derive(Debug, Clone)]
pub struct TestFont {
    units_per_em: u16,
    glyphs: Vec<TestGlyph>,
    os2_version: Option<u16>,
    panose: [u8; 10],
    glyph_names: bool,
    /// hhea ascender, descender and line gap
    hhea: (i16, i16, i16),
    /// OS/2 typo ascender, descender and line gap
    typo: (i16, i16, i16),
    /// OS/2 win ascent and descent
    win: (u16, u16),
    gsub: Option<Gsub>,
}

impl TestFont {
    pub fn new(units_per_em: u16) -> Self {
        let ascent = (units_per_em as i32 * 4 / 5) as i16;
        let descent = ascent - units_per_em as i16;
        let notdef = TestGlyph {
            name: ".notdef".to_string(),
            codepoints: vec![],
            shape: Shape::Empty,
            advance: units_per_em / 2,
        };
        Self {
            units_per_em,
            glyphs: vec![notdef],
            os2_version: Some(4),
            panose: [0; 10],
            glyph_names: false,
            hhea: (ascent, descent, 0),
            typo: (ascent, descent, 0),
            win: (ascent as u16, (-descent) as u16),
            gsub: None,
        }
    }

    pub fn glyph(mut self, name: &str, codepoints: &[u32], shape: Shape, advance: u16) -> Self {
        self.glyphs.push(TestGlyph {
            name: name.to_string(),
            codepoints: codepoints.to_vec(),
            shape,
            advance,
        });
        self
    }

    pub fn rect(self, codepoint: u32, rect: (i16, i16, i16, i16), advance: u16) -> Self {
        let name = format!("uni{codepoint:04X}");
        self.glyph(&name, &[codepoint], Shape::Rect(rect.0, rect.1, rect.2, rect.3), advance)
    }

    pub fn os2(mut self, version: Option<u16>) -> Self {
        self.os2_version = version;
        self
    }

    pub fn panose(mut self, panose: [u8; 10]) -> Self {
        self.panose = panose;
        self
    }

    pub fn glyph_names(mut self) -> Self {
        self.glyph_names = true;
        self
    }

    pub fn hhea(mut self, ascender: i16, descender: i16, line_gap: i16) -> Self {
        self.hhea = (ascender, descender, line_gap);
        self
    }

    pub fn typo(mut self, ascender: i16, descender: i16, line_gap: i16) -> Self {
        self.typo = (ascender, descender, line_gap);
        self
    }

    pub fn win(mut self, ascent: u16, descent: u16) -> Self {
        self.win = (ascent, descent);
        self
    }

    /// A GSUB table with empty lookups, listing the given features and their lookup indices.
    pub fn features(mut self, features: &[(&[u8; 4], &[u16])]) -> Self {
        let records = features
            .iter()
            .map(|(tag, lookups)| {
                FeatureRecord::new(font_types::Tag::new(tag), Feature::new(None, lookups.to_vec()))
            })
            .collect();
        let count = features.iter().flat_map(|(_, l)| l.iter()).max().map_or(0, |&i| i + 1);
        let lookups = LookupList::new(vec![SubstitutionLookup::default(); count as usize]);
        self.gsub = Some(Gsub::new(ScriptList::default(), FeatureList::new(records), lookups));
        self
    }

    /// Glyph index of the glyph with the given name.
    pub fn gid(&self, name: &str) -> u16 {
        self.glyphs.iter().position(|g| g.name == name).expect("glyph exists") as u16
    }

    fn bbox(&self, shape: &Shape, depth: usize) -> Option<Bbox> {
        match shape {
            Shape::Empty => None,
            Shape::Rect(x_min, y_min, x_max, y_max) => {
                Some(Bbox { x_min: *x_min, y_min: *y_min, x_max: *x_max, y_max: *y_max })
            }
            Shape::Composite(components) if depth < 4 => components
                .iter()
                .filter_map(|&(gid, dx, dy)| {
                    let b = self.bbox(&self.glyphs[gid as usize].shape, depth + 1)?;
                    Some(Bbox {
                        x_min: b.x_min + dx,
                        y_min: b.y_min + dy,
                        x_max: b.x_max + dx,
                        y_max: b.y_max + dy,
                    })
                })
                .reduce(|a, b| Bbox {
                    x_min: a.x_min.min(b.x_min),
                    y_min: a.y_min.min(b.y_min),
                    x_max: a.x_max.max(b.x_max),
                    y_max: a.y_max.max(b.y_max),
                }),
            Shape::Composite(_) => None,
        }
    }

    fn write_glyph(&self, shape: &Shape) -> Glyph {
        match shape {
            Shape::Empty => Glyph::Empty,
            Shape::Rect(x0, y0, x1, y1) => {
                let points = vec![
                    CurvePoint { x: *x0, y: *y0, on_curve: true },
                    CurvePoint { x: *x0, y: *y1, on_curve: true },
                    CurvePoint { x: *x1, y: *y1, on_curve: true },
                    CurvePoint { x: *x1, y: *y0, on_curve: true },
                ];
                Glyph::Simple(SimpleGlyph {
                    bbox: Bbox { x_min: *x0, y_min: *y0, x_max: *x1, y_max: *y1 },
                    contours: vec![Contour::from(points)],
                    instructions: vec![],
                })
            }
            Shape::Composite(components) => {
                let bbox = self.bbox(shape, 0).unwrap_or(EMPTY_BBOX);
                let mut components = components.iter().map(|&(gid, x, y)| Component {
                    glyph: font_types::GlyphId16::new(gid),
                    anchor: Anchor::Offset { x, y },
                    transform: Transform {
                        xx: font_types::F2Dot14::from_f32(1.0),
                        yx: font_types::F2Dot14::from_f32(0.0),
                        xy: font_types::F2Dot14::from_f32(0.0),
                        yy: font_types::F2Dot14::from_f32(1.0),
                    },
                    flags: ComponentFlags {
                        round_xy_to_grid: true,
                        use_my_metrics: false,
                        scaled_component_offset: false,
                        unscaled_component_offset: false,
                        overlap_compound: false,
                    },
                });
                let first = components.next().expect("composite has components");
                let mut composite = CompositeGlyph::new(first, bbox);
                for component in components {
                    composite.add_component(component, bbox);
                }
                Glyph::Composite(composite)
            }
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let num_glyphs = self.glyphs.len() as u16;

        let mut glyf_builder = GlyfLocaBuilder::new();
        for glyph in &self.glyphs {
            glyf_builder.add_glyph(&self.write_glyph(&glyph.shape)).unwrap();
        }
        let (glyf, loca, loca_format) = glyf_builder.build();

        let cmap_mappings: Vec<(char, GlyphId)> = self
            .glyphs
            .iter()
            .enumerate()
            .flat_map(|(gid, glyph)| {
                glyph
                    .codepoints
                    .iter()
                    .filter_map(move |cp| Some((char::from_u32(*cp)?, GlyphId::new(gid as u32))))
            })
            .collect();
        let cmap = Cmap::from_mappings(cmap_mappings).expect("cmap");

        let font_box = self
            .glyphs
            .iter()
            .filter_map(|g| self.bbox(&g.shape, 0))
            .reduce(|a, b| Bbox {
                x_min: a.x_min.min(b.x_min),
                y_min: a.y_min.min(b.y_min),
                x_max: a.x_max.max(b.x_max),
                y_max: a.y_max.max(b.y_max),
            })
            .unwrap_or(EMPTY_BBOX);

        let head = Head {
            font_revision: font_types::Fixed::from_f64(1.0),
            checksum_adjustment: 0,
            magic_number: 0x5F0F3CF5,
            flags: write_fonts::tables::head::Flags::empty(),
            units_per_em: self.units_per_em,
            created: font_types::LongDateTime::new(0),
            modified: font_types::LongDateTime::new(0),
            x_min: font_box.x_min,
            y_min: font_box.y_min,
            x_max: font_box.x_max,
            y_max: font_box.y_max,
            mac_style: write_fonts::tables::head::MacStyle::empty(),
            lowest_rec_ppem: 8,
            font_direction_hint: 2,
            index_to_loc_format: match loca_format {
                write_fonts::tables::loca::LocaFormat::Short => 0,
                write_fonts::tables::loca::LocaFormat::Long => 1,
            },
        };

        let max_advance = self.glyphs.iter().map(|g| g.advance).max().unwrap_or(0);
        let hhea = Hhea {
            ascender: font_types::FWord::new(self.hhea.0),
            descender: font_types::FWord::new(self.hhea.1),
            line_gap: font_types::FWord::new(self.hhea.2),
            advance_width_max: font_types::UfWord::new(max_advance),
            min_left_side_bearing: font_types::FWord::new(0),
            min_right_side_bearing: font_types::FWord::new(0),
            x_max_extent: font_types::FWord::new(font_box.x_max),
            caret_slope_rise: 1,
            caret_slope_run: 0,
            caret_offset: 0,
            number_of_h_metrics: num_glyphs,
        };

        let hmtx = Hmtx {
            h_metrics: self
                .glyphs
                .iter()
                .map(|g| LongMetric {
                    advance: g.advance,
                    side_bearing: self.bbox(&g.shape, 0).map_or(0, |b| b.x_min),
                })
                .collect(),
            left_side_bearings: vec![],
        };

        let maxp = Maxp {
            num_glyphs,
            max_points: Some(4),
            max_contours: Some(1),
            max_composite_points: Some(0),
            max_composite_contours: Some(0),
            max_zones: Some(1),
            max_twilight_points: Some(0),
            max_storage: Some(0),
            max_function_defs: Some(0),
            max_instruction_defs: Some(0),
            max_stack_elements: Some(0),
            max_size_of_instructions: Some(0),
            max_component_elements: Some(0),
            max_component_depth: Some(0),
        };

        let post = if self.glyph_names {
            Post::new_v2(self.glyphs.iter().map(|g| g.name.as_str()))
        } else {
            Post {
                version: font_types::Version16Dot16::VERSION_3_0,
                italic_angle: font_types::Fixed::from_f64(0.0),
                underline_position: font_types::FWord::new(-100),
                underline_thickness: font_types::FWord::new(50),
                is_fixed_pitch: 0,
                min_mem_type42: 0,
                max_mem_type42: 0,
                min_mem_type1: 0,
                max_mem_type1: 0,
                num_glyphs: Some(num_glyphs),
                glyph_name_index: None,
                string_data: None,
            }
        };

        let mut builder = FontBuilder::new();
        builder.add_table(&head).unwrap();
        builder.add_table(&hhea).unwrap();
        builder.add_table(&hmtx).unwrap();
        builder.add_table(&maxp).unwrap();
        builder.add_table(&cmap).unwrap();
        builder.add_table(&post).unwrap();
        builder.add_table(&glyf).unwrap();
        builder.add_table(&loca).unwrap();
        if let Some(version) = self.os2_version {
            builder.add_table(&self.make_os2(version)).unwrap();
        }
        if let Some(gsub) = &self.gsub {
            builder.add_table(gsub).unwrap();
        }
        builder.build()
    }

    fn make_os2(&self, version: u16) -> Os2 {
        Os2 {
            x_avg_char_width: (self.units_per_em / 2) as i16,
            us_weight_class: 400,
            us_width_class: 5,
            fs_type: 0,
            y_subscript_x_size: 650,
            y_subscript_y_size: 600,
            y_subscript_x_offset: 0,
            y_subscript_y_offset: 75,
            y_superscript_x_size: 650,
            y_superscript_y_size: 600,
            y_superscript_x_offset: 0,
            y_superscript_y_offset: 350,
            y_strikeout_size: 50,
            y_strikeout_position: 300,
            s_family_class: 0,
            panose_10: self.panose,
            ul_unicode_range_1: 0,
            ul_unicode_range_2: 0,
            ul_unicode_range_3: 0,
            ul_unicode_range_4: 0,
            ach_vend_id: font_types::Tag::new(b"NONE"),
            fs_selection: write_fonts::tables::os2::SelectionFlags::REGULAR,
            us_first_char_index: 0x20,
            us_last_char_index: 0x7E,
            s_typo_ascender: self.typo.0,
            s_typo_descender: self.typo.1,
            s_typo_line_gap: self.typo.2,
            us_win_ascent: self.win.0,
            us_win_descent: self.win.1,
            ul_code_page_range_1: if version >= 1 { Some(0) } else { None },
            ul_code_page_range_2: if version >= 1 { Some(0) } else { None },
            sx_height: if version >= 2 { Some(500) } else { None },
            s_cap_height: if version >= 2 { Some(700) } else { None },
            us_default_char: if version >= 2 { Some(0) } else { None },
            us_break_char: if version >= 2 { Some(0x20) } else { None },
            us_max_context: if version >= 2 { Some(0) } else { None },
            us_lower_optical_point_size: if version >= 5 { Some(0) } else { None },
            us_upper_optical_point_size: if version >= 5 { Some(0xFFFF) } else { None },
        }
    }
}

/// A monospaced latin font: every printable ASCII glyph is 600 units wide.
pub fn mono_font() -> TestFont {
    (0x21..=0x7E).fold(TestFont::new(1000).panose([2, 0, 0, 9, 0, 0, 0, 0, 0, 0]), |font, cp| {
        font.rect(cp, (50, 0, 550, 700), 600)
    })
}

/// A symbol font with square glyphs filling the em.
pub fn symbol_font(codepoints: &[u32]) -> TestFont {
    codepoints
        .iter()
        .fold(TestFont::new(1000), |font, &cp| font.rect(cp, (0, 0, 1000, 1000), 1000))
}

/// A glyph directory holding the given fonts at the given relative paths.
pub fn glyph_dir(fonts: &[(&str, Vec<u8>)]) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for (path, data) in fonts {
        write_font(&dir.path().join(path), data);
    }
    dir
}

/// A glyph directory with the symbol fonts that are always patched in.
pub fn default_glyph_dir(extra: &[(&str, Vec<u8>)]) -> TempDir {
    let mut fonts = vec![
        ("original-source.otf", symbol_font(&[0xE4FA, 0xE4FB]).build()),
        ("devicons.ttf", symbol_font(&[0xE600, 0xE60E]).build()),
    ];
    fonts.extend(extra.iter().cloned());
    glyph_dir(&fonts)
}

fn write_font(path: &Path, data: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create glyph dir");
    }
    fs::write(path, data).expect("write font");
}
