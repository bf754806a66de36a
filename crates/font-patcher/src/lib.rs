//! # Nerd Font Patcher
//!
//! Copy symbol glyphs (Powerline separators, Font Awesome, Devicons, Material Design and
//! more) from donor symbol fonts into a TrueType font, scaled and aligned to the target's
//! cell.
//!
//! ## Example
//!
//! ```no_run
//! use nerdfont_patcher::{PatchOptions, Patcher, SymbolSet};
//!
//! let data = std::fs::read("Hack-Regular.ttf").unwrap();
//! let options = PatchOptions::new("src/glyphs")
//!     .single_width(1)
//!     .set(SymbolSet::Powerline)
//!     .set(SymbolSet::FontAwesome);
//! let patched = Patcher::new(options).patch(&data).unwrap();
//! std::fs::write("HackNerdFontMono-Regular.ttf", patched).unwrap();
//! ```

mod attributes;
mod error;
mod essential;
mod fit;
mod geometry;
mod ligatures;
mod metrics;
mod monospace;
mod options;
mod outline;
mod patch_set;
mod patcher;
mod scale_rules;
mod symbol;
mod target;
mod types;

pub use attributes::{Align, AttributeTable, Stretch, SymbolAttributes};
pub use error::{Error, Result};
pub use essential::essential_codepoints;
pub use fit::{
    FitMode, alignment_offset, apply_overlap, limit_xy_ratio, scale_factors, symbol_advance,
};
pub use geometry::{GlyphDimensions, MeasuredGlyph, combined_dimensions, half_gap};
pub use ligatures::LigatureConfig;
pub use metrics::{BaselineToBaseline, CellMetrics, MetricsSource, VerticalMetrics};
pub use monospace::{
    PanoseCheck, advance_width, assert_monospace, check_panose_monospaced, enforce_monospace,
    is_monospaced, report_advance_widths,
};
pub use options::PatchOptions;
pub use outline::{PathPen, SimpleOutline};
pub use patch_set::{SymbolRange, SymbolSet, patch_set};
pub use patcher::Patcher;
pub use scale_rules::{GlyphMeasure, GlyphSelector, ScaleRuleSpec, ScaleRules};
pub use symbol::{SelectedGlyph, SymbolFont, SymbolGlyphs, SymbolOutline};
pub use target::{DROPPED_TABLES, EditGlyph, TargetFont};
pub use types::Codepoint;

/// Version of the Nerd Fonts symbol set this patcher ships.
pub const NERD_FONTS_VERSION: &str = "2.3.3";

/// Project name, as written into patched font names.
pub const PROJECT_NAME: &str = "Nerd Fonts";
