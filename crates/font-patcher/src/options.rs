//! Options for glyph patching

use std::{collections::BTreeSet, path::PathBuf};

use crate::{fit::FitMode, ligatures::LigatureConfig, patch_set::SymbolSet};

/// Options for glyph patching
#[derive(Debug, Clone, Default)]
pub struct PatchOptions {
    /// How often `--mono` was given. Once makes the result strictly monospaced, twice also
    /// forces patching of fonts that do not look monospaced.
    pub single_width: u8,

    /// Make the line height even and unify all vertical metrics
    pub adjust_line_height: bool,

    /// Never overwrite existing glyphs
    pub careful: bool,

    /// Keep the symbols' natural widths instead of the cell width
    pub variable_width: bool,

    /// Directory the symbol fonts are read from
    pub glyph_dir: PathBuf,

    /// Optional symbol sets to patch in
    pub sets: BTreeSet<SymbolSet>,

    /// Additional symbol font, patched in as a whole
    pub custom: Option<PathBuf>,

    /// GSUB lookups to disconnect before patching
    pub ligatures: Option<LigatureConfig>,
}

impl PatchOptions {
    pub fn new(glyph_dir: impl Into<PathBuf>) -> Self {
        Self { glyph_dir: glyph_dir.into(), ..Self::default() }
    }

    pub fn single_width(mut self, count: u8) -> Self {
        self.single_width = count;
        self
    }

    pub fn adjust_line_height(mut self, adjust: bool) -> Self {
        self.adjust_line_height = adjust;
        self
    }

    pub fn careful(mut self, careful: bool) -> Self {
        self.careful = careful;
        self
    }

    /// Variable width symbols make no sense in a monospaced result and are ignored there.
    pub fn variable_width(mut self, variable: bool) -> Self {
        self.variable_width = variable;
        self
    }

    /// Enable one symbol set
    pub fn set(mut self, set: SymbolSet) -> Self {
        self.sets.insert(set);
        self
    }

    /// Enable several symbol sets
    pub fn sets(mut self, sets: impl IntoIterator<Item = SymbolSet>) -> Self {
        self.sets.extend(sets);
        self
    }

    /// Enable every optional symbol set
    pub fn complete(self) -> Self {
        self.sets(SymbolSet::OPTIONAL)
    }

    pub fn custom(mut self, path: impl Into<PathBuf>) -> Self {
        self.custom = Some(path.into());
        self
    }

    pub fn remove_ligatures(mut self, config: LigatureConfig) -> Self {
        self.ligatures = Some(config);
        self
    }

    pub fn is_single_width(&self) -> bool {
        self.single_width > 0
    }

    /// Whether every optional set is enabled
    pub fn is_complete(&self) -> bool {
        SymbolSet::OPTIONAL.iter().all(|set| self.sets.contains(set))
    }

    pub fn fit_mode(&self) -> FitMode {
        FitMode {
            single_width: self.is_single_width(),
            variable_width: self.variable_width && !self.is_single_width(),
        }
    }
}
