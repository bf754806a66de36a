//! The table of symbol fonts and codepoint ranges that can be patched in.

use std::{
    collections::BTreeSet,
    fmt::{self, Display, Formatter},
    path::PathBuf,
};

use crate::{
    attributes::{
        AttributeTable, CUSTOM_ATTRIBUTES, DEFAULT_ATTRIBUTES, FONTA_ATTRIBUTES,
        POWERLINE_ATTRIBUTES,
    },
    scale_rules::{DEVI_RULES, FONTA_RULES, MDI_RULES, OCTI_RULES, ScaleRuleSpec, WEATH_RULES},
};

/// A family of symbols that is patched as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolSet {
    SetiUi,
    Devicons,
    Powerline,
    PowerlineExtra,
    Pomicons,
    FontAwesome,
    FontAwesomeExtension,
    PowerSymbols,
    Material,
    Weather,
    FontLogos,
    Octicons,
    Codicons,
    Custom,
}

impl SymbolSet {
    /// Sets that are patched into every font.
    pub const ALWAYS: [Self; 2] = [Self::SetiUi, Self::Devicons];

    /// Sets selected by their own flag (everything `--complete` adds).
    pub const OPTIONAL: [Self; 11] = [
        Self::Powerline,
        Self::PowerlineExtra,
        Self::Pomicons,
        Self::FontAwesome,
        Self::FontAwesomeExtension,
        Self::PowerSymbols,
        Self::Material,
        Self::Weather,
        Self::FontLogos,
        Self::Octicons,
        Self::Codicons,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::SetiUi => "Seti-UI + Custom",
            Self::Devicons => "Devicons",
            Self::Powerline => "Powerline Symbols",
            Self::PowerlineExtra => "Powerline Extra Symbols",
            Self::Pomicons => "Pomicons",
            Self::FontAwesome => "Font Awesome",
            Self::FontAwesomeExtension => "Font Awesome Extension",
            Self::PowerSymbols => "Power Symbols",
            Self::Material => "Material",
            Self::Weather => "Weather Icons",
            Self::FontLogos => "Font Logos",
            Self::Octicons => "Octicons",
            Self::Codicons => "Codicons",
            Self::Custom => "Custom",
        }
    }
}

impl Display for SymbolSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static description of one range of a symbol font.
#[derive(Debug)]
struct RangeSpec {
    set: SymbolSet,
    name: &'static str,
    filename: &'static str,
    exact: bool,
    sym_start: u32,
    sym_end: u32,
    src_start: Option<u32>,
    scale_rules: Option<&'static ScaleRuleSpec>,
    attributes: &'static AttributeTable,
}

const fn spec(
    set: SymbolSet,
    filename: &'static str,
    (sym_start, sym_end): (u32, u32),
    src_start: Option<u32>,
) -> RangeSpec {
    RangeSpec {
        set,
        name: "",
        filename,
        exact: src_start.is_none(),
        sym_start,
        sym_end,
        src_start,
        scale_rules: None,
        attributes: &DEFAULT_ATTRIBUTES,
    }
}

impl RangeSpec {
    const fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    const fn rules(mut self, rules: &'static ScaleRuleSpec) -> Self {
        self.scale_rules = Some(rules);
        self
    }

    const fn attributes(mut self, attributes: &'static AttributeTable) -> Self {
        self.attributes = attributes;
        self
    }
}

const POWERLINE_FILE: &str = "powerline-symbols/PowerlineSymbols.otf";
const POWERLINE_EXTRA_FILE: &str = "PowerlineExtraSymbols.otf";
const POWER_SYMBOLS_FILE: &str = "Unicode_IEC_symbol_font.otf";
const OCTICONS_FILE: &str = "octicons.ttf";

use SymbolSet::*;

static BUILTIN_RANGES: &[RangeSpec] = &[
    spec(SetiUi, "original-source.otf", (0xE4FA, 0xE5AA), Some(0xE5FA)),
    spec(Devicons, "devicons.ttf", (0xE600, 0xE6C5), Some(0xE700)).rules(&DEVI_RULES),
    spec(Powerline, POWERLINE_FILE, (0xE0A0, 0xE0A2), None).attributes(&POWERLINE_ATTRIBUTES),
    spec(Powerline, POWERLINE_FILE, (0xE0B0, 0xE0B3), None).attributes(&POWERLINE_ATTRIBUTES),
    spec(PowerlineExtra, POWERLINE_EXTRA_FILE, (0xE0A3, 0xE0A3), None)
        .attributes(&POWERLINE_ATTRIBUTES),
    spec(PowerlineExtra, POWERLINE_EXTRA_FILE, (0xE0B4, 0xE0C8), None)
        .attributes(&POWERLINE_ATTRIBUTES),
    spec(PowerlineExtra, POWERLINE_EXTRA_FILE, (0xE0CA, 0xE0CA), None)
        .attributes(&POWERLINE_ATTRIBUTES),
    spec(PowerlineExtra, POWERLINE_EXTRA_FILE, (0xE0CC, 0xE0D4), None)
        .attributes(&POWERLINE_ATTRIBUTES),
    spec(Pomicons, "Pomicons.otf", (0xE000, 0xE00A), None),
    spec(FontAwesome, "font-awesome/FontAwesome.otf", (0xF000, 0xF2E0), None)
        .rules(&FONTA_RULES)
        .attributes(&FONTA_ATTRIBUTES),
    spec(FontAwesomeExtension, "font-awesome-extension.ttf", (0xE000, 0xE0A9), Some(0xE200)),
    spec(PowerSymbols, POWER_SYMBOLS_FILE, (0x23FB, 0x23FE), None),
    spec(PowerSymbols, POWER_SYMBOLS_FILE, (0x2B58, 0x2B58), None),
    spec(Material, "materialdesignicons-webfont.ttf", (0xF001, 0xF847), Some(0xF500))
        .named("Material legacy"),
    spec(Material, "materialdesign/MaterialDesignIconsDesktop.ttf", (0xF0001, 0xF1AF0), None)
        .rules(&MDI_RULES),
    spec(Weather, "weather-icons/weathericons-regular-webfont.ttf", (0xF000, 0xF0EB), Some(0xE300))
        .rules(&WEATH_RULES),
    spec(FontLogos, "font-logos.ttf", (0xF300, 0xF32F), None),
    spec(Octicons, OCTICONS_FILE, (0xF000, 0xF105), Some(0xF400)).rules(&OCTI_RULES),
    // Heart
    spec(Octicons, OCTICONS_FILE, (0x2665, 0x2665), None).rules(&OCTI_RULES),
    // Zap
    spec(Octicons, OCTICONS_FILE, (0x26A1, 0x26A1), None).rules(&OCTI_RULES),
    spec(Octicons, OCTICONS_FILE, (0xF27C, 0xF27C), Some(0xF4A9)).rules(&OCTI_RULES),
    spec(Codicons, "codicons/codicon.ttf", (0xEA60, 0xEBEB), None),
];

/// One codepoint range of a symbol font, ready to be patched.
#[derive(Debug, Clone)]
pub struct SymbolRange {
    pub set: SymbolSet,
    pub name: &'static str,
    /// Donor font path, relative to the glyph directory unless absolute.
    pub filename: PathBuf,
    /// Keep the donor codepoints instead of packing from `src_start`.
    pub exact: bool,
    pub sym_start: u32,
    pub sym_end: u32,
    pub src_start: Option<u32>,
    pub scale_rules: Option<&'static ScaleRuleSpec>,
    pub attributes: &'static AttributeTable,
    /// Never overwrite existing glyphs.
    pub careful: bool,
}

impl SymbolRange {
    /// A custom font patched as a whole; it never replaces existing glyphs.
    pub fn custom(filename: impl Into<PathBuf>) -> Self {
        Self {
            set: SymbolSet::Custom,
            name: SymbolSet::Custom.name(),
            filename: filename.into(),
            exact: true,
            sym_start: 0,
            sym_end: 0,
            src_start: None,
            scale_rules: None,
            attributes: &CUSTOM_ATTRIBUTES,
            careful: true,
        }
    }

    /// Whether every encoded glyph of the donor is selected.
    pub fn selects_all(&self) -> bool {
        self.sym_start == 0 && self.sym_end == 0
    }

    /// First destination codepoint of a packed range.
    pub fn destination_start(&self) -> u32 {
        self.src_start.unwrap_or(self.sym_start)
    }

    fn from_spec(spec: &RangeSpec) -> Self {
        Self {
            set: spec.set,
            name: if spec.name.is_empty() { spec.set.name() } else { spec.name },
            filename: PathBuf::from(spec.filename),
            exact: spec.exact,
            sym_start: spec.sym_start,
            sym_end: spec.sym_end,
            src_start: spec.src_start,
            scale_rules: spec.scale_rules,
            attributes: spec.attributes,
            careful: false,
        }
    }
}

/// The enabled ranges, in patching order.
///
/// Seti-UI and Devicons are always included; a custom font comes last.
pub fn patch_set(enabled: &BTreeSet<SymbolSet>, custom: Option<&PathBuf>) -> Vec<SymbolRange> {
    let mut ranges: Vec<SymbolRange> = BUILTIN_RANGES
        .iter()
        .filter(|r| SymbolSet::ALWAYS.contains(&r.set) || enabled.contains(&r.set))
        .map(SymbolRange::from_spec)
        .collect();
    if let Some(custom) = custom {
        ranges.push(SymbolRange::custom(custom));
    }
    ranges
}
