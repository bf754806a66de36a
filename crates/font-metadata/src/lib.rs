//! Font metadata fixups applied after patching (head flags, versioning).

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use nerdfont_font_ops::{append_version, rewrite_font};
use read_fonts::{FontRef, TableProvider, types::Tag};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::head::{Flags, Head},
    types::LongDateTime,
};

/// Tables that make a font variable.
pub const VARIATION_TABLES: [Tag; 7] = [
    Tag::new(b"avar"),
    Tag::new(b"cvar"),
    Tag::new(b"fvar"),
    Tag::new(b"gvar"),
    Tag::new(b"HVAR"),
    Tag::new(b"MVAR"),
    Tag::new(b"VVAR"),
];

/// head.flags bit 3: force ppem to integer values.
const FORCE_INTEGER_PPEM: u16 = 1 << 3;

/// Seconds from the `LongDateTime` epoch (1904-01-01) to the unix epoch.
const SECONDS_1904_TO_1970: i64 = 2_082_844_800;

/// Whether the font carries any variation table.
pub fn is_variable(font: &FontRef) -> bool {
    VARIATION_TABLES.iter().any(|&tag| font.table_data(tag).is_some())
}

/// The `head` fields a patched font takes from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadTweak {
    pub force_integer_ppem: bool,
    pub lowest_rec_ppem: u16,
}

impl HeadTweak {
    pub fn from_font(font: &FontRef) -> Result<Self> {
        let head = font.head().context("Font has no head table")?;
        Ok(Self {
            force_integer_ppem: head.flags().bits() & FORCE_INTEGER_PPEM != 0,
            lowest_rec_ppem: head.lowest_rec_ppem(),
        })
    }

    /// Apply the source's head fields to `patched` and stamp the modification time.
    pub fn sync(source: &[u8], patched: &[u8]) -> Result<Vec<u8>> {
        let source = FontRef::new(source).context("Failed to parse source font")?;
        Self::from_font(&source)?.apply(patched, Utc::now())
    }

    pub fn apply(&self, data: &[u8], modified: DateTime<Utc>) -> Result<Vec<u8>> {
        rewrite_font(data, |font, builder| {
            let mut head: Head = font.head().context("Font has no head table")?.to_owned_table();
            if !self.force_integer_ppem {
                let bits = head.flags.bits() & !FORCE_INTEGER_PPEM;
                head.flags = Flags::from_bits_truncate(bits);
            }
            head.lowest_rec_ppem = self.lowest_rec_ppem;
            head.modified = long_date_time(modified);
            builder.add_table(&head)?;
            Ok(())
        })
    }
}

fn long_date_time(time: DateTime<Utc>) -> LongDateTime {
    LongDateTime::new(time.timestamp() + SECONDS_1904_TO_1970)
}

/// Marks the version string (name ID 5) of a patched font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSuffix {
    suffix: String,
}

impl VersionSuffix {
    /// Suffix `;{project} {version}`, e.g. `;Nerd Fonts 2.3.3`.
    pub fn new(project: &str, version: &str) -> Self {
        Self { suffix: format!(";{project} {version}") }
    }

    pub fn as_str(&self) -> &str {
        &self.suffix
    }

    pub fn apply(&self, data: &[u8]) -> Result<Vec<u8>> {
        append_version(data, &self.suffix)
    }
}
