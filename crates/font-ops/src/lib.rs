//! Generic font table manipulation utilities.

pub mod collection;

use anyhow::{Context, Result};
use log::info;
use read_fonts::{FontRef, TableProvider, types::NameId};
use write_fonts::{
    FontBuilder,
    tables::name::{Name, NameRecord},
};

pub use collection::{build_collection, collection_faces, is_collection};

/// Name table IDs.
pub const NAME_ID_FAMILY: u16 = 1;
pub const NAME_ID_SUBFAMILY: u16 = 2;
pub const NAME_ID_UNIQUE_ID: u16 = 3;
pub const NAME_ID_FULL_NAME: u16 = 4;
pub const NAME_ID_VERSION: u16 = 5;
pub const NAME_ID_POSTSCRIPT: u16 = 6;
pub const NAME_ID_TYPOGRAPHIC_FAMILY: u16 = 16;
pub const NAME_ID_COMPATIBLE_FULL: u16 = 18;

const WINDOWS_PLATFORM: u16 = 3;
const WINDOWS_UNICODE_BMP: u16 = 1;
const WINDOWS_ENGLISH_US: u16 = 0x409;

/// Rewrite font data by applying a transformation function.
///
/// Copies all tables from the source font, then calls `f` to modify or add tables.
/// The function receives a reference to the source font and a mutable builder
/// that already contains all original tables.
pub fn rewrite_font(
    data: &[u8],
    f: impl FnOnce(&FontRef, &mut FontBuilder) -> Result<()>,
) -> Result<Vec<u8>> {
    let font = FontRef::new(data)?;
    let mut builder = FontBuilder::new();

    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if let Some(table_data) = font.table_data(tag) {
            builder.add_raw(tag, table_data);
        }
    }

    f(&font, &mut builder)?;
    Ok(builder.build())
}

/// Map name table records using a transformation function.
///
/// The mapper receives `(name_id, current_string)` and returns:
/// - `Some(new_string)` to replace the record's string
/// - `None` to keep the current string unchanged
pub fn map_name_records(
    font: &FontRef,
    mut mapper: impl FnMut(u16, &str) -> Option<String>,
) -> Result<Name> {
    let records = read_name_records(font)?
        .into_iter()
        .map(|mut record| {
            if let Some(new_string) = mapper(record.name_id, &record.value) {
                record.value = new_string;
            }
            record
        })
        .collect();

    Ok(build_name(records))
}

/// Replace every record carrying one of the given name IDs.
///
/// IDs with no record at all are added as Windows English (US) records.
pub fn set_name_records(font: &FontRef, updates: &[(u16, String)]) -> Result<Name> {
    let mut records = read_name_records(font)?;

    for (name_id, value) in updates {
        let mut found = false;
        for record in records.iter_mut().filter(|r| r.name_id == *name_id) {
            record.value = value.clone();
            found = true;
        }
        if !found {
            records.push(OwnedNameRecord {
                platform_id: WINDOWS_PLATFORM,
                encoding_id: WINDOWS_UNICODE_BMP,
                language_id: WINDOWS_ENGLISH_US,
                name_id: *name_id,
                value: value.clone(),
            });
        }
    }

    Ok(build_name(records))
}

/// Append `suffix` to the version string (name ID 5).
///
/// A version string without the `Version ` prefix gets one.
pub fn append_version(data: &[u8], suffix: &str) -> Result<Vec<u8>> {
    rewrite_font(data, |font, builder| {
        let name = map_name_records(font, |id, current| {
            (id == NAME_ID_VERSION).then(|| version_with_suffix(current, suffix))
        })?;
        builder.add_table(&name)?;
        Ok(())
    })
    .context("Failed to update version string")
}

fn version_with_suffix(current: &str, suffix: &str) -> String {
    let current = current.trim();
    let prefixed = if current.starts_with("Version ") {
        current.to_string()
    } else {
        format!("Version {current}")
    };
    if prefixed.ends_with(suffix) { prefixed } else { format!("{prefixed}{suffix}") }
}

/// Look up a name string, preferring the Windows English (US) record.
pub fn name_string(font: &FontRef, name_id: u16) -> Option<String> {
    let records = read_name_records(font).ok()?;
    let mut matching = records.into_iter().filter(|r| r.name_id == name_id);
    let first = matching.next()?;
    if first.is_windows_english() {
        return Some(first.value);
    }
    Some(matching.find(OwnedNameRecord::is_windows_english).unwrap_or(first).value)
}

/// The full font name (name ID 4), falling back to the PostScript name.
pub fn full_name(font: &FontRef) -> Option<String> {
    name_string(font, NAME_ID_FULL_NAME)
        .filter(|s| !s.is_empty())
        .or_else(|| name_string(font, NAME_ID_POSTSCRIPT))
}

/// The family name, preferring the typographic family.
pub fn family_name(font: &FontRef) -> Option<String> {
    name_string(font, NAME_ID_TYPOGRAPHIC_FAMILY)
        .filter(|s| !s.is_empty())
        .or_else(|| name_string(font, NAME_ID_FAMILY))
}

/// New names for a font, as used by the `rename` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontNames {
    /// PostScript font name.
    pub fontname: String,
    /// Human readable full name.
    pub fullname: String,
    pub familyname: String,
    pub weight: String,
}

impl FontNames {
    /// Derive all names from a common prefix: `{name}-{weight}` and family `{name}`.
    pub fn from_prefix(name: &str, weight: &str) -> Self {
        Self {
            fontname: format!("{name}-{weight}"),
            fullname: format!("{name}-{weight}"),
            familyname: name.to_string(),
            weight: weight.to_string(),
        }
    }

    fn updates(&self) -> Vec<(u16, String)> {
        vec![
            (NAME_ID_FAMILY, self.familyname.clone()),
            (NAME_ID_SUBFAMILY, self.weight.clone()),
            (NAME_ID_UNIQUE_ID, self.fontname.clone()),
            (NAME_ID_FULL_NAME, self.fullname.clone()),
            (NAME_ID_POSTSCRIPT, self.fontname.clone()),
            (NAME_ID_TYPOGRAPHIC_FAMILY, self.familyname.clone()),
            (NAME_ID_COMPATIBLE_FULL, self.fullname.clone()),
        ]
    }
}

/// Rename a font.
///
/// Updates name IDs 1, 2, 3, 4, 6, 16 and 18, adding the ones that are missing.
pub fn rename(font_data: &[u8], names: &FontNames) -> Result<Vec<u8>> {
    rewrite_font(font_data, |font, builder| {
        for (label, id, new) in [
            ("fontname", NAME_ID_POSTSCRIPT, &names.fontname),
            ("fullname", NAME_ID_FULL_NAME, &names.fullname),
            ("familyname", NAME_ID_FAMILY, &names.familyname),
        ] {
            let old = name_string(font, id).unwrap_or_default();
            info!("  {label}: {old} --> {new}");
        }

        let new_name = set_name_records(font, &names.updates())?;
        builder.add_table(&new_name)?;
        Ok(())
    })
    .context("Failed to rename font")
}

#[derive(Debug, Clone)]
struct OwnedNameRecord {
    platform_id: u16,
    encoding_id: u16,
    language_id: u16,
    name_id: u16,
    value: String,
}

impl OwnedNameRecord {
    fn is_windows_english(&self) -> bool {
        self.platform_id == WINDOWS_PLATFORM && self.language_id == WINDOWS_ENGLISH_US
    }
}

fn read_name_records(font: &FontRef) -> Result<Vec<OwnedNameRecord>> {
    let name = font.name()?;
    let mut records = Vec::new();

    for record in name.name_record() {
        let value = match record.string(name.string_data()) {
            Ok(s) => s.chars().collect::<String>(),
            Err(_) => continue,
        };
        records.push(OwnedNameRecord {
            platform_id: record.platform_id(),
            encoding_id: record.encoding_id(),
            language_id: record.language_id(),
            name_id: record.name_id().to_u16(),
            value,
        });
    }

    Ok(records)
}

fn build_name(mut records: Vec<OwnedNameRecord>) -> Name {
    records.sort_by_key(|r| (r.platform_id, r.encoding_id, r.language_id, r.name_id));

    Name::new(
        records
            .into_iter()
            .map(|r| {
                NameRecord::new(
                    r.platform_id,
                    r.encoding_id,
                    r.language_id,
                    NameId::new(r.name_id),
                    r.value.into(),
                )
            })
            .collect(),
    )
}
