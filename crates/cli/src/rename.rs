//! The `rename` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use log::info;
use nerdfont_font_ops::{
    FontNames, NAME_ID_POSTSCRIPT, family_name, full_name, name_string, rename,
};
use read_fonts::FontRef;

use crate::io::{FontFile, sanitize_filename};

#[derive(Debug, Clone, Args)]
pub struct RenameArgs {
    /// Font to rename
    pub font: PathBuf,

    /// Weight of the font, used in naming
    #[arg(short, long, default_value = "regular")]
    pub weight: String,

    /// Common name/prefix to use for all name fields
    #[arg(short, long)]
    pub name: Option<String>,

    /// PostScript font name
    #[arg(long)]
    pub fontname: Option<String>,

    /// Font family name
    #[arg(long)]
    pub familyname: Option<String>,

    /// Full font name
    #[arg(long)]
    pub fullname: Option<String>,

    /// Directory to write the renamed font to
    #[arg(short = 'o', long = "outputdir", default_value = ".")]
    pub output_dir: PathBuf,
}

impl RenameArgs {
    /// The new names; fields that are not given keep their current value.
    pub fn names(&self, font: &FontRef) -> FontNames {
        if let Some(name) = &self.name {
            info!("Name override provided, using {name} as name/prefix");
            return FontNames::from_prefix(name, &self.weight);
        }
        let current = |explicit: &Option<String>, read: Option<String>| {
            explicit.clone().or(read).unwrap_or_default()
        };
        FontNames {
            fontname: current(&self.fontname, name_string(font, NAME_ID_POSTSCRIPT)),
            fullname: current(&self.fullname, full_name(font)),
            familyname: current(&self.familyname, family_name(font)),
            weight: self.weight.clone(),
        }
    }

    pub fn run(self) -> Result<()> {
        let input = FontFile::new(&self.font);
        let data = input.read()?;
        let font = FontRef::new(&data).context("Failed to parse font")?;
        let names = self.names(&font);

        let renamed = rename(&data, &names)?;
        let stem = sanitize_filename(&names.fontname, false);
        let file_name = format!("{stem}{}", input.extension());
        let output = FontFile::new(self.output_dir.join(file_name));
        output.write(renamed)?;
        info!("Generated {}", output.path().display());
        Ok(())
    }
}
