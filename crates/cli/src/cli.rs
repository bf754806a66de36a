//! CLI definitions and command dispatch.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::{
    download::{GLYPHS_URL, GLYPHS_ZIP_PREFIX, fetch_glyphs},
    patch::PatchArgs,
    rename::RenameArgs,
};

#[derive(Parser)]
#[command(name = "font-patcher")]
#[command(about = "Patch Nerd Fonts symbols into programming fonts")]
pub struct Cli {
    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Patch symbol glyphs into fonts
    Patch(PatchArgs),
    /// Rewrite the name fields of a font
    Rename(RenameArgs),
    /// Download the symbol fonts into the glyph directory
    FetchGlyphs {
        #[arg(long = "glyphdir", default_value = "src/glyphs")]
        glyph_dir: PathBuf,
        #[arg(long, default_value = GLYPHS_URL)]
        url: String,
        /// Directory inside the archive that holds the symbol fonts
        #[arg(long, default_value = GLYPHS_ZIP_PREFIX)]
        prefix: String,
    },
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Patch(args) => args.run(),
            Commands::Rename(args) => args.run(),
            Commands::FetchGlyphs { glyph_dir, url, prefix } => {
                fetch_glyphs(&url, &prefix, &glyph_dir)
            }
        }
    }
}
