//! Error types for glyph patching.

use std::{io, path::PathBuf, result};

use read_fonts::ReadError;
use write_fonts::BuilderError;

use crate::types::Codepoint;

/// Errors that can occur while patching a font.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("failed to build font: {0}")]
    Build(#[from] BuilderError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("font has no TrueType outlines (glyf/loca); only TrueType targets can be patched")]
    UnsupportedOutlines,

    #[error("can not detect sane font height (ymin {ymin}, ymax {ymax})")]
    InsaneFontHeight { ymin: i32, ymax: i32 },

    #[error(
        "font is not monospaced (offending char {offending}); give --mono twice to force patching"
    )]
    NotMonospaced { offending: Codepoint },

    #[error("can not find symbol glyph directory {0} (probably you need to fetch the glyphs?)")]
    MissingGlyphDir(PathBuf),

    #[error("can not find symbol source for '{set}' (i.e. {path})")]
    MissingSymbolFont { set: String, path: PathBuf },

    #[error("failed to draw glyph {glyph} of symbol font: {message}")]
    Draw { glyph: u32, message: String },

    #[error("too many glyphs: {0} exceeds the TrueType limit of 65535")]
    TooManyGlyphs(usize),

    #[error("failed to build cmap table: {0}")]
    Cmap(String),

    #[error("invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid feature tag '{0}' in configuration file")]
    InvalidTag(String),
}

pub type Result<T> = result::Result<T, Error>;
