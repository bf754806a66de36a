//! Nerd Fonts patcher CLI library.

pub mod cli;
pub mod download;
pub mod io;
pub mod parallel;
pub mod patch;
pub mod rename;

pub use nerdfont_font_ops::FontNames;
pub use nerdfont_patcher::{PatchOptions, Patcher, SymbolSet};
