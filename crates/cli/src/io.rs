//! Shared font I/O utilities.

use std::{
    fs::{create_dir_all, read, write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use glob::glob;

/// A font file handle for I/O operations.
#[derive(Debug, Clone)]
pub struct FontFile {
    path: PathBuf,
}

impl FontFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read font data from the file.
    pub fn read(&self) -> Result<Vec<u8>> {
        read(&self.path).with_context(|| format!("Failed to read font: {}", self.path.display()))
    }

    /// Write font data to the file, creating its directory.
    pub fn write(&self, data: impl AsRef<[u8]>) -> Result<()> {
        self.ensure_parent_dir()?;
        write(&self.path, data)
            .with_context(|| format!("Failed to write font: {}", self.path.display()))
    }

    /// Create parent directory if it doesn't exist.
    pub fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }

    /// The file extension with its dot, or an empty string.
    pub fn extension(&self) -> String {
        self.path.extension().map_or_else(String::new, |e| format!(".{}", e.to_string_lossy()))
    }
}

impl AsRef<Path> for FontFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Expand glob patterns; arguments without glob characters are taken as they are.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if !input.contains(['*', '?', '[']) {
            paths.push(PathBuf::from(input));
            continue;
        }
        let matched: Vec<PathBuf> = glob(input)
            .with_context(|| format!("Failed to glob pattern: {input}"))?
            .filter_map(Result::ok)
            .collect();
        if matched.is_empty() {
            bail!("No fonts match {input}");
        }
        paths.extend(matched);
    }
    Ok(paths)
}

/// Replace characters that are not allowed in file names.
///
/// With `allow_dirs` the name is a path: separators are kept, backslashes become slashes.
pub fn sanitize_filename(name: &str, allow_dirs: bool) -> String {
    if name == "." && !allow_dirs {
        return "_".to_string();
    }
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => '_',
            c if (c as u32) < 0x20 => '_',
            '/' | '\\' if !allow_dirs => '_',
            '\\' => '/',
            c => c,
        })
        .collect()
}

/// Normalize an extension argument to `.ext`; empty means "like the input".
pub fn normalize_extension(extension: Option<&str>, input: &FontFile) -> String {
    match extension.map(|e| e.trim_start_matches('.')) {
        Some(e) if !e.is_empty() => format!(".{e}"),
        _ => input.extension(),
    }
}

pub fn is_ttc_extension(extension: &str) -> bool {
    extension.eq_ignore_ascii_case(".ttc")
}
