use std::{
    fs,
    io::{Cursor, Read, Seek},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use log::{debug, info};
use zip::ZipArchive;

/// Source archive of the symbol fonts.
pub const GLYPHS_URL: &str =
    "https://github.com/ryanoasis/nerd-fonts/archive/refs/tags/v2.3.3.zip";
/// Directory holding the symbol fonts inside [`GLYPHS_URL`].
pub const GLYPHS_ZIP_PREFIX: &str = "nerd-fonts-2.3.3/src/glyphs/";

const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "sfd"];

/// Download the symbol font archive and unpack its glyph directory into `glyph_dir`.
pub fn fetch_glyphs(url: &str, prefix: &str, glyph_dir: &Path) -> Result<()> {
    info!("Downloading {url}");
    let response = reqwest::blocking::get(url).with_context(|| format!("Failed to fetch {url}"))?;
    let status = response.status();
    if !status.is_success() {
        bail!("HTTP {status} for {url}");
    }
    let bytes = response.bytes()?;
    info!("Downloaded ({:.2} MB)", bytes.len() as f64 / 1024.0 / 1024.0);

    let written = unpack_glyphs(Cursor::new(bytes.as_ref()), prefix, glyph_dir)?;
    if written == 0 {
        bail!("No symbol fonts below {prefix} in the archive");
    }
    info!("{written} symbol fonts ready in {}", glyph_dir.display());
    Ok(())
}

/// Extract every font file below `prefix`, keeping its relative path.
pub fn unpack_glyphs<R: Read + Seek>(reader: R, prefix: &str, glyph_dir: &Path) -> Result<usize> {
    let mut archive = ZipArchive::new(reader).context("Failed to open zip archive")?;
    let mut written = 0;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let Some(name) = file.enclosed_name() else {
            debug!("Skipping unsafe path {}", file.name());
            continue;
        };
        let Some(relative) = glyph_path(&name, prefix) else {
            continue;
        };

        let target = glyph_dir.join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        fs::write(&target, &buffer)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        debug!("  {}", relative.display());
        written += 1;
    }
    Ok(written)
}

fn glyph_path(name: &Path, prefix: &str) -> Option<PathBuf> {
    let relative = name.strip_prefix(prefix.trim_end_matches('/')).ok()?;
    let extension = relative.extension()?.to_str()?.to_ascii_lowercase();
    FONT_EXTENSIONS.contains(&extension.as_str()).then(|| relative.to_path_buf())
}
