//! The `patch` command: patch every input font and write the results.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result, bail};
use clap::Args;
use log::{info, warn};
use nerdfont_font_metadata::{HeadTweak, VersionSuffix, is_variable};
use nerdfont_font_ops::{
    build_collection, collection_faces, family_name, full_name, is_collection,
};
use nerdfont_patcher::{
    LigatureConfig, NERD_FONTS_VERSION, PROJECT_NAME, PatchOptions, Patcher, SymbolSet,
};
use read_fonts::FontRef;

use crate::{
    io::{FontFile, expand_inputs, is_ttc_extension, normalize_extension, sanitize_filename},
    parallel::run_parallel,
};

#[derive(Debug, Clone, Args)]
pub struct PatchArgs {
    /// Fonts to patch (glob patterns are expanded)
    #[arg(required = true)]
    pub fonts: Vec<String>,

    /// Make the symbols single width; give twice to force patching a proportional font
    #[arg(
        short = 's',
        long = "mono",
        alias = "use-single-width-glyphs",
        action = clap::ArgAction::Count
    )]
    pub mono: u8,

    /// Adjust line heights (center powerline separators more evenly)
    #[arg(short = 'l', long)]
    pub adjust_line_height: bool,

    /// Add all available symbol sets
    #[arg(short, long)]
    pub complete: bool,

    /// Do not overwrite existing glyphs
    #[arg(long)]
    pub careful: bool,

    /// Do not adjust the advance width of the symbols
    #[arg(long = "variable-width-glyphs")]
    pub variable_width: bool,

    /// Font file type to create (e.g. ttf, otf); defaults to the input's
    #[arg(short = 'e', long = "extension", alias = "ext")]
    pub extension: Option<String>,

    /// Directory to write the patched fonts to
    #[arg(short = 'o', long = "outputdir", alias = "out", default_value = ".")]
    pub output_dir: PathBuf,

    /// Directory holding the symbol fonts
    #[arg(long = "glyphdir", default_value = "src/glyphs")]
    pub glyph_dir: PathBuf,

    /// Additional symbol font (relative to the glyph directory)
    #[arg(long)]
    pub custom: Option<PathBuf>,

    /// Program to run with the path of every written font
    #[arg(long)]
    pub postprocess: Option<PathBuf>,

    /// Remove the ligatures named in the configuration file
    #[arg(long = "removeligatures", alias = "removeligs")]
    pub remove_ligatures: bool,

    /// JSON configuration file (with a `ligatures` section)
    #[arg(long = "configfile")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub sets: SetArgs,
}

/// One flag per optional symbol set.
#[derive(Debug, Clone, Default, Args)]
pub struct SetArgs {
    /// Add Font Awesome glyphs
    #[arg(long)]
    pub fontawesome: bool,
    /// Add Font Awesome Extension glyphs
    #[arg(long)]
    pub fontawesomeextension: bool,
    /// Add Font Linux and other open source logos
    #[arg(long, alias = "fontlinux")]
    pub fontlogos: bool,
    /// Add Octicons glyphs
    #[arg(long)]
    pub octicons: bool,
    /// Add Codicons glyphs
    #[arg(long)]
    pub codicons: bool,
    /// Add IEC power symbols
    #[arg(long)]
    pub powersymbols: bool,
    /// Add Pomicon glyphs
    #[arg(long)]
    pub pomicons: bool,
    /// Add Powerline glyphs
    #[arg(long)]
    pub powerline: bool,
    /// Add Powerline extra glyphs
    #[arg(long)]
    pub powerlineextra: bool,
    /// Add Material Design Icons
    #[arg(long, alias = "mdi", alias = "materialdesignicons")]
    pub material: bool,
    /// Add Weather Icons
    #[arg(long, alias = "weathericons")]
    pub weather: bool,
}

impl SetArgs {
    pub fn selected(&self) -> Vec<SymbolSet> {
        [
            (self.fontawesome, SymbolSet::FontAwesome),
            (self.fontawesomeextension, SymbolSet::FontAwesomeExtension),
            (self.fontlogos, SymbolSet::FontLogos),
            (self.octicons, SymbolSet::Octicons),
            (self.codicons, SymbolSet::Codicons),
            (self.powersymbols, SymbolSet::PowerSymbols),
            (self.pomicons, SymbolSet::Pomicons),
            (self.powerline, SymbolSet::Powerline),
            (self.powerlineextra, SymbolSet::PowerlineExtra),
            (self.material, SymbolSet::Material),
            (self.weather, SymbolSet::Weather),
        ]
        .into_iter()
        .filter_map(|(on, set)| on.then_some(set))
        .collect()
    }
}

impl PatchArgs {
    pub fn options(&self) -> PatchOptions {
        let mut variable_width = self.variable_width;
        if variable_width && self.mono > 0 {
            warn!(
                "Specified contradicting --variable-width-glyphs and --mono, \
                 ignoring --variable-width-glyphs"
            );
            variable_width = false;
        }

        let mut options = PatchOptions::new(&self.glyph_dir)
            .single_width(self.mono)
            .adjust_line_height(self.adjust_line_height)
            .careful(self.careful)
            .variable_width(variable_width)
            .sets(self.sets.selected());
        if self.complete {
            options = options.complete();
        }
        if let Some(custom) = &self.custom {
            options = options.custom(custom);
        }
        if let Some(config) = self.ligature_config() {
            options = options.remove_ligatures(config);
        }
        options
    }

    fn ligature_config(&self) -> Option<LigatureConfig> {
        if !self.remove_ligatures {
            return None;
        }
        let Some(path) = &self.config_file else {
            warn!("No configfile given, unable to remove ligatures");
            return None;
        };
        match LigatureConfig::load(path) {
            Ok(config) => {
                info!("Removing ligatures listed in {}", path.display());
                Some(config)
            }
            Err(e) => {
                let path = path.display();
                warn!("Unable to read configfile {path} ({e}), unable to remove ligatures");
                None
            }
        }
    }

    pub fn run(self) -> Result<()> {
        let inputs = expand_inputs(&self.fonts)?;
        let patcher = Patcher::new(self.options());
        patcher.check_sources()?;
        if patcher.options().is_complete() {
            info!("Patching in every symbol set");
        }

        let result = run_parallel("Patch", &inputs, |path| self.patch_file(&patcher, path));
        result.ok_or_bail("Patching")
    }

    fn patch_file(&self, patcher: &Patcher, path: &Path) -> Result<()> {
        let input = FontFile::new(path);
        let data = input.read()?;
        let extension = normalize_extension(self.extension.as_deref(), &input);
        let ttc = is_collection(&data);
        match (ttc, is_ttc_extension(&extension)) {
            (false, true) => bail!("Can not create True Type Collections from single font files"),
            (true, false) => bail!("Can not create single font files from True Type Collections"),
            _ => {}
        }

        let patched = patcher.patch_collection(&data)?;
        let faces = finish_faces(&data, &patched)?;

        let first = faces.first().context("Patching produced no font")?;
        let first = FontRef::new(first).context("Failed to parse patched font")?;
        let (output, out_data) = if ttc {
            let family = family_name(&first).context("Font has no family name")?;
            (self.output_path(&family, ".ttc"), build_collection(&faces)?)
        } else {
            let name = full_name(&first).context("Patched font has no name")?;
            let output = self.output_path(&name, &extension);
            (output, faces.into_iter().next().context("Patching produced no font")?)
        };

        FontFile::new(&output).write(out_data)?;
        info!("{} ===> {}", path.display(), output.display());

        if let Some(program) = &self.postprocess {
            postprocess(program, &output)?;
        }
        Ok(())
    }

    fn output_path(&self, name: &str, extension: &str) -> PathBuf {
        let dir = sanitize_filename(&self.output_dir.to_string_lossy(), true);
        PathBuf::from(dir).join(format!("{}{extension}", sanitize_filename(name, false)))
    }
}

/// Version suffix and head fixups of every patched face, paired with its source face.
fn finish_faces(data: &[u8], patched: &[Vec<u8>]) -> Result<Vec<Vec<u8>>> {
    let sources = collection_faces(data)?;
    if sources.len() != patched.len() {
        bail!("Patched {} of {} faces", patched.len(), sources.len());
    }
    sources.iter().zip(patched).map(|(source, face)| finish_face(source, face)).collect()
}

fn finish_face(source: &[u8], patched: &[u8]) -> Result<Vec<u8>> {
    let data = VersionSuffix::new(PROJECT_NAME, NERD_FONTS_VERSION).apply(patched)?;
    let font = FontRef::new(source)?;
    if is_variable(&font) {
        warn!("Source font is a variable font, the result is most likely not what you want");
    }
    HeadTweak::sync(source, &data)
}

fn postprocess(program: &Path, output: &Path) -> Result<()> {
    let status = Command::new(program)
        .arg(output)
        .status()
        .with_context(|| format!("Failed to run {}", program.display()))?;
    if !status.success() {
        warn!("{} exited with {status}", program.display());
    }
    info!("Post processed: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use read_fonts::TableProvider;

    use super::*;
    use crate::cli::{Cli, Commands};

    fn parse(args: &[&str]) -> PatchArgs {
        let argv = ["font-patcher", "patch"].iter().chain(args).copied();
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Patch(args) => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_flags() {
        let args = parse(&["-ss", "-l", "--careful", "--powerline", "--mdi", "Hack.ttf"]);
        let options = args.options();
        assert_eq!(options.single_width, 2);
        assert!(options.adjust_line_height);
        assert!(options.careful);
        assert_eq!(
            options.sets.iter().copied().collect::<Vec<_>>(),
            [SymbolSet::Powerline, SymbolSet::Material]
        );
        assert!(!options.is_complete());
    }

    #[test]
    fn test_every_set_flag_is_complete() {
        let args = parse(&[
            "--fontawesome",
            "--fontawesomeextension",
            "--fontlinux",
            "--octicons",
            "--codicons",
            "--powersymbols",
            "--pomicons",
            "--powerline",
            "--powerlineextra",
            "--material",
            "--weather",
            "Hack.ttf",
        ]);
        assert!(args.options().is_complete());
        assert!(parse(&["-c", "Hack.ttf"]).options().is_complete());
    }

    #[test]
    fn test_mono_ignores_variable_width() {
        let options = parse(&["--mono", "--variable-width-glyphs", "Hack.ttf"]).options();
        assert!(!options.variable_width);
        let options = parse(&["--variable-width-glyphs", "Hack.ttf"]).options();
        assert!(options.variable_width);
    }

    #[test]
    fn test_remove_ligatures() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.json");
        std::fs::write(&config, r#"{"ligatures": {"features": ["liga"]}}"#).unwrap();
        let config = config.to_str().unwrap();

        let options = parse(&["--removeligs", "--configfile", config, "Hack.ttf"]).options();
        let ligatures = options.ligatures.unwrap();
        assert_eq!(ligatures.features.len(), 1);

        // Either flag alone removes nothing
        assert!(parse(&["--configfile", config, "Hack.ttf"]).options().ligatures.is_none());
        assert!(parse(&["--removeligatures", "Hack.ttf"]).options().ligatures.is_none());
        let missing = ["--removeligatures", "--configfile", "/nonexistent.json", "Hack.ttf"];
        assert!(parse(&missing).options().ligatures.is_none());
    }

    #[test]
    fn test_output_path() {
        let args = parse(&["--outputdir", "out\\patched", "Hack.ttf"]);
        assert_eq!(
            args.output_path("Hack Nerd Font: Mono", ".ttf"),
            PathBuf::from("out/patched/Hack Nerd Font_ Mono.ttf")
        );
    }

    #[test]
    fn test_finish_every_collection_face() {
        let source = font_test_data::VAZIRMATN_VAR;
        let ttc = build_collection(&[source.to_vec(), source.to_vec()]).unwrap();
        let patched = collection_faces(&ttc).unwrap();

        let faces = finish_faces(&ttc, &patched).unwrap();
        assert_eq!(faces.len(), 2);
        let source_modified = FontRef::new(source).unwrap().head().unwrap().modified();
        for face in &faces {
            let head = FontRef::new(face).unwrap().head().unwrap();
            assert!(head.modified().as_secs() > source_modified.as_secs());
        }

        assert!(finish_faces(&ttc, &patched[..1]).is_err());
    }

    #[test]
    fn test_collection_extension_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let font = dir.path().join("Hack.ttf");
        FontFile::new(&font).write(b"\0\x01\0\0").unwrap();

        let args = parse(&["--extension", "ttc", "--glyphdir", "/nonexistent", "Hack.ttf"]);
        let patcher = Patcher::new(args.options());
        let err = args.patch_file(&patcher, &font).unwrap_err();
        assert!(err.to_string().contains("True Type Collections"), "{err}");
    }
}
