//! Convert command implementation.
//!
//! Resolves a profile for every archive and runs the pipeline over it.

use std::path::{Path, PathBuf};

use clap::Args;
use walkdir::WalkDir;

use crate::archive::DirArchive;
use crate::config::{is_save_extension, Config, CONFIG_FILENAME};
use crate::error::{MinifyError, Result};
use crate::output::{display_path, plural, Printer};
use crate::pipeline::{process_archive, ConversionSummary};

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Archive directories to convert. MPQ files must be unpacked by an
    /// external extractor first; a directory named like the archive
    /// (e.g. DIABDAT.MPQ/) holding its files and `(listfile)` is expected
    #[arg(value_name = "MPQ")]
    pub archives: Vec<PathBuf>,

    /// Override output directory
    #[arg(long, value_name = "OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Walk this listfile instead of the configured or built-in one
    #[arg(long, value_name = "LISTFILE")]
    pub listfile: Option<PathBuf>,

    /// Conversion profiles [default: minify.yaml if present]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Convert WAV files to MP3. Not implemented.
    #[arg(long)]
    pub mp3: bool,
}

pub fn run(args: ConvertArgs) -> Result<()> {
    if args.mp3 {
        return Err(MinifyError::Usage {
            message: "--mp3 option is not implemented yet.".to_string(),
            help: None,
        });
    }

    let archives = if args.archives.is_empty() {
        discover_archives(Path::new("."))?
    } else {
        args.archives.clone()
    };
    if archives.is_empty() {
        return Err(MinifyError::Usage {
            message: "No MPQs found in the current directory or in the command line".to_string(),
            help: Some("Pass unpacked archive directories, e.g. `unpack-and-minify-mpq DIABDAT.MPQ`".to_string()),
        });
    }

    let config = load_config(args.config.as_deref())?;
    let printer = Printer::new();
    for path in &archives {
        let profile = config.resolve(path, args.listfile.as_deref())?;
        printer.status("Processing", &display_path(path));

        let mut archive = DirArchive::open(path)?;
        let summary = process_archive(&mut archive, &profile, &args.output_dir, &printer)?;
        report(&printer, &summary, &profile.output_dir(&args.output_dir));
    }
    Ok(())
}

/// Find archives in `dir`: entries named `*.mpq`, `*.MPQ`, `*.sv` or `*.hsv`.
pub fn discover_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut archives = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| MinifyError::Io {
            path: dir.to_path_buf(),
            message: format!("Failed to scan for archives: {}", e),
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let is_archive = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext == "mpq" || ext == "MPQ" || is_save_extension(ext));
        if is_archive {
            archives.push(entry.into_path());
        }
    }
    Ok(archives)
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None if Path::new(CONFIG_FILENAME).is_file() => Config::load(Path::new(CONFIG_FILENAME)),
        None => Ok(Config::default()),
    }
}

fn report(printer: &Printer, summary: &ConversionSummary, output_dir: &Path) {
    let written = summary.converted + summary.combined + summary.extracted;
    printer.status(
        "Finished",
        &format!(
            "{} ({} converted, {} combined, {} skipped) in {}",
            plural(written, "file", "files"),
            summary.converted,
            summary.combined,
            summary.skipped + summary.missing,
            printer.cyan(&display_path(output_dir))
        ),
    );
    if summary.write_failures > 0 {
        printer.warning(
            "Warning",
            &format!("{} could not be written", plural(summary.write_failures, "output", "outputs")),
        );
    }
}
