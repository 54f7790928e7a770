//! Archive conversion pipeline.
//!
//! Walks the manifest of one archive in order and, for every entry, either
//! combines it with its aggregator siblings, skips it, converts it to CLX or
//! copies it through unchanged.
//!
//! # Example
//!
//! ```ignore
//! use mpq_minify::archive::DirArchive;
//! use mpq_minify::config::Config;
//! use mpq_minify::output::Printer;
//! use mpq_minify::pipeline::process_archive;
//!
//! let profile = Config::load(Path::new("minify.yaml"))?.resolve(Path::new("diabdat.mpq"), None)?;
//! let mut archive = DirArchive::open(Path::new("diabdat.mpq"))?;
//! let summary = process_archive(&mut archive, &profile, Path::new("out"), &Printer::new())?;
//! ```

pub mod combine;
pub mod spell_icons;

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use crate::archive::Archive;
use crate::codec::{cel_to_clx, cl2_to_clx, pcx_to_clx, PcxConversion};
use crate::config::ArchiveProfile;
use crate::error::{MinifyError, Result};
use crate::output::{display_path, Printer};
use crate::registry::Resolution;
use crate::types::{
    archive_path, file_stem, mirrored_path, normalize_name, with_extension, with_file_name,
    ConversionCommand,
};

pub use combine::{combined_output_name, process_aggregator, read_combined};
pub use spell_icons::{extract_spell_icons, ExtractError, SpellIcons};

/// One file to write, relative to the archive's output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Normalized (forward-slash) relative path.
    pub path: String,
    pub data: Vec<u8>,
}

/// Counts of what happened to the entries of one archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Entries converted on their own.
    pub converted: usize,
    /// Aggregators combined into one sheet.
    pub combined: usize,
    /// Entries copied through unchanged.
    pub extracted: usize,
    /// Spell icon sheets split into background and foreground.
    pub spell_icons: usize,
    /// Entries in the exclusion list.
    pub skipped: usize,
    /// Optional entries absent from the archive.
    pub missing: usize,
    /// Output files that could not be written.
    pub write_failures: usize,
}

/// Convert every manifest entry of `archive` into `output_root/<output name>`.
///
/// Stops at the first archive, codec or extraction error. Output files that
/// cannot be written are reported and counted, and the walk continues.
pub fn process_archive<A: Archive + ?Sized>(
    archive: &mut A,
    profile: &ArchiveProfile,
    output_root: &Path,
    printer: &Printer,
) -> Result<ConversionSummary> {
    let output_dir = profile.output_dir(output_root);
    let manifest: Cow<'_, [String]> = match &profile.manifest {
        Some(manifest) => Cow::Borrowed(manifest),
        None => Cow::Owned(archive.listfile()?),
    };
    let n = manifest.len();

    let mut summary = ConversionSummary::default();
    let mut states = profile.commands.new_states();
    let mut i = 0;
    for entry in manifest.iter() {
        let name = normalize_name(entry);
        let resolution = profile.commands.resolve(&name);

        if let Some(Resolution::Combined(id)) = resolution {
            if states.is_processed(id) {
                continue;
            }
            let aggregator = profile.commands.aggregator(id);
            i += 1;
            printer.progress(i, n, &format!("Combining {} ({})", entry, aggregator.files.len()));
            let output = process_aggregator(archive, aggregator)?;
            write_output(&output_dir, &output, printer, &mut summary);
            states.mark_processed(id);
            summary.combined += 1;
            // The other members are skipped when reached.
            i += aggregator.files.len().saturating_sub(1);
            continue;
        }

        i += 1;
        if profile.excluded.contains(&name) {
            printer.progress(i, n, &format!("Skipping {}", entry));
            summary.skipped += 1;
            continue;
        }

        let Some(data) = archive.read_file(&archive_path(entry), true, profile.is_save)? else {
            printer.progress(i, n, &format!("Missing {}", entry));
            summary.missing += 1;
            continue;
        };

        let outputs = match resolution {
            Some(Resolution::Direct(command)) => {
                printer.progress(i, n, &format!("Converting {} to CLX", entry));
                let outputs = transcode(command, &name, data)?;
                if is_spell_icon_conversion(command, &name) {
                    summary.spell_icons += 1;
                }
                summary.converted += 1;
                outputs
            }
            _ => {
                printer.progress(i, n, &format!("Extracting {}", entry));
                summary.extracted += 1;
                vec![Output { path: name, data }]
            }
        };
        for output in &outputs {
            write_output(&output_dir, output, printer, &mut summary);
        }
    }
    printer.progress(n, n, "Done");
    printer.finish_progress();
    Ok(summary)
}

/// Convert one asset with its own command.
///
/// `name` is the normalized asset name. Returns the files to write: the CLX
/// output, plus a `.pal` palette for PCX palette export. Spell icon sheets
/// yield `<stem>_bg.clx` and `<stem>_fg.clx` instead of a single output.
pub fn transcode(command: &ConversionCommand, name: &str, mut data: Vec<u8>) -> Result<Vec<Output>> {
    let clx_path = with_extension(name, "clx");
    match command {
        ConversionCommand::Cl2ToClx { widths } => {
            cl2_to_clx(&mut data, widths)
                .map_err(|e| MinifyError::codec(command.kind(), name, e))?;
            Ok(vec![Output { path: clx_path, data }])
        }
        ConversionCommand::CelToClx { widths } => {
            let clx = cel_to_clx(&data, widths)
                .map_err(|e| MinifyError::codec(command.kind(), name, e))?;
            if !is_spell_icon_conversion(command, name) {
                return Ok(vec![Output { path: clx_path, data: clx }]);
            }
            let stem = file_stem(name);
            let icons = extract_spell_icons(&clx).map_err(|source| MinifyError::SpellIcons {
                asset: name.to_string(),
                source,
            })?;
            Ok(vec![
                Output {
                    path: with_file_name(&clx_path, &format!("{}_bg.clx", stem)),
                    data: icons.background,
                },
                Output {
                    path: with_file_name(&clx_path, &format!("{}_fg.clx", stem)),
                    data: icons.foreground,
                },
            ])
        }
        ConversionCommand::PcxToClx {
            num_frames,
            transparent_color,
            export_palette,
        } => {
            let PcxConversion { clx, palette } =
                pcx_to_clx(&data, *num_frames, *transparent_color, *export_palette)
                    .map_err(|e| MinifyError::codec(command.kind(), name, e))?;
            let mut outputs = vec![Output { path: clx_path, data: clx }];
            if let Some(palette) = palette {
                outputs.push(Output {
                    path: with_extension(name, "pal"),
                    data: palette,
                });
            }
            Ok(outputs)
        }
    }
}

fn is_spell_icon_conversion(command: &ConversionCommand, name: &str) -> bool {
    matches!(command, ConversionCommand::CelToClx { .. })
        && spell_icons::is_spell_icon_sheet(file_stem(name))
}

/// Write one output, creating parent directories.
///
/// Failures are reported and counted, never propagated.
fn write_output(output_dir: &Path, output: &Output, printer: &Printer, summary: &mut ConversionSummary) {
    let path = mirrored_path(output_dir, &output.path);
    if let Err(e) = write_file(&path, &output.data) {
        printer.error("Failed", &format!("to write {}: {}", display_path(&path), e));
        summary.write_failures += 1;
    }
}

fn write_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data)
}
