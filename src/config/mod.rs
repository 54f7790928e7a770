//! Conversion profiles (minify.yaml).
//!
//! The config file names, per archive, the listfile to walk, the files to
//! leave out and the conversion directives to apply. Paths are relative to
//! the config file.

mod profile;

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::archive::split_lines;
use crate::error::{MinifyError, Result};
use crate::parser::parse_directives;
use crate::registry::CommandTable;

pub use profile::{default_output_name, is_save_extension, ArchiveProfile};

/// The name of the config file looked up in the current directory.
pub const CONFIG_FILENAME: &str = "minify.yaml";

/// Conversion config loaded from minify.yaml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listfile used for save archives (`.sv`, `.hsv`).
    pub save_listfile: Option<PathBuf>,

    /// Profiles keyed by archive source name (lower-cased file stem).
    pub profiles: BTreeMap<String, ProfileConfig>,

    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Files describing how to convert one archive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Manifest to walk instead of the archive's own `(listfile)`.
    pub listfile: Option<PathBuf>,
    /// Asset names to leave out, one per line.
    pub excludes: Option<PathBuf>,
    /// Conversion directives, one per line.
    pub commands: Option<PathBuf>,
    /// Output directory name; defaults to the source name.
    pub output_name: Option<String>,
}

impl Config {
    /// Load config from a minify.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MinifyError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        let mut config = Self::parse(&content)?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    /// Parse config from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| MinifyError::Config {
            message: format!("Invalid config: {}", e),
            help: Some(format!("Check {} syntax", CONFIG_FILENAME)),
        })
    }

    /// Build the profile for one archive.
    ///
    /// `listfile` overrides any configured manifest.
    pub fn resolve(&self, archive: &Path, listfile: Option<&Path>) -> Result<ArchiveProfile> {
        let mut profile = ArchiveProfile::for_archive(archive);
        let config = self.profiles.get(&profile.source_name);

        let manifest = match (listfile, profile.is_save, config) {
            (Some(path), _, _) => Some(path.to_path_buf()),
            (None, true, _) => self.save_listfile.as_ref().map(|p| self.path(p)),
            (None, false, Some(config)) => config.listfile.as_ref().map(|p| self.path(p)),
            (None, false, None) => None,
        };
        if let Some(path) = manifest {
            profile.manifest = Some(read_list(&path)?);
        }

        let Some(config) = config else {
            return Ok(profile);
        };
        if let Some(name) = &config.output_name {
            if !profile.is_save {
                profile.output_name = name.clone();
            }
        }
        if let Some(path) = &config.excludes {
            profile.excluded = read_list(&self.path(path))?.into_iter().collect::<HashSet<_>>();
        }
        if let Some(path) = &config.commands {
            profile.commands = load_commands(&self.path(path))?;
        }
        Ok(profile)
    }

    fn path(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| MinifyError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Read a list file, split on NUL/CR/LF with empty entries dropped.
fn read_list(path: &Path) -> Result<Vec<String>> {
    Ok(split_lines(&read_text(path)?))
}

/// Parse a directives file into a command table.
pub fn load_commands(path: &Path) -> Result<CommandTable> {
    let content = read_text(path)?;
    let directives = parse_directives(content.lines()).map_err(|e| match e {
        MinifyError::Parse { message, help } => MinifyError::Parse {
            message: format!("{}: {}", path.display(), message),
            help,
        },
        other => other,
    })?;
    CommandTable::from_directives(directives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Resolution;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
save_listfile: lists/save.txt
profiles:
  diabdat:
    listfile: lists/diabdat.txt
    excludes: lists/diabdat-rm.txt
    commands: lists/diabdat-clx.txt
  hfmonk:
    output_name: hellfire-monk
"#;

    fn project() -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("lists")).unwrap();
        fs::write(dir.path().join("lists/save.txt"), "hero\r\ngame\r\n").unwrap();
        fs::write(dir.path().join("lists/diabdat.txt"), "a.cel\nb.wav\nc.pcx\n").unwrap();
        fs::write(dir.path().join("lists/diabdat-rm.txt"), "b.wav\n").unwrap();
        fs::write(
            dir.path().join("lists/diabdat-clx.txt"),
            "# ui\ncel2clx --width 10 a.cel\npcx2clx --num-sprites 2 c.pcx\n",
        )
        .unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, CONFIG).unwrap();
        let config = Config::load(&path).unwrap();
        (dir, config)
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("{}").unwrap();
        assert!(config.profiles.is_empty());
        assert_eq!(config.save_listfile, None);
    }

    #[test]
    fn test_parse_invalid_config() {
        let err = Config::parse("profiles: [1, 2").unwrap_err();
        assert!(matches!(err, MinifyError::Config { .. }));
    }

    #[test]
    fn test_resolve_configured_archive() {
        let (_dir, config) = project();
        let profile = config.resolve(Path::new("DIABDAT.MPQ"), None).unwrap();

        assert_eq!(profile.source_name, "diabdat");
        assert_eq!(profile.output_name, "diabdat");
        assert!(!profile.is_save);
        assert_eq!(
            profile.manifest,
            Some(vec!["a.cel".to_string(), "b.wav".to_string(), "c.pcx".to_string()])
        );
        assert!(profile.excluded.contains("b.wav"));
        assert!(matches!(profile.commands.resolve("a.cel"), Some(Resolution::Direct(_))));
        assert_eq!(profile.commands.len(), 2);
    }

    #[test]
    fn test_resolve_save_archive() {
        let (_dir, config) = project();
        let profile = config.resolve(Path::new("saves/single_0.sv"), None).unwrap();

        assert!(profile.is_save);
        assert_eq!(profile.output_name, "single_0_sv");
        assert_eq!(profile.manifest, Some(vec!["hero".to_string(), "game".to_string()]));
        assert!(profile.commands.is_empty());
    }

    #[test]
    fn test_resolve_unknown_archive_uses_own_listfile() {
        let (_dir, config) = project();
        let profile = config.resolve(Path::new("patch_rt.mpq"), None).unwrap();
        assert_eq!(profile.manifest, None);
        assert!(profile.excluded.is_empty());
        assert_eq!(profile.output_name, "patch_rt");
    }

    #[test]
    fn test_output_name_override() {
        let (_dir, config) = project();
        let profile = config.resolve(Path::new("hfmonk.mpq"), None).unwrap();
        assert_eq!(profile.output_name, "hellfire-monk");
    }

    #[test]
    fn test_listfile_override() {
        let (dir, config) = project();
        let listfile = dir.path().join("override.txt");
        fs::write(&listfile, "only.cel\n").unwrap();
        let profile = config.resolve(Path::new("diabdat.mpq"), Some(&listfile)).unwrap();
        assert_eq!(profile.manifest, Some(vec!["only.cel".to_string()]));
    }

    #[test]
    fn test_bad_directive_names_file_and_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clx.txt");
        fs::write(&path, "cel2clx --width 10 a.cel\nwav2mp3 b.wav\n").unwrap();
        let err = load_commands(&path).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("clx.txt: line 2"), "{message}");
        assert!(message.contains("Unknown command: wav2mp3"), "{message}");
    }

    #[test]
    fn test_missing_referenced_file() {
        let config = Config::parse("profiles:\n  spawn:\n    commands: nowhere.txt\n").unwrap();
        let err = config.resolve(Path::new("spawn.mpq"), None).unwrap_err();
        assert!(matches!(err, MinifyError::Io { .. }));
    }
}
