//! Sync configuration loaded from YAML.
//!
//! # Example YAML
//!
//! ```yaml
//! application_id: "123456789012345678"
//! command_dirs:
//!   - commands
//!   - admin/commands
//! fingerprint_file: command-hashes.json
//! force_refresh: false
//! ```
//!
//! Relative paths are resolved against the directory containing the
//! configuration file.

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::fingerprint::DEFAULT_FINGERPRINT_FILE;

fn default_command_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("commands")]
}

fn default_fingerprint_file() -> PathBuf {
    PathBuf::from(DEFAULT_FINGERPRINT_FILE)
}

/// Settings for one application's command sync.
///
/// # Examples
///
/// ```
/// use slash_commands_db::SyncConfig;
///
/// let config: SyncConfig = serde_yaml::from_str("application_id: \"42\"").unwrap();
/// assert_eq!(config.fingerprint_file.to_str(), Some("command-hashes.json"));
/// assert!(!config.force_refresh);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Application the commands are registered for.
    pub application_id: String,
    /// Directories scanned recursively for command documents.
    #[serde(default = "default_command_dirs")]
    pub command_dirs: Vec<PathBuf>,
    /// Where confirmed fingerprints are persisted between runs.
    #[serde(default = "default_fingerprint_file")]
    pub fingerprint_file: PathBuf,
    /// Treat every command as stale on every run.
    #[serde(default)]
    pub force_refresh: bool,
}

impl SyncConfig {
    pub fn new(application_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            command_dirs: default_command_dirs(),
            fingerprint_file: default_fingerprint_file(),
            force_refresh: false,
        }
    }

    /// Loads configuration from a YAML file.
    ///
    /// Relative `command_dirs` and `fingerprint_file` entries are rebased
    /// onto the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::DatabaseError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut config: Self = serde_yaml::from_reader(reader)?;

        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.command_dirs = config
                .command_dirs
                .into_iter()
                .map(|dir| base.join(dir))
                .collect();
            config.fingerprint_file = base.join(&config.fingerprint_file);
        }
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::DatabaseError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Effective force-refresh flag: on if either the file or the command
    /// line asks for it.
    pub fn force_refresh(&self, cli_flag: bool) -> bool {
        match (self.force_refresh, cli_flag) {
            (true, _) => {
                info!("force refresh enabled by configuration");
                true
            }
            (false, true) => {
                info!("force refresh enabled by --refresh-all");
                true
            }
            (false, false) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: SyncConfig = serde_yaml::from_str("application_id: \"1\"\n").unwrap();
        assert_eq!(config, SyncConfig::new("1"));
    }

    #[test]
    fn test_force_refresh_sources() {
        let mut config = SyncConfig::new("1");
        assert!(!config.force_refresh(false));
        assert!(config.force_refresh(true));
        config.force_refresh = true;
        assert!(config.force_refresh(false));
    }

    #[test]
    fn test_load_rebases_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.yml");
        std::fs::write(
            &path,
            "application_id: \"1\"\ncommand_dirs: [cmds]\nforce_refresh: true\n",
        )
        .unwrap();

        let config = SyncConfig::load(&path).unwrap();
        assert_eq!(config.command_dirs, vec![dir.path().join("cmds")]);
        assert_eq!(
            config.fingerprint_file,
            dir.path().join(DEFAULT_FINGERPRINT_FILE)
        );
        assert!(config.force_refresh);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync.yml");
        let mut config = SyncConfig::new("99");
        config.command_dirs = vec![dir.path().join("a")];
        config.fingerprint_file = dir.path().join("hashes.json");
        config.save(&path).unwrap();

        assert_eq!(SyncConfig::load(&path).unwrap(), config);
    }
}
