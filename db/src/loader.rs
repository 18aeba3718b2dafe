//! Loading command documents from disk.
//!
//! A command document is a JSON or YAML file holding one command:
//!
//! ```yaml
//! data:
//!   name: ping
//!   description: Replies with pong
//! guild: ["123456789012345678"]
//! ```
//!
//! `data` is a declarative schema. Legacy documents carry a ready-made wire
//! body under `wire` instead; exactly one of the two must be present.
//!
//! [`CommandRegistry::load_dir`] walks a directory tree, loads every
//! document it finds and keeps going past files that fail, so one broken
//! definition never hides the others.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use slash_commands_core::{CommandSchema, WireCommand};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{DatabaseError, Result};
use crate::fingerprint::FingerprintStore;
use crate::registry::{CommandFile, CommandRegistry, CommandSource};

/// File extensions recognized as command documents.
pub const DOCUMENT_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// On-disk form of one command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<CommandSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wire: Option<WireCommand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild: Option<Vec<String>>,
}

impl CommandDocument {
    /// Reads a document, choosing YAML or JSON by file extension.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::IoError`] if the file cannot be read,
    /// [`DatabaseError::JsonError`] / [`DatabaseError::YamlError`] if it does
    /// not parse, or [`DatabaseError::InvalidDocument`] for an unknown
    /// extension.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match extension(path) {
            Some("json") => Ok(serde_json::from_str(&text)?),
            Some("yaml" | "yml") => Ok(serde_yaml::from_str(&text)?),
            _ => Err(DatabaseError::InvalidDocument {
                path: path.to_path_buf(),
                reason: "expected a .json, .yaml or .yml file".into(),
            }),
        }
    }

    /// Splits the document into its definition and guild list.
    ///
    /// `path` is only used for the error message.
    pub fn into_source(self, path: &Path) -> Result<(CommandSource, Option<Vec<String>>)> {
        let source = match (self.data, self.wire) {
            (Some(schema), None) => CommandSource::Schema(schema),
            (None, Some(doc)) => CommandSource::Prebuilt(doc),
            (Some(_), Some(_)) => {
                return Err(DatabaseError::InvalidDocument {
                    path: path.to_path_buf(),
                    reason: "`data` and `wire` are mutually exclusive".into(),
                });
            }
            (None, None) => {
                return Err(DatabaseError::InvalidDocument {
                    path: path.to_path_buf(),
                    reason: "one of `data` or `wire` is required".into(),
                });
            }
        };
        Ok((source, self.guild))
    }
}

/// A file that could not be loaded.
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: DatabaseError,
}

/// Outcome of loading a directory of command documents.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Names of the commands that loaded, in load order.
    pub loaded: Vec<String>,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    /// Returns `true` if every document loaded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|e| e.to_str())
}

/// Lists every command document under `dir`, recursively, sorted by path.
///
/// Symbolic links are not followed, so a link pointing back up the tree
/// cannot make a document load twice.
///
/// # Errors
///
/// Returns [`DatabaseError::IoError`] if a directory cannot be read.
pub fn collect_command_paths(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_dir() {
            continue;
        }
        if extension(entry.path()).is_some_and(|e| DOCUMENT_EXTENSIONS.contains(&e)) {
            paths.push(entry.into_path());
        }
    }

    paths.sort();
    Ok(paths)
}

/// Reads `path` into a [`CommandFile`], asking `resolve_handler` for the
/// handler registered under the command's name.
pub fn read_command_file<H>(
    path: &Path,
    resolve_handler: impl FnOnce(&str) -> Option<H>,
) -> Result<CommandFile<H>> {
    let (source, guild) = CommandDocument::read(path)?.into_source(path)?;
    let execute = resolve_handler(source.name());
    Ok(CommandFile {
        source,
        guild,
        execute,
    })
}

impl<H> CommandRegistry<H> {
    /// Loads every command document under `dir`.
    ///
    /// Files are processed in sorted path order. A file that fails to parse
    /// or compile is logged, recorded in the report and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::IoError`] only if the directory tree itself
    /// cannot be listed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use slash_commands_db::{CommandRegistry, FingerprintStore};
    ///
    /// let mut store = FingerprintStore::open("command-hashes.json", false);
    /// let mut registry = CommandRegistry::new();
    /// let report = registry.load_dir("commands", &mut store, |_name| Some(())).unwrap();
    /// println!("{} loaded, {} failed", report.loaded.len(), report.failures.len());
    /// ```
    pub fn load_dir(
        &mut self,
        dir: impl AsRef<Path>,
        store: &mut FingerprintStore,
        mut resolve_handler: impl FnMut(&str) -> Option<H>,
    ) -> Result<LoadReport> {
        let dir = dir.as_ref();
        let mut report = LoadReport::default();

        for path in collect_command_paths(dir)? {
            let loaded = read_command_file(&path, &mut resolve_handler)
                .and_then(|file| self.load(file, store).map(|cmd| cmd.name().to_string()));
            match loaded {
                Ok(name) => report.loaded.push(name),
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping command file");
                    report.failures.push(LoadFailure { path, error });
                }
            }
        }

        info!(
            dir = %dir.display(),
            loaded = report.loaded.len(),
            failed = report.failures.len(),
            "loaded command directory"
        );
        Ok(report)
    }
}
