//! Offline registration into a directory of JSON files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use slash_commands_core::WireCommand;
use tracing::debug;

use crate::client::{RegistrationClient, Scope};
use crate::error::ClientError;

/// A [`RegistrationClient`] that writes each scope's command set to
/// `<dir>/global.json` or `<dir>/guild-<id>.json`.
///
/// Like the remote API, each call replaces the whole file.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    dir: PathBuf,
}

impl DirectoryClient {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a scope is written to.
    pub fn path_for(&self, scope: &Scope) -> PathBuf {
        match scope {
            Scope::Global => self.dir.join("global.json"),
            Scope::Guild(id) => self.dir.join(format!("guild-{id}.json")),
        }
    }

    /// Reads back what was last written for `scope`, if anything.
    pub async fn read_scope(&self, scope: &Scope) -> Result<Option<Vec<WireCommand>>, ClientError> {
        match tokio::fs::read_to_string(self.path_for(scope)).await {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_scope(
        &self,
        scope: &Scope,
        commands: &[WireCommand],
    ) -> Result<Vec<WireCommand>, ClientError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(scope);
        let json = serde_json::to_string_pretty(commands)?;
        tokio::fs::write(&path, json).await?;
        debug!(path = %path.display(), commands = commands.len(), "wrote command set");
        Ok(commands.to_vec())
    }
}

#[async_trait]
impl RegistrationClient for DirectoryClient {
    async fn replace_global_commands(
        &self,
        _application_id: &str,
        commands: &[WireCommand],
    ) -> Result<Vec<WireCommand>, ClientError> {
        self.write_scope(&Scope::Global, commands).await
    }

    async fn replace_scoped_commands(
        &self,
        _application_id: &str,
        guild_id: &str,
        commands: &[WireCommand],
    ) -> Result<Vec<WireCommand>, ClientError> {
        self.write_scope(&Scope::Guild(guild_id.to_string()), commands)
            .await
    }
}
