//! The remote registration API, seen from the sync planner.

use std::fmt;

use async_trait::async_trait;
use slash_commands_core::WireCommand;

use crate::error::ClientError;

/// Where a batch of commands is registered.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scope {
    /// Available everywhere the application is installed.
    Global,
    /// Restricted to one guild.
    Guild(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::Guild(id) => write!(f, "guild {id}"),
        }
    }
}

/// Full-replace command registration.
///
/// Each call overwrites the entire command set of its scope with `commands`
/// and returns what the remote side now holds.
#[async_trait]
pub trait RegistrationClient: Send + Sync {
    async fn replace_global_commands(
        &self,
        application_id: &str,
        commands: &[WireCommand],
    ) -> Result<Vec<WireCommand>, ClientError>;

    async fn replace_scoped_commands(
        &self,
        application_id: &str,
        guild_id: &str,
        commands: &[WireCommand],
    ) -> Result<Vec<WireCommand>, ClientError>;

    /// Dispatches to the call matching `scope`.
    async fn replace_commands(
        &self,
        application_id: &str,
        scope: &Scope,
        commands: &[WireCommand],
    ) -> Result<Vec<WireCommand>, ClientError> {
        match scope {
            Scope::Global => self.replace_global_commands(application_id, commands).await,
            Scope::Guild(id) => {
                self.replace_scoped_commands(application_id, id, commands)
                    .await
            }
        }
    }
}
