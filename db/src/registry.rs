//! In-memory command registry keyed by command name.
//!
//! The registry is built once at startup by loading command files one after
//! another. Each load compiles the schema, fingerprints the result against
//! the [`FingerprintStore`], and keeps the compiled document together with
//! its guild scope list and handler.

use std::collections::BTreeMap;
use std::collections::btree_map;

use slash_commands_core::{CommandSchema, CompileError, WireCommand, check_prebuilt, compile};
use tracing::{debug, warn};

use crate::error::Result;
use crate::fingerprint::FingerprintStore;

/// What a command file provides as its definition.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandSource {
    /// A declarative schema, compiled on load.
    Schema(CommandSchema),
    /// A wire document written by hand, used as is.
    Prebuilt(WireCommand),
}

impl CommandSource {
    /// Name of the command being defined.
    pub fn name(&self) -> &str {
        match self {
            CommandSource::Schema(schema) => &schema.name,
            CommandSource::Prebuilt(doc) => &doc.name,
        }
    }
}

/// One command as supplied by the application: definition, scope, handler.
///
/// `H` is the application's handler type; the registry never calls it.
#[derive(Debug, Clone)]
pub struct CommandFile<H> {
    pub source: CommandSource,
    /// Guild ids the command is restricted to; global when `None`.
    pub guild: Option<Vec<String>>,
    pub execute: Option<H>,
}

impl<H> CommandFile<H> {
    /// A global command defined by a schema.
    pub fn new(schema: CommandSchema, execute: H) -> Self {
        Self {
            source: CommandSource::Schema(schema),
            guild: None,
            execute: Some(execute),
        }
    }

    /// A global command defined by a pre-built wire document.
    pub fn prebuilt(doc: WireCommand, execute: H) -> Self {
        Self {
            source: CommandSource::Prebuilt(doc),
            guild: None,
            execute: Some(execute),
        }
    }

    /// Restricts the command to the given guilds.
    pub fn in_guilds<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.guild = Some(ids.into_iter().map(Into::into).collect());
        self
    }
}

/// A compiled command ready for registration.
#[derive(Debug, Clone)]
pub struct CompiledCommand<H> {
    pub data: WireCommand,
    /// Deduplicated guild ids; `None` for a global command.
    pub guild: Option<Vec<String>>,
    pub execute: H,
}

impl<H> CompiledCommand<H> {
    /// Command name.
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Returns `true` if the command is registered globally.
    pub fn is_global(&self) -> bool {
        self.guild.is_none()
    }
}

/// Compiles a command file without touching any registry or store.
///
/// An empty guild list is treated the same as no list (global), and
/// repeated guild ids are collapsed.
///
/// # Errors
///
/// Returns [`DatabaseError::Compile`](crate::DatabaseError::Compile) if the
/// schema fails to compile or the handler is missing.
pub fn compile_command<H>(file: CommandFile<H>) -> Result<CompiledCommand<H>> {
    let data = match file.source {
        CommandSource::Schema(schema) => compile(&schema)?,
        CommandSource::Prebuilt(doc) => {
            check_prebuilt(&doc)?;
            doc
        }
    };

    let execute = file.execute.ok_or_else(|| CompileError::MissingRequiredField {
        command: data.name.clone(),
        path: data.name.clone(),
        field: "execute",
    })?;

    let guild = file.guild.filter(|ids| !ids.is_empty()).map(|ids| {
        let mut unique: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        unique
    });

    Ok(CompiledCommand {
        data,
        guild,
        execute,
    })
}

/// Compiled commands keyed by name, iterated in name order.
///
/// # Examples
///
/// ```
/// use slash_commands_core::CommandSchema;
/// use slash_commands_db::{CommandFile, CommandRegistry, FingerprintStore, MemoryStorage};
///
/// let mut store = FingerprintStore::load(MemoryStorage::default(), false);
/// let mut registry = CommandRegistry::new();
///
/// registry
///     .load(CommandFile::new(CommandSchema::new("ping", "pong"), ()), &mut store)
///     .unwrap();
///
/// assert!(registry.contains("ping"));
/// assert!(store.is_stale("ping"));
/// ```
#[derive(Debug)]
pub struct CommandRegistry<H> {
    commands: BTreeMap<String, CompiledCommand<H>>,
}

impl<H> Default for CommandRegistry<H> {
    fn default() -> Self {
        Self {
            commands: BTreeMap::new(),
        }
    }
}

impl<H> CommandRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `file`, fingerprints it and stores it.
    ///
    /// A command with the same name as one already loaded replaces it; this
    /// is how a definition is reloaded.
    ///
    /// # Errors
    ///
    /// Returns the compile error for this command; the registry and store
    /// are unchanged in that case.
    pub fn load(
        &mut self,
        file: CommandFile<H>,
        store: &mut FingerprintStore,
    ) -> Result<&CompiledCommand<H>> {
        let compiled = compile_command(file)?;
        let stale = store.check(&compiled.data)?;
        let name = compiled.data.name.clone();
        debug!(command = %name, stale, global = compiled.is_global(), "loaded command");

        match self.commands.entry(name) {
            btree_map::Entry::Occupied(mut entry) => {
                warn!(command = %entry.key(), "replacing previously loaded command");
                entry.insert(compiled);
                Ok(entry.into_mut())
            }
            btree_map::Entry::Vacant(entry) => Ok(entry.insert(compiled)),
        }
    }

    /// Looks up a command by name.
    pub fn get(&self, name: &str) -> Option<&CompiledCommand<H>> {
        self.commands.get(name)
    }

    /// Returns `true` if a command with this name is loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Number of loaded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterates over compiled commands in name order.
    pub fn iter(&self) -> impl Iterator<Item = &CompiledCommand<H>> {
        self.commands.values()
    }

    /// Command names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }
}
