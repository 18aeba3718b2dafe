//! Command registry, fingerprint store and configuration for slash command
//! sync.
//!
//! This crate sits between the compiler in `slash-commands-core` and the
//! sync planner: it loads command definitions from code or from documents
//! on disk, compiles them, and records which ones changed since the last
//! successful registration.
//!
//! # Quick start
//!
//! ```no_run
//! use slash_commands_db::{CommandRegistry, FingerprintStore, SyncConfig};
//!
//! let config = SyncConfig::load("sync.yml").unwrap();
//! let mut store = FingerprintStore::open(&config.fingerprint_file, config.force_refresh(false));
//!
//! let mut registry = CommandRegistry::new();
//! for dir in &config.command_dirs {
//!     registry.load_dir(dir, &mut store, |_name| Some(())).unwrap();
//! }
//!
//! for name in store.stale_names() {
//!     println!("{name} needs registering");
//! }
//! ```

mod config;
mod error;
mod fingerprint;
mod loader;
mod registry;
mod storage;

pub use config::SyncConfig;
pub use error::{DatabaseError, Result};
pub use fingerprint::{DEFAULT_FINGERPRINT_FILE, FingerprintStore, fingerprint};
pub use loader::{
    CommandDocument, DOCUMENT_EXTENSIONS, LoadFailure, LoadReport, collect_command_paths,
    read_command_file,
};
pub use registry::{CommandFile, CommandRegistry, CommandSource, CompiledCommand, compile_command};
pub use storage::{FileStorage, MemoryStorage, TextStorage};
