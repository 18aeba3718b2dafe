//! Incremental, scope-partitioned registration of compiled commands.
//!
//! The planner groups every command in a
//! [`CommandRegistry`](slash_commands_db::CommandRegistry) into a global
//! batch and one batch per guild, and only calls the registration API for
//! batches holding a changed command. Calls go through the
//! [`RegistrationClient`] trait; [`DirectoryClient`] implements it by
//! writing JSON files.
//!
//! A scope whose call fails is reported and skipped. Its commands keep
//! their stale fingerprints, so the next run retries that scope alone.

mod client;
mod error;
mod execute;
mod export;
mod plan;
mod ready;

pub use client::{RegistrationClient, Scope};
pub use error::{ClientError, Result, SyncError};
pub use execute::{CommandSync, ScopeOutcome, ScopeReport, SyncReport};
pub use export::DirectoryClient;
pub use plan::{SyncPlan, is_dirty, plan};
pub use ready::{ReadySignal, ReadyTrigger, ready_channel};
