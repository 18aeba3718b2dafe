//! Content fingerprints for change detection across runs.
//!
//! Every compiled command is hashed (SHA-256 of its canonical JSON). The
//! store keeps the hashes confirmed by the last successful registration and
//! compares each freshly loaded command against them:
//!
//! - **Unchanged**: the stored hash equals the new one; nothing to send.
//! - **Stale**: the hash differs, is absent, or a forced refresh is active.
//!   The new hash waits in the stale table until [`commit`] confirms it.
//!
//! Lifecycle per run: [`load`] → [`check`] each command → [`commit`] the
//! ones that registered → [`prune`] → [`flush`]. A crash before `flush`
//! loses only this run's commits; those commands come back stale next time.
//!
//! [`load`]: FingerprintStore::load
//! [`check`]: FingerprintStore::check
//! [`commit`]: FingerprintStore::commit
//! [`prune`]: FingerprintStore::prune
//! [`flush`]: FingerprintStore::flush
//!
//! # Examples
//!
//! ```
//! use slash_commands_core::WireCommand;
//! use slash_commands_db::{FingerprintStore, MemoryStorage};
//!
//! let storage = MemoryStorage::default();
//! let ping = WireCommand::new("ping", "pong");
//!
//! // First run: nothing stored, so the command is stale.
//! let mut store = FingerprintStore::load(storage.clone(), false);
//! assert!(store.check(&ping).unwrap());
//! store.commit("ping").unwrap();
//! store.prune();
//! store.flush().unwrap();
//!
//! // Second run: same document, nothing to do.
//! let mut store = FingerprintStore::load(storage, false);
//! assert!(!store.check(&ping).unwrap());
//! assert!(!store.has_stale());
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};
use slash_commands_core::WireCommand;
use tracing::{debug, info, warn};

use crate::error::{DatabaseError, Result};
use crate::storage::{FileStorage, TextStorage};

/// File name used when no fingerprint path is configured.
pub const DEFAULT_FINGERPRINT_FILE: &str = "command-hashes.json";

/// Computes the SHA-256 hex digest of a value's canonical JSON.
///
/// The value is first converted to a JSON tree whose object keys are
/// sorted, then serialized compactly, so the digest does not depend on
/// struct field order or formatting.
///
/// # Examples
///
/// ```
/// use slash_commands_db::fingerprint;
///
/// let a = fingerprint(&serde_json::json!({ "b": 1, "a": 2 })).unwrap();
/// let b = fingerprint(&serde_json::json!({ "a": 2, "b": 1 })).unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 64);
/// ```
///
/// # Errors
///
/// Returns [`DatabaseError::JsonError`] if the value cannot be serialized.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let canonical = canonicalize(serde_json::to_value(value)?);
    let bytes = serde_json::to_vec(&canonical)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

fn canonicalize(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Persistent name → hash table plus the per-run seen/stale bookkeeping.
///
/// Not synchronized: exactly one sync pass may use a store at a time.
pub struct FingerprintStore {
    storage: Box<dyn TextStorage + Send + Sync>,
    hashes: BTreeMap<String, String>,
    seen: BTreeSet<String>,
    stale: BTreeMap<String, String>,
    force_refresh: bool,
}

impl std::fmt::Debug for FingerprintStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FingerprintStore")
            .field("hashes", &self.hashes)
            .field("seen", &self.seen)
            .field("stale", &self.stale)
            .field("force_refresh", &self.force_refresh)
            .finish_non_exhaustive()
    }
}

impl FingerprintStore {
    /// Loads stored hashes from `storage`.
    ///
    /// Missing, unreadable or malformed content yields an empty table; the
    /// only consequence is that every command is treated as stale.
    pub fn load(storage: impl TextStorage + Send + Sync + 'static, force_refresh: bool) -> Self {
        let hashes = match storage.read_text() {
            Ok(Some(text)) => match serde_json::from_str::<BTreeMap<String, String>>(&text) {
                Ok(hashes) => hashes,
                Err(e) => {
                    warn!(error = %e, "fingerprint file is not valid JSON; treating every command as changed");
                    BTreeMap::new()
                }
            },
            Ok(None) => {
                info!(
                    "no fingerprint file yet; every command will be registered \
                     (force later runs with --refresh-all or `force_refresh: true`)"
                );
                BTreeMap::new()
            }
            Err(e) => {
                warn!(error = %e, "could not read fingerprint file; treating every command as changed");
                BTreeMap::new()
            }
        };
        debug!(entries = hashes.len(), force_refresh, "loaded fingerprints");

        Self {
            storage: Box::new(storage),
            hashes,
            seen: BTreeSet::new(),
            stale: BTreeMap::new(),
            force_refresh,
        }
    }

    /// Loads stored hashes from a JSON file at `path`.
    pub fn open(path: impl AsRef<Path>, force_refresh: bool) -> Self {
        Self::load(FileStorage::new(path.as_ref()), force_refresh)
    }

    /// Fingerprints a compiled command and records whether it is stale.
    ///
    /// Returns `true` if the command is stale. Calling this again with the
    /// same document recomputes the same hash and records the same outcome.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::JsonError`] if the document cannot be
    /// serialized.
    pub fn check(&mut self, doc: &WireCommand) -> Result<bool> {
        let hash = fingerprint(doc)?;
        let name = doc.name.clone();
        self.seen.insert(name.clone());

        let changed = self.hashes.get(&name) != Some(&hash);
        if changed || self.force_refresh {
            debug!(command = %name, changed, "command is stale");
            self.stale.insert(name, hash);
            Ok(true)
        } else {
            debug!(command = %name, "command is unchanged");
            self.stale.remove(&name);
            Ok(false)
        }
    }

    /// Confirms the pending hash of `name` after a successful registration.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::StaleCommitMismatch`] if no stale hash is
    /// pending for `name`; the stored table is left untouched.
    pub fn commit(&mut self, name: &str) -> Result<()> {
        let hash = self
            .stale
            .remove(name)
            .ok_or_else(|| DatabaseError::StaleCommitMismatch(name.to_string()))?;
        self.hashes.insert(name.to_string(), hash);
        Ok(())
    }

    /// Drops stored hashes for commands not seen this run.
    ///
    /// Returns the removed names.
    pub fn prune(&mut self) -> Vec<String> {
        let removed: Vec<String> = self
            .hashes
            .keys()
            .filter(|name| !self.seen.contains(*name))
            .cloned()
            .collect();
        for name in &removed {
            debug!(command = %name, "pruning fingerprint of removed command");
            self.hashes.remove(name);
        }
        removed
    }

    /// Writes the stored table back, replacing previous content.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::JsonError`] or [`DatabaseError::IoError`] if
    /// the table cannot be serialized or written.
    pub fn flush(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.hashes)?;
        self.storage.write_text(&text)?;
        debug!(entries = self.hashes.len(), "flushed fingerprints");
        Ok(())
    }

    /// Returns `true` if `name` has a pending stale hash.
    pub fn is_stale(&self, name: &str) -> bool {
        self.stale.contains_key(name)
    }

    /// Returns `true` if any command is stale.
    pub fn has_stale(&self) -> bool {
        !self.stale.is_empty()
    }

    /// Names with a pending stale hash, sorted.
    pub fn stale_names(&self) -> impl Iterator<Item = &str> {
        self.stale.keys().map(String::as_str)
    }

    /// Returns `true` if `name` was checked this run.
    pub fn was_seen(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    /// The confirmed hash for `name`, if any.
    pub fn stored_hash(&self, name: &str) -> Option<&str> {
        self.hashes.get(name).map(String::as_str)
    }

    /// Whether every checked command is forced stale.
    pub fn force_refresh(&self) -> bool {
        self.force_refresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn doc(name: &str, description: &str) -> WireCommand {
        WireCommand::new(name, description)
    }

    fn committed_run(storage: &MemoryStorage, docs: &[WireCommand]) {
        let mut store = FingerprintStore::load(storage.clone(), false);
        for d in docs {
            store.check(d).unwrap();
            store.commit(&d.name).unwrap();
        }
        store.prune();
        store.flush().unwrap();
    }

    #[test]
    fn test_sha256_of_canonical_json() {
        // SHA-256 of `{"a":1}`
        assert_eq!(
            fingerprint(&serde_json::json!({ "a": 1 })).unwrap(),
            "015abd7f5cc57a2dd94b7590f04ad8084273905ee33ec5cebeae62276a97f862"
        );
    }

    #[test]
    fn test_unchanged_after_commit_and_flush() {
        let storage = MemoryStorage::default();
        committed_run(&storage, &[doc("ping", "pong")]);

        let mut store = FingerprintStore::load(storage, false);
        assert!(!store.check(&doc("ping", "pong")).unwrap());
        assert!(!store.has_stale());
        assert!(store.was_seen("ping"));
    }

    #[test]
    fn test_changed_description_is_stale() {
        let storage = MemoryStorage::default();
        committed_run(&storage, &[doc("ping", "pong")]);

        let mut store = FingerprintStore::load(storage, false);
        assert!(store.check(&doc("ping", "pong!")).unwrap());
        assert_eq!(store.stale_names().collect::<Vec<_>>(), vec!["ping"]);
    }

    #[test]
    fn test_force_refresh_marks_everything_stale() {
        let storage = MemoryStorage::default();
        committed_run(&storage, &[doc("ping", "pong"), doc("echo", "echo")]);

        let mut store = FingerprintStore::load(storage, true);
        assert!(store.check(&doc("ping", "pong")).unwrap());
        assert!(store.check(&doc("echo", "echo")).unwrap());
        assert_eq!(store.stale_names().count(), 2);
    }

    #[test]
    fn test_check_is_idempotent() {
        let mut store = FingerprintStore::load(MemoryStorage::default(), false);
        assert!(store.check(&doc("ping", "pong")).unwrap());
        assert!(store.check(&doc("ping", "pong")).unwrap());
        assert_eq!(store.stale_names().count(), 1);
    }

    #[test]
    fn test_commit_without_stale_entry() {
        let mut store = FingerprintStore::load(MemoryStorage::default(), false);
        let err = store.commit("ghost").unwrap_err();
        assert!(matches!(err, DatabaseError::StaleCommitMismatch(name) if name == "ghost"));
        assert!(store.stored_hash("ghost").is_none());
    }

    #[test]
    fn test_commit_moves_hash() {
        let mut store = FingerprintStore::load(MemoryStorage::default(), false);
        store.check(&doc("ping", "pong")).unwrap();
        store.commit("ping").unwrap();
        assert!(!store.is_stale("ping"));
        assert_eq!(
            store.stored_hash("ping").map(str::to_string),
            Some(fingerprint(&doc("ping", "pong")).unwrap())
        );
    }

    #[test]
    fn test_prune_removes_unseen_only() {
        let storage = MemoryStorage::default();
        committed_run(&storage, &[doc("ping", "pong"), doc("old", "gone soon")]);

        let mut store = FingerprintStore::load(storage, false);
        store.check(&doc("ping", "pong")).unwrap();
        assert_eq!(store.prune(), vec!["old".to_string()]);
        assert!(store.stored_hash("ping").is_some());
        assert!(store.stored_hash("old").is_none());
    }

    #[test]
    fn test_malformed_storage_is_empty() {
        let store = FingerprintStore::load(MemoryStorage::with_text("not json"), false);
        assert!(store.stored_hash("ping").is_none());
    }

    #[test]
    fn test_flush_format() {
        let storage = MemoryStorage::default();
        committed_run(&storage, &[doc("b", "B"), doc("a", "A")]);

        let text = storage.read_text().unwrap().unwrap();
        let a = text.find("\"a\"").unwrap();
        let b = text.find("\"b\"").unwrap();
        assert!(a < b);
        assert!(text.contains('\n'));
    }
}
