//! Running a sync plan against a registration client.
//!
//! A pass calls the global scope first, then every dirty guild scope
//! concurrently. Once all calls have settled, fingerprints are committed
//! one at a time: a stale command is committed only if every scope it was
//! sent to accepted it, so a command shared by two guilds stays stale when
//! either call fails and is retried on the next run.

use std::collections::BTreeMap;

use futures::future::join_all;
use slash_commands_core::WireCommand;
use slash_commands_db::{CommandRegistry, FingerprintStore};
use tracing::{debug, error, info, warn};

use crate::client::{RegistrationClient, Scope};
use crate::error::{ClientError, Result};
use crate::plan::{SyncPlan, is_dirty};
use crate::ready::ReadySignal;

/// What happened to one scope during a pass.
#[derive(Debug)]
pub enum ScopeOutcome {
    /// Nothing in the scope changed; no call was made.
    Unchanged,
    /// The scope was replaced.
    Synced {
        /// Names sent in the call, in batch order.
        commands: Vec<String>,
        /// Number of commands the remote side reported back.
        registered: usize,
    },
    /// The call failed; the scope's commands stay stale.
    Failed { error: ClientError },
}

impl ScopeOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ScopeOutcome::Failed { .. })
    }
}

/// Outcome of one scope.
#[derive(Debug)]
pub struct ScopeReport {
    pub scope: Scope,
    pub outcome: ScopeOutcome,
}

/// Outcome of a sync pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// One entry per non-empty scope, global first.
    pub scopes: Vec<ScopeReport>,
    /// Commands whose fingerprints were confirmed.
    pub committed: Vec<String>,
    /// Fingerprints dropped for commands no longer loaded.
    pub pruned: Vec<String>,
}

impl SyncReport {
    /// Returns `true` if no scope call failed.
    pub fn is_success(&self) -> bool {
        !self.scopes.iter().any(|s| s.outcome.is_failed())
    }

    /// Number of registration calls that were made.
    pub fn calls(&self) -> usize {
        self.scopes
            .iter()
            .filter(|s| !matches!(s.outcome, ScopeOutcome::Unchanged))
            .count()
    }

    /// Scopes whose call failed.
    pub fn failures(&self) -> impl Iterator<Item = (&Scope, &ClientError)> {
        self.scopes.iter().filter_map(|s| match &s.outcome {
            ScopeOutcome::Failed { error } => Some((&s.scope, error)),
            _ => None,
        })
    }
}

/// Drives registration for one application.
///
/// # Examples
///
/// ```no_run
/// use slash_commands_db::{CommandRegistry, FingerprintStore};
/// use slash_commands_sync::{CommandSync, DirectoryClient, ReadySignal};
///
/// # async fn run() -> slash_commands_sync::Result<()> {
/// let mut store = FingerprintStore::open("command-hashes.json", false);
/// let mut registry: CommandRegistry<()> = CommandRegistry::new();
/// registry.load_dir("commands", &mut store, |_| Some(()))?;
///
/// let sync = CommandSync::new(DirectoryClient::new("out"), "1234", ReadySignal::ready());
/// let report = sync.register_all(&registry, &mut store).await?;
/// println!("{} calls", report.calls());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CommandSync<C> {
    client: C,
    application_id: String,
    ready: ReadySignal,
}

impl<C: RegistrationClient> CommandSync<C> {
    pub fn new(client: C, application_id: impl Into<String>, ready: ReadySignal) -> Self {
        Self {
            client,
            application_id: application_id.into(),
            ready,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    async fn call(&self, scope: &Scope, batch: &[WireCommand]) -> ScopeOutcome {
        info!(%scope, commands = batch.len(), "replacing commands");
        match self
            .client
            .replace_commands(&self.application_id, scope, batch)
            .await
        {
            Ok(registered) => ScopeOutcome::Synced {
                commands: batch.iter().map(|c| c.name.clone()).collect(),
                registered: registered.len(),
            },
            Err(error) => {
                error!(%scope, %error, "failed to replace commands");
                ScopeOutcome::Failed { error }
            }
        }
    }

    /// Waits for readiness, then calls every dirty scope and commits what
    /// succeeded.
    ///
    /// Scope failures are recorded in the report and never returned.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NeverReady`](crate::SyncError::NeverReady) if
    /// the connection never becomes ready.
    pub async fn execute(
        &self,
        plan: &SyncPlan,
        store: &mut FingerprintStore,
    ) -> Result<SyncReport> {
        self.ready.wait().await?;

        let mut report = SyncReport::default();
        let mut scopes = plan.scopes().peekable();

        if let Some((scope, batch)) = scopes.next_if(|(scope, _)| *scope == Scope::Global) {
            let outcome = if is_dirty(batch, store) {
                self.call(&scope, batch).await
            } else {
                debug!(%scope, "no changes");
                ScopeOutcome::Unchanged
            };
            report.scopes.push(ScopeReport { scope, outcome });
        }

        let mut calls = Vec::new();
        for (scope, batch) in scopes {
            if is_dirty(batch, store) {
                calls.push(async move {
                    let outcome = self.call(&scope, batch).await;
                    ScopeReport { scope, outcome }
                });
            } else {
                debug!(%scope, "no changes");
                report.scopes.push(ScopeReport {
                    scope,
                    outcome: ScopeOutcome::Unchanged,
                });
            }
        }
        report.scopes.extend(join_all(calls).await);
        report.scopes.sort_by(|a, b| a.scope.cmp(&b.scope));

        report.committed = commit_confirmed(plan, &report.scopes, store);
        Ok(report)
    }

    /// Full pass: wait for readiness, plan, execute, prune and flush.
    ///
    /// Fingerprints are flushed even when some scopes failed.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NeverReady`](crate::SyncError::NeverReady) or a
    /// [`SyncError::Database`](crate::SyncError::Database) if fingerprints
    /// cannot be written.
    pub async fn register_all<H>(
        &self,
        registry: &CommandRegistry<H>,
        store: &mut FingerprintStore,
    ) -> Result<SyncReport> {
        let plan = SyncPlan::from_registry(registry);
        let mut report = self.execute(&plan, store).await?;
        report.pruned = store.prune();
        store.flush()?;

        info!(
            calls = report.calls(),
            committed = report.committed.len(),
            failed = report.failures().count(),
            "command sync finished"
        );
        Ok(report)
    }
}

/// Commits every stale command whose calls all succeeded.
fn commit_confirmed(
    plan: &SyncPlan,
    scopes: &[ScopeReport],
    store: &mut FingerprintStore,
) -> Vec<String> {
    let mut confirmed: BTreeMap<&str, bool> = BTreeMap::new();
    for report in scopes {
        let ok = match &report.outcome {
            ScopeOutcome::Unchanged => continue,
            ScopeOutcome::Synced { .. } => true,
            ScopeOutcome::Failed { .. } => false,
        };
        for command in plan.batch(&report.scope) {
            confirmed
                .entry(command.name.as_str())
                .and_modify(|all_ok| *all_ok &= ok)
                .or_insert(ok);
        }
    }

    let mut committed = Vec::new();
    for (name, ok) in confirmed {
        if !ok {
            debug!(command = name, "left stale after a failed call");
            continue;
        }
        // Unchanged commands ride along in a dirty scope's batch but have
        // nothing pending to commit.
        if !store.is_stale(name) {
            continue;
        }
        match store.commit(name) {
            Ok(()) => committed.push(name.to_string()),
            Err(e) => warn!(%e, "commit skipped"),
        }
    }
    committed
}
