//! Partitioning the registry into per-scope batches.

use std::collections::BTreeMap;

use slash_commands_core::WireCommand;
use slash_commands_db::{CommandRegistry, FingerprintStore};

use crate::client::Scope;

/// Every loaded command, grouped by the scope it is registered in.
///
/// A command listing several guilds appears in each of their batches.
/// Batches hold every command of the scope, changed or not, because a
/// registration call replaces the whole scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPlan {
    pub global: Vec<WireCommand>,
    pub scoped: BTreeMap<String, Vec<WireCommand>>,
}

impl SyncPlan {
    /// Builds the plan from a registry, in command name order.
    pub fn from_registry<H>(registry: &CommandRegistry<H>) -> Self {
        let mut plan = Self::default();
        for command in registry.iter() {
            match &command.guild {
                None => plan.global.push(command.data.clone()),
                Some(ids) => {
                    for id in ids {
                        plan.scoped
                            .entry(id.clone())
                            .or_default()
                            .push(command.data.clone());
                    }
                }
            }
        }
        plan
    }

    /// Every scope with at least one command, global first.
    pub fn scopes(&self) -> impl Iterator<Item = (Scope, &[WireCommand])> {
        let global = (!self.global.is_empty()).then(|| (Scope::Global, self.global.as_slice()));
        global.into_iter().chain(
            self.scoped
                .iter()
                .filter(|(_, batch)| !batch.is_empty())
                .map(|(id, batch)| (Scope::Guild(id.clone()), batch.as_slice())),
        )
    }

    /// The batch registered in `scope`; empty if the scope has no commands.
    pub fn batch(&self, scope: &Scope) -> &[WireCommand] {
        match scope {
            Scope::Global => &self.global,
            Scope::Guild(id) => self.scoped.get(id).map(Vec::as_slice).unwrap_or_default(),
        }
    }

    /// The scopes that need a registration call this run, global first.
    pub fn pending<'a>(
        &'a self,
        store: &'a FingerprintStore,
    ) -> impl Iterator<Item = (Scope, &'a [WireCommand])> + 'a {
        self.scopes().filter(move |(_, batch)| is_dirty(batch, store))
    }

    /// Total number of commands across all batches.
    pub fn len(&self) -> usize {
        self.global.len() + self.scoped.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Groups the registry's commands by scope.
pub fn plan<H>(registry: &CommandRegistry<H>) -> SyncPlan {
    SyncPlan::from_registry(registry)
}

/// A non-empty batch is dirty when force refresh is on or any of its
/// commands is stale.
pub fn is_dirty(batch: &[WireCommand], store: &FingerprintStore) -> bool {
    !batch.is_empty()
        && (store.force_refresh() || batch.iter().any(|cmd| store.is_stale(&cmd.name)))
}

#[cfg(test)]
mod tests {
    use slash_commands_core::CommandSchema;
    use slash_commands_db::{CommandFile, MemoryStorage};

    use super::*;

    fn registry(store: &mut FingerprintStore) -> CommandRegistry<()> {
        let mut registry = CommandRegistry::new();
        for file in [
            CommandFile::new(CommandSchema::new("ping", "Pong"), ()),
            CommandFile::new(CommandSchema::new("ban", "Ban a member"), ()).in_guilds(["a", "b"]),
            CommandFile::new(CommandSchema::new("kick", "Kick a member"), ()).in_guilds(["b"]),
        ] {
            registry.load(file, store).unwrap();
        }
        registry
    }

    fn names(batch: &[WireCommand]) -> Vec<&str> {
        batch.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_partition_by_scope() {
        let mut store = FingerprintStore::load(MemoryStorage::default(), false);
        let plan = plan(&registry(&mut store));

        assert_eq!(names(&plan.global), vec!["ping"]);
        assert_eq!(names(&plan.scoped["a"]), vec!["ban"]);
        assert_eq!(names(&plan.scoped["b"]), vec!["ban", "kick"]);
        assert_eq!(plan.len(), 4);

        let scopes: Vec<Scope> = plan.scopes().map(|(scope, _)| scope).collect();
        assert_eq!(
            scopes,
            vec![
                Scope::Global,
                Scope::Guild("a".into()),
                Scope::Guild("b".into())
            ]
        );
    }

    #[test]
    fn test_pending_only_dirty_scopes() {
        let storage = MemoryStorage::default();
        let mut store = FingerprintStore::load(storage.clone(), false);
        registry(&mut store);
        for name in ["ping", "ban", "kick"] {
            store.commit(name).unwrap();
        }
        store.flush().unwrap();

        let mut store = FingerprintStore::load(storage.clone(), false);
        let mut reg = registry(&mut store);
        reg.load(
            CommandFile::new(CommandSchema::new("kick", "Kick someone"), ()).in_guilds(["b"]),
            &mut store,
        )
        .unwrap();

        let plan = plan(&reg);
        let pending: Vec<Scope> = plan.pending(&store).map(|(scope, _)| scope).collect();
        assert_eq!(pending, vec![Scope::Guild("b".into())]);

        let store = FingerprintStore::load(storage, true);
        assert_eq!(plan.pending(&store).count(), 3);
    }

    #[test]
    fn test_empty_registry_has_no_scopes() {
        let plan = plan(&CommandRegistry::<()>::new());
        assert!(plan.is_empty());
        assert_eq!(plan.scopes().count(), 0);
    }
}
