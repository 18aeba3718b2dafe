use std::path::Path;

use slash_commands_core::{CommandSchema, OptionSchema};
use slash_commands_db::{
    CommandDocument, CommandRegistry, FingerprintStore, SyncConfig, fingerprint,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_document(dir: &Path, file: &str, doc: &CommandDocument) {
    let text = serde_json::to_string_pretty(doc).unwrap();
    std::fs::write(dir.join(file), text).unwrap();
}

fn schema_doc(schema: CommandSchema, guild: Option<&[&str]>) -> CommandDocument {
    CommandDocument {
        data: Some(schema),
        wire: None,
        guild: guild.map(|ids| ids.iter().map(|id| id.to_string()).collect()),
    }
}

fn load(dir: &Path, hashes: &Path, force: bool) -> (CommandRegistry<()>, FingerprintStore) {
    let mut store = FingerprintStore::open(hashes, force);
    let mut registry = CommandRegistry::new();
    let report = registry.load_dir(dir, &mut store, |_| Some(())).unwrap();
    assert!(report.is_clean(), "unexpected failures: {:?}", report.failures);
    (registry, store)
}

fn commit_all(store: &mut FingerprintStore) {
    let stale: Vec<String> = store.stale_names().map(String::from).collect();
    for name in stale {
        store.commit(&name).unwrap();
    }
    store.prune();
    store.flush().unwrap();
}

// ---------------------------------------------------------------------------
// Fingerprint lifecycle across runs
// ---------------------------------------------------------------------------

#[test]
fn test_unchanged_commands_are_not_stale_on_second_run() {
    let dir = tempfile::tempdir().unwrap();
    let commands = dir.path().join("commands");
    std::fs::create_dir(&commands).unwrap();
    let hashes = dir.path().join("command-hashes.json");

    write_document(&commands, "ping.json", &schema_doc(CommandSchema::new("ping", "Pong"), None));
    write_document(
        &commands,
        "echo.json",
        &schema_doc(
            CommandSchema::new("echo", "Echo text")
                .with_option(OptionSchema::text("text", "What to echo").required()),
            Some(&["123"]),
        ),
    );

    let (registry, mut store) = load(&commands, &hashes, false);
    assert_eq!(registry.len(), 2);
    assert_eq!(store.stale_names().collect::<Vec<_>>(), vec!["echo", "ping"]);
    commit_all(&mut store);

    let (_, store) = load(&commands, &hashes, false);
    assert!(!store.has_stale());
}

#[test]
fn test_edited_command_becomes_stale() {
    let dir = tempfile::tempdir().unwrap();
    let hashes = dir.path().join("command-hashes.json");

    write_document(dir.path(), "ping.json", &schema_doc(CommandSchema::new("ping", "Pong"), None));
    let (_, mut store) = load(dir.path(), &hashes, false);
    commit_all(&mut store);

    write_document(
        dir.path(),
        "ping.json",
        &schema_doc(CommandSchema::new("ping", "Pong, but louder"), None),
    );
    let (registry, store) = load(dir.path(), &hashes, false);
    assert!(store.is_stale("ping"));

    let expected = fingerprint(&registry.get("ping").unwrap().data).unwrap();
    assert_ne!(store.stored_hash("ping"), Some(expected.as_str()));
}

#[test]
fn test_force_refresh_marks_everything_stale() {
    let dir = tempfile::tempdir().unwrap();
    let hashes = dir.path().join("command-hashes.json");

    write_document(dir.path(), "ping.json", &schema_doc(CommandSchema::new("ping", "Pong"), None));
    let (_, mut store) = load(dir.path(), &hashes, false);
    commit_all(&mut store);

    let (_, store) = load(dir.path(), &hashes, true);
    assert!(store.is_stale("ping"));
}

#[test]
fn test_removed_command_is_pruned() {
    let dir = tempfile::tempdir().unwrap();
    let hashes = dir.path().join("command-hashes.json");

    write_document(dir.path(), "ping.json", &schema_doc(CommandSchema::new("ping", "Pong"), None));
    write_document(dir.path(), "old.json", &schema_doc(CommandSchema::new("old", "Gone soon"), None));
    let (_, mut store) = load(dir.path(), &hashes, false);
    commit_all(&mut store);

    std::fs::remove_file(dir.path().join("old.json")).unwrap();
    let (_, mut store) = load(dir.path(), &hashes, false);
    assert_eq!(store.prune(), vec!["old".to_string()]);
    store.flush().unwrap();

    let persisted: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&hashes).unwrap()).unwrap();
    assert!(persisted.get("old").is_none());
    assert!(persisted.get("ping").is_some());
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_config_drives_loading() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("cmds")).unwrap();
    write_document(
        &dir.path().join("cmds"),
        "ping.yaml",
        &schema_doc(CommandSchema::new("ping", "Pong"), None),
    );
    let config_path = dir.path().join("sync.yml");
    std::fs::write(&config_path, "application_id: \"1\"\ncommand_dirs: [cmds]\n").unwrap();

    let config = SyncConfig::load(&config_path).unwrap();
    let mut store = FingerprintStore::open(&config.fingerprint_file, config.force_refresh(false));
    let mut registry: CommandRegistry<()> = CommandRegistry::new();
    for dir in &config.command_dirs {
        registry.load_dir(dir, &mut store, |_| Some(())).unwrap();
    }

    assert!(registry.contains("ping"));
    store.commit("ping").unwrap();
    store.flush().unwrap();
    assert!(dir.path().join("command-hashes.json").exists());
}
