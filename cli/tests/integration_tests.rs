use std::fs;
use std::path::PathBuf;
use std::process::Output;

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path =
            std::env::temp_dir().join(format!("slash_sync_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run(args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_slash-sync"))
        .args(args)
        .output()
        .expect("failed to run slash-sync")
}

fn write_command(dir: &TempDir, file: &str, doc: serde_json::Value) -> PathBuf {
    let path = dir.join(file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create command dir");
    }
    fs::write(&path, serde_json::to_string_pretty(&doc).unwrap())
        .expect("failed to write command document");
    path
}

/// A workspace with `sync.yml`, a global `ping` and a guild-scoped `ban`.
fn write_workspace(dir: &TempDir, ping_description: &str) -> PathBuf {
    write_command(
        dir,
        "commands/ping.json",
        serde_json::json!({ "data": { "name": "ping", "description": ping_description } }),
    );
    write_command(
        dir,
        "commands/mod/ban.json",
        serde_json::json!({
            "data": {
                "name": "ban",
                "description": "Ban a member",
                "permissions": ["BanMembers"],
                "options": [{ "type": "user", "name": "target", "description": "Who", "required": true }]
            },
            "guild": ["42"]
        }),
    );
    let config = dir.join("sync.yml");
    fs::write(&config, "application_id: \"1\"\ncommand_dirs: [commands]\n")
        .expect("failed to write config");
    config
}

fn read_json(path: PathBuf) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// compile / validate
// ---------------------------------------------------------------------------

#[test]
fn compile_prints_wire_document() {
    let dir = TempDir::new("compile_print");
    let path = write_command(
        &dir,
        "ping.json",
        serde_json::json!({ "data": { "name": "ping", "description": "pong" } }),
    );

    let output = run(&["compile", path.to_str().unwrap()]);
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        doc,
        serde_json::json!({ "name": "ping", "description": "pong", "options": [] })
    );
}

#[test]
fn compile_directory_writes_array() {
    let dir = TempDir::new("compile_dir");
    write_workspace(&dir, "pong");
    let out = dir.join("compiled.json");

    let output = run(&[
        "compile",
        dir.join("commands").to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let docs = read_json(out);
    let names: Vec<&str> = docs
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["ban", "ping"]);
    assert_eq!(docs[0]["default_member_permissions"], "4");
}

#[test]
fn validate_reports_conflicting_shapes() {
    let dir = TempDir::new("validate_conflict");
    write_command(
        &dir,
        "ok.json",
        serde_json::json!({ "data": { "name": "ok", "description": "Fine" } }),
    );
    write_command(
        &dir,
        "bad.json",
        serde_json::json!({
            "data": {
                "name": "bad",
                "description": "Both shapes",
                "options": [{ "type": "boolean", "name": "flag", "description": "A flag" }],
                "subcommands": [{ "name": "one", "description": "One" }]
            }
        }),
    );

    let output = run(&["validate", dir.path().to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bad.json"), "stderr: {stderr}");
    assert!(stderr.contains("`bad`"), "stderr: {stderr}");
}

#[test]
fn validate_accepts_clean_documents() {
    let dir = TempDir::new("validate_clean");
    write_workspace(&dir, "pong");

    let output = run(&["validate", dir.join("commands").to_str().unwrap()]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Validated 2"));
}

// ---------------------------------------------------------------------------
// plan / sync
// ---------------------------------------------------------------------------

#[test]
fn sync_writes_scopes_and_skips_unchanged_on_rerun() {
    let dir = TempDir::new("sync_rerun");
    let config = write_workspace(&dir, "pong");
    let out = dir.join("out");
    let args = [
        "sync",
        "--config",
        config.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ];

    let first = run(&args);
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    assert_eq!(read_json(out.join("global.json"))[0]["name"], "ping");
    assert_eq!(read_json(out.join("guild-42.json"))[0]["name"], "ban");
    assert!(dir.join("command-hashes.json").exists());

    fs::remove_dir_all(&out).unwrap();
    let second = run(&args);
    assert!(second.status.success());
    assert!(!out.join("global.json").exists());
    assert!(!out.join("guild-42.json").exists());
}

#[test]
fn sync_only_rewrites_changed_scope() {
    let dir = TempDir::new("sync_changed");
    let config = write_workspace(&dir, "pong");
    let out = dir.join("out");
    let sync = |out: &PathBuf| {
        run(&[
            "sync",
            "--config",
            config.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
        ])
    };

    assert!(sync(&out).status.success());
    fs::remove_dir_all(&out).unwrap();

    write_workspace(&dir, "pong, edited");
    assert!(sync(&out).status.success());
    assert_eq!(read_json(out.join("global.json"))[0]["description"], "pong, edited");
    assert!(!out.join("guild-42.json").exists());
}

#[test]
fn plan_does_not_persist_fingerprints() {
    let dir = TempDir::new("plan_dry_run");
    let config = write_workspace(&dir, "pong");

    let output = run(&["plan", "--config", config.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("global: 1 command(s), replace"), "stdout: {stdout}");
    assert!(stdout.contains("guild 42: 1 command(s), replace"), "stdout: {stdout}");
    assert!(!dir.join("command-hashes.json").exists());
}

#[test]
fn refresh_all_replaces_every_scope() {
    let dir = TempDir::new("refresh_all");
    let config = write_workspace(&dir, "pong");
    let out = dir.join("out");
    let mut args = vec![
        "sync",
        "--config",
        config.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ];

    assert!(run(&args).status.success());
    fs::remove_dir_all(&out).unwrap();

    args.push("--refresh-all");
    assert!(run(&args).status.success());
    assert!(out.join("global.json").exists());
    assert!(out.join("guild-42.json").exists());
}
