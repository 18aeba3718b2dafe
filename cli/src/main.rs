use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use slash_commands_core::WireCommand;
use slash_commands_db::{
    CommandRegistry, FingerprintStore, LoadFailure, SyncConfig, collect_command_paths,
    compile_command, read_command_file,
};
use slash_commands_sync::{
    CommandSync, DirectoryClient, ReadySignal, ScopeOutcome, SyncPlan, is_dirty,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "slash_commands=info,slash_sync=info";
const VERBOSE_LOG_FILTER: &str = "slash_commands=debug,slash_sync=debug";

/// Output format for compiled documents.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "slash-sync")]
#[command(about = "Compile slash command definitions and sync them incrementally")]
struct Cli {
    /// Log per-command decisions.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile command documents into registration bodies.
    Compile(CompileArgs),
    /// Check that command documents compile.
    Validate(ValidateArgs),
    /// Show which scopes the next sync would call, without calling them.
    Plan(PlanArgs),
    /// Register changed commands, writing each scope's set into a directory.
    Sync(SyncArgs),
}

#[derive(Debug, Args)]
struct CompileArgs {
    /// A command document, or a directory of them.
    input: PathBuf,
    /// Write to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Command documents and/or directories containing them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct PlanArgs {
    /// Sync configuration YAML.
    #[arg(long)]
    config: PathBuf,
    /// Treat every command as changed.
    #[arg(long)]
    refresh_all: bool,
}

#[derive(Debug, Args)]
struct SyncArgs {
    /// Sync configuration YAML.
    #[arg(long)]
    config: PathBuf,
    /// Directory receiving `global.json` and `guild-<id>.json`.
    #[arg(long)]
    out: PathBuf,
    /// Treat every command as changed.
    #[arg(long)]
    refresh_all: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Compile(args) => run_compile(args),
        Command::Validate(args) => run_validate(args),
        Command::Plan(args) => run_plan(args),
        Command::Sync(args) => run_sync(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = collect_command_paths(input)
                .map_err(|err| format!("Failed to read '{}': {err}", input.display()))?;
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn compile_file(path: &Path) -> Result<WireCommand, String> {
    let file = read_command_file(path, |_| Some(())).map_err(|err| err.to_string())?;
    let compiled = compile_command(file).map_err(|err| err.to_string())?;
    Ok(compiled.data)
}

fn run_compile(args: CompileArgs) -> Result<(), String> {
    let rendered = if args.input.is_dir() {
        let docs = collect_inputs(std::slice::from_ref(&args.input))?
            .iter()
            .map(|path| compile_file(path).map_err(|err| format!("{}: {err}", path.display())))
            .collect::<Result<Vec<_>, _>>()?;
        render(&docs, args.format)?
    } else {
        let doc = compile_file(&args.input)
            .map_err(|err| format!("{}: {err}", args.input.display()))?;
        render(&doc, args.format)?
    };

    match args.output {
        Some(output) => {
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|err| {
                    format!(
                        "Failed to create output directory '{}': {err}",
                        parent.display()
                    )
                })?;
            }
            fs::write(&output, rendered)
                .map_err(|err| format!("Failed to write '{}': {err}", output.display()))?;
            println!("Wrote '{}'.", output.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn render<T: serde::Serialize + ?Sized>(value: &T, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|err| format!("Failed to serialize output: {err}")),
        CliOutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|err| format!("Failed to serialize output: {err}")),
    }
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let paths = collect_inputs(&args.inputs)?;
    let mut failed = 0;
    for path in &paths {
        match compile_file(path) {
            Ok(doc) => debug!(path = %path.display(), command = %doc.name, "valid"),
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(format!(
            "{failed} of {} command document(s) failed validation",
            paths.len()
        ));
    }
    println!("Validated {} command document(s).", paths.len());
    Ok(())
}

/// Loads configuration and every command directory it names.
fn load_workspace(
    config_path: &Path,
    refresh_all: bool,
) -> Result<(SyncConfig, CommandRegistry<()>, FingerprintStore), String> {
    let config = SyncConfig::load(config_path)
        .map_err(|err| format!("Failed to load config '{}': {err}", config_path.display()))?;
    let mut store = FingerprintStore::open(&config.fingerprint_file, config.force_refresh(refresh_all));
    let mut registry = CommandRegistry::new();

    let mut failures: Vec<LoadFailure> = Vec::new();
    for dir in &config.command_dirs {
        let report = registry
            .load_dir(dir, &mut store, |_| Some(()))
            .map_err(|err| format!("Failed to read '{}': {err}", dir.display()))?;
        failures.extend(report.failures);
    }

    if !failures.is_empty() {
        eprintln!("Skipped {} command document(s):", failures.len());
        for failure in &failures {
            eprintln!("  {}: {}", failure.path.display(), failure.error);
        }
    }
    Ok((config, registry, store))
}

fn run_plan(args: PlanArgs) -> Result<(), String> {
    let (_, registry, store) = load_workspace(&args.config, args.refresh_all)?;
    let plan = SyncPlan::from_registry(&registry);

    println!("{} command(s) loaded.", registry.len());
    for (scope, batch) in plan.scopes() {
        let action = if is_dirty(batch, &store) {
            "replace"
        } else {
            "unchanged"
        };
        println!("  {scope}: {} command(s), {action}", batch.len());
    }

    let stale: Vec<&str> = store.stale_names().collect();
    if stale.is_empty() {
        println!("No changes.");
    } else {
        println!("Changed: {}", stale.join(", "));
    }
    Ok(())
}

fn run_sync(args: SyncArgs) -> Result<(), String> {
    let (config, registry, mut store) = load_workspace(&args.config, args.refresh_all)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to start runtime: {err}"))?;

    let sync = CommandSync::new(
        DirectoryClient::new(&args.out),
        config.application_id,
        ReadySignal::ready(),
    );
    let report = runtime
        .block_on(sync.register_all(&registry, &mut store))
        .map_err(|err| err.to_string())?;

    for scope in &report.scopes {
        match &scope.outcome {
            ScopeOutcome::Unchanged => println!("  {}: unchanged", scope.scope),
            ScopeOutcome::Synced { commands, .. } => {
                println!("  {}: replaced {} command(s)", scope.scope, commands.len())
            }
            ScopeOutcome::Failed { error } => println!("  {}: failed: {error}", scope.scope),
        }
    }
    println!(
        "Synced {} scope(s), committed {} command(s).",
        report.calls(),
        report.committed.len()
    );

    let failed = report.failures().count();
    if failed > 0 {
        return Err(format!("{failed} scope(s) failed"));
    }
    Ok(())
}
