//! invsync CLI
//!
//! Scans a physical host with a user-provided script and brings its record in
//! the inventory store up to date.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};

use clap::{Args, Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use invsync_client::HttpStore;
use invsync_core::{
    ComponentSelection, ReconcileOptions, ReconcileReport, Reconciler, SingletonOptions,
};
use invsync_exec::LocalExecutor;
use invsync_inventory::{ScanRunner, ScanScript, ScanTarget};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::{Config, ConfigSource};

/// Hardware inventory reconciliation for Ralph
#[derive(Parser, Debug)]
#[command(name = "invsync", version, about, long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a host and update its inventory record
    Scan(ScanArgs),

    /// Show the config file location and effective settings
    Config,
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// IP address or host name to scan
    addr: String,

    /// Scan script, looked up in the scripts/ subdirectory of the config dir
    #[arg(short, long)]
    script: String,

    /// Components to reconcile: "none", "all" or a comma-separated list of
    /// eth, mem, fcc, cpu, disk
    #[arg(short, long, default_value = "none")]
    components: ComponentSelection,

    /// Update firmware and BIOS versions of the host
    #[arg(long)]
    with_bios_and_firmware: bool,

    /// Record the detected model name in the host's remarks
    #[arg(long)]
    with_model: bool,

    /// Compute and print changes without sending them
    #[arg(long)]
    dry_run: bool,

    /// Don't print per-component change notices
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let config_dir = config::config_dir()?;
    let location = config::prepare_config_dir(&config_dir)?;
    let config_path = location.path;
    let (config, source) = Config::load(&config_path)?;

    init_tracing(&config, cli.verbose)?;
    if location.created {
        info!(path = %config_path.display(), "created default config file");
    }
    if source == ConfigSource::Defaults {
        warn!(path = %config_path.display(), "no config file found, using defaults");
    }
    debug!(config_dir = %config_dir.display(), ?config, "configuration loaded");

    match cli.command {
        Commands::Scan(args) => scan(args, &config, &config_dir).await,
        Commands::Config => {
            println!("# {}", config_path.display());
            println!("{config}");
            Ok(())
        }
    }
}

fn init_tracing(config: &Config, verbose: bool) -> Result<()> {
    let default_level = if config.debug || verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_output.as_str() {
        "stderr" => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        "stdout" => registry
            .with(fmt::layer().with_writer(std::io::stdout))
            .init(),
        path => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("cannot open log file {path}"))?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
    }
    Ok(())
}

async fn scan(args: ScanArgs, config: &Config, config_dir: &Path) -> Result<()> {
    let unset = config.unset_keys();
    if unset.contains(&"ralph_api_url") || unset.contains(&"ralph_api_key") {
        bail!(
            "please set {} in the config file first",
            unset.join(", ")
        );
    }

    let script = ScanScript::locate(&args.script, config_dir)?;
    let target = ScanTarget::resolve(&args.addr).await?;

    if args.dry_run {
        println!("INFO: Running in dry-run mode, no changes will be saved in Ralph.");
    }

    let runner = ScanRunner::new(Arc::new(LocalExecutor::new())).with_timeout(config.scan_timeout());
    let snapshot = runner
        .run(&script, &target, &config.credentials())
        .await
        .wrap_err_with(|| format!("error running script {}", script.path.display()))?;

    let store = HttpStore::new(
        &config.ralph_api_url,
        &config.ralph_api_key,
        config.client_timeout(),
    )?;
    let options = ReconcileOptions {
        components: args.components,
        singleton: SingletonOptions {
            firmware_and_bios: args.with_bios_and_firmware,
            model_name: args.with_model,
        },
        dry_run: args.dry_run,
    };
    info!(components = %options.components, "reconciling");

    let report = Reconciler::new(Arc::new(store), options)?
        .run(&target, &snapshot)
        .await?;

    for line in operator_notices(&report, &snapshot.serial_number, args.quiet) {
        println!("{line}");
    }
    Ok(())
}

/// Lines printed for the operator after a run
///
/// The serial number warning and the no-changes line are always shown;
/// `quiet` hides the per-component notices.
fn operator_notices(report: &ReconcileReport, detected_serial: &str, quiet: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(stored) = &report.serial_mismatch {
        lines.push(format!(
            "WARNING: Detected serial number differs from the one stored in Ralph ({detected_serial:?} vs. {stored:?})."
        ));
    }
    if !quiet {
        lines.extend(
            report
                .dhcp_excluded
                .iter()
                .map(|exclusion| format!("WARNING: {}", exclusion.warning())),
        );
        lines.extend(report.applied.changes.iter().map(ToString::to_string));
    }
    if !report.changes_detected {
        lines.push("No changes detected.".to_string());
    }
    lines
}
