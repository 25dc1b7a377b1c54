//! sharedock-init - container entrypoint
//!
//! Runs once per container start, before smbd and the NFS server, and turns
//! the YAML document into accounts, smb.conf, /etc/exports and share
//! directories.

use std::process::ExitCode;

use anyhow::Context;
use tracing::{debug, info, warn};

use sharedock::bootstrap;
use sharedock::cli::{Cli, Commands};
use sharedock::config::ShareDockConfig;
use sharedock::error::ShareDockError;

/// Initialize the tracing subscriber. `RUST_LOG` overrides the default level.
fn init_logging() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}

/// Main application entry point
fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("Warning: logging disabled: {:#}", e);
    }

    let cli = Cli::parse_args();
    debug!("CLI arguments parsed: {:?}", cli.command);
    let settings = cli.settings();

    let result = match cli.command.unwrap_or(Commands::Apply) {
        Commands::Apply => run_bootstrap(&settings),
        Commands::Validate => run_validate(&settings),
        Commands::Render => run_render(&settings),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_fatal(&e);
            ExitCode::FAILURE
        }
    }
}

fn run_bootstrap(settings: &bootstrap::Settings) -> Result<(), ShareDockError> {
    let summary = bootstrap::run(settings)?;

    info!("{}", summary.headline());
    if !summary.directories.failed.is_empty() {
        warn!(
            "Share directories not created: {}",
            summary.directories.failed.join(", ")
        );
    }
    println!("Configuration completed successfully");
    Ok(())
}

fn run_validate(settings: &bootstrap::Settings) -> Result<(), ShareDockError> {
    let config = ShareDockConfig::load_from_file(&settings.config_path)?;

    println!(
        "✓ Configuration file is valid: {} ({} account(s), {} share(s), {} NFS export(s))",
        settings.config_path.display(),
        config.auth.len(),
        config.share.len(),
        config.nfs_shares().count()
    );
    Ok(())
}

fn run_render(settings: &bootstrap::Settings) -> Result<(), ShareDockError> {
    let config = ShareDockConfig::load_from_file(&settings.config_path)?;

    for (path, contents) in bootstrap::render(&config, settings) {
        println!("# ---- {} ----", path.display());
        print!("{}", contents);
    }
    Ok(())
}

/// Missing/empty config and generator failures carry their own wording;
/// anything else is reported as an initialization error.
fn report_fatal(e: &ShareDockError) {
    if e.is_config_failure() || e.is_generator_failure() {
        eprintln!("{}", e);
    } else {
        eprintln!("Initialization error: {}", e);
    }
}
