//! Warden CLI — evaluate permission grants from the command line.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{ERROR_EXIT_CODE, Outcome};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use warden_config::{CliOverrides, WardenConfig};

#[derive(Parser)]
#[command(name = "warden", version, about = "Evaluate dot-segmented permission grants")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config directory (overrides WARDEN_CONFIG_DIR)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Enable verbose/debug logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Check a single grant pattern against a required permission
    Check {
        /// Held grant, e.g. `admin.*`
        pattern: String,
        /// Required permission, e.g. `admin.users.delete`
        required: String,
    },

    /// Decide a permission for a set of grants and configured roles
    Authorize {
        /// Grant pattern held directly (repeatable)
        #[arg(long = "grant")]
        grants: Vec<String>,
        /// Configured role held (repeatable)
        #[arg(long = "role")]
        roles: Vec<String>,
        /// Subject to name in log output
        #[arg(long, default_value = "cli")]
        subject: String,
        required: String,
    },

    /// Decide a permission for a principal record stored as JSON
    Inspect {
        /// Path to the principal record
        #[arg(long)]
        principal: PathBuf,
        required: String,
    },

    /// List configured roles and their grants
    Roles,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(outcome) => ExitCode::from(outcome.exit_code()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(ERROR_EXIT_CODE)
        }
    }
}

fn run(cli: Cli) -> Result<Outcome> {
    let config = WardenConfig::load(CliOverrides {
        log_level: cli.verbose.then(|| "debug".to_string()),
        config_dir: cli.config_dir,
        project_dir: None,
    })?;

    init_logging(&config.log_level, cli.json_logs);
    for warning in &config.warnings {
        tracing::warn!("Ignoring config file: {warning}");
    }
    tracing::debug!(
        config_dir = %config.config_dir.display(),
        roles = config.roles.len(),
        "Loaded configuration"
    );

    let mut stdout = io::stdout().lock();
    match cli.command {
        Command::Check { pattern, required } => {
            commands::check(&mut stdout, &pattern, &required)
        }
        Command::Authorize {
            grants,
            roles,
            subject,
            required,
        } => commands::authorize(&mut stdout, &config.roles, &subject, &grants, &roles, &required),
        Command::Inspect {
            principal,
            required,
        } => commands::inspect(&mut stdout, &config.roles, &principal, &required),
        Command::Roles => commands::list_roles(&mut stdout, &config.roles),
    }
}

/// RUST_LOG wins over the configured level.
fn init_logging(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
