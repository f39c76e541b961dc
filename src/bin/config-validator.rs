//! # STIPS Configuration Validator
//!
//! Command-line tool for validating lifecycle engine configuration before a
//! deployment picks it up.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stips_core::config::ConfigManager;
use stips_core::settings::{SettingsProvider, StaticSettings};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "stips-config-validator")]
#[command(about = "Validate STIPS lifecycle engine configuration")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment overlay to apply (development, test, production, ...)
    #[arg(short, long, default_value = "development")]
    environment: String,

    /// Configuration directory containing stips.toml (default: config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Validate a single file instead of a directory
    #[arg(short, long, conflicts_with = "config_dir")]
    file: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load and validate the configuration
    Validate,

    /// Print the merged configuration as JSON
    Show,

    /// List task types with their minimum quotes
    TaskTypes {
        /// Page count used to compute per-page minimums
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init();

    let result = match &cli.command {
        Some(Commands::Validate) | None => validate(&cli),
        Some(Commands::Show) => show(&cli),
        Some(Commands::TaskTypes { pages }) => task_types(&cli, *pages),
    };

    match result {
        Ok(()) => {
            info!("Configuration check completed successfully");
        }
        Err(e) => {
            error!("Configuration check failed: {e:#}");
            eprintln!("❌ {e:#}");
            process::exit(1);
        }
    }
}

fn load(cli: &Cli) -> Result<Arc<ConfigManager>> {
    match &cli.file {
        Some(file) => ConfigManager::load_from_file(file)
            .with_context(|| format!("loading {}", file.display())),
        None => ConfigManager::load_from_directory_with_env(cli.config_dir.clone(), &cli.environment)
            .with_context(|| format!("loading configuration for environment '{}'", cli.environment)),
    }
}

fn validate(cli: &Cli) -> Result<()> {
    println!("🔧 Validating STIPS configuration");
    println!("Environment: {}", cli.environment);

    let manager = load(cli)?;
    let config = manager.config();

    if manager.sources().is_empty() {
        println!("⚠️  No configuration files found, using built-in defaults");
    }
    for source in manager.sources() {
        println!("✅ Loaded {}", source.display());
    }

    println!("   max_active_tasks_per_va: {}", config.max_active_tasks_per_va);
    println!("   notification_channel_capacity: {}", config.notification_channel_capacity);
    println!("   activity_log_capacity: {}", config.activity_log_capacity);
    println!("   min_reason_length: {}", config.min_reason_length);
    println!("   task types: {}", config.task_types.len());
    println!("✅ Configuration is valid");
    Ok(())
}

fn show(cli: &Cli) -> Result<()> {
    let manager = load(cli)?;
    let rendered = serde_json::to_string_pretty(manager.config()).context("rendering configuration")?;
    println!("{rendered}");
    Ok(())
}

fn task_types(cli: &Cli, pages: u32) -> Result<()> {
    let manager = load(cli)?;
    let settings = StaticSettings::from_config(manager.config());

    println!("{:<16} {:>14}", "TASK TYPE", "MIN QUOTE");
    for name in settings.task_type_names() {
        println!("{:<16} {:>14}", name, settings.minimum_quote_minor(&name, pages));
    }
    Ok(())
}
