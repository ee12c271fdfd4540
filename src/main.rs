//! modwatch command-line interface.
//!
//! Argument parsing and dispatch only; everything with design weight lives
//! in the library crates.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::miette;
use modwatch_config::Config;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "modwatch", version, about = "Track published mod releases and reconcile them against a local mods directory")]
struct Cli {
    /// Path of the configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start tracking a mod (idempotent) and reconcile its releases.
    Add {
        /// Site slug of the mod.
        slug: String,
    },
    /// Reconcile one tracked mod, or all of them.
    Update {
        /// Site slug of the mod; all tracked mods when omitted.
        slug: Option<String>,
        /// Explicit page of the file listing to read.
        #[arg(long)]
        page: Option<u32>,
    },
    /// Hash local mod files and report matches and available updates.
    Scan {
        /// Directory to scan; defaults to the configured mods directory.
        dir: Option<PathBuf>,
    },
    /// List all tracked mods.
    List,
    /// Show the stored releases of one mod.
    Show {
        /// Site slug of the mod.
        slug: String,
    },
    /// Fetch and print a mod's releases without touching the store.
    Inspect {
        /// Site slug of the mod.
        slug: String,
        /// Explicit page of the file listing to read.
        #[arg(long)]
        page: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("modwatch=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).map_err(|e| miette!("{e}"))?;

    match cli.command {
        Command::Add { slug } => commands::add(&config, &slug).await,
        Command::Update { slug, page } => commands::update(&config, slug.as_deref(), page).await,
        Command::Scan { dir } => commands::scan(&config, dir.as_deref()).await,
        Command::List => commands::list(&config).await,
        Command::Show { slug } => commands::show(&config, &slug).await,
        Command::Inspect { slug, page } => commands::inspect(&config, &slug, page).await,
    }
}
