mod category;
mod entry;
mod render;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use punchcard::services::JsonStore;
use punchcard::settings::Settings;
use tracing_subscriber::EnvFilter;

use category::CategoryCommand;
use entry::EntryCommand;
use report::ReportCommand;

/// Log work hours against a category tree and report them week by week
#[derive(Parser)]
#[command(name = "punchcard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Settings file (defaults to ~/.punchcard/settings.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding categories.json and entries.json
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List, add and edit categories
    #[command(subcommand)]
    Category(CategoryCommand),

    /// List, add and edit work entries
    #[command(subcommand)]
    Entry(EntryCommand),

    /// Show time reports
    #[command(subcommand)]
    Report(ReportCommand),
}

/// Settings and store shared by every subcommand
pub struct Context {
    pub settings: Settings,
    pub store: JsonStore,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let mut settings = Settings::load(self.config.as_deref())?;
        init_tracing(&settings.log_level);

        if let Some(dir) = self.data_dir {
            settings.data_dir = Some(dir);
        }
        let store = match &settings.data_dir {
            Some(dir) => JsonStore::open(dir.clone())?,
            None => JsonStore::open_default()?,
        };
        tracing::debug!(data_dir = %store.data_dir().display(), "store opened");

        let ctx = Context { settings, store };
        let output = match self.command {
            Commands::Category(command) => command.run(&ctx)?,
            Commands::Entry(command) => command.run(&ctx)?,
            Commands::Report(command) => command.run(&ctx)?,
        };
        println!("{}", output);
        Ok(())
    }
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Serialize `value` for `--json` output
fn to_json<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
