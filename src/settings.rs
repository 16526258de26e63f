//! Process settings, read once at startup.
//!
//! Sources, later ones overriding earlier ones: built-in defaults,
//! `~/.punchcard/settings.toml` (or the file passed with `--config`), then
//! `PUNCHCARD_*` environment variables such as `PUNCHCARD_WEEK_START=6`.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use directories::BaseDirs;
use serde::Deserialize;

use crate::services::WeekStart;
use crate::types::{PunchcardError, Result};

/// Weeks shown by `report weekly` when none (or a non-positive count) is asked for
pub const DEFAULT_WEEKS: usize = 2;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// First day of the reporting week, Monday = 0 .. Sunday = 6
    pub week_start: u8,
    pub default_weeks: usize,
    /// `tracing` filter directive, e.g. `warn` or `punchcard=debug`
    pub log_level: String,
    /// Directory holding the record store; `~/.punchcard` when unset
    pub data_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            week_start: 0,
            default_weeks: DEFAULT_WEEKS,
            log_level: "warn".to_string(),
            data_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from the default file location plus the environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let default_path = BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".punchcard").join("settings.toml"));
        let path = config_path.map(Path::to_path_buf).or(default_path);

        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(config_path.is_some()));
        }
        builder = builder.add_source(Environment::with_prefix("PUNCHCARD"));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would only fail later, deep inside a report
    pub fn validate(&self) -> Result<()> {
        WeekStart::new(self.week_start)?;
        if self.default_weeks < 1 {
            return Err(PunchcardError::Config(
                "default_weeks must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn week_start(&self) -> Result<WeekStart> {
        WeekStart::new(self.week_start)
    }
}
