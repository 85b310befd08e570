use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Directory searched for map documents when neither flag nor file names one.
pub(crate) const DEFAULT_MAPS_DIR: &str = "maps";
/// Filter used when neither `RUST_LOG` nor the config file provide one.
pub(crate) const DEFAULT_LOG_FILTER: &str = "info";

/// How frames and summaries are written to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    /// ASCII frames with a one-line summary.
    #[default]
    Text,
    /// One JSON document per frame.
    Json,
}

/// Settings read from the optional TOML config file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CliConfig {
    pub(crate) log_filter: Option<String>,
    pub(crate) maps_dir: Option<PathBuf>,
    pub(crate) default_map: Option<String>,
    pub(crate) format: Option<OutputFormat>,
}

impl CliConfig {
    /// Reads the config file, or returns defaults when no path was given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("invalid config file at {}", path.display()))
    }

    fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config toml contents")
    }

    pub(crate) fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}
