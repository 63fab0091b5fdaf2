//! Display and logging settings, optionally read from a TOML file.
//!

use std::path::Path;

use color_eyre::{Result, eyre::eyre};
use log::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOG_FILE: &str = "procmon.log";

/// Which inspection backend to use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectorKind {
    /// `/proc` on Linux, sysinfo elsewhere.
    #[default]
    Auto,
    Procfs,
    Sysinfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub log_file: String,
    pub log_level: String,
    /// Height of the log pane under the dashboard; 0 hides it.
    pub log_lines: u16,
    pub alternate_screen: bool,
    pub inspector: InspectorKind,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_file: DEFAULT_LOG_FILE.to_string(),
            log_level: "info".to_string(),
            log_lines: 0,
            alternate_screen: true,
            inspector: InspectorKind::Auto,
        }
    }
}

impl MonitorConfig {
    /// Defaults, overridden by `file_path` when given.
    pub fn load(file_path: Option<&Path>) -> Result<MonitorConfig> {
        let mut builder = config::Config::builder();
        if let Some(path) = file_path {
            info!(target: "Config", "Reading {:?}", path);
            builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml));
        }
        let config: MonitorConfig = builder.build()?.try_deserialize()?;
        config.level_filter()?;
        Ok(config)
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| eyre!("Unknown log level {:?}", self.log_level))
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
