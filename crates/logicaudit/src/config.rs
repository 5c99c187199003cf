//! Configuration management for logicaudit.
//!
//! This module provides configuration loading and validation using figment,
//! supporting a TOML config file, environment variables, and defaults.
//!
//! The reveal delay is not configurable; see [`crate::navigator::REVEAL_DELAY`].

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory under the user config dir.
const APP_DIR_NAME: &str = "logicaudit";

/// Environment variable prefix. Nested keys are separated by `__`,
/// e.g. `LOGICAUDIT_DISPLAY__RULE_WIDTH=80`.
const ENV_PREFIX: &str = "LOGICAUDIT_";

/// Narrowest and widest accepted panel rule.
const RULE_WIDTH_RANGE: std::ops::RangeInclusive<usize> = 20..=200;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `LOGICAUDIT_`)
/// 2. TOML config file at `~/.config/logicaudit/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How panels are rendered.
    pub display: DisplayConfig,
    /// Interactive session behaviour.
    pub session: SessionConfig,
}

/// How the presenter renders notifications.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum PanelFormat {
    /// Human-readable text panels.
    #[default]
    Plain,
    /// One JSON object per notification.
    Json,
}

impl std::fmt::Display for PanelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Display-related configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Panel format used by `run`.
    pub format: PanelFormat,
    /// Width of the horizontal rules between panels.
    pub rule_width: usize,
}

/// Session-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Accept `next` before the current scenario has been audited.
    pub allow_skip: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: PanelFormat::Plain,
            rule_width: 72,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let config: Config = Self::figment(&config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(config_file: &std::path::Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if !RULE_WIDTH_RANGE.contains(&self.display.rule_width) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "rule_width ({}) must be between {} and {}",
                    self.display.rule_width,
                    RULE_WIDTH_RANGE.start(),
                    RULE_WIDTH_RANGE.end()
                ),
            });
        }

        Ok(())
    }
}
