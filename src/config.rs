//! Configuration loaded from `config.toml`
//!
//! Every key is optional. A missing default config file means defaults; an
//! explicitly requested file must exist.
//!
//! Example TOML:
//! ```toml
//! [logging]
//! level = "debug"
//! json = true
//!
//! [git]
//! program = "/usr/local/bin/git"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::git::GIT_PROGRAM;

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub git: GitConfig,
}

/// `[logging]` section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when neither `--verbose` nor `RUST_LOG` is set
    pub level: String,
    /// Emit JSON log lines instead of text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// `[git]` section
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GitConfig {
    /// Git executable, a name on PATH or a path
    pub program: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: GIT_PROGRAM.to_string(),
        }
    }
}

impl Config {
    /// Platform config location, e.g. `~/.config/gitstat/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "gitstat").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("failed to parse config.toml")
    }

    /// Read and parse the file at `path`
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("config not found: {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config: {}", path.display()))
    }

    /// Load `explicit` if given, otherwise the default file if it exists,
    /// otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }
}
