//! YAML configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::schema::{Engine, SchemaKind};

/// Top-level configuration: one source database and what to extract from it.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub extract: ExtractConfig,
}

/// Connection parameters for the source database.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

fn default_port() -> u16 {
    5432
}

/// What to extract and how the identifiers are spelled.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    pub schema: SchemaKind,
    #[serde(default)]
    pub engine: Engine,
    /// XML output path; stdout when unset.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }
}
