//! Repository configuration, stored as TOML in `<meta>/config`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RepoError, RepoResult};

/// Only format version 0 repositories are understood.
pub const SUPPORTED_FORMAT_VERSION: u32 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub core: CoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub repository_format_version: u32,
    pub file_mode: bool,
    pub bare: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            repository_format_version: SUPPORTED_FORMAT_VERSION,
            file_mode: false,
            bare: false,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> RepoResult<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> RepoResult<()> {
        let raw = toml::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// Rejects repositories written by a newer, incompatible format.
    pub fn validate(&self) -> RepoResult<()> {
        if self.core.repository_format_version != SUPPORTED_FORMAT_VERSION {
            return Err(RepoError::UnsupportedFormatVersion(
                self.core.repository_format_version,
            ));
        }
        Ok(())
    }
}
