//! Startup configuration, read from a TOML file.
//!
//! The file named by `CHESS_ENGINE_CONFIG` is used when set; otherwise
//! `engine.toml` in the working directory if it exists; otherwise the
//! defaults. Every field is optional.

use std::path::Path;
use std::time::Duration;

use chess_core::{ChessError, ChessResult, MAX_PLY};
use serde::Deserialize;

pub const CONFIG_ENV: &str = "CHESS_ENGINE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "engine.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Transposition table size in megabytes.
    pub hash_mb: usize,
    /// Depth cap for `go` commands that do not give one.
    pub default_depth: u8,
    /// Upper bound on the time spent on a single move.
    pub max_time_ms: u64,
    /// Fallback log filter when `RUST_LOG` is not set.
    pub log_level: String,
    pub null_move: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_mb: 16,
            default_depth: 64,
            max_time_ms: 10_000,
            log_level: "info".to_string(),
            null_move: true,
        }
    }
}

impl EngineConfig {
    pub fn from_toml(text: &str) -> ChessResult<Self> {
        let config: EngineConfig =
            toml::from_str(text).map_err(|e| ChessError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> ChessResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ChessError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    /// Load from the usual places; see the module docs.
    pub fn load() -> ChessResult<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load_from(Path::new(&path));
        }
        let default = Path::new(DEFAULT_CONFIG_FILE);
        if default.exists() {
            return Self::load_from(default);
        }
        Ok(Self::default())
    }

    pub fn max_time(&self) -> Duration {
        Duration::from_millis(self.max_time_ms)
    }

    fn validate(&self) -> ChessResult<()> {
        if self.hash_mb == 0 {
            return Err(ChessError::Config("hash_mb must be at least 1".into()));
        }
        if self.default_depth == 0 || self.default_depth as usize >= MAX_PLY {
            return Err(ChessError::Config(format!(
                "default_depth must be between 1 and {}",
                MAX_PLY - 1
            )));
        }
        if self.max_time_ms == 0 {
            return Err(ChessError::Config("max_time_ms must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
