//! Runtime configuration.
//!
//! The binary assembles an [`AppConfig`] from command line flags and
//! environment variables; library callers can build one directly.

use crate::animation::RouletteConfig;
use crate::services::GitHubClientConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory settings are persisted in when none is given.
pub const DEFAULT_DATA_DIR: &str = ".reviewer-roulette";

/// Display refresh interval for the terminal roulette (about 60 Hz).
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the settings blob lives.
    pub data_dir: PathBuf,

    /// GitHub API access.
    pub github: GitHubClientConfig,

    /// Spin tuning.
    pub roulette: RouletteConfig,

    /// Delay between rendered frames, in milliseconds.
    pub frame_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            github: GitHubClientConfig::default(),
            roulette: RouletteConfig::default(),
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

impl AppConfig {
    /// Use `dir` for persisted settings.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Override the API base URL when one is given.
    pub fn with_api_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.github.base_url = url;
        }
        self
    }

    /// Set the request timeout. `None` keeps waiting indefinitely.
    pub fn with_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.github.timeout_secs = secs;
        self
    }

    /// Override spin duration and laps when given.
    pub fn with_roulette(mut self, duration_ms: Option<u64>, laps: Option<u32>) -> Self {
        if let Some(duration_ms) = duration_ms {
            self.roulette.duration_ms = duration_ms;
        }
        if let Some(laps) = laps {
            self.roulette.laps = laps;
        }
        self
    }
}
