//! Configuration management for fimwatch
//!
//! This module provides configuration structures and defaults for the
//! hashing, baseline store, and event loop components.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::hasher::RetryPolicy;

/// Global configuration for fimwatch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FimConfig {
    /// Content hashing configuration
    pub hasher: HasherConfig,
    /// Baseline store configuration
    pub store: StoreConfig,
    /// Event loop configuration
    pub watcher: WatcherConfig,
}

/// Configuration for content hashing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    /// Hash attempts before a transiently inaccessible file is skipped
    pub retries: u32,
    /// Delay between attempts in milliseconds
    pub retry_delay_ms: u64,
}

/// Configuration for the baseline store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backing file for the fingerprint baseline
    pub baseline_path: PathBuf,
}

/// Configuration for the monitoring event loop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherConfig {
    /// How long the event loop waits for a raw event before re-checking
    /// the cancellation flag, in milliseconds
    pub poll_timeout_ms: u64,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            baseline_path: PathBuf::from("baseline.json"),
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: 100,
        }
    }
}

impl HasherConfig {
    /// Get the retry policy described by this section
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retries, Duration::from_millis(self.retry_delay_ms))
    }
}

impl WatcherConfig {
    /// Get the poll timeout duration
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}

/// Configuration loading and management
impl FimConfig {
    /// Load configuration from a TOML file, or use defaults when no file
    /// is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("failed to parse config file {}", path.display()))?
            }
            None => Self::default(),
        };
        Ok(config)
    }

    /// Apply FIMWATCH_* environment overrides on top of the current values.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("FIMWATCH_RETRIES") {
            if let Ok(retries) = val.parse::<u32>() {
                self.hasher.retries = retries;
            }
        }

        if let Ok(val) = std::env::var("FIMWATCH_RETRY_DELAY_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                self.hasher.retry_delay_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("FIMWATCH_POLL_TIMEOUT_MS") {
            if let Ok(ms) = val.parse::<u64>() {
                self.watcher.poll_timeout_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("FIMWATCH_BASELINE") {
            self.store.baseline_path = PathBuf::from(val);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.hasher.retries == 0 {
            return Err("retries must be greater than 0".to_string());
        }

        if self.watcher.poll_timeout_ms == 0 {
            return Err("poll_timeout_ms must be greater than 0".to_string());
        }

        if self.store.baseline_path.as_os_str().is_empty() {
            return Err("baseline_path must not be empty".to_string());
        }

        Ok(())
    }
}
