//! Training run configuration.
//!
//! Supports YAML configuration files with sensible defaults.

use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;

/// Settings for a background training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Total number of training epochs
    pub epochs: usize,
    /// Visit samples in a fresh random order each epoch
    pub shuffle: bool,
    /// Weight noise limit applied once before training (0 disables)
    pub jitter_limit: f64,
    /// Epochs between progress snapshots (0 disables)
    pub snapshot_interval: usize,
    /// Rayon worker threads (0 = twice the available cores)
    pub worker_threads: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 1000,
            shuffle: true,
            jitter_limit: 0.0,
            snapshot_interval: 10,
            worker_threads: 0,
        }
    }
}

impl TrainingConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: TrainingConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.epochs == 0 {
            return Err("epochs must be greater than zero".to_string());
        }
        if self.jitter_limit < 0.0 {
            return Err("jitter_limit must not be negative".to_string());
        }
        Ok(())
    }

    /// Worker thread count with the 0-means-auto rule applied. Training is
    /// throughput-bound with many short parallel sections, so auto picks
    /// twice the core count.
    pub fn effective_worker_threads(&self) -> usize {
        if self.worker_threads > 0 {
            self.worker_threads
        } else {
            2 * std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        }
    }
}
