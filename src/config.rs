//! Configuration Module
//!
//! Handles loading the demo driver's settings from environment variables.

use std::env;

/// Demo driver configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of entries seeded into the shared store
    pub seed_entries: usize,
    /// The demo view admits every n-th store key
    pub view_stride: usize,
    /// Values below this threshold are swept from the pruned copy
    pub sweep_threshold: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SEED_ENTRIES` - Entries seeded into the store (default: 12)
    /// - `VIEW_STRIDE` - Admit every n-th key into the view (default: 3, minimum 1)
    /// - `SWEEP_THRESHOLD` - Sweep values below this threshold (default: 6)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            seed_entries: env::var("SEED_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.seed_entries),
            view_stride: env::var("VIEW_STRIDE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|stride: &usize| *stride > 0)
                .unwrap_or(defaults.view_stride),
            sweep_threshold: env::var("SWEEP_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_threshold),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed_entries: 12,
            view_stride: 3,
            sweep_threshold: 6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.seed_entries, 12);
        assert_eq!(config.view_stride, 3);
        assert_eq!(config.sweep_threshold, 6);
    }

    #[test]
    fn test_config_from_env() {
        // Single test touches the environment to avoid races between tests
        env::remove_var("SEED_ENTRIES");
        env::remove_var("SWEEP_THRESHOLD");
        env::set_var("VIEW_STRIDE", "0");

        let config = Config::from_env();
        assert_eq!(config.seed_entries, 12);
        assert_eq!(config.view_stride, 3);
        assert_eq!(config.sweep_threshold, 6);

        env::set_var("SEED_ENTRIES", "40");
        env::set_var("VIEW_STRIDE", "5");
        env::set_var("SWEEP_THRESHOLD", "not-a-number");

        let config = Config::from_env();
        assert_eq!(config.seed_entries, 40);
        assert_eq!(config.view_stride, 5);
        assert_eq!(config.sweep_threshold, 6);

        env::remove_var("SEED_ENTRIES");
        env::remove_var("VIEW_STRIDE");
        env::remove_var("SWEEP_THRESHOLD");
    }
}
