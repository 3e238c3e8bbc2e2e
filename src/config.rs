//! Tunable knobs for the numerical routines.
//!
//! Every field has a default, so a config file only needs to mention the
//! values it wants to change:
//!
//! ```toml
//! [search]
//! chunk_fraction = 0.0625
//! parallel = true
//! ```

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub kepler: KeplerSettings,
    pub lambert: LambertSettings,
    pub search: SearchSettings,
}

/// Settings for solving Kepler's equation (and its hyperbolic analog).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeplerSettings {
    /// Convergence threshold on the residual, in radians.
    pub tolerance: f64,
    pub max_iterations: usize,
}

/// Settings for the universal-variable Lambert solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LambertSettings {
    /// Accepted mismatch in time of flight, in seconds.
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Bracket on the universal variable z.
    pub z_lower: f64,
    pub z_upper: f64,
}

/// Settings for the transfer-window searches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub max_iterations: usize,
    /// Width of each launch-window chunk, as a fraction of the shorter period.
    pub chunk_fraction: f64,
    /// Shortest flight duration considered, in seconds.
    pub min_duration: i64,
    /// Time-of-flight tolerance for the Lambert trials inside a search, in
    /// seconds. Trials are compared one second apart, so this has to be well
    /// under a second.
    pub trial_tolerance: f64,
    /// Search the launch-window chunks on the rayon thread pool.
    pub parallel: bool,
}

impl Default for KeplerSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 1000,
        }
    }
}

impl Default for LambertSettings {
    fn default() -> Self {
        Self {
            tolerance: 1.0,
            max_iterations: 150,
            z_lower: -4.0 * PI,
            z_upper: 4.0 * PI * PI,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            chunk_fraction: 0.125,
            min_duration: 1,
            trial_tolerance: 1e-3,
            parallel: false,
        }
    }
}

impl SolverConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = SolverConfig::from_toml_str("").unwrap();
        assert_eq!(config, SolverConfig::default());
        assert_eq!(config.kepler.max_iterations, 1000);
        assert_eq!(config.lambert.max_iterations, 150);
        assert_eq!(config.search.max_iterations, 100);
        assert_eq!(config.search.chunk_fraction, 0.125);
        assert!(config.search.trial_tolerance < config.lambert.tolerance);
    }

    #[test]
    fn test_partial_config() {
        let text = r#"
            [lambert]
            tolerance = 0.5

            [search]
            chunk_fraction = 0.0625
            parallel = true
        "#;
        let config = SolverConfig::from_toml_str(text).unwrap();
        assert_eq!(config.lambert.tolerance, 0.5);
        assert_eq!(config.lambert.max_iterations, 150);
        assert_eq!(config.search.chunk_fraction, 0.0625);
        assert!(config.search.parallel);
        assert_eq!(config.kepler, KeplerSettings::default());
    }

    #[test]
    fn test_bad_config() {
        let result = SolverConfig::from_toml_str("[kepler]\nmax_iterations = \"lots\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_round_trip() {
        let mut config = SolverConfig::default();
        config.search.parallel = true;
        let text = toml::to_string(&config).unwrap();
        assert_eq!(SolverConfig::from_toml_str(&text).unwrap(), config);
    }
}
