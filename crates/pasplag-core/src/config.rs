//! Configuration for the detection engine and the host-side limits.
//!
//! Load order: `pasplag.toml` → environment variables → defaults.

use crate::error::AnalysisError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level pasplag configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PasplagConfig {
    pub engine: EngineConfig,
    pub limits: LimitsConfig,
}

/// Core engine parameters, fixed at engine construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of normalised tokens per shingle. Shingling of length K
    /// suppresses single-token coincidences while preserving local structure.
    pub kgram_size: usize,
    /// Winnowing window width W. Every window of W consecutive k-gram hashes
    /// contributes at least one selected fingerprint.
    pub window_size: usize,
    /// Weight of the syntactic similarity in the overall score. Kept at 1.0
    /// until other similarity sources contribute.
    pub syntactic_weight: f64,
}

/// Host-side resource limits. The engine itself imposes none; callers use
/// these to refuse oversized inputs up front.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Files larger than this are refused by the caller (bytes).
    pub max_file_bytes: u64,
}

/// Per-call options for `detect` / `detect_batch`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectOptions {
    /// Decision boundary on overall similarity. When `None` the engine picks
    /// an adaptive threshold (per pair, or batch-wide in batch mode).
    pub threshold: Option<f64>,
    /// Minimum shared k-grams for a fragment to survive clustering.
    /// `None` keeps the default of 1.
    pub min_occurrences: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kgram_size: 8,
            window_size: 15,
            syntactic_weight: 1.0,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 10 * 1024 * 1024,
        }
    }
}

impl EngineConfig {
    /// Validate parameter ranges. Invalid parameters are fatal at engine
    /// construction, never silently clamped.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.kgram_size < 2 {
            return Err(AnalysisError::InvalidParameter(format!(
                "kgram_size must be >= 2, got {}",
                self.kgram_size
            )));
        }
        if self.window_size < 1 {
            return Err(AnalysisError::InvalidParameter(format!(
                "window_size must be >= 1, got {}",
                self.window_size
            )));
        }
        if !self.syntactic_weight.is_finite() || !(0.0..=1.0).contains(&self.syntactic_weight) {
            return Err(AnalysisError::InvalidParameter(format!(
                "syntactic_weight must be within [0, 1], got {}",
                self.syntactic_weight
            )));
        }
        Ok(())
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl PasplagConfig {
    /// Load config from `pasplag.toml` under `root`, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join("pasplag.toml");

        let mut config: Self = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        env_override("PASPLAG_KGRAM_SIZE", &mut config.engine.kgram_size);
        env_override("PASPLAG_WINDOW_SIZE", &mut config.engine.window_size);
        env_override(
            "PASPLAG_SYNTACTIC_WEIGHT",
            &mut config.engine.syntactic_weight,
        );
        env_override("PASPLAG_MAX_FILE_BYTES", &mut config.limits.max_file_bytes);

        config.engine.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PasplagConfig::default();
        assert_eq!(config.engine.kgram_size, 8);
        assert_eq!(config.engine.window_size, 15);
        assert_eq!(config.engine.syntactic_weight, 1.0);
        assert_eq!(config.limits.max_file_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r"
[engine]
kgram_size = 5
window_size = 4

[limits]
max_file_bytes = 1048576
";
        let config: PasplagConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine.kgram_size, 5);
        assert_eq!(config.engine.window_size, 4);
        assert_eq!(config.limits.max_file_bytes, 1_048_576);
        // Defaults for unspecified fields
        assert_eq!(config.engine.syntactic_weight, 1.0);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let config = PasplagConfig::load(Path::new("/nonexistent/path")).unwrap();
        assert_eq!(config.engine.kgram_size, 8);
    }

    #[test]
    fn test_load_rejects_invalid_kgram_size() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("pasplag.toml"),
            "[engine]\nkgram_size = 1\n",
        )
        .unwrap();

        let err = PasplagConfig::load(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("kgram_size"));
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let config = EngineConfig {
            window_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_weight() {
        let config = EngineConfig {
            syntactic_weight: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
