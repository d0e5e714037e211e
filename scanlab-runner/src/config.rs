//! Serializable backtest run configuration.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use scanlab_core::domain::{ScannerId, Timeframe};
use scanlab_core::engine::EngineConfig;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("toml parse error in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Everything needed to reproduce a backtest run: scanners, universe, date
/// range, timeframe, and engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Scanner ids to evaluate.
    pub scanners: Vec<u16>,

    /// Instruments to scan.
    pub universe: Vec<String>,

    /// Backtest start date (inclusive).
    pub start_date: NaiveDate,

    /// Backtest end date (inclusive).
    pub end_date: NaiveDate,

    /// Bar size to evaluate on.
    pub timeframe: Timeframe,

    /// Engine parameters (warm-up, trigger gap, session hours).
    #[serde(default)]
    pub engine: EngineConfig,
}

impl RunConfig {
    /// Load a run configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let config: RunConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scanners.is_empty() {
            return Err(ConfigError::Invalid("no scanners selected".into()));
        }
        if self.universe.is_empty() {
            return Err(ConfigError::Invalid("empty universe".into()));
        }
        if self.end_date < self.start_date {
            return Err(ConfigError::Invalid(format!(
                "end date {} precedes start date {}",
                self.end_date, self.start_date
            )));
        }
        let unique: BTreeSet<u16> = self.scanners.iter().copied().collect();
        if unique.len() != self.scanners.len() {
            return Err(ConfigError::Invalid("duplicate scanner ids".into()));
        }
        Ok(())
    }

    pub fn scanner_ids(&self) -> Vec<ScannerId> {
        self.scanners.iter().map(|&id| ScannerId(id)).collect()
    }

    /// Engine config with the run's timeframe applied.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            timeframe: self.timeframe,
            ..self.engine.clone()
        }
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two runs with identical configs share a RunId, which makes result
    /// stores and exports idempotent per configuration.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> RunConfig {
        RunConfig {
            scanners: vec![1, 12],
            universe: vec!["ALPHA".into(), "BETA".into()],
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            timeframe: Timeframe::M1,
            engine: EngineConfig::default(),
        }
    }

    #[test]
    fn run_id_is_deterministic() {
        let config = sample_config();
        assert_eq!(config.run_id(), config.run_id());
        assert!(!config.run_id().is_empty());
    }

    #[test]
    fn run_id_changes_with_params() {
        let config = sample_config();
        let mut other = sample_config();
        other.scanners = vec![1, 23];
        assert_ne!(config.run_id(), other.run_id());
    }

    #[test]
    fn validation_rejects_bad_configs() {
        let mut config = sample_config();
        config.scanners.clear();
        assert!(config.validate().is_err());

        let mut config = sample_config();
        config.universe.clear();
        assert!(config.validate().is_err());

        let mut config = sample_config();
        config.end_date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert!(config.validate().is_err());

        let mut config = sample_config();
        config.scanners = vec![1, 1];
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let config = sample_config();
        let text = toml::to_string(&config).unwrap();
        let parsed: RunConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.run_id(), config.run_id());
    }

    #[test]
    fn engine_config_applies_timeframe() {
        let mut config = sample_config();
        config.timeframe = Timeframe::M5;
        assert_eq!(config.engine_config().timeframe, Timeframe::M5);
    }
}
