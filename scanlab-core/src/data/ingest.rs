//! CSV candle ingest.
//!
//! One file per instrument, named `<instrument>.csv`, with a header of
//! `timestamp,open,high,low,close,volume` and RFC 3339 timestamps. Series
//! are validated on load; a bad row or an out-of-order series rejects the
//! whole file.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{validate_series, Candle, SeriesError};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("csv error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
    #[error("invalid series in {path}: {source}")]
    Invalid { path: String, source: SeriesError },
}

#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<CandleRow> for Candle {
    fn from(row: CandleRow) -> Self {
        Candle {
            timestamp: row.timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

/// Load and validate one instrument's candles from a CSV file.
pub fn load_csv_file(path: &Path) -> Result<Vec<Candle>, LoadError> {
    let display = path.display().to_string();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: display.clone(),
        source,
    })?;

    let mut reader = csv::Reader::from_reader(file);
    let mut candles = Vec::new();
    for row in reader.deserialize::<CandleRow>() {
        let row = row.map_err(|source| LoadError::Csv {
            path: display.clone(),
            source,
        })?;
        candles.push(Candle::from(row));
    }

    validate_series(&candles).map_err(|source| LoadError::Invalid {
        path: display,
        source,
    })?;

    Ok(candles)
}

/// Load every `*.csv` in a directory, keyed by file stem (the instrument).
pub fn load_csv_dir(dir: &Path) -> Result<BTreeMap<String, Vec<Candle>>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let mut result = BTreeMap::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let candles = load_csv_file(&path)?;
        result.insert(stem.to_string(), candles);
    }
    Ok(result)
}
