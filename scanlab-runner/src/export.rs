//! Result export: flattened CSV rows and JSON documents.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use scanlab_core::engine::BacktestResult;

use crate::sink::SinkError;

/// One flattened CSV row per trigger; horizon columns in catalog order.
#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    scanner_id: u16,
    instrument: &'a str,
    trigger_time: String,
    trigger_price: f64,
    price_after_3min: Option<f64>,
    return_3min_pct: Option<f64>,
    price_after_5min: Option<f64>,
    return_5min_pct: Option<f64>,
    price_after_15min: Option<f64>,
    return_15min_pct: Option<f64>,
    price_after_30min: Option<f64>,
    return_30min_pct: Option<f64>,
    price_after_1hour: Option<f64>,
    return_1hour_pct: Option<f64>,
    price_after_2hours: Option<f64>,
    return_2hours_pct: Option<f64>,
    max_favorable_pct: Option<f64>,
    max_adverse_pct: Option<f64>,
    was_successful: bool,
    hit_target_1pct: bool,
    hit_target_2pct: bool,
    hit_stoploss: bool,
}

impl<'a> ResultRow<'a> {
    fn from_result(result: &'a BacktestResult) -> Self {
        let horizon = |label: &str| {
            result
                .horizons
                .iter()
                .find(|h| h.label == label)
                .map(|h| (h.price, h.return_pct))
                .unwrap_or((None, None))
        };
        let (price_after_3min, return_3min_pct) = horizon("3min");
        let (price_after_5min, return_5min_pct) = horizon("5min");
        let (price_after_15min, return_15min_pct) = horizon("15min");
        let (price_after_30min, return_30min_pct) = horizon("30min");
        let (price_after_1hour, return_1hour_pct) = horizon("1hour");
        let (price_after_2hours, return_2hours_pct) = horizon("2hours");

        Self {
            scanner_id: result.scanner_id.0,
            instrument: &result.instrument,
            trigger_time: result.trigger_time.to_rfc3339(),
            trigger_price: result.trigger_price,
            price_after_3min,
            return_3min_pct,
            price_after_5min,
            return_5min_pct,
            price_after_15min,
            return_15min_pct,
            price_after_30min,
            return_30min_pct,
            price_after_1hour,
            return_1hour_pct,
            price_after_2hours,
            return_2hours_pct,
            max_favorable_pct: result.excursion.as_ref().map(|e| e.max_favorable_pct),
            max_adverse_pct: result.excursion.as_ref().map(|e| e.max_adverse_pct),
            was_successful: result.flags.was_successful,
            hit_target_1pct: result.flags.hit_target_1pct,
            hit_target_2pct: result.flags.hit_target_2pct,
            hit_stoploss: result.flags.hit_stoploss,
        }
    }
}

/// Write results as CSV.
pub fn write_csv(path: &Path, results: &[BacktestResult]) -> Result<(), SinkError> {
    let mut writer = csv::Writer::from_path(path).map_err(csv_to_sink)?;
    for result in results {
        writer
            .serialize(ResultRow::from_result(result))
            .map_err(csv_to_sink)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write results as a pretty-printed JSON array.
pub fn write_json(path: &Path, results: &[BacktestResult]) -> Result<(), SinkError> {
    let json = serde_json::to_string_pretty(results)
        .map_err(|e| SinkError::Rejected(e.to_string()))?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

fn csv_to_sink(err: csv::Error) -> SinkError {
    SinkError::Rejected(err.to_string())
}
