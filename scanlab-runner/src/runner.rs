//! Backtest runner — fans the (stock × day × scanner) product out over a
//! worker pool.
//!
//! Each (stock, day) unit performs one bulk candle fetch and replays every
//! requested scanner sequentially; units are independent and run in
//! parallel. A unit that fails to load data is logged and skipped without
//! aborting the run.

use std::sync::Arc;

use chrono::{Duration, NaiveTime};
use rayon::prelude::*;
use thiserror::Error;
use tracing::error;

use scanlab_core::data::provider::{CandleSource, ReferenceData};
use scanlab_core::domain::{Candle, ScannerId, Timeframe};
use scanlab_core::engine::{replay_daily, replay_day, trading_days, BacktestResult, TradingDay};
use scanlab_core::scanners::{by_id, Scanner};

use crate::config::{ConfigError, RunConfig, RunId};
use crate::sink::{ResultSink, SinkError};

/// Daily candles fetched before the range start so indicators have history.
const DAILY_LOOKBACK_DAYS: i64 = 300;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("unknown scanner id {0}")]
    UnknownScanner(ScannerId),
}

/// Outcome of a full run.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: RunId,
    /// All qualifying triggers, sorted by (scanner, instrument, time).
    pub results: Vec<BacktestResult>,
    /// (stock, day) units processed (instruments, in daily mode).
    pub units_total: usize,
    /// Units skipped because their data failed to load.
    pub units_failed: usize,
}

/// Orchestrates scanners over a candle source.
pub struct BacktestRunner {
    source: Arc<dyn CandleSource>,
    reference: Option<Arc<dyn ReferenceData>>,
    parallel: bool,
}

impl BacktestRunner {
    pub fn new(source: Arc<dyn CandleSource>) -> Self {
        Self {
            source,
            reference: None,
            parallel: true,
        }
    }

    /// Attach a daily reference-data provider for baseline gates.
    pub fn with_reference(mut self, reference: Arc<dyn ReferenceData>) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run a backtest and return the collected results.
    pub fn run(&self, config: &RunConfig) -> Result<RunReport, RunError> {
        config.validate()?;
        let scanners = resolve_scanners(config)?;

        let mut report = if config.timeframe.is_intraday() {
            self.run_intraday(config, &scanners)
        } else {
            self.run_daily(config, &scanners)
        };

        report
            .results
            .sort_by(|a, b| a.key().cmp(&b.key()));
        Ok(report)
    }

    /// Run a backtest and upsert the results into a sink. A sink failure is
    /// logged and reported, never propagated as a run failure.
    pub fn run_into(
        &self,
        config: &RunConfig,
        sink: &dyn ResultSink,
    ) -> Result<RunReport, RunError> {
        let report = self.run(config)?;
        if let Err(err) = sink.upsert_batch(&report.results) {
            log_sink_failure(&err, report.results.len());
        }
        Ok(report)
    }

    fn run_intraday(&self, config: &RunConfig, scanners: &[Box<dyn Scanner>]) -> RunReport {
        let engine_config = config.engine_config();
        let fetch_start = config.start_date.and_time(NaiveTime::MIN).and_utc();
        let fetch_end = config
            .end_date
            .and_hms_opt(23, 59, 59)
            .expect("valid time")
            .and_utc();

        // One bulk fetch per instrument, split into (instrument, day) units
        let mut units: Vec<(String, TradingDay)> = Vec::new();
        let mut units_failed = 0;
        for instrument in &config.universe {
            match self
                .source
                .candles(instrument, Timeframe::M1, fetch_start, fetch_end)
            {
                Ok(candles) => {
                    for day in trading_days(&candles, &engine_config.session) {
                        units.push((instrument.clone(), day));
                    }
                }
                Err(err) => {
                    error!(instrument, %err, "candle fetch failed; skipping instrument");
                    units_failed += 1;
                }
            }
        }

        let reference = self.reference.as_deref();
        let replay_unit = |(instrument, day): &(String, TradingDay)| -> Vec<BacktestResult> {
            scanners
                .iter()
                .flat_map(|scanner| {
                    replay_day(
                        scanner.as_ref(),
                        instrument,
                        &day.candles,
                        &engine_config,
                        reference,
                    )
                })
                .collect()
        };

        let nested: Vec<Vec<BacktestResult>> = if self.parallel {
            units.par_iter().map(replay_unit).collect()
        } else {
            units.iter().map(replay_unit).collect()
        };

        RunReport {
            run_id: config.run_id(),
            results: nested.into_iter().flatten().collect(),
            units_total: units.len(),
            units_failed,
        }
    }

    fn run_daily(&self, config: &RunConfig, scanners: &[Box<dyn Scanner>]) -> RunReport {
        let lookback_start = config.start_date - Duration::days(DAILY_LOOKBACK_DAYS);
        let fetch_start = lookback_start.and_time(NaiveTime::MIN).and_utc();
        let fetch_end = config
            .end_date
            .and_hms_opt(23, 59, 59)
            .expect("valid time")
            .and_utc();

        let mut series: Vec<(String, Vec<Candle>)> = Vec::new();
        let mut units_failed = 0;
        for instrument in &config.universe {
            match self
                .source
                .candles(instrument, Timeframe::Daily, fetch_start, fetch_end)
            {
                Ok(candles) => series.push((instrument.clone(), candles)),
                Err(err) => {
                    error!(instrument, %err, "daily candle fetch failed; skipping instrument");
                    units_failed += 1;
                }
            }
        }

        let reference = self.reference.as_deref();
        let (start, end) = (config.start_date, config.end_date);
        let replay_instrument = |(instrument, candles): &(String, Vec<Candle>)| {
            scanners
                .iter()
                .flat_map(|scanner| {
                    replay_daily(scanner.as_ref(), instrument, candles, start, end, reference)
                })
                .collect::<Vec<BacktestResult>>()
        };

        let nested: Vec<Vec<BacktestResult>> = if self.parallel {
            series.par_iter().map(replay_instrument).collect()
        } else {
            series.iter().map(replay_instrument).collect()
        };

        RunReport {
            run_id: config.run_id(),
            results: nested.into_iter().flatten().collect(),
            units_total: series.len(),
            units_failed,
        }
    }
}

fn resolve_scanners(config: &RunConfig) -> Result<Vec<Box<dyn Scanner>>, RunError> {
    config
        .scanner_ids()
        .into_iter()
        .map(|id| by_id(id).ok_or(RunError::UnknownScanner(id)))
        .collect()
}

fn log_sink_failure(err: &SinkError, batch_len: usize) {
    error!(%err, batch_len, "result sink rejected batch; backtest results kept in memory");
}

/// Convenience for ad-hoc runs over an in-memory source.
pub fn run_backtest(
    source: Arc<dyn CandleSource>,
    config: &RunConfig,
) -> Result<RunReport, RunError> {
    BacktestRunner::new(source).run(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use scanlab_core::data::MemoryCandleSource;
    use scanlab_core::engine::EngineConfig;

    fn empty_source() -> Arc<dyn CandleSource> {
        Arc::new(MemoryCandleSource::new())
    }

    fn config_for(scanners: Vec<u16>) -> RunConfig {
        RunConfig {
            scanners,
            universe: vec!["GHOST".into()],
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            timeframe: Timeframe::M1,
            engine: EngineConfig::default(),
        }
    }

    #[test]
    fn unknown_scanner_is_rejected() {
        let runner = BacktestRunner::new(empty_source());
        let result = runner.run(&config_for(vec![1, 999]));
        assert!(matches!(result, Err(RunError::UnknownScanner(_))));
    }

    #[test]
    fn missing_instrument_is_skipped_not_fatal() {
        let runner = BacktestRunner::new(empty_source());
        let report = runner.run(&config_for(vec![1])).unwrap();
        assert_eq!(report.units_total, 0);
        assert_eq!(report.units_failed, 1);
        assert!(report.results.is_empty());
    }
}
