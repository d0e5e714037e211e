//! ScanLab Runner — run configuration, parallel orchestration, result
//! sinks, summaries, and export.
//!
//! The runner owns the embarrassingly-parallel outer loop over
//! (stocks × scanners × days); every individual replay inside a unit stays
//! strictly sequential so no evaluation ever sees future data.

pub mod config;
pub mod export;
pub mod runner;
pub mod sink;
pub mod summary;

pub use config::{ConfigError, RunConfig, RunId};
pub use export::{write_csv, write_json};
pub use runner::{run_backtest, BacktestRunner, RunError, RunReport};
pub use sink::{MemorySink, ResultSink, SinkError};
pub use summary::ScannerSummary;
