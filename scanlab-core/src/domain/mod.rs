//! Domain types shared across the engine.

pub mod candle;

pub use candle::{validate_series, Candle, ScannerId, SeriesError, Timeframe};
