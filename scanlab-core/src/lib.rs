//! ScanLab Core — signal derivation from per-minute OHLCV bars.
//!
//! Two independent pipelines over the same candle data:
//! - Point-and-Figure: box/reversal transform, matrix construction, anchor
//!   point/zone extraction, and a multi-box-size matrix score
//! - Scanner backtesting: parametrized rule evaluators driven minute-by-minute
//!   (or day-by-day) by a replay engine that annotates every trigger with
//!   multi-horizon forward returns
//!
//! Candle fetching and daily reference statistics are trait-shaped
//! collaborators in `data`; no network or storage code lives here.

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod pnf;
pub mod scanners;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the runner fans out across threads is
    /// Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::ScannerId>();
        require_sync::<domain::ScannerId>();

        require_send::<engine::BacktestResult>();
        require_sync::<engine::BacktestResult>();
        require_send::<engine::EngineConfig>();
        require_sync::<engine::EngineConfig>();

        require_send::<pnf::AnchorPoint>();
        require_sync::<pnf::AnchorPoint>();
        require_send::<pnf::PnfMatrix>();
        require_sync::<pnf::PnfMatrix>();

        require_send::<scanners::ScanOutcome>();
        require_sync::<scanners::ScanOutcome>();
        require_send::<Box<dyn scanners::Scanner>>();
        require_sync::<Box<dyn scanners::Scanner>>();

        require_send::<data::MemoryCandleSource>();
        require_sync::<data::MemoryCandleSource>();
    }

    /// Architecture contract: `Scanner::evaluate` takes an immutable window
    /// and context only — no portfolio, no clock, no mutable state. The
    /// signature itself guarantees evaluations are pure and replayable.
    #[test]
    fn scanner_trait_is_pure() {
        fn _check_trait_object_builds(
            scanner: &dyn scanners::Scanner,
            window: &[domain::Candle],
            ctx: &scanners::ScanContext<'_>,
        ) -> scanners::ScanOutcome {
            scanner.evaluate(window, ctx)
        }
    }
}
