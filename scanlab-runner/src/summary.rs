//! Per-scanner summary statistics over a result set.

use serde::{Deserialize, Serialize};

use scanlab_core::domain::ScannerId;
use scanlab_core::engine::BacktestResult;

/// Horizon used for the average-return line of the summary.
const SUMMARY_HORIZON: &str = "30min";

/// Aggregate outcome of one scanner across a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerSummary {
    pub scanner_id: ScannerId,
    pub triggers: usize,
    pub successful: usize,
    pub hit_target_1pct: usize,
    pub hit_target_2pct: usize,
    pub hit_stoploss: usize,
    /// Mean return at the summary horizon, over triggers that resolved it.
    pub avg_return_pct: Option<f64>,
    pub best_excursion_pct: Option<f64>,
    pub worst_excursion_pct: Option<f64>,
}

impl ScannerSummary {
    /// Summarize one scanner's slice of a result set.
    pub fn compute(scanner_id: ScannerId, results: &[BacktestResult]) -> Self {
        let own: Vec<&BacktestResult> = results
            .iter()
            .filter(|r| r.scanner_id == scanner_id)
            .collect();

        let returns: Vec<f64> = own
            .iter()
            .filter_map(|r| r.return_at(SUMMARY_HORIZON))
            .collect();
        let avg_return_pct = if returns.is_empty() {
            None
        } else {
            Some(returns.iter().sum::<f64>() / returns.len() as f64)
        };

        let best_excursion_pct = own
            .iter()
            .filter_map(|r| r.excursion.as_ref().map(|e| e.max_favorable_pct))
            .fold(None, |acc: Option<f64>, v| {
                Some(acc.map_or(v, |a| a.max(v)))
            });
        let worst_excursion_pct = own
            .iter()
            .filter_map(|r| r.excursion.as_ref().map(|e| e.max_adverse_pct))
            .fold(None, |acc: Option<f64>, v| {
                Some(acc.map_or(v, |a| a.min(v)))
            });

        Self {
            scanner_id,
            triggers: own.len(),
            successful: own.iter().filter(|r| r.flags.was_successful).count(),
            hit_target_1pct: own.iter().filter(|r| r.flags.hit_target_1pct).count(),
            hit_target_2pct: own.iter().filter(|r| r.flags.hit_target_2pct).count(),
            hit_stoploss: own.iter().filter(|r| r.flags.hit_stoploss).count(),
            avg_return_pct,
            best_excursion_pct,
            worst_excursion_pct,
        }
    }

    /// Success rate in [0, 1]; None with no triggers.
    pub fn success_rate(&self) -> Option<f64> {
        if self.triggers == 0 {
            None
        } else {
            Some(self.successful as f64 / self.triggers as f64)
        }
    }

    /// The `count` triggers with the best summary-horizon return.
    pub fn top_trades<'a>(
        scanner_id: ScannerId,
        results: &'a [BacktestResult],
        count: usize,
    ) -> Vec<&'a BacktestResult> {
        let mut own: Vec<&BacktestResult> = results
            .iter()
            .filter(|r| r.scanner_id == scanner_id && r.return_at(SUMMARY_HORIZON).is_some())
            .collect();
        own.sort_by(|a, b| {
            b.return_at(SUMMARY_HORIZON)
                .partial_cmp(&a.return_at(SUMMARY_HORIZON))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        own.truncate(count);
        own
    }
}
