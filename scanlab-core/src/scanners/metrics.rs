//! Scanner diagnostics — the metrics map every evaluation returns.
//!
//! Gates record their computed values before they are tested, so a failed
//! scan still carries everything evaluated up to the failing gate. The map
//! is ordered for stable serialization and reporting.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single diagnostic value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Num(f64),
    Flag(bool),
}

/// Named diagnostics accumulated during one scanner evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanMetrics {
    values: BTreeMap<String, MetricValue>,
    /// Set when the evaluation could not run (insufficient data, internal
    /// failure); partial values remain available.
    pub error: Option<String>,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metrics for a window shorter than the scanner's minimum.
    pub fn insufficient_data() -> Self {
        Self {
            values: BTreeMap::new(),
            error: Some("insufficient data".to_string()),
        }
    }

    pub fn put_num(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), MetricValue::Num(value));
    }

    pub fn put_flag(&mut self, name: impl Into<String>, value: bool) {
        self.values.insert(name.into(), MetricValue::Flag(value));
    }

    pub fn num(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(MetricValue::Num(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(MetricValue::Flag(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of one scanner evaluation: the verdict plus its diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub passed: bool,
    pub metrics: ScanMetrics,
}

impl ScanOutcome {
    pub fn fail(metrics: ScanMetrics) -> Self {
        Self {
            passed: false,
            metrics,
        }
    }

    pub fn pass(metrics: ScanMetrics) -> Self {
        Self {
            passed: true,
            metrics,
        }
    }
}
