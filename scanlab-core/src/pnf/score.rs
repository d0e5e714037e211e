//! Multi-box-size P&F matrix score.
//!
//! Runs the transform at several box sizes and scores the latest column of
//! each: an X column counts +1, an O column -1, a double-top buy breakout
//! +2, a double-bottom sell breakdown -2. The summed score maps to a
//! strength band; |total| >= 6 qualifies for a super alert.

use serde::{Deserialize, Serialize};

use crate::domain::Candle;
use crate::pnf::transform::{pnf_points, PnfPoint, PnfSymbol};

/// Box sizes scored by default: 0.25%, 0.5%, 1%, 1.5%.
pub const DEFAULT_BOX_SIZES: [f64; 4] = [0.0025, 0.005, 0.01, 0.015];

/// Standard 3-box reversal.
pub const DEFAULT_REVERSAL: u32 = 3;

/// Minimum candles required to score a series.
const MIN_CANDLES: usize = 10;

/// Classification of the latest column at one box size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Rising column.
    X,
    /// Falling column.
    O,
    /// Double-top buy: latest X column broke above the prior X column top.
    DoubleTopBuy,
    /// Double-bottom sell: latest O column broke below the prior O column
    /// bottom.
    DoubleBottomSell,
}

impl ColumnKind {
    pub fn score(&self) -> i32 {
        match self {
            ColumnKind::X => 1,
            ColumnKind::O => -1,
            ColumnKind::DoubleTopBuy => 2,
            ColumnKind::DoubleBottomSell => -2,
        }
    }
}

/// Score contribution of a single box size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxScore {
    pub box_size: f64,
    pub column_kind: ColumnKind,
    pub score: i32,
    pub latest_price: f64,
}

/// Strength bands for the summed score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixStrength {
    SuperBullish,
    Bullish,
    NeutralBullish,
    Neutral,
    NeutralBearish,
    Bearish,
    SuperBearish,
}

impl MatrixStrength {
    fn from_total(total: i32) -> Self {
        if total >= 8 {
            MatrixStrength::SuperBullish
        } else if total >= 6 {
            MatrixStrength::Bullish
        } else if total >= 2 {
            MatrixStrength::NeutralBullish
        } else if total >= -1 {
            MatrixStrength::Neutral
        } else if total >= -5 {
            MatrixStrength::NeutralBearish
        } else if total >= -6 {
            MatrixStrength::Bearish
        } else {
            MatrixStrength::SuperBearish
        }
    }
}

/// Complete matrix score for one candle series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixScore {
    pub total: i32,
    pub scores: Vec<BoxScore>,
    pub strength: MatrixStrength,
    pub super_alert: bool,
}

/// Score a candle series across box sizes. Returns `None` when the series is
/// too short or no box size produces any P&F activity.
pub fn matrix_score(candles: &[Candle], box_sizes: &[f64], reversal: u32) -> Option<MatrixScore> {
    if candles.len() < MIN_CANDLES {
        return None;
    }

    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();

    let scores: Vec<BoxScore> = box_sizes
        .iter()
        .filter_map(|&box_size| score_box_size(&highs, &lows, box_size, reversal))
        .collect();

    if scores.is_empty() {
        return None;
    }

    let total: i32 = scores.iter().map(|s| s.score).sum();
    Some(MatrixScore {
        total,
        scores,
        strength: MatrixStrength::from_total(total),
        super_alert: total.abs() >= 6,
    })
}

fn score_box_size(highs: &[f64], lows: &[f64], box_size: f64, reversal: u32) -> Option<BoxScore> {
    let points = pnf_points(highs, lows, box_size, reversal);
    if points.is_empty() {
        return None;
    }

    let latest_column = points.iter().map(|p| p.column).max()?;
    let latest: Vec<&PnfPoint> = points.iter().filter(|p| p.column == latest_column).collect();
    let latest_symbol = latest.first()?.symbol;
    let latest_price = latest.last()?.price;

    let column_kind = match latest_symbol {
        PnfSymbol::X => {
            if breaks_prior_top(&points, latest_column) {
                ColumnKind::DoubleTopBuy
            } else {
                ColumnKind::X
            }
        }
        PnfSymbol::O => {
            if breaks_prior_bottom(&points, latest_column) {
                ColumnKind::DoubleBottomSell
            } else {
                ColumnKind::O
            }
        }
    };

    Some(BoxScore {
        box_size,
        column_kind,
        score: column_kind.score(),
        latest_price,
    })
}

/// Double top: the latest X column's top exceeds the previous X column's top.
fn breaks_prior_top(points: &[PnfPoint], latest_column: u32) -> bool {
    let Some(prior_column) = latest_column.checked_sub(2) else {
        return false;
    };
    match (
        column_extreme(points, latest_column, f64::max),
        column_extreme(points, prior_column, f64::max),
    ) {
        (Some(top), Some(prior)) => top > prior,
        _ => false,
    }
}

/// Double bottom: the latest O column's bottom undercuts the previous O
/// column's bottom.
fn breaks_prior_bottom(points: &[PnfPoint], latest_column: u32) -> bool {
    let Some(prior_column) = latest_column.checked_sub(2) else {
        return false;
    };
    match (
        column_extreme(points, latest_column, f64::min),
        column_extreme(points, prior_column, f64::min),
    ) {
        (Some(bottom), Some(prior)) => bottom < prior,
        _ => false,
    }
}

fn column_extreme(points: &[PnfPoint], column: u32, pick: fn(f64, f64) -> f64) -> Option<f64> {
    points
        .iter()
        .filter(|p| p.column == column)
        .map(|p| p.price)
        .reduce(pick)
}
