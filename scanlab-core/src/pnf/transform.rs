//! Point-and-Figure transform — box/reversal state machine.
//!
//! Collapses a high/low series into columns of X (rising) and O (falling)
//! boxes. Box levels scale multiplicatively: the next level above `p` is
//! `p * (1 + box_pct)`, the next below is `p / (1 + box_pct)`. A column
//! flips only after price crosses `reversal` box levels against the
//! prevailing direction, and the reversal check runs before the extension
//! check within a bar.

use serde::{Deserialize, Serialize};

/// Box symbol: X marks rising boxes, O falling boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PnfSymbol {
    X,
    O,
}

/// One plotted box. Columns are 1-based and non-decreasing across the
/// emitted sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnfPoint {
    pub column: u32,
    pub price: f64,
    pub symbol: PnfSymbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Undetermined,
    Up,
    Down,
}

/// Run the P&F state machine over a high/low series.
///
/// The two slices must be equal length, one bar per element, chronological.
/// Fewer than 2 bars produces an empty output. Direction is undetermined
/// until a bar clears one full box from the first bar's high; the
/// initialization thresholds are re-tested on every bar until that happens,
/// after which the machine stays in its directional branches.
pub fn pnf_points(highs: &[f64], lows: &[f64], box_pct: f64, reversal: u32) -> Vec<PnfPoint> {
    assert_eq!(highs.len(), lows.len(), "highs and lows must be equal length");
    assert!(box_pct > 0.0, "box_pct must be positive");
    assert!(reversal >= 1, "reversal must be >= 1");

    if highs.len() < 2 {
        return Vec::new();
    }

    let mut points = Vec::new();
    let mut column: u32 = 1;
    let mut direction = Direction::Undetermined;
    let mut last_level = highs[0];
    let box_factor = 1.0 + box_pct;
    // Initialization thresholds stay anchored at the first bar's high until
    // a direction is established.
    let box_up_thresh = last_level * box_factor;
    let box_down_thresh = last_level / box_factor;

    let start_column = |points: &mut Vec<PnfPoint>, level: f64, symbol: PnfSymbol| {
        points.push(PnfPoint {
            column: 1,
            price: highs[0],
            symbol,
        });
        points.push(PnfPoint {
            column: 1,
            price: level,
            symbol,
        });
    };

    if highs[0] >= box_up_thresh {
        direction = Direction::Up;
        start_column(&mut points, box_up_thresh, PnfSymbol::X);
        last_level = box_up_thresh;
    } else if lows[0] <= box_down_thresh {
        direction = Direction::Down;
        start_column(&mut points, box_down_thresh, PnfSymbol::O);
        last_level = box_down_thresh;
    }

    for i in 1..highs.len() {
        let high = highs[i];
        let low = lows[i];

        match direction {
            Direction::Up => {
                let reversal_level = last_level / box_factor.powi(reversal as i32);
                if low <= reversal_level {
                    // Reversal takes precedence over extension.
                    direction = Direction::Down;
                    column += 1;
                    let mut level = last_level / box_factor;
                    while low <= level {
                        points.push(PnfPoint {
                            column,
                            price: level,
                            symbol: PnfSymbol::O,
                        });
                        last_level = level;
                        level /= box_factor;
                    }
                } else {
                    let mut level = last_level * box_factor;
                    while high >= level {
                        points.push(PnfPoint {
                            column,
                            price: level,
                            symbol: PnfSymbol::X,
                        });
                        last_level = level;
                        level *= box_factor;
                    }
                }
            }
            Direction::Down => {
                let reversal_level = last_level * box_factor.powi(reversal as i32);
                if high >= reversal_level {
                    direction = Direction::Up;
                    column += 1;
                    let mut level = last_level * box_factor;
                    while high >= level {
                        points.push(PnfPoint {
                            column,
                            price: level,
                            symbol: PnfSymbol::X,
                        });
                        last_level = level;
                        level *= box_factor;
                    }
                } else {
                    let mut level = last_level / box_factor;
                    while low <= level {
                        points.push(PnfPoint {
                            column,
                            price: level,
                            symbol: PnfSymbol::O,
                        });
                        last_level = level;
                        level /= box_factor;
                    }
                }
            }
            Direction::Undetermined => {
                if high >= box_up_thresh {
                    direction = Direction::Up;
                    last_level = box_up_thresh;
                    start_column(&mut points, box_up_thresh, PnfSymbol::X);
                } else if low <= box_down_thresh {
                    direction = Direction::Down;
                    last_level = box_down_thresh;
                    start_column(&mut points, box_down_thresh, PnfSymbol::O);
                }
            }
        }
    }

    points
}
