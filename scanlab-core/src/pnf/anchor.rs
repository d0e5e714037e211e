//! Anchor-point extraction — the most populated price levels of a P&F matrix.
//!
//! An anchor point is a price level whose box count equals the maximum
//! activity observed in a column range; nearby anchors group into zones.
//! Extraction never fails: insufficient input yields an empty list.

use serde::{Deserialize, Serialize};

use crate::pnf::matrix::PnfMatrix;

/// How an anchor was identified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorKind {
    Single,
    Zone,
    MajorFormation,
}

/// A price level with maximal P&F activity inside a column range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorPoint {
    pub price_level: f64,
    pub box_count: usize,
    pub start_column: usize,
    pub end_column: usize,
    pub kind: AnchorKind,
    /// Share of the range's total activity (activity confidence), blended
    /// with a position factor for major formations. Always in [0, 1].
    pub confidence: f64,
}

/// A group of anchor points within price tolerance of each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorZone {
    pub anchor_points: Vec<AnchorPoint>,
    pub zone_center: f64,
    pub zone_range: (f64, f64),
    pub total_activity: usize,
}

/// Extraction parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnchorConfig {
    /// Minimum width (in columns) of a range worth analyzing.
    pub min_column_separation: usize,
    /// Relative tolerance for grouping anchors into zones.
    pub price_tolerance: f64,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            min_column_separation: 7,
            price_tolerance: 0.02,
        }
    }
}

impl AnchorConfig {
    /// Extract anchor points for a column range. `None` auto-detects the
    /// full matrix width, widened to the minimum separation where possible.
    /// Ranges narrower than the minimum produce an empty result.
    pub fn anchor_points(
        &self,
        matrix: &PnfMatrix,
        range: Option<(usize, usize)>,
    ) -> Vec<AnchorPoint> {
        if matrix.is_empty() {
            return Vec::new();
        }

        let (start_col, end_col) = match range {
            Some(r) => r,
            None => self.auto_range(matrix),
        };

        if end_col < start_col || end_col - start_col < self.min_column_separation {
            return Vec::new();
        }

        // Per-row activity counts; rows without activity are dropped.
        let counts: Vec<(usize, usize)> = (0..matrix.height())
            .map(|row| (row, matrix.row_activity(row, start_col, end_col)))
            .filter(|&(_, count)| count > 0)
            .collect();

        let Some(&max_count) = counts.iter().map(|(_, c)| c).max() else {
            return Vec::new();
        };
        let total_activity: usize = counts.iter().map(|(_, c)| c).sum();

        let max_rows: Vec<usize> = counts
            .iter()
            .filter(|&&(_, c)| c == max_count)
            .map(|&(row, _)| row)
            .collect();

        let kind = if max_rows.len() > 1 {
            AnchorKind::Zone
        } else {
            AnchorKind::Single
        };

        max_rows
            .into_iter()
            .map(|row| AnchorPoint {
                price_level: matrix.levels()[row],
                box_count: max_count,
                start_column: start_col,
                end_column: end_col,
                kind,
                confidence: if total_activity > 0 {
                    max_count as f64 / total_activity as f64
                } else {
                    0.0
                },
            })
            .collect()
    }

    /// Extract anchors between every swing high/low pair with sufficient
    /// column separation, re-tagged as major formations with a blended
    /// activity/position confidence.
    pub fn major_formation_anchors(
        &self,
        matrix: &PnfMatrix,
        swing_highs: &[(usize, f64)],
        swing_lows: &[(usize, f64)],
    ) -> Vec<AnchorPoint> {
        let mut anchors = Vec::new();

        for &(high_col, high_price) in swing_highs {
            for &(low_col, low_price) in swing_lows {
                if high_col.abs_diff(low_col) < self.min_column_separation {
                    continue;
                }
                let start_col = high_col.min(low_col);
                let end_col = high_col.max(low_col);

                for mut anchor in self.anchor_points(matrix, Some((start_col, end_col))) {
                    anchor.kind = AnchorKind::MajorFormation;
                    anchor.confidence = formation_confidence(&anchor, high_price, low_price);
                    anchors.push(anchor);
                }
            }
        }

        anchors
    }

    /// Group anchors into zones: sort by price, then grow a running group
    /// while each next anchor stays within tolerance of the group mean.
    /// Groups of a single anchor are dropped.
    pub fn group_into_zones(&self, anchor_points: &[AnchorPoint]) -> Vec<AnchorZone> {
        if anchor_points.is_empty() {
            return Vec::new();
        }

        let mut sorted: Vec<AnchorPoint> = anchor_points.to_vec();
        sorted.sort_by(|a, b| a.price_level.total_cmp(&b.price_level));

        let mut zones = Vec::new();
        let mut group = vec![sorted[0].clone()];

        for anchor in sorted.into_iter().skip(1) {
            let center = group_mean(&group);
            let diff = (anchor.price_level - center).abs() / center;
            if diff <= self.price_tolerance {
                group.push(anchor);
            } else {
                if group.len() > 1 {
                    zones.push(make_zone(group));
                }
                group = vec![anchor];
            }
        }
        if group.len() > 1 {
            zones.push(make_zone(group));
        }

        zones
    }

    fn auto_range(&self, matrix: &PnfMatrix) -> (usize, usize) {
        let total_cols = matrix.width();
        let start = 0;
        let mut end = total_cols.saturating_sub(1);
        if end - start < self.min_column_separation {
            end = start + self.min_column_separation;
            if end >= total_cols {
                // Narrower than the minimum; the caller's separation check
                // will reject it.
                end = total_cols.saturating_sub(1);
            }
        }
        (start, end)
    }
}

/// Blend of activity confidence and position within the formation range;
/// a zero-height formation degrades to 0.5.
fn formation_confidence(anchor: &AnchorPoint, high_price: f64, low_price: f64) -> f64 {
    let range = high_price - low_price;
    if range == 0.0 {
        return 0.5;
    }
    let middle = (high_price + low_price) / 2.0;
    let distance = (anchor.price_level - middle).abs();
    let position_factor = 1.0 - distance / (range.abs() / 2.0);
    (position_factor + anchor.confidence) / 2.0
}

fn group_mean(group: &[AnchorPoint]) -> f64 {
    group.iter().map(|a| a.price_level).sum::<f64>() / group.len() as f64
}

fn make_zone(group: Vec<AnchorPoint>) -> AnchorZone {
    let center = group_mean(&group);
    let min = group
        .iter()
        .map(|a| a.price_level)
        .fold(f64::MAX, f64::min);
    let max = group
        .iter()
        .map(|a| a.price_level)
        .fold(f64::MIN, f64::max);
    let total_activity = group.iter().map(|a| a.box_count).sum();

    AnchorZone {
        anchor_points: group,
        zone_center: center,
        zone_range: (min, max),
        total_activity,
    }
}
