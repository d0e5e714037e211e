//! Property tests for P&F and engine invariants.
//!
//! Uses proptest to verify:
//! 1. Transform ladder discipline — no skipped levels, no premature flips
//! 2. Anchor confidence bounds and narrow-range emptiness
//! 3. Zone grouping idempotence on zone centers
//! 4. Forward-return excursion sign bracketing

use proptest::prelude::*;

use scanlab_core::domain::Candle;
use scanlab_core::engine::forward_returns;
use scanlab_core::pnf::{pnf_points, AnchorConfig, AnchorKind, AnchorPoint, PnfMatrix, PnfSymbol};

// ── Strategies ───────────────────────────────────────────────────────

/// A random walk of bar midpoints with bounded step size.
fn arb_walk() -> impl Strategy<Value = Vec<f64>> {
    (
        50.0..500.0_f64,
        prop::collection::vec(-0.02..0.02_f64, 10..120),
    )
        .prop_map(|(start, steps)| {
            let mut price = start;
            let mut walk = vec![price];
            for step in steps {
                price *= 1.0 + step;
                walk.push(price);
            }
            walk
        })
}

fn arb_box_pct() -> impl Strategy<Value = f64> {
    0.003..0.03_f64
}

fn arb_reversal() -> impl Strategy<Value = u32> {
    1..5_u32
}

fn bars_from_walk(walk: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let highs: Vec<f64> = walk.iter().map(|p| p * 1.002).collect();
    let lows: Vec<f64> = walk.iter().map(|p| p * 0.998).collect();
    (highs, lows)
}

// ── 1. Transform ladder discipline ───────────────────────────────────

proptest! {
    /// Consecutive boxes in one column sit exactly one box apart, and a
    /// column change flips the symbol and advances the index by one.
    #[test]
    fn ladder_has_no_gaps_and_flips_cleanly(
        walk in arb_walk(),
        box_pct in arb_box_pct(),
        reversal in arb_reversal(),
    ) {
        let (highs, lows) = bars_from_walk(&walk);
        let points = pnf_points(&highs, &lows, box_pct, reversal);

        for pair in points.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(b.column >= a.column, "columns must be non-decreasing");
            if b.column == a.column {
                prop_assert_eq!(a.symbol, b.symbol);
                if a.column > 1 {
                    let ratio = match b.symbol {
                        PnfSymbol::X => b.price / a.price,
                        PnfSymbol::O => a.price / b.price,
                    };
                    prop_assert!(
                        (ratio - (1.0 + box_pct)).abs() < 1e-9,
                        "ladder gap: ratio {} vs box {}", ratio, 1.0 + box_pct
                    );
                }
            } else {
                prop_assert_eq!(b.column, a.column + 1);
                prop_assert_ne!(a.symbol, b.symbol);
            }
        }
    }

    /// A reversal column always contains at least `reversal` boxes — fewer
    /// crossed boxes must never flip direction.
    #[test]
    fn reversal_columns_span_minimum_depth(
        walk in arb_walk(),
        box_pct in arb_box_pct(),
        reversal in arb_reversal(),
    ) {
        let (highs, lows) = bars_from_walk(&walk);
        let points = pnf_points(&highs, &lows, box_pct, reversal);

        let max_column = points.iter().map(|p| p.column).max().unwrap_or(0);
        for column in 2..=max_column {
            let count = points.iter().filter(|p| p.column == column).count();
            prop_assert!(
                count >= reversal as usize,
                "column {} has {} boxes, reversal is {}", column, count, reversal
            );
        }
    }

    /// All emitted prices are positive and finite.
    #[test]
    fn prices_stay_positive(
        walk in arb_walk(),
        box_pct in arb_box_pct(),
        reversal in arb_reversal(),
    ) {
        let (highs, lows) = bars_from_walk(&walk);
        for point in pnf_points(&highs, &lows, box_pct, reversal) {
            prop_assert!(point.price.is_finite() && point.price > 0.0);
        }
    }
}

// ── 2. Anchor extraction bounds ──────────────────────────────────────

proptest! {
    /// Confidences stay in [0, 1]; tied anchors share the maximal count;
    /// sub-minimum ranges yield nothing.
    #[test]
    fn anchor_invariants(
        walk in arb_walk(),
        box_pct in arb_box_pct(),
    ) {
        let (highs, lows) = bars_from_walk(&walk);
        let points = pnf_points(&highs, &lows, box_pct, 3);
        let matrix = PnfMatrix::from_points(&points, box_pct);
        let config = AnchorConfig::default();

        let anchors = config.anchor_points(&matrix, None);
        if let Some(first) = anchors.first() {
            let sum: f64 = anchors.iter().map(|a| a.confidence).sum();
            prop_assert!(sum <= 1.0 + 1e-9);
            for anchor in &anchors {
                prop_assert!((0.0..=1.0).contains(&anchor.confidence));
                prop_assert_eq!(anchor.box_count, first.box_count);
                prop_assert!(anchor.box_count >= 1);
            }
            if anchors.len() > 1 {
                prop_assert!(anchors.iter().all(|a| a.kind == AnchorKind::Zone));
            }
        }

        // A range narrower than the separation minimum is always empty
        prop_assert!(config.anchor_points(&matrix, Some((0, 3))).is_empty());
    }
}

// ── 3. Zone grouping idempotence ─────────────────────────────────────

fn arb_anchor_prices() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(50.0..500.0_f64, 2..20)
}

proptest! {
    /// Zones built from zone centers never merge further: the centers of
    /// distinct zones are farther apart than the tolerance.
    #[test]
    fn zone_grouping_idempotent(prices in arb_anchor_prices()) {
        let anchors: Vec<AnchorPoint> = prices
            .iter()
            .map(|&p| AnchorPoint {
                price_level: p,
                box_count: 3,
                start_column: 0,
                end_column: 8,
                kind: AnchorKind::Single,
                confidence: 0.5,
            })
            .collect();

        let config = AnchorConfig::default();
        let zones = config.group_into_zones(&anchors);

        let centers: Vec<AnchorPoint> = zones
            .iter()
            .map(|z| AnchorPoint {
                price_level: z.zone_center,
                box_count: 3,
                start_column: 0,
                end_column: 8,
                kind: AnchorKind::Single,
                confidence: 0.5,
            })
            .collect();
        prop_assert!(config.group_into_zones(&centers).is_empty());
    }
}

// ── 4. Excursion sign bracketing ─────────────────────────────────────

proptest! {
    /// Whenever future data exists: favorable >= 0 >= adverse, and horizon
    /// returns are finite.
    #[test]
    fn excursion_signs(walk in arb_walk()) {
        use chrono::TimeZone;
        let base = chrono::Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap();
        let bars: Vec<Candle> = walk
            .iter()
            .enumerate()
            .map(|(i, &p)| Candle {
                timestamp: base + chrono::Duration::minutes(i as i64),
                open: p,
                high: p * 1.002,
                low: p * 0.998,
                close: p,
                volume: 1000.0,
            })
            .collect();

        let trigger_idx = bars.len() / 2;
        let (horizons, excursion, _) = forward_returns(&bars, trigger_idx);

        if trigger_idx + 1 < bars.len() {
            let e = excursion.expect("future data exists");
            prop_assert!(e.max_favorable_pct >= 0.0);
            prop_assert!(e.max_adverse_pct <= 0.0);
            for h in &horizons {
                let r = h.return_pct.expect("horizons resolve when future exists");
                prop_assert!(r.is_finite());
            }
        } else {
            prop_assert!(excursion.is_none());
        }
    }
}
