//! Per-curve deviation thresholds.
//!
//! Each selected ideal curve gets an allowed band derived from its own training
//! curve: the largest absolute gap over the shared grid, widened by a fixed
//! factor of `√2`.

use std::f64::consts::SQRT_2;

use crate::domain::{CurveSet, MatchResult, MaxDeviation, Thresholds};
use crate::math::max_abs_deviation;

/// Fixed widening applied to every maximum deviation.
pub const DEVIATION_FACTOR: f64 = SQRT_2;

/// Derive a threshold for each matched ideal curve.
///
/// Matches that reference a curve missing from either table are logged and
/// skipped; the returned mapping simply has no entry for them. If two training
/// curves picked the same ideal curve, the later match wins.
pub fn compute_max_deviations(
    training: &CurveSet,
    catalog: &CurveSet,
    matches: &[MatchResult],
) -> Thresholds {
    let mut thresholds = Thresholds::new();

    for m in matches {
        let Some(train_col) = training.curve_values(m.training_curve_id) else {
            tracing::warn!(
                training = %m.training_curve_id,
                ideal = %m.selected_ideal_curve_id,
                "training curve missing; no threshold derived"
            );
            continue;
        };
        let Some(ideal_col) = catalog.curve_values(m.selected_ideal_curve_id) else {
            tracing::warn!(
                training = %m.training_curve_id,
                ideal = %m.selected_ideal_curve_id,
                "ideal curve missing; no threshold derived"
            );
            continue;
        };
        if train_col.len() != ideal_col.len() {
            tracing::warn!(
                training = %m.training_curve_id,
                ideal = %m.selected_ideal_curve_id,
                training_len = train_col.len(),
                ideal_len = ideal_col.len(),
                "grid length mismatch; no threshold derived"
            );
            continue;
        }

        let threshold = max_abs_deviation(&train_col, &ideal_col) * DEVIATION_FACTOR;
        tracing::info!(
            training = %m.training_curve_id,
            ideal = %m.selected_ideal_curve_id,
            threshold,
            "max deviation"
        );

        if let Some(prev) = thresholds.insert(MaxDeviation {
            ideal_curve_id: m.selected_ideal_curve_id,
            threshold,
        }) {
            tracing::debug!(
                ideal = %prev.ideal_curve_id,
                replaced = prev.threshold,
                "ideal curve selected more than once; keeping latest threshold"
            );
        }
    }

    thresholds
}
