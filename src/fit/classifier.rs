//! Deviation-threshold classification of test observations.
//!
//! A test point `(x, y)` is compared against every ideal curve that has a
//! threshold. The comparison uses the ideal curve's sample at exactly `x`; if
//! the grid has no such sample the pair is skipped (no interpolation, and no
//! "zero deviation" stand-in).

use rayon::prelude::*;

use crate::domain::{ClassificationRecord, CurveSet, MaxDeviation, TestObservation, Thresholds};

/// Evaluate each observation against each thresholded ideal curve.
///
/// Output order is observation order, then catalog column order. An
/// observation may produce zero, one or several records, and several of them
/// may be within threshold; picking a single winner is left to the caller.
pub fn classify(
    observations: &[TestObservation],
    catalog: &CurveSet,
    thresholds: &Thresholds,
) -> Vec<ClassificationRecord> {
    let candidates: Vec<(usize, MaxDeviation)> = catalog
        .ids()
        .iter()
        .enumerate()
        .filter_map(|(col, &id)| thresholds.get(id).map(|d| (col, *d)))
        .collect();

    if candidates.is_empty() {
        tracing::warn!("no ideal curve has a threshold; nothing to classify against");
        return Vec::new();
    }

    let records: Vec<ClassificationRecord> = observations
        .par_iter()
        .flat_map_iter(|obs| evaluate(obs, catalog, &candidates))
        .collect();

    tracing::debug!(
        observations = observations.len(),
        candidates = candidates.len(),
        records = records.len(),
        "classified test observations"
    );

    records
}

fn evaluate(
    obs: &TestObservation,
    catalog: &CurveSet,
    candidates: &[(usize, MaxDeviation)],
) -> Vec<ClassificationRecord> {
    let Some(row) = catalog.row_of(obs.x) else {
        return Vec::new();
    };

    candidates
        .iter()
        .map(|&(col, deviation)| {
            let ideal_y = catalog.values()[(row, col)];
            let delta_y = (obs.y - ideal_y).abs();
            ClassificationRecord {
                observation_id: obs.id,
                x: obs.x,
                y: obs.y,
                ideal_curve_id: deviation.ideal_curve_id,
                delta_y,
                threshold: deviation.threshold,
                within_threshold: delta_y <= deviation.threshold,
            }
        })
        .collect()
}
