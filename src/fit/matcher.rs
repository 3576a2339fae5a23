//! Best-ideal-curve selection by minimum SSE.
//!
//! For every training curve `t` we compute `SSE(t, c)` against every curve `c`
//! of the ideal catalog and keep the smallest. Ties go to the candidate that
//! comes first in catalog order, so the catalog must be passed in its input
//! order (never re-sorted).
//!
//! The scan is `O(training × catalog × grid)`. Each training curve is handled
//! independently on the rayon pool; `collect` keeps the training order.

use rayon::prelude::*;

use crate::domain::{CurveSet, MatchResult};
use crate::error::MatchError;
use crate::math::{argmin_first, sse_per_column};

/// Select the best ideal curve for each training curve.
///
/// Fails before doing any work if the two tables are not sampled on the same
/// grid, or if either side has no curves.
pub fn select_best_matches(
    training: &CurveSet,
    catalog: &CurveSet,
) -> Result<Vec<MatchResult>, MatchError> {
    training.ensure_aligned(catalog)?;

    if training.curve_count() == 0 {
        return Err(MatchError::EmptyTraining);
    }
    if catalog.curve_count() == 0 {
        return Err(MatchError::EmptyCatalog);
    }

    let results: Vec<MatchResult> = (0..training.curve_count())
        .into_par_iter()
        .map(|col| best_for_column(training, catalog, col))
        .collect();

    for r in &results {
        tracing::debug!(
            training = %r.training_curve_id,
            ideal = %r.selected_ideal_curve_id,
            sse = r.sse,
            "selected ideal curve"
        );
    }

    Ok(results)
}

fn best_for_column(training: &CurveSet, catalog: &CurveSet, col: usize) -> MatchResult {
    let target = training.column(col);
    let sse = sse_per_column(&target, catalog.values());

    // Non-empty catalog and finite values are guaranteed by the checks above
    // and by `CurveSet` construction, so there is always a minimum.
    let (best, min_sse) = argmin_first(&sse).unwrap_or((0, f64::INFINITY));

    MatchResult {
        training_curve_id: training.ids()[col],
        selected_ideal_curve_id: catalog.ids()[best],
        sse: min_sse,
    }
}
