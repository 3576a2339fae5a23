//! Shared pipeline logic used by the `select` and `evaluate` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> select -> thresholds -> classify -> partition
//!
//! The command handlers can then focus on presentation and exports.

use std::path::Path;

use crate::domain::{ClassificationRecord, MatchResult, Thresholds};
use crate::error::AppError;
use crate::fit::{classify, compute_max_deviations, select_best_matches};
use crate::io::ingest::{CurveTable, ObservationSet, load_curve_table, load_observations};
use crate::report::{Outcomes, partition_outcomes};

/// Outputs of the selection stage.
#[derive(Debug, Clone)]
pub struct SelectionRun {
    pub training: CurveTable,
    pub ideal: CurveTable,
    pub matches: Vec<MatchResult>,
}

/// Outputs of a full evaluation run.
#[derive(Debug, Clone)]
pub struct EvaluationRun {
    pub selection: SelectionRun,
    pub test: ObservationSet,
    pub thresholds: Thresholds,
    pub records: Vec<ClassificationRecord>,
    pub outcomes: Outcomes,
}

/// Load training + ideal tables and select the best ideal curve per training curve.
pub fn run_selection(training_csv: &Path, ideal_csv: &Path) -> Result<SelectionRun, AppError> {
    let training = load_curve_table(training_csv)?;
    let ideal = load_curve_table(ideal_csv)?;
    select(training, ideal)
}

/// Selection over already-loaded tables.
pub fn select(training: CurveTable, ideal: CurveTable) -> Result<SelectionRun, AppError> {
    tracing::info!(
        training_curves = training.curves.curve_count(),
        ideal_curves = ideal.curves.curve_count(),
        grid = training.curves.len(),
        "selecting ideal functions"
    );

    let matches = select_best_matches(&training.curves, &ideal.curves)?;

    Ok(SelectionRun {
        training,
        ideal,
        matches,
    })
}

/// Full run: selection plus classification of the test observations.
pub fn run_evaluation(training_csv: &Path, ideal_csv: &Path, test_csv: &Path) -> Result<EvaluationRun, AppError> {
    let selection = run_selection(training_csv, ideal_csv)?;
    let test = load_observations(test_csv)?;
    Ok(evaluate(selection, test))
}

/// Thresholds, classification and partitioning over a finished selection.
pub fn evaluate(selection: SelectionRun, test: ObservationSet) -> EvaluationRun {
    let thresholds = compute_max_deviations(
        &selection.training.curves,
        &selection.ideal.curves,
        &selection.matches,
    );
    let records = classify(&test.observations, &selection.ideal.curves, &thresholds);
    let outcomes = partition_outcomes(&test.observations, &records);

    tracing::info!(
        observations = test.observations.len(),
        matched = outcomes.matched.len(),
        unmatched = outcomes.unmatched.len(),
        "classified test data"
    );

    EvaluationRun {
        selection,
        test,
        thresholds,
        records,
        outcomes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CurveId;
    use crate::io::ingest::{read_curve_table, read_observations};

    fn selection() -> SelectionRun {
        let training = read_curve_table("x,y1\n1,1.0\n2,2.0\n3,3.0\n".as_bytes(), "train").unwrap();
        let ideal = read_curve_table(
            "x,y1,y2,y3\n1,5,1.1,0\n2,5,2.1,0\n3,5,3.1,0\n".as_bytes(),
            "ideal",
        )
        .unwrap();
        select(training, ideal).unwrap()
    }

    #[test]
    fn evaluate_runs_all_stages() {
        let test = read_observations("x,y\n2,2.15\n2.5,2.0\n1,4.0\n".as_bytes(), "test").unwrap();
        let run = evaluate(selection(), test);

        assert_eq!(run.selection.matches[0].selected_ideal_curve_id, CurveId(2));
        assert_eq!(run.thresholds.len(), 1);
        // Only y2 has a threshold, and x=2.5 is off-grid: two records.
        assert_eq!(run.records.len(), 2);
        assert_eq!(run.outcomes.matched.len(), 1);
        assert_eq!(run.outcomes.matched[0].observation_id, 1);
        let unmatched: Vec<usize> = run.outcomes.unmatched.iter().map(|u| u.observation_id).collect();
        assert_eq!(unmatched, vec![2, 3]);
    }

    #[test]
    fn misaligned_tables_fail_with_exit_code_4() {
        let training = read_curve_table("x,y1\n1,1\n2,2\n".as_bytes(), "train").unwrap();
        let ideal = read_curve_table("x,y1\n1,1\n2,2\n3,3\n".as_bytes(), "ideal").unwrap();
        let err = select(training, ideal).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
