//! Export results to CSV.
//!
//! Column names follow the reference result tables so the files drop into the
//! same spreadsheets and downstream scripts.

use std::fs::{File, create_dir_all};
use std::path::Path;

use serde::Serialize;

use crate::domain::{ClassificationRecord, CurveLabels, MatchResult, UnmatchedObservation};
use crate::error::AppError;
use crate::report::Outcomes;

/// File names used by `write_evaluation_bundle`.
pub const EVALUATION_FILE: &str = "test_evaluation.csv";
pub const MATCHED_FILE: &str = "test_matched.csv";
pub const UNMATCHED_FILE: &str = "test_unmatched.csv";

const NOT_MATCHED: &str = "Not matched";

const MAPPING_HEADER: [&str; 3] = ["Training Function", "Ideal Function", "SSE"];
const EVALUATION_HEADER: [&str; 7] = [
    "ID",
    "X (test func)",
    "Y (test func)",
    "Delta Y (test func)",
    "No. of ideal func",
    "Max Deviation",
    "within_threshold",
];
const RESULT_HEADER: [&str; 4] = [
    "X (test func)",
    "Y (test func)",
    "Delta Y (test func)",
    "No. of ideal func",
];

#[derive(Serialize)]
struct MappingRow {
    training: String,
    ideal: String,
    sse: f64,
}

#[derive(Serialize)]
struct EvaluationRow {
    id: usize,
    x: f64,
    y: f64,
    delta_y: f64,
    ideal: String,
    threshold: f64,
    within_threshold: bool,
}

#[derive(Serialize)]
struct ResultRow {
    x: f64,
    y: f64,
    delta_y: Option<f64>,
    ideal: String,
}

/// Write the training → ideal mapping, one row per training curve.
pub fn write_mapping_csv(
    path: &Path,
    matches: &[MatchResult],
    training_labels: &CurveLabels,
    ideal_labels: &CurveLabels,
) -> Result<(), AppError> {
    let rows = matches.iter().map(|m| MappingRow {
        training: training_labels.label(m.training_curve_id),
        ideal: ideal_labels.label(m.selected_ideal_curve_id),
        sse: m.sse,
    });
    write_rows(path, &MAPPING_HEADER, rows)
}

/// Write every evaluated (observation, curve) pair.
pub fn write_evaluation_csv(
    path: &Path,
    records: &[ClassificationRecord],
    ideal_labels: &CurveLabels,
) -> Result<(), AppError> {
    let rows = records.iter().map(|r| EvaluationRow {
        id: r.observation_id,
        x: r.x,
        y: r.y,
        delta_y: r.delta_y,
        ideal: ideal_labels.label(r.ideal_curve_id),
        threshold: r.threshold,
        within_threshold: r.within_threshold,
    });
    write_rows(path, &EVALUATION_HEADER, rows)
}

/// Write the matched result table: x, y, delta y, matched ideal curve.
pub fn write_matched_csv(
    path: &Path,
    matched: &[ClassificationRecord],
    ideal_labels: &CurveLabels,
) -> Result<(), AppError> {
    let rows = matched.iter().map(|r| ResultRow {
        x: r.x,
        y: r.y,
        delta_y: Some(r.delta_y),
        ideal: ideal_labels.label(r.ideal_curve_id),
    });
    write_rows(path, &RESULT_HEADER, rows)
}

/// Write unmatched observations; the delta is blank for off-grid points.
pub fn write_unmatched_csv(path: &Path, unmatched: &[UnmatchedObservation]) -> Result<(), AppError> {
    let rows = unmatched.iter().map(|u| ResultRow {
        x: u.x,
        y: u.y,
        delta_y: u.first_candidate.map(|r| r.delta_y),
        ideal: NOT_MATCHED.to_string(),
    });
    write_rows(path, &RESULT_HEADER, rows)
}

/// Write the evaluation, matched and unmatched tables into `dir`.
///
/// The directory is created if needed.
pub fn write_evaluation_bundle(
    dir: &Path,
    records: &[ClassificationRecord],
    outcomes: &Outcomes,
    ideal_labels: &CurveLabels,
) -> Result<(), AppError> {
    create_dir_all(dir).map_err(|e| {
        AppError::new(2, format!("Failed to create export dir '{}': {e}", dir.display()))
    })?;

    write_evaluation_csv(&dir.join(EVALUATION_FILE), records, ideal_labels)?;
    write_matched_csv(&dir.join(MATCHED_FILE), &outcomes.matched, ideal_labels)?;
    write_unmatched_csv(&dir.join(UNMATCHED_FILE), &outcomes.unmatched)?;
    Ok(())
}

/// Header is written up front so empty result sets still produce a valid table.
fn write_rows<T: Serialize>(path: &Path, header: &[&str], rows: impl Iterator<Item = T>) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

    writer
        .write_record(header)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let mut n = 0usize;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        n += 1;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV '{}': {e}", path.display())))?;

    tracing::info!(path = %path.display(), rows = n, "wrote CSV export");
    Ok(())
}
