//! Read/write run summary JSON files.
//!
//! The summary is the "portable" record of a run:
//! - where the inputs came from
//! - the training → ideal mapping with SSE and threshold
//! - classification totals and per-curve match counts
//!
//! `ideal show` reads it back for display without re-running anything.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CurveLabels, MatchResult, Thresholds};
use crate::error::AppError;
use crate::io::ingest::ObservationSet;
use crate::report::{Outcomes, match_counts};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub inputs: SummaryInputs,
    pub mapping: Vec<MappingEntry>,
    /// Absent for selection-only runs.
    pub evaluation: Option<EvaluationTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryInputs {
    pub training: String,
    pub ideal: String,
    pub test: Option<String>,
    pub grid_len: usize,
    pub ideal_curves: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub training: String,
    pub ideal: String,
    pub sse: f64,
    pub max_deviation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationTotals {
    /// Data rows in the test file, accepted or not.
    pub rows_read: usize,
    pub observations: usize,
    pub skipped_rows: usize,
    pub records: usize,
    pub matched_records: usize,
    pub unmatched_observations: usize,
    pub matches_per_curve: Vec<CurveCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveCount {
    pub ideal: String,
    pub matched: usize,
}

impl RunSummary {
    pub fn new(inputs: SummaryInputs, mapping: Vec<MappingEntry>) -> Self {
        Self {
            tool: "ideal".to_string(),
            generated_at: Utc::now(),
            inputs,
            mapping,
            evaluation: None,
        }
    }
}

/// Build the mapping section, attaching thresholds when available.
pub fn mapping_entries(
    matches: &[MatchResult],
    thresholds: Option<&Thresholds>,
    training_labels: &CurveLabels,
    ideal_labels: &CurveLabels,
) -> Vec<MappingEntry> {
    matches
        .iter()
        .map(|m| MappingEntry {
            training: training_labels.label(m.training_curve_id),
            ideal: ideal_labels.label(m.selected_ideal_curve_id),
            sse: m.sse,
            max_deviation: thresholds
                .and_then(|t| t.get(m.selected_ideal_curve_id))
                .map(|d| d.threshold),
        })
        .collect()
}

/// Build the evaluation section from the partitioned outcomes.
pub fn evaluation_totals(
    outcomes: &Outcomes,
    test: &ObservationSet,
    records: usize,
    ideal_labels: &CurveLabels,
) -> EvaluationTotals {
    EvaluationTotals {
        rows_read: test.rows_read,
        observations: test.observations.len(),
        skipped_rows: test.row_errors.len(),
        records,
        matched_records: outcomes.matched.len(),
        unmatched_observations: outcomes.unmatched.len(),
        matches_per_curve: match_counts(&outcomes.matched)
            .into_iter()
            .map(|(id, matched)| CurveCount {
                ideal: ideal_labels.label(id),
                matched,
            })
            .collect(),
    }
}

/// Write a summary JSON file.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::new(2, format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}

/// Read a summary JSON file.
pub fn read_summary_json(path: &Path) -> Result<RunSummary, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open summary JSON '{}': {e}", path.display())))?;
    let summary: RunSummary =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid summary JSON: {e}")))?;
    Ok(summary)
}

/// Render a summary for the terminal.
pub fn format_summary(summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {} run ({}) ===\n", summary.tool, summary.generated_at.to_rfc3339()));
    out.push_str(&format!("Training: {}\n", summary.inputs.training));
    out.push_str(&format!(
        "Ideal:    {} ({} curves, {} grid points)\n",
        summary.inputs.ideal, summary.inputs.ideal_curves, summary.inputs.grid_len
    ));
    if let Some(test) = &summary.inputs.test {
        out.push_str(&format!("Test:     {test}\n"));
    }

    out.push('\n');
    for m in &summary.mapping {
        let dev = m
            .max_deviation
            .map(|d| format!("{d:.4}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("{:<12} -> {:<12} SSE={:.4} max dev={dev}\n", m.training, m.ideal, m.sse));
    }

    if let Some(e) = &summary.evaluation {
        out.push_str(&format!(
            "\nRows read: {} | observations: n={} | within band={} | unmatched={} | skipped rows={}\n",
            e.rows_read, e.observations, e.matched_records, e.unmatched_observations, e.skipped_rows
        ));
        for c in &e.matches_per_curve {
            out.push_str(&format!("  {:<12} {:>6}\n", c.ideal, c.matched));
        }
    }

    out
}
