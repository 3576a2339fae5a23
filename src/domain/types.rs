//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during matching and classification
//! - exported to JSON/CSV
//! - reloaded later for display

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::CurveId;

/// Best ideal curve for one training curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub training_curve_id: CurveId,
    pub selected_ideal_curve_id: CurveId,
    /// Sum of squared errors over the shared grid (>= 0).
    pub sse: f64,
}

/// Allowed deviation band for one selected ideal curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxDeviation {
    pub ideal_curve_id: CurveId,
    /// `max |training_y - ideal_y| * sqrt(2)` over the grid (>= 0).
    pub threshold: f64,
}

/// Per-ideal-curve thresholds.
///
/// A missing entry means "no threshold available": that curve is never a
/// classification candidate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Thresholds {
    by_curve: HashMap<CurveId, MaxDeviation>,
}

impl Thresholds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the threshold for `deviation.ideal_curve_id`.
    pub fn insert(&mut self, deviation: MaxDeviation) -> Option<MaxDeviation> {
        self.by_curve.insert(deviation.ideal_curve_id, deviation)
    }

    pub fn get(&self, id: CurveId) -> Option<&MaxDeviation> {
        self.by_curve.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_curve.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_curve.is_empty()
    }

    /// Entries sorted by curve id (stable output for reports).
    pub fn sorted(&self) -> Vec<MaxDeviation> {
        let mut out: Vec<MaxDeviation> = self.by_curve.values().copied().collect();
        out.sort_by_key(|d| d.ideal_curve_id);
        out
    }
}

impl FromIterator<MaxDeviation> for Thresholds {
    fn from_iter<I: IntoIterator<Item = MaxDeviation>>(iter: I) -> Self {
        let mut out = Thresholds::new();
        for d in iter {
            out.insert(d);
        }
        out
    }
}

/// One test point. `id` is 1-based, in input order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestObservation {
    pub id: usize,
    pub x: f64,
    pub y: f64,
}

/// Outcome of comparing one observation against one candidate ideal curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub observation_id: usize,
    pub x: f64,
    pub y: f64,
    pub ideal_curve_id: CurveId,
    pub delta_y: f64,
    pub threshold: f64,
    pub within_threshold: bool,
}

/// An observation that fell inside no candidate's band.
///
/// `first_candidate` carries the first evaluated record for the observation,
/// if any curve was sampled at its x at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedObservation {
    pub observation_id: usize,
    pub x: f64,
    pub y: f64,
    pub first_candidate: Option<ClassificationRecord>,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus env/defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub training_csv: PathBuf,
    pub ideal_csv: PathBuf,
    /// Absent for `select` runs.
    pub test_csv: Option<PathBuf>,

    /// Training-to-ideal mapping CSV.
    pub export_mapping: Option<PathBuf>,
    /// Directory receiving the evaluation/matched/unmatched CSVs.
    pub export_dir: Option<PathBuf>,
    /// JSON run summary.
    pub export_json: Option<PathBuf>,

    /// Max number of unmatched observations listed in the terminal summary.
    pub show_unmatched: usize,
}
