//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the matching code stays clean and testable
//! - output changes are localized

use crate::domain::{CurveLabels, MatchResult, Thresholds};
use crate::report::{Outcomes, match_counts};

/// Format the training → ideal mapping table.
///
/// The threshold column is shown only once thresholds have been derived.
pub fn format_mapping(
    matches: &[MatchResult],
    thresholds: Option<&Thresholds>,
    training_labels: &CurveLabels,
    ideal_labels: &CurveLabels,
) -> String {
    let mut out = String::new();

    out.push_str("Best ideal function per training function:\n");
    match thresholds {
        Some(_) => out.push_str(&format!(
            "{:<12} {:<12} {:>14} {:>12}\n",
            "training", "ideal", "SSE", "max dev"
        )),
        None => out.push_str(&format!("{:<12} {:<12} {:>14}\n", "training", "ideal", "SSE")),
    }

    for m in matches {
        let training = training_labels.label(m.training_curve_id);
        let ideal = ideal_labels.label(m.selected_ideal_curve_id);
        match thresholds {
            Some(t) => {
                let dev = t
                    .get(m.selected_ideal_curve_id)
                    .map(|d| format!("{:.4}", d.threshold))
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "{training:<12} {ideal:<12} {:>14.4} {dev:>12}\n",
                    m.sse
                ));
            }
            None => out.push_str(&format!("{training:<12} {ideal:<12} {:>14.4}\n", m.sse)),
        }
    }

    if let Some(t) = thresholds.filter(|t| !t.is_empty()) {
        out.push_str("\nDeviation thresholds (max |dy| * sqrt(2)):\n");
        for d in t.sorted() {
            out.push_str(&format!(
                "  {:<12} {:>12.4}\n",
                ideal_labels.label(d.ideal_curve_id),
                d.threshold
            ));
        }
    }

    out
}

/// Format the classification summary: totals, per-curve counts, and the first
/// `show_unmatched` unmatched observations.
pub fn format_outcomes(
    outcomes: &Outcomes,
    observation_count: usize,
    skipped_rows: usize,
    ideal_labels: &CurveLabels,
    show_unmatched: usize,
) -> String {
    let mut out = String::new();

    let matched_obs = observation_count.saturating_sub(outcomes.unmatched.len());
    out.push_str("Test data evaluation:\n");
    out.push_str(&format!(
        "Observations: n={observation_count} | matched={matched_obs} | unmatched={} | records within band={}\n",
        outcomes.unmatched.len(),
        outcomes.matched.len(),
    ));
    if skipped_rows > 0 {
        out.push_str(&format!("Skipped malformed rows: {skipped_rows}\n"));
    }

    let counts = match_counts(&outcomes.matched);
    if !counts.is_empty() {
        out.push_str("\nMatches per ideal function:\n");
        for (id, n) in counts {
            out.push_str(&format!("  {:<12} {n:>6}\n", ideal_labels.label(id)));
        }
    }

    if show_unmatched > 0 && !outcomes.unmatched.is_empty() {
        out.push_str("\nUnmatched observations:\n");
        out.push_str(&format!(
            "  {:>6} {:>12} {:>12} {:>12}\n",
            "id", "x", "y", "closest dy"
        ));
        for u in outcomes.unmatched.iter().take(show_unmatched) {
            let dy = u
                .first_candidate
                .map(|r| format!("{:.4}", r.delta_y))
                .unwrap_or_else(|| "off-grid".to_string());
            out.push_str(&format!(
                "  {:>6} {:>12.4} {:>12.4} {dy:>12}\n",
                u.observation_id, u.x, u.y
            ));
        }
        let hidden = outcomes.unmatched.len().saturating_sub(show_unmatched);
        if hidden > 0 {
            out.push_str(&format!("  ... and {hidden} more\n"));
        }
    }

    out
}
