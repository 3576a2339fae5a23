//! Reporting utilities: matched/unmatched split, per-curve counts, and
//! formatted terminal output.

pub mod format;

pub use format::*;

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::domain::{ClassificationRecord, CurveId, TestObservation, UnmatchedObservation};

/// Classification records split into the two result sets consumers care about.
#[derive(Debug, Clone, Default)]
pub struct Outcomes {
    /// Every record with `within_threshold = true`, in classification order.
    pub matched: Vec<ClassificationRecord>,
    /// One entry per observation that matched no curve, in observation order.
    pub unmatched: Vec<UnmatchedObservation>,
}

/// Split classification output into matched records and unmatched observations.
///
/// An observation is unmatched when none of its records is within threshold,
/// including when no curve was sampled at its x at all. Each unmatched
/// observation appears exactly once; if its id shows up more than once in
/// `observations`, the first occurrence wins.
pub fn partition_outcomes(
    observations: &[TestObservation],
    records: &[ClassificationRecord],
) -> Outcomes {
    let matched: Vec<ClassificationRecord> = records
        .iter()
        .filter(|r| r.within_threshold)
        .copied()
        .collect();

    let matched_ids: HashSet<usize> = matched.iter().map(|r| r.observation_id).collect();

    let mut first_record: HashMap<usize, ClassificationRecord> = HashMap::new();
    for r in records {
        first_record.entry(r.observation_id).or_insert(*r);
    }

    let mut seen: HashSet<usize> = HashSet::new();

    let unmatched = observations
        .iter()
        .filter(|obs| !matched_ids.contains(&obs.id))
        .filter(|obs| seen.insert(obs.id))
        .map(|obs| UnmatchedObservation {
            observation_id: obs.id,
            x: obs.x,
            y: obs.y,
            first_candidate: first_record.get(&obs.id).copied(),
        })
        .collect();

    Outcomes { matched, unmatched }
}

/// Number of matched records per ideal curve, ordered by curve id.
pub fn match_counts(matched: &[ClassificationRecord]) -> Vec<(CurveId, usize)> {
    let mut counts: BTreeMap<CurveId, usize> = BTreeMap::new();
    for r in matched {
        *counts.entry(r.ideal_curve_id).or_default() += 1;
    }
    counts.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(obs: usize, curve: u32, delta_y: f64, threshold: f64) -> ClassificationRecord {
        ClassificationRecord {
            observation_id: obs,
            x: obs as f64,
            y: 0.0,
            ideal_curve_id: CurveId(curve),
            delta_y,
            threshold,
            within_threshold: delta_y <= threshold,
        }
    }

    fn obs(id: usize) -> TestObservation {
        TestObservation {
            id,
            x: id as f64,
            y: 0.0,
        }
    }

    #[test]
    fn splits_matched_and_unmatched() {
        let observations = [obs(1), obs(2), obs(3)];
        let records = [
            record(1, 4, 0.05, 0.14),
            record(1, 9, 0.50, 0.14),
            record(2, 4, 0.90, 0.14),
            record(2, 9, 0.80, 0.14),
        ];

        let out = partition_outcomes(&observations, &records);

        assert_eq!(out.matched.len(), 1);
        assert_eq!(out.matched[0].observation_id, 1);

        let ids: Vec<usize> = out.unmatched.iter().map(|u| u.observation_id).collect();
        assert_eq!(ids, vec![2, 3]);
        // First-seen record is kept for context.
        assert_eq!(
            out.unmatched[0].first_candidate.map(|r| r.ideal_curve_id),
            Some(CurveId(4))
        );
        // Observation 3 had no sample on the grid at all.
        assert!(out.unmatched[1].first_candidate.is_none());
    }

    #[test]
    fn observation_matching_several_curves_keeps_all_records() {
        let records = [record(1, 4, 0.0, 1.0), record(1, 9, 0.0, 1.0)];
        let out = partition_outcomes(&[obs(1)], &records);
        assert_eq!(out.matched.len(), 2);
        assert!(out.unmatched.is_empty());
    }

    #[test]
    fn duplicate_unmatched_ids_are_reported_once() {
        let out = partition_outcomes(&[obs(5), obs(5)], &[]);
        assert_eq!(out.unmatched.len(), 1);
    }

    #[test]
    fn large_unmatched_sets_keep_first_candidate() {
        let n = 50_000;
        let observations: Vec<TestObservation> = (1..=n).map(obs).collect();
        let records: Vec<ClassificationRecord> = (1..=n)
            .flat_map(|id| [record(id, 4, 2.0, 1.0), record(id, 9, 3.0, 1.0)])
            .collect();

        let start = std::time::Instant::now();
        let out = partition_outcomes(&observations, &records);
        let elapsed = start.elapsed();

        assert!(out.matched.is_empty());
        assert_eq!(out.unmatched.len(), n);
        assert!(
            out.unmatched
                .iter()
                .all(|u| u.first_candidate.map(|r| r.ideal_curve_id) == Some(CurveId(4)))
        );
        assert_eq!(out.unmatched[n - 1].first_candidate.unwrap().observation_id, n);
        assert!(elapsed.as_secs() < 5, "partition took {elapsed:?}");
    }

    #[test]
    fn counts_are_grouped_by_curve() {
        let matched = [
            record(1, 9, 0.0, 1.0),
            record(2, 4, 0.0, 1.0),
            record(3, 9, 0.0, 1.0),
        ];
        assert_eq!(
            match_counts(&matched),
            vec![(CurveId(4), 1), (CurveId(9), 2)]
        );
    }
}
