//! Dense residual kernels.
//!
//! Everything the matcher and the threshold derivation need reduces to two
//! column-vs-column reductions over a shared grid:
//!
//! ```text
//! SSE(t, c)     = Σ (t_i - c_i)^2
//! maxdev(t, c)  = max |t_i - c_i|
//! ```
//!
//! Both operate on `nalgebra` column views so the inner loop is a whole-vector
//! operation rather than per-element bookkeeping in the callers.

use nalgebra::{DMatrix, DVectorView};

/// Sum of squared differences between two aligned columns.
pub fn sse(a: &DVectorView<'_, f64>, b: &DVectorView<'_, f64>) -> f64 {
    (a - b).norm_squared()
}

/// SSE of `target` against every column of `candidates`, in column order.
pub fn sse_per_column(target: &DVectorView<'_, f64>, candidates: &DMatrix<f64>) -> Vec<f64> {
    candidates
        .column_iter()
        .map(|col| sse(&col, target))
        .collect()
}

/// Largest absolute difference between two aligned columns.
pub fn max_abs_deviation(a: &DVectorView<'_, f64>, b: &DVectorView<'_, f64>) -> f64 {
    (a - b).amax()
}

/// Index and value of the smallest entry; ties resolve to the first index.
pub fn argmin_first(values: &[f64]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v >= b => {}
            _ => best = Some((i, v)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    #[test]
    fn sse_of_identical_columns_is_zero() {
        let a = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(sse(&a.column(0), &a.column(0)), 0.0);
    }

    #[test]
    fn sse_per_column_matches_hand_computation() {
        let t = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        // Columns: [1,2,3], [5,5,5], [0,0,0]
        let c = DMatrix::from_vec(3, 3, vec![1.0, 2.0, 3.0, 5.0, 5.0, 5.0, 0.0, 0.0, 0.0]);
        let out = sse_per_column(&t.column(0), &c);
        assert_eq!(out, vec![0.0, 16.0 + 9.0 + 4.0, 1.0 + 4.0 + 9.0]);
    }

    #[test]
    fn max_abs_deviation_uses_magnitude() {
        let a = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        let b = DVector::from_vec(vec![1.5, -1.0, 3.0]);
        assert_eq!(max_abs_deviation(&a.column(0), &b.column(0)), 3.0);
    }

    #[test]
    fn argmin_prefers_first_on_ties() {
        assert_eq!(argmin_first(&[3.0, 1.0, 1.0, 2.0]), Some((1, 1.0)));
        assert_eq!(argmin_first(&[]), None);
    }
}
