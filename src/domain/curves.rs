//! Tabulated curves on a shared x grid.
//!
//! Every dataset the matcher sees (training curves, ideal catalog) is a table:
//! one x column plus N y columns, all sampled at the same x values. We store
//! the y columns as a dense `nalgebra` matrix (rows = grid points, columns =
//! curves) so that per-candidate comparisons are whole-column operations.

use std::collections::HashMap;
use std::fmt;

use nalgebra::{DMatrix, DVectorView};
use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// Numeric curve identifier: `y7` in a CSV header is `CurveId(7)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurveId(pub u32);

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "y{}", self.0)
    }
}

impl CurveId {
    /// Parse a bare column name such as `y12` (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        let rest = name.strip_prefix('y').or_else(|| name.strip_prefix('Y'))?;
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        rest.parse::<u32>().ok().filter(|n| *n > 0).map(CurveId)
    }
}

/// A set of curves sharing one grid.
///
/// Invariants (checked on construction):
/// - the grid is non-empty, finite and free of duplicate x values
/// - every y value is finite
/// - curve ids are unique; column order is the input order
#[derive(Debug, Clone)]
pub struct CurveSet {
    grid: Vec<f64>,
    ids: Vec<CurveId>,
    values: DMatrix<f64>,
    row_by_x: HashMap<u64, usize>,
    col_by_id: HashMap<CurveId, usize>,
}

impl CurveSet {
    /// Build a table from a grid and `(id, y-column)` pairs.
    pub fn new(grid: Vec<f64>, columns: Vec<(CurveId, Vec<f64>)>) -> Result<Self, MatchError> {
        if grid.is_empty() {
            return Err(MatchError::EmptyGrid);
        }

        let mut row_by_x = HashMap::with_capacity(grid.len());
        for (index, &x) in grid.iter().enumerate() {
            if !x.is_finite() {
                return Err(MatchError::NonFiniteX { index });
            }
            if row_by_x.insert(grid_key(x), index).is_some() {
                return Err(MatchError::DuplicateX { index, x });
            }
        }

        let rows = grid.len();
        let mut ids = Vec::with_capacity(columns.len());
        let mut col_by_id = HashMap::with_capacity(columns.len());
        let mut data = Vec::with_capacity(rows * columns.len());

        for (col, (id, y)) in columns.into_iter().enumerate() {
            if y.len() != rows {
                return Err(MatchError::ColumnLength {
                    curve: id,
                    expected: rows,
                    found: y.len(),
                });
            }
            if let Some(index) = y.iter().position(|v| !v.is_finite()) {
                return Err(MatchError::NonFinite { curve: id, index });
            }
            if col_by_id.insert(id, col).is_some() {
                return Err(MatchError::DuplicateCurve(id));
            }
            ids.push(id);
            data.extend(y);
        }

        // Column-major storage: `data` holds each column contiguously.
        let values = DMatrix::from_vec(rows, ids.len(), data);

        Ok(Self {
            grid,
            ids,
            values,
            row_by_x,
            col_by_id,
        })
    }

    pub fn grid(&self) -> &[f64] {
        &self.grid
    }

    /// Number of grid points.
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn curve_count(&self) -> usize {
        self.ids.len()
    }

    /// Curve ids in column (input) order.
    pub fn ids(&self) -> &[CurveId] {
        &self.ids
    }

    /// Dense y-values: rows are grid points, columns are curves.
    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }

    pub fn column_of(&self, id: CurveId) -> Option<usize> {
        self.col_by_id.get(&id).copied()
    }

    pub fn column(&self, col: usize) -> DVectorView<'_, f64> {
        self.values.column(col)
    }

    /// Column for a curve id, if present.
    pub fn curve_values(&self, id: CurveId) -> Option<DVectorView<'_, f64>> {
        self.column_of(id).map(|col| self.values.column(col))
    }

    /// Grid row whose x equals `x` exactly. No tolerance, no interpolation.
    pub fn row_of(&self, x: f64) -> Option<usize> {
        if !x.is_finite() {
            return None;
        }
        self.row_by_x.get(&grid_key(x)).copied()
    }

    /// Check that `other` is sampled on exactly this grid.
    pub fn ensure_aligned(&self, other: &CurveSet) -> Result<(), MatchError> {
        ensure_same_grid(&self.grid, &other.grid)
    }
}

fn ensure_same_grid(expected: &[f64], found: &[f64]) -> Result<(), MatchError> {
    if expected.len() != found.len() {
        return Err(MatchError::Alignment {
            expected: expected.len(),
            found: found.len(),
        });
    }
    if let Some(index) = expected.iter().zip(found).position(|(a, b)| a != b) {
        return Err(MatchError::GridMismatch {
            index,
            expected: expected[index],
            found: found[index],
        });
    }
    Ok(())
}

/// Hash key for exact x lookup. `0.0` and `-0.0` compare equal, so they share a key.
fn grid_key(x: f64) -> u64 {
    if x == 0.0 { 0 } else { x.to_bits() }
}

/// Display labels for curve ids, used only when exporting or printing.
///
/// Ingest fills this from the CSV headers so exports echo the source naming.
#[derive(Debug, Clone, Default)]
pub struct CurveLabels {
    labels: HashMap<CurveId, String>,
}

impl CurveLabels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: CurveId, label: impl Into<String>) {
        self.labels.insert(id, label.into());
    }

    /// Label for `id`, falling back to the canonical `yN` form.
    pub fn label(&self, id: CurveId) -> String {
        self.labels
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(grid: &[f64], cols: Vec<(u32, Vec<f64>)>) -> Result<CurveSet, MatchError> {
        CurveSet::new(
            grid.to_vec(),
            cols.into_iter().map(|(id, y)| (CurveId(id), y)).collect(),
        )
    }

    #[test]
    fn curve_id_parses_header_names() {
        assert_eq!(CurveId::parse("y1"), Some(CurveId(1)));
        assert_eq!(CurveId::parse("Y50"), Some(CurveId(50)));
        assert_eq!(CurveId::parse("y0"), None);
        assert_eq!(CurveId::parse("x"), None);
        assert_eq!(CurveId::parse("y"), None);
        assert_eq!(CurveId::parse("y+3"), None);
        assert_eq!(CurveId(7).to_string(), "y7");
    }

    #[test]
    fn columns_keep_input_order() {
        let s = set(&[1.0, 2.0], vec![(3, vec![1.0, 2.0]), (1, vec![3.0, 4.0])]).unwrap();
        assert_eq!(s.ids(), &[CurveId(3), CurveId(1)]);
        assert_eq!(s.column_of(CurveId(1)), Some(1));
        assert_eq!(s.values()[(1, 1)], 4.0);
        let y3: Vec<f64> = s.curve_values(CurveId(3)).unwrap().iter().copied().collect();
        assert_eq!(y3, vec![1.0, 2.0]);
    }

    #[test]
    fn row_lookup_is_exact() {
        let s = set(&[-1.0, 0.0, 2.5], vec![(1, vec![0.0, 0.0, 0.0])]).unwrap();
        assert_eq!(s.row_of(2.5), Some(2));
        assert_eq!(s.row_of(-0.0), Some(1));
        assert_eq!(s.row_of(2.5000001), None);
        assert_eq!(s.row_of(f64::NAN), None);
    }

    #[test]
    fn rejects_bad_grids() {
        assert_eq!(set(&[], vec![]).unwrap_err(), MatchError::EmptyGrid);
        assert!(matches!(
            set(&[1.0, 1.0], vec![]).unwrap_err(),
            MatchError::DuplicateX { index: 1, .. }
        ));
        assert!(matches!(
            set(&[1.0, f64::NAN], vec![]).unwrap_err(),
            MatchError::NonFiniteX { index: 1 }
        ));
    }

    #[test]
    fn rejects_bad_columns() {
        assert!(matches!(
            set(&[1.0, 2.0], vec![(1, vec![1.0])]).unwrap_err(),
            MatchError::ColumnLength { expected: 2, found: 1, .. }
        ));
        assert!(matches!(
            set(&[1.0, 2.0], vec![(1, vec![1.0, f64::INFINITY])]).unwrap_err(),
            MatchError::NonFinite { index: 1, .. }
        ));
        assert_eq!(
            set(&[1.0], vec![(1, vec![1.0]), (1, vec![2.0])]).unwrap_err(),
            MatchError::DuplicateCurve(CurveId(1))
        );
    }

    #[test]
    fn alignment_requires_identical_grid() {
        let a = set(&[1.0, 2.0, 3.0], vec![(1, vec![1.0, 2.0, 3.0])]).unwrap();
        let b = set(&[1.0, 2.0], vec![(2, vec![1.0, 2.0])]).unwrap();
        assert_eq!(
            a.ensure_aligned(&b).unwrap_err(),
            MatchError::Alignment { expected: 3, found: 2 }
        );

        let c = set(&[1.0, 2.0, 4.0], vec![(2, vec![1.0, 2.0, 3.0])]).unwrap();
        assert!(matches!(
            a.ensure_aligned(&c).unwrap_err(),
            MatchError::GridMismatch { index: 2, .. }
        ));
        assert!(a.ensure_aligned(&a).is_ok());
    }

    #[test]
    fn labels_fall_back_to_canonical_name() {
        let mut labels = CurveLabels::new();
        labels.insert(CurveId(2), "Y2");
        assert_eq!(labels.label(CurveId(2)), "Y2");
        assert_eq!(labels.label(CurveId(9)), "y9");
    }
}
