//! CSV ingest for curve tables and test observations.
//!
//! Two file shapes are supported:
//!
//! - curve tables: `x,y1,...,yN` (training and ideal catalogs). Column names
//!   may carry the descriptive suffixes used in the reference data, e.g.
//!   `y3 (training func)` or `y17 (ideal func)`.
//! - test observations: `x,y`, one observation per row.
//!
//! Design goals:
//! - **Strict schema** for curve tables: any bad cell is an error (exit code 2),
//!   because a hole in the grid would break positional alignment.
//! - **Row-level validation** for test points: skip bad rows, but report them.
//! - **Separation of concerns**: no matching logic here.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{CurveId, CurveLabels, CurveSet, TestObservation};
use crate::error::AppError;

const DESCRIPTIVE_SUFFIXES: [&str; 3] = ["(training func)", "(ideal func)", "(test func)"];

/// A loaded curve table plus the labels its header used.
#[derive(Debug, Clone)]
pub struct CurveTable {
    pub curves: CurveSet,
    pub labels: CurveLabels,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Loaded test observations.
#[derive(Debug, Clone)]
pub struct ObservationSet {
    pub observations: Vec<TestObservation>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load a `x,y1..yN` table.
pub fn load_curve_table(path: &Path) -> Result<CurveTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_curve_table(file, &path.display().to_string())
}

/// Load test observations from a `x,y` file.
pub fn load_observations(path: &Path) -> Result<ObservationSet, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_observations(file, &path.display().to_string())
}

/// Parse a curve table from any reader. `source` is used in error messages.
pub fn read_curve_table<R: std::io::Read>(reader: R, source: &str) -> Result<CurveTable, AppError> {
    let mut reader = csv_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers of '{source}': {e}")))?
        .clone();

    let (x_idx, columns) = resolve_curve_columns(&headers, source)?;

    let mut grid = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based.
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::new(2, format!("'{source}' line {line}: CSV parse error: {e}")))?;

        grid.push(parse_cell(&record, x_idx, "x", source, line)?);
        for (slot, col) in values.iter_mut().zip(&columns) {
            slot.push(parse_cell(&record, col.index, &col.header, source, line)?);
        }
    }

    if grid.is_empty() {
        return Err(AppError::new(3, format!("'{source}' contains no data rows.")));
    }

    let mut labels = CurveLabels::new();
    let mut pairs = Vec::with_capacity(columns.len());
    for (col, y) in columns.into_iter().zip(values) {
        labels.insert(col.id, col.label);
        pairs.push((col.id, y));
    }

    let curves = CurveSet::new(grid, pairs)
        .map_err(|e| AppError::new(2, format!("'{source}': {e}")))?;

    tracing::debug!(
        source,
        rows = curves.len(),
        curves = curves.curve_count(),
        "loaded curve table"
    );

    Ok(CurveTable { curves, labels })
}

/// Parse test observations from any reader. Ids are assigned 1..=n in row order.
pub fn read_observations<R: std::io::Read>(reader: R, source: &str) -> Result<ObservationSet, AppError> {
    let mut reader = csv_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers of '{source}': {e}")))?
        .clone();
    let header_map = build_header_map(&headers, source)?;

    let x_idx = *header_map
        .get("x")
        .ok_or_else(|| AppError::new(2, format!("'{source}': missing required column `x`")))?;
    let y_idx = *header_map
        .get("y")
        .ok_or_else(|| AppError::new(2, format!("'{source}': missing required column `y`")))?;

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let parsed = parse_f64(record.get(x_idx), "x")
            .and_then(|x| parse_f64(record.get(y_idx), "y").map(|y| (x, y)));
        match parsed {
            Ok((x, y)) => observations.push(TestObservation {
                id: observations.len() + 1,
                x,
                y,
            }),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        tracing::warn!(
            source,
            skipped = row_errors.len(),
            "skipped malformed test rows"
        );
    }

    Ok(ObservationSet {
        observations,
        row_errors,
        rows_read,
    })
}

struct CurveColumn {
    index: usize,
    id: CurveId,
    header: String,
    label: String,
}

fn csv_reader<R: std::io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn resolve_curve_columns(headers: &StringRecord, source: &str) -> Result<(usize, Vec<CurveColumn>), AppError> {
    let mut x_idx = None;
    let mut columns = Vec::new();

    for (index, raw) in headers.iter().enumerate() {
        let label = clean_header(raw);
        let name = strip_suffix(&label).to_ascii_lowercase();

        if name == "x" {
            if x_idx.replace(index).is_some() {
                return Err(AppError::new(2, format!("'{source}': duplicate `x` column")));
            }
            continue;
        }

        let id = CurveId::parse(&name).ok_or_else(|| {
            AppError::new(
                2,
                format!("'{source}': unrecognized column `{label}` (expected `x` or `y<N>`)"),
            )
        })?;

        columns.push(CurveColumn {
            index,
            id,
            header: label.clone(),
            label: strip_suffix(&label).to_string(),
        });
    }

    let x_idx = x_idx.ok_or_else(|| AppError::new(2, format!("'{source}': missing required column `x`")))?;
    Ok((x_idx, columns))
}

/// Normalized header name -> column index. A repeated `x` or `y` is ambiguous and rejected.
fn build_header_map(headers: &StringRecord, source: &str) -> Result<HashMap<String, usize>, AppError> {
    let mut map = HashMap::with_capacity(headers.len());
    for (idx, raw) in headers.iter().enumerate() {
        let name = strip_suffix(&clean_header(raw)).to_ascii_lowercase();
        let required = name == "x" || name == "y";
        if map.insert(name.clone(), idx).is_some() && required {
            return Err(AppError::new(2, format!("'{source}': duplicate `{name}` column")));
        }
    }
    Ok(map)
}

fn clean_header(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

fn strip_suffix(name: &str) -> &str {
    for suffix in DESCRIPTIVE_SUFFIXES {
        if let Some(head) = name.strip_suffix(suffix) {
            return head.trim_end();
        }
    }
    name
}

fn parse_cell(record: &StringRecord, idx: usize, column: &str, source: &str, line: usize) -> Result<f64, AppError> {
    parse_f64(record.get(idx), column).map_err(|msg| AppError::new(2, format!("'{source}' line {line}: {msg}")))
}

fn parse_f64(cell: Option<&str>, column: &str) -> Result<f64, String> {
    let s = cell
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing value for `{column}`."))?;
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{s}' in `{column}`."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite value '{s}' in `{column}`."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_plain_curve_table() {
        let csv = "x,y1,y2\n1,1.0,5\n2,2.0,5\n3,3.0,5\n";
        let table = read_curve_table(csv.as_bytes(), "mem").unwrap();
        assert_eq!(table.curves.grid(), &[1.0, 2.0, 3.0]);
        assert_eq!(table.curves.ids(), &[CurveId(1), CurveId(2)]);
        let y2: Vec<f64> = table.curves.curve_values(CurveId(2)).unwrap().iter().copied().collect();
        assert_eq!(y2, vec![5.0, 5.0, 5.0]);
        assert_eq!(table.labels.label(CurveId(1)), "y1");
    }

    #[test]
    fn accepts_descriptive_suffixes_and_bom() {
        let csv = "\u{feff}x,y1 (training func),Y2 (training func)\n0.5,1,2\n";
        let table = read_curve_table(csv.as_bytes(), "mem").unwrap();
        assert_eq!(table.curves.ids(), &[CurveId(1), CurveId(2)]);
        assert_eq!(table.labels.label(CurveId(2)), "Y2");
    }

    #[test]
    fn bad_cell_in_curve_table_is_fatal() {
        let csv = "x,y1\n1,1\n2,abc\n";
        let err = read_curve_table(csv.as_bytes(), "mem").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("line 3"), "{err}");
    }

    #[test]
    fn unknown_and_missing_columns_are_rejected() {
        let err = read_curve_table("x,z\n1,1\n".as_bytes(), "mem").unwrap_err();
        assert!(err.message().contains("unrecognized column"));

        let err = read_curve_table("y1,y2\n1,1\n".as_bytes(), "mem").unwrap_err();
        assert!(err.message().contains("`x`"));
    }

    #[test]
    fn duplicate_grid_x_is_rejected() {
        let err = read_curve_table("x,y1\n1,1\n1,2\n".as_bytes(), "mem").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("duplicate x"));
    }

    #[test]
    fn empty_table_is_insufficient_data() {
        let err = read_curve_table("x,y1\n".as_bytes(), "mem").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn observations_get_sequential_ids_and_skip_bad_rows() {
        let csv = "x,y\n2,2.15\noops,1\n2.5,0\n";
        let set = read_observations(csv.as_bytes(), "mem").unwrap();
        assert_eq!(set.rows_read, 3);
        assert_eq!(set.row_errors.len(), 1);
        assert_eq!(set.row_errors[0].line, 3);
        assert_eq!(
            set.observations,
            vec![
                TestObservation { id: 1, x: 2.0, y: 2.15 },
                TestObservation { id: 2, x: 2.5, y: 0.0 },
            ]
        );
    }

    #[test]
    fn observations_require_x_and_y() {
        let err = read_observations("x,z\n1,1\n".as_bytes(), "mem").unwrap_err();
        assert!(err.message().contains("`y`"));
    }

    #[test]
    fn repeated_observation_columns_are_rejected() {
        let err = read_observations("x,y,y (test func)\n1,1,2\n".as_bytes(), "mem").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("duplicate `y`"));

        let err = read_observations("x,x,y\n1,2,3\n".as_bytes(), "mem").unwrap_err();
        assert!(err.message().contains("duplicate `x`"));
    }
}
