use thiserror::Error;

use crate::domain::CurveId;

/// Top-level error carried up to `main`, which maps it to a process exit code.
///
/// Exit codes:
/// - `2`: invalid input (missing files, malformed CSV, bad arguments)
/// - `3`: insufficient data (nothing to compare)
/// - `4`: numeric/alignment failures inside the matcher
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of the matching core.
///
/// These are raised before any comparison work starts; the core never returns
/// a partial result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// Two datasets do not share the same grid length.
    #[error("grid length mismatch: expected {expected} samples, found {found}")]
    Alignment { expected: usize, found: usize },

    /// Same length, but the x values disagree at some position.
    #[error("grid mismatch at row {index}: x={expected} vs x={found}")]
    GridMismatch {
        index: usize,
        expected: f64,
        found: f64,
    },

    #[error("grid is empty")]
    EmptyGrid,

    #[error("no training curves to match")]
    EmptyTraining,

    #[error("ideal catalog is empty")]
    EmptyCatalog,

    #[error("duplicate x value {x} at row {index}")]
    DuplicateX { index: usize, x: f64 },

    #[error("non-finite value in {curve} at row {index}")]
    NonFinite { curve: CurveId, index: usize },

    #[error("non-finite x value at row {index}")]
    NonFiniteX { index: usize },

    #[error("duplicate curve id {0}")]
    DuplicateCurve(CurveId),

    #[error("curve {curve} has {found} samples but the grid has {expected}")]
    ColumnLength {
        curve: CurveId,
        expected: usize,
        found: usize,
    },
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        let exit_code = match err {
            MatchError::EmptyGrid | MatchError::EmptyTraining | MatchError::EmptyCatalog => 3,
            MatchError::Alignment { .. } | MatchError::GridMismatch { .. } => 4,
            _ => 2,
        };
        AppError::new(exit_code, err.to_string())
    }
}
