//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - curve identifiers and the shared-grid curve table (`CurveId`, `CurveSet`)
//! - matcher/classifier outputs (`MatchResult`, `MaxDeviation`, `ClassificationRecord`)
//! - the run configuration derived from CLI flags (`RunConfig`)

pub mod curves;
pub mod types;

pub use curves::*;
pub use types::*;
