//! The matching core.
//!
//! Responsibilities:
//!
//! - select the best ideal curve per training curve (minimum SSE)
//! - derive a deviation threshold per selected ideal curve
//! - classify test observations against the thresholded curves
//!
//! Everything here is a pure function of its inputs; I/O lives in `io`.

pub mod classifier;
pub mod deviation;
pub mod matcher;

pub use classifier::*;
pub use deviation::*;
pub use matcher::*;
