//! `ideal-curves` library crate.
//!
//! Picks, for each training curve, the closest curve (least squares) from a
//! catalog of ideal curves, then classifies test points against the picked
//! curves using a per-curve deviation band.
//!
//! The binary (`ideal`) is a thin wrapper around this library so that the
//! matching core is testable without spawning processes.

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod report;
