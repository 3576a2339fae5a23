//! Numeric kernels: dense residual reductions over aligned curve columns.

pub mod residuals;

pub use residuals::*;
