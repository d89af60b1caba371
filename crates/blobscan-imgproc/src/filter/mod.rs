//! Filter operations
//!
//! N-dimensional Gaussian filtering with half-sample symmetric borders.

/// Filter kernels
pub mod kernels;

/// Filter operations
mod ops;
pub use ops::*;
