#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// utilities to rasterize shapes into masks.
pub mod draw;

/// Error types for the imgproc module.
pub mod error;

/// blob detection module.
pub mod features;

/// image filtering module.
pub mod filter;

/// connected-component labeling module.
pub mod label;

/// neighbourhood offsets shared by peak finding and labeling.
mod neighbors;

pub use crate::error::FeatureError;
