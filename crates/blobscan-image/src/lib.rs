#![deny(missing_docs)]
//! Image volume types and sample conversions for blob scanning.

/// Error types for the image module.
pub mod error;

/// Sample types and their float conversion.
pub mod sample;

/// Spatial metadata attached to a volume.
pub mod spatial;

/// N-dimensional image volumes.
pub mod volume;

pub use crate::error::ImageError;
pub use crate::sample::Sample;
pub use crate::spatial::SpatialMetadata;
pub use crate::volume::ImageVolume;
