//! Scale-space blob detection.
//!
//! Each detector filters the input at a series of scales, stacks the responses into a cube
//! with the scale as its last axis, keeps the local maxima of that cube and finally drops
//! blobs that are mostly covered by a larger one.

mod blob;
pub use blob::*;

mod dog;
pub use dog::*;

mod doh;
pub use doh::*;

mod log;
pub use self::log::*;

mod peaks;
pub use peaks::*;

mod prune;
pub use prune::*;

mod scale_space;
pub use scale_space::sigma_series;
