#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `blobscan-tensor` provides the array type shared by the blob scanner crates. Unlike a
//! fixed-rank image, a microscopy stack may carry any number of leading axes (time, channel,
//! z, ...), so the rank of [`NdArray`] is a runtime property.
//!
//! - **NdArray**: owned row-major (C-contiguous) samples with shape and strides
//! - **NdView**: a borrowed, contiguous sub-array, e.g. the trailing axes at a fixed leading index
//! - **NdIndexIter**: row-major enumeration of every multi-index of a shape
//!
//! # Quick Start
//!
//! ```rust
//! use blobscan_tensor::{NdArray, NdIndexIter};
//!
//! // a stack of two 2x3 planes
//! let stack = NdArray::from_shape_fn(&[2, 2, 3], |idx| (idx[0] * 100 + idx[1] * 10 + idx[2]) as u16);
//!
//! // visit every plane by its leading index
//! for leading in NdIndexIter::new(&stack.shape[..1]) {
//!     let plane = stack.subview(&leading).unwrap();
//!     assert_eq!(plane.shape, vec![2, 3]);
//!     assert_eq!(plane.get(&[1, 2]), Some(&(leading[0] as u16 * 100 + 12)));
//! }
//! ```

/// Row-major multi-index enumeration.
pub mod index;

/// Serde support for owned arrays.
#[cfg(feature = "serde")]
pub mod serde;

/// Owned dynamic-rank arrays and the tensor error type.
pub mod tensor;

/// Borrowed contiguous views.
pub mod view;

pub use crate::index::NdIndexIter;
pub use crate::tensor::{get_strides_from_shape, NdArray, TensorError};
pub use crate::view::NdView;
