#![deny(missing_docs)]
#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use blobscan_tensor as tensor;

#[doc(inline)]
pub use blobscan_image as image;

#[doc(inline)]
pub use blobscan_imgproc as imgproc;

/// Error types for the scanner and the top level entry points.
pub mod error;

/// Viewer layer data produced by the entry points.
pub mod layer;

/// Detection method registry and entry points.
pub mod methods;

/// Conversion of point annotations into label images.
pub mod points;

/// The dimensional blob scanner.
pub mod scan;

pub use crate::error::{BlobscanError, ScanError};
pub use crate::layer::{LabelsLayer, LayerData, LayerType, PointsLayer};
pub use crate::methods::{
    determinant_of_hessian, difference_of_gaussian, laplacian_of_gaussian, Algorithm,
    Dimensionality, Method, MethodSelector,
};
pub use crate::points::{points_to_labels, Points};
pub use crate::scan::{detect_blobs, scan_blobs, ScanResult};
