use blobscan_image::ImageError;
use blobscan_imgproc::FeatureError;
use blobscan_tensor::TensorError;

/// An error type for the dimensional blob scanner.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ScanError {
    /// The feature dimensionality does not fit the image.
    #[error(
        "Invalid feature dimensionality {feature_dim} for a {ndim}-dimensional image: \
         it must lie between 1 and {ndim}"
    )]
    InvalidDimensionality {
        /// Number of axes of the image
        ndim: usize,
        /// Requested feature dimensionality
        feature_dim: usize,
    },

    /// A detector reported a blob with the wrong number of coordinates.
    #[error("Detector returned a blob with {actual} coordinates, expected {expected}")]
    MalformedDetection {
        /// The feature dimensionality
        expected: usize,
        /// Number of coordinates of the offending blob
        actual: usize,
    },

    /// Error raised by the detector.
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// Error from the underlying array.
    #[error(transparent)]
    Tensor(#[from] TensorError),
}

/// The top level error type of the crate.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum BlobscanError {
    /// Error from the scanner.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Error from the image model.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error from filtering, detection or labeling.
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// Error from the underlying array.
    #[error(transparent)]
    Tensor(#[from] TensorError),

    /// No detection method has the given name.
    #[error("Unknown detection method `{0}`")]
    UnknownMethod(String),

    /// The points and the reference image have different dimensionalities.
    #[error("Points have {points} dimensions but the reference image has {image}")]
    PointDimensionMismatch {
        /// Dimensionality of the points
        points: usize,
        /// Dimensionality of the reference image
        image: usize,
    },

    /// The number of point sizes is neither one nor the number of points.
    #[error("Got {sizes} point sizes for {points} points")]
    SizeCountMismatch {
        /// Number of sizes
        sizes: usize,
        /// Number of points
        points: usize,
    },

    /// A point size is negative or not finite.
    #[error("Invalid size {size} for point {index}")]
    InvalidPointSize {
        /// Index of the point
        index: usize,
        /// The rejected size
        size: f64,
    },
}
