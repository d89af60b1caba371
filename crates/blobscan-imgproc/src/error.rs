use blobscan_tensor::TensorError;

/// An error type for filtering, detection and labeling.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FeatureError {
    /// A detector or filter parameter is outside its valid range.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the parameter
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// The detector cannot run on arrays of this dimensionality.
    #[error("{detector} does not support {ndim}-dimensional input")]
    UnsupportedDimensionality {
        /// Name of the detector
        detector: &'static str,
        /// Dimensionality of the rejected input
        ndim: usize,
    },

    /// Error from the underlying array.
    #[error(transparent)]
    Tensor(#[from] TensorError),
}

impl FeatureError {
    /// Creates an InvalidParameter error.
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
