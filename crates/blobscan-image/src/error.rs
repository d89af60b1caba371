use blobscan_tensor::TensorError;

/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when a metadata field does not match the volume dimensionality.
    #[error("Metadata field `{field}` has length {actual}, expected {expected} for a {ndim}-d volume")]
    InvalidMetadata {
        /// Name of the offending field
        field: &'static str,
        /// Dimensionality of the volume
        ndim: usize,
        /// Expected length of the field
        expected: usize,
        /// Actual length of the field
        actual: usize,
    },

    /// Error from the underlying array.
    #[error(transparent)]
    Tensor(#[from] TensorError),
}
