use blobscan_tensor::NdView;

use crate::FeatureError;

/// A detected blob: its position inside the analysed array and its characteristic scale.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Blob {
    /// Position of the blob, one coordinate per axis of the analysed array.
    pub coords: Vec<f64>,
    /// Standard deviation of the gaussian kernel that detected the blob.
    pub sigma: f64,
}

impl Blob {
    /// Create a new blob.
    pub fn new(coords: Vec<f64>, sigma: f64) -> Self {
        Self { coords, sigma }
    }

    /// Dimensionality of the blob position.
    pub fn ndim(&self) -> usize {
        self.coords.len()
    }

    /// Radius of the blob, `sigma * sqrt(ndim)`.
    pub fn radius(&self) -> f64 {
        self.sigma * (self.ndim() as f64).sqrt()
    }
}

/// A blob detection algorithm together with its parameters.
///
/// Implementations receive one array of float intensities and report the blobs found in it,
/// in a deterministic order. They must not keep state between calls.
pub trait BlobDetector {
    /// Short identifier of the algorithm, e.g. `difference_of_gaussian`.
    fn name(&self) -> &'static str;

    /// Detect blobs in `src`.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError`] if the parameters are invalid or the detector does not support
    /// the dimensionality of `src`.
    fn detect(&self, src: &NdView<'_, f32>) -> Result<Vec<Blob>, FeatureError>;
}

impl<B: BlobDetector + ?Sized> BlobDetector for &B {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn detect(&self, src: &NdView<'_, f32>) -> Result<Vec<Blob>, FeatureError> {
        (**self).detect(src)
    }
}

impl<B: BlobDetector + ?Sized> BlobDetector for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn detect(&self, src: &NdView<'_, f32>) -> Result<Vec<Blob>, FeatureError> {
        (**self).detect(src)
    }
}

/// Adapts a closure into a [`BlobDetector`].
///
/// # Example
///
/// ```
/// use blobscan_imgproc::features::{Blob, BlobDetector, FnDetector};
/// use blobscan_tensor::NdArray;
///
/// let brightest = FnDetector::new("brightest", |src| {
///     let (i, _) = src
///         .as_slice()
///         .iter()
///         .enumerate()
///         .fold((0, f32::MIN), |acc, (i, &v)| if v > acc.1 { (i, v) } else { acc });
///     Ok(vec![Blob::new(vec![i as f64], 1.0)])
/// });
///
/// let src = NdArray::from_shape_vec(&[4], vec![0.0, 3.0, 1.0, 0.0]).unwrap();
/// assert_eq!(brightest.detect(&src.view()).unwrap()[0].coords, vec![1.0]);
/// ```
pub struct FnDetector<F> {
    name: &'static str,
    f: F,
}

impl<F> FnDetector<F>
where
    F: Fn(&NdView<'_, f32>) -> Result<Vec<Blob>, FeatureError>,
{
    /// Wrap `f` under the given name.
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> BlobDetector for FnDetector<F>
where
    F: Fn(&NdView<'_, f32>) -> Result<Vec<Blob>, FeatureError>,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn detect(&self, src: &NdView<'_, f32>) -> Result<Vec<Blob>, FeatureError> {
        (self.f)(src)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_blob_radius() {
        assert_relative_eq!(Blob::new(vec![1.0, 2.0], 2.0).radius(), 2.0 * 2f64.sqrt());
        assert_relative_eq!(Blob::new(vec![0.0; 3], 1.5).radius(), 1.5 * 3f64.sqrt());
        assert_eq!(Blob::new(vec![4.0], 3.0).radius(), 3.0);
    }
}
