use blobscan_tensor::{NdArray, NdView};

use super::scale_space::{blobs_from_layers, check_overlap, check_sigma_range, CubeSearch};
use super::{Blob, BlobDetector};
use crate::filter::gaussian_filter;
use crate::FeatureError;

/// Difference of Gaussian blob detector.
///
/// Blurs the input with gaussians of geometrically increasing sigma and subtracts successive
/// blurred arrays to approximate the scale-normalized Laplacian. Fast, but less accurate than
/// [`LaplacianOfGaussian`] for large blobs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DifferenceOfGaussian {
    /// Smallest standard deviation of the gaussian kernel.
    pub min_sigma: f32,
    /// Largest standard deviation of the gaussian kernel.
    pub max_sigma: f32,
    /// Ratio between the sigmas of successive scales.
    pub sigma_ratio: f32,
    /// Absolute lower bound for scale-space maxima.
    pub threshold: Option<f32>,
    /// Fraction of the smaller blob above which overlapping blobs are merged.
    pub overlap: f32,
    /// Lower bound for scale-space maxima, relative to the largest response.
    pub threshold_rel: Option<f32>,
    /// Width of the border in which no blob is reported.
    pub exclude_border: usize,
}

impl Default for DifferenceOfGaussian {
    fn default() -> Self {
        Self {
            min_sigma: 1.0,
            max_sigma: 50.0,
            sigma_ratio: 1.6,
            threshold: Some(0.5),
            overlap: 0.5,
            threshold_rel: None,
            exclude_border: 0,
        }
    }
}

impl DifferenceOfGaussian {
    /// Check that the parameters describe a valid scale space.
    pub fn validate(&self) -> Result<(), FeatureError> {
        check_sigma_range(self.min_sigma, self.max_sigma)?;
        if self.sigma_ratio.is_nan() || self.sigma_ratio <= 1.0 {
            return Err(FeatureError::invalid_parameter(
                "sigma_ratio",
                format!("must be greater than 1, got {}", self.sigma_ratio),
            ));
        }
        check_overlap(self.overlap)
    }

    /// Sigmas of the blurred arrays, `min_sigma * sigma_ratio^i` for `i` in `0..=k`.
    ///
    /// `k` is the number of ratio steps needed to reach `max_sigma`, plus one.
    pub fn sigmas(&self) -> Vec<f32> {
        let steps = ((self.max_sigma / self.min_sigma).ln() / self.sigma_ratio.ln() + 1.0).floor();
        let k = steps.max(0.0) as usize;
        (0..=k)
            .map(|i| self.min_sigma * self.sigma_ratio.powi(i as i32))
            .collect()
    }
}

impl BlobDetector for DifferenceOfGaussian {
    fn name(&self) -> &'static str {
        "difference_of_gaussian"
    }

    fn detect(&self, src: &NdView<'_, f32>) -> Result<Vec<Blob>, FeatureError> {
        blob_dog(src, self)
    }
}

/// Find blobs with the Difference of Gaussian method.
///
/// # Arguments
///
/// * `src` - The input array, of any dimensionality.
/// * `params` - The detector parameters.
///
/// # Returns
///
/// The blobs, ordered by decreasing response after pruning.
///
/// # Example
///
/// ```
/// use blobscan_imgproc::features::{blob_dog, DifferenceOfGaussian};
/// use blobscan_tensor::NdArray;
///
/// let src = NdArray::from_shape_fn(&[10, 10], |idx| {
///     if (4..7).contains(&idx[0]) && (4..7).contains(&idx[1]) { 1.0f32 } else { 0.0 }
/// });
/// let blobs = blob_dog(&src.view(), &DifferenceOfGaussian::default()).unwrap();
/// assert_eq!(blobs.len(), 1);
/// assert_eq!(blobs[0].coords, vec![5.0, 5.0]);
/// ```
pub fn blob_dog(
    src: &NdView<'_, f32>,
    params: &DifferenceOfGaussian,
) -> Result<Vec<Blob>, FeatureError> {
    params.validate()?;

    let sigmas = params.sigmas();
    let num_scales = sigmas.len() - 1;
    if num_scales == 0 {
        return Ok(Vec::new());
    }
    log::debug!(
        "blob_dog: {num_scales} scales on {:?}, sigma {}..{}",
        src.shape,
        sigmas[0],
        sigmas[num_scales]
    );

    let norm = 1.0 / (params.sigma_ratio - 1.0);
    let mut previous = gaussian_filter(src, sigmas[0])?;
    let mut layers: Vec<NdArray<f32>> = Vec::with_capacity(num_scales);
    for &sigma in &sigmas[1..] {
        let current = gaussian_filter(src, sigma)?;
        let diff = NdArray::from_shape_vec(
            &src.shape,
            previous
                .iter()
                .zip(current.iter())
                .map(|(p, c)| (p - c) * norm)
                .collect(),
        )?;
        layers.push(diff);
        previous = current;
    }

    let search = CubeSearch {
        threshold_abs: params.threshold,
        threshold_rel: params.threshold_rel,
        exclude_border: params.exclude_border,
        overlap: params.overlap,
    };
    blobs_from_layers(&layers, &sigmas[..num_scales], &search)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(shape: &[usize], start: usize, end: usize) -> NdArray<f32> {
        NdArray::from_shape_fn(shape, |idx| {
            if idx.iter().all(|&i| (start..end).contains(&i)) {
                1.0
            } else {
                0.0
            }
        })
    }

    #[test]
    fn test_sigmas() {
        let params = DifferenceOfGaussian::default();
        let sigmas = params.sigmas();
        // floor(ln(50) / ln(1.6) + 1) = 9
        assert_eq!(sigmas.len(), 10);
        assert_relative_eq!(sigmas[0], 1.0);
        assert_relative_eq!(sigmas[2], 2.56, epsilon = 1e-5);

        let flat = DifferenceOfGaussian {
            min_sigma: 2.0,
            max_sigma: 2.0,
            ..Default::default()
        };
        assert_eq!(flat.sigmas().len(), 2);
    }

    #[test]
    fn test_dog_zeros() -> Result<(), FeatureError> {
        let src = NdArray::<f32>::zeros(&[10, 10]);
        let blobs = blob_dog(&src.view(), &DifferenceOfGaussian::default())?;
        assert!(blobs.is_empty());
        Ok(())
    }

    #[test]
    fn test_dog_square() -> Result<(), FeatureError> {
        let src = square(&[10, 10], 4, 7);
        let blobs = DifferenceOfGaussian::default().detect(&src.view())?;
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].coords, vec![5.0, 5.0]);
        assert_relative_eq!(blobs[0].sigma, 1.0);
        Ok(())
    }

    #[test]
    fn test_dog_exclude_border() -> Result<(), FeatureError> {
        let src = square(&[10, 10], 4, 7);
        let params = DifferenceOfGaussian {
            exclude_border: 6,
            ..Default::default()
        };
        assert!(blob_dog(&src.view(), &params)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_dog_invalid_params() {
        let src = NdArray::<f32>::zeros(&[4, 4]);
        let params = DifferenceOfGaussian {
            sigma_ratio: 1.0,
            ..Default::default()
        };
        assert!(matches!(
            blob_dog(&src.view(), &params),
            Err(FeatureError::InvalidParameter { name: "sigma_ratio", .. })
        ));
        let params = DifferenceOfGaussian {
            min_sigma: 0.0,
            ..Default::default()
        };
        assert!(blob_dog(&src.view(), &params).is_err());
    }
}
