use blobscan_tensor::NdView;

use super::scale_space::{blobs_from_layers, check_overlap, check_sigma_range, sigma_series, CubeSearch};
use super::{Blob, BlobDetector};
use crate::filter::gaussian_laplace;
use crate::FeatureError;

/// Laplacian of Gaussian blob detector.
///
/// The most accurate and the slowest of the detectors: the scale-normalized Laplacian is
/// computed at every sigma of the series.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LaplacianOfGaussian {
    /// Smallest standard deviation of the gaussian kernel.
    pub min_sigma: f32,
    /// Largest standard deviation of the gaussian kernel.
    pub max_sigma: f32,
    /// Number of sigmas between `min_sigma` and `max_sigma`.
    pub num_sigma: usize,
    /// Absolute lower bound for scale-space maxima.
    pub threshold: Option<f32>,
    /// Fraction of the smaller blob above which overlapping blobs are merged.
    pub overlap: f32,
    /// Space the sigmas evenly on a log10 scale.
    pub log_scale: bool,
    /// Lower bound for scale-space maxima, relative to the largest response.
    pub threshold_rel: Option<f32>,
    /// Width of the border in which no blob is reported.
    pub exclude_border: usize,
}

impl Default for LaplacianOfGaussian {
    fn default() -> Self {
        Self {
            min_sigma: 1.0,
            max_sigma: 50.0,
            num_sigma: 10,
            threshold: Some(0.2),
            overlap: 0.5,
            log_scale: false,
            threshold_rel: None,
            exclude_border: 0,
        }
    }
}

impl LaplacianOfGaussian {
    /// Check that the parameters describe a valid scale space.
    pub fn validate(&self) -> Result<(), FeatureError> {
        check_sigma_range(self.min_sigma, self.max_sigma)?;
        if self.num_sigma == 0 {
            return Err(FeatureError::invalid_parameter(
                "num_sigma",
                "at least one scale is required",
            ));
        }
        check_overlap(self.overlap)
    }
}

impl BlobDetector for LaplacianOfGaussian {
    fn name(&self) -> &'static str {
        "laplacian_of_gaussian"
    }

    fn detect(&self, src: &NdView<'_, f32>) -> Result<Vec<Blob>, FeatureError> {
        blob_log(src, self)
    }
}

/// Find blobs with the Laplacian of Gaussian method.
///
/// Each scale contributes `-sigma^2 * laplacian(gaussian(src, sigma))`, which is positive on
/// bright blobs over a dark background.
pub fn blob_log(
    src: &NdView<'_, f32>,
    params: &LaplacianOfGaussian,
) -> Result<Vec<Blob>, FeatureError> {
    params.validate()?;

    let sigmas = sigma_series(
        params.min_sigma,
        params.max_sigma,
        params.num_sigma,
        params.log_scale,
    );
    log::debug!("blob_log: {} scales on {:?}", sigmas.len(), src.shape);

    let layers = sigmas
        .iter()
        .map(|&sigma| {
            let mut layer = gaussian_laplace(src, sigma)?;
            let norm = -sigma * sigma;
            layer.as_slice_mut().iter_mut().for_each(|v| *v *= norm);
            Ok(layer)
        })
        .collect::<Result<Vec<_>, FeatureError>>()?;

    let search = CubeSearch {
        threshold_abs: params.threshold,
        threshold_rel: params.threshold_rel,
        exclude_border: params.exclude_border,
        overlap: params.overlap,
    };
    blobs_from_layers(&layers, &sigmas, &search)
}
