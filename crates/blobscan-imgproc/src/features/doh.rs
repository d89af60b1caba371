use blobscan_tensor::{NdArray, NdView};

use super::scale_space::{blobs_from_layers, check_overlap, check_sigma_range, sigma_series, CubeSearch};
use super::{Blob, BlobDetector};
use crate::filter::gaussian_derivative;
use crate::FeatureError;

/// Determinant of Hessian blob detector.
///
/// Only defined for 2D arrays. The response does not depend on the blob polarity, so dark
/// blobs on a bright background are found as well.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeterminantOfHessian {
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
}

impl Default for DeterminantOfHessian {
    fn default() -> Self {
        Self {
            min_sigma: 1.0,
            max_sigma: 30.0,
            num_sigma: 10,
            threshold: Some(0.01),
            overlap: 0.5,
            log_scale: false,
            threshold_rel: None,
        }
    }
}

impl DeterminantOfHessian {
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

impl BlobDetector for DeterminantOfHessian {
    fn name(&self) -> &'static str {
        "determinant_of_hessian"
    }

    fn detect(&self, src: &NdView<'_, f32>) -> Result<Vec<Blob>, FeatureError> {
        blob_doh(src, self)
    }
}

/// Scale-normalized determinant of the Hessian, `sigma^4 * (Dxx * Dyy - Dxy^2)`.
pub fn hessian_determinant(
    src: &NdView<'_, f32>,
    sigma: f32,
) -> Result<NdArray<f32>, FeatureError> {
    if src.ndim() != 2 {
        return Err(FeatureError::UnsupportedDimensionality {
            detector: "determinant_of_hessian",
            ndim: src.ndim(),
        });
    }

    let dxx = gaussian_derivative(src, sigma, &[2, 0])?;
    let dyy = gaussian_derivative(src, sigma, &[0, 2])?;
    let dxy = gaussian_derivative(src, sigma, &[1, 1])?;

    let norm = sigma.powi(4);
    let det = dxx
        .iter()
        .zip(dyy.iter())
        .zip(dxy.iter())
        .map(|((xx, yy), xy)| norm * (xx * yy - xy * xy))
        .collect();
    Ok(NdArray::from_shape_vec(&src.shape, det)?)
}

/// Find blobs with the Determinant of Hessian method.
///
/// # Errors
///
/// Returns [`FeatureError::UnsupportedDimensionality`] unless `src` is 2D.
pub fn blob_doh(
    src: &NdView<'_, f32>,
    params: &DeterminantOfHessian,
) -> Result<Vec<Blob>, FeatureError> {
    if src.ndim() != 2 {
        return Err(FeatureError::UnsupportedDimensionality {
            detector: "determinant_of_hessian",
            ndim: src.ndim(),
        });
    }
    params.validate()?;

    let sigmas = sigma_series(
        params.min_sigma,
        params.max_sigma,
        params.num_sigma,
        params.log_scale,
    );
    log::debug!("blob_doh: {} scales on {:?}", sigmas.len(), src.shape);

    let layers = sigmas
        .iter()
        .map(|&sigma| hessian_determinant(src, sigma))
        .collect::<Result<Vec<_>, _>>()?;

    let search = CubeSearch {
        threshold_abs: params.threshold,
        threshold_rel: params.threshold_rel,
        exclude_border: 0,
        overlap: params.overlap,
    };
    blobs_from_layers(&layers, &sigmas, &search)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_doh_zeros() -> Result<(), FeatureError> {
        let src = NdArray::<f32>::zeros(&[10, 10]);
        assert!(blob_doh(&src.view(), &DeterminantOfHessian::default())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_doh_square() -> Result<(), FeatureError> {
        let src = NdArray::from_shape_fn(&[10, 10], |idx| {
            if (4..7).contains(&idx[0]) && (4..7).contains(&idx[1]) {
                1.0f32
            } else {
                0.0
            }
        });
        let blobs = DeterminantOfHessian::default().detect(&src.view())?;
        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].coords, vec![5.0, 5.0]);
        assert_relative_eq!(blobs[0].sigma, 1.0);
        Ok(())
    }

    #[test]
    fn test_doh_rejects_3d() {
        let src = NdArray::<f32>::zeros(&[4, 4, 4]);
        assert_eq!(
            blob_doh(&src.view(), &DeterminantOfHessian::default()),
            Err(FeatureError::UnsupportedDimensionality {
                detector: "determinant_of_hessian",
                ndim: 3,
            })
        );
    }

    #[test]
    fn test_hessian_determinant_positive_on_blob() -> Result<(), FeatureError> {
        let mut src = NdArray::<f32>::zeros(&[11, 11]);
        *src.get_mut(&[5, 5]).unwrap() = 1.0;
        let det = hessian_determinant(&src.view(), 1.0)?;
        let center = *det.get(&[5, 5]).unwrap();
        assert!(center > 0.0);
        assert!(det.iter().all(|&v| v <= center));
        Ok(())
    }
}
