use blobscan_tensor::NdArray;

use super::peaks::{peak_local_max, PeakOptions};
use super::prune::prune_blobs;
use super::Blob;
use crate::FeatureError;

/// Evenly spaced sigmas between `min_sigma` and `max_sigma`, inclusive.
///
/// With `log_scale` the spacing is even in log10 space instead.
pub fn sigma_series(min_sigma: f32, max_sigma: f32, num_sigma: usize, log_scale: bool) -> Vec<f32> {
    let (start, stop) = if log_scale {
        (min_sigma.log10(), max_sigma.log10())
    } else {
        (min_sigma, max_sigma)
    };
    let step = if num_sigma > 1 {
        (stop - start) / (num_sigma - 1) as f32
    } else {
        0.0
    };
    (0..num_sigma)
        .map(|i| {
            let v = start + step * i as f32;
            if log_scale {
                10f32.powf(v)
            } else {
                v
            }
        })
        .collect()
}

pub(crate) fn check_sigma_range(min_sigma: f32, max_sigma: f32) -> Result<(), FeatureError> {
    if min_sigma.is_nan() || min_sigma <= 0.0 {
        return Err(FeatureError::invalid_parameter(
            "min_sigma",
            format!("must be positive, got {min_sigma}"),
        ));
    }
    if max_sigma.is_nan() || max_sigma < min_sigma {
        return Err(FeatureError::invalid_parameter(
            "max_sigma",
            format!("must be at least min_sigma ({min_sigma}), got {max_sigma}"),
        ));
    }
    Ok(())
}

pub(crate) fn check_overlap(overlap: f32) -> Result<(), FeatureError> {
    if !(0.0..=1.0).contains(&overlap) {
        return Err(FeatureError::invalid_parameter(
            "overlap",
            format!("must lie in [0, 1], got {overlap}"),
        ));
    }
    Ok(())
}

/// Thresholds shared by the scale-space detectors.
pub(crate) struct CubeSearch {
    pub threshold_abs: Option<f32>,
    pub threshold_rel: Option<f32>,
    pub exclude_border: usize,
    pub overlap: f32,
}

/// Stack per-scale responses along a new last axis and turn its maxima into blobs.
///
/// `layers[i]` is the response at `sigmas[i]`; every layer has the shape of the analysed
/// array. The scale axis is never border-excluded.
pub(crate) fn blobs_from_layers(
    layers: &[NdArray<f32>],
    sigmas: &[f32],
    search: &CubeSearch,
) -> Result<Vec<Blob>, FeatureError> {
    let Some(first) = layers.first() else {
        return Ok(Vec::new());
    };
    let ndim = first.ndim();
    let num_scales = layers.len();

    let mut shape = first.shape.clone();
    shape.push(num_scales);
    let mut data = vec![0.0f32; first.numel() * num_scales];
    for (s, layer) in layers.iter().enumerate() {
        for (p, &v) in layer.iter().enumerate() {
            data[p * num_scales + s] = v;
        }
    }
    let cube = NdArray::from_shape_vec(&shape, data)?;

    let mut exclude_border = Vec::new();
    if search.exclude_border > 0 {
        exclude_border = vec![search.exclude_border; ndim];
        exclude_border.push(0);
    }
    let options = PeakOptions {
        threshold_abs: search.threshold_abs,
        threshold_rel: search.threshold_rel,
        exclude_border,
    };
    let peaks = peak_local_max(&cube.view(), &options)?;
    if peaks.is_empty() {
        return Ok(Vec::new());
    }

    let blobs = peaks
        .into_iter()
        .map(|index| {
            let coords = index[..ndim].iter().map(|&c| c as f64).collect();
            Blob::new(coords, sigmas[index[ndim]] as f64)
        })
        .collect::<Vec<_>>();
    let found = blobs.len();
    let blobs = prune_blobs(blobs, search.overlap as f64);
    log::trace!("scale space: {found} maxima, {} after pruning", blobs.len());

    Ok(blobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sigma_series_linear() {
        let sigmas = sigma_series(1.0, 50.0, 10, false);
        assert_eq!(sigmas.len(), 10);
        assert_relative_eq!(sigmas[0], 1.0);
        assert_relative_eq!(sigmas[1], 1.0 + 49.0 / 9.0);
        assert_relative_eq!(sigmas[9], 50.0, epsilon = 1e-4);
        assert_eq!(sigma_series(2.0, 8.0, 1, false), vec![2.0]);
    }

    #[test]
    fn test_sigma_series_log() {
        let sigmas = sigma_series(1.0, 100.0, 3, true);
        assert_relative_eq!(sigmas[0], 1.0);
        assert_relative_eq!(sigmas[1], 10.0, epsilon = 1e-4);
        assert_relative_eq!(sigmas[2], 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_blobs_from_layers_picks_scale() -> Result<(), FeatureError> {
        let mut small = NdArray::<f32>::zeros(&[7, 7]);
        let mut large = NdArray::<f32>::zeros(&[7, 7]);
        *small.get_mut(&[3, 3]).unwrap() = 0.4;
        *large.get_mut(&[3, 3]).unwrap() = 0.9;
        let search = CubeSearch {
            threshold_abs: Some(0.1),
            threshold_rel: None,
            exclude_border: 0,
            overlap: 0.5,
        };
        let blobs = blobs_from_layers(&[small, large], &[1.0, 2.0], &search)?;
        assert_eq!(blobs, vec![Blob::new(vec![3.0, 3.0], 2.0)]);
        Ok(())
    }

    #[test]
    fn test_blobs_from_layers_merges_plateau() -> Result<(), FeatureError> {
        let mut layer = NdArray::<f32>::zeros(&[7, 7]);
        *layer.get_mut(&[3, 3]).unwrap() = 0.9;
        *layer.get_mut(&[3, 4]).unwrap() = 0.9;
        let search = CubeSearch {
            threshold_abs: Some(0.1),
            threshold_rel: None,
            exclude_border: 0,
            overlap: 0.5,
        };
        let blobs = blobs_from_layers(&[layer], &[2.0], &search)?;
        assert_eq!(blobs, vec![Blob::new(vec![3.0, 4.0], 2.0)]);
        Ok(())
    }

    #[test]
    fn test_parameter_checks() {
        assert!(check_sigma_range(0.0, 1.0).is_err());
        assert!(check_sigma_range(2.0, 1.0).is_err());
        assert!(check_sigma_range(1.0, 1.0).is_ok());
        assert!(check_overlap(1.5).is_err());
        assert!(check_overlap(0.0).is_ok());
    }
}
