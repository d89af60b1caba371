use blobscan_tensor::{NdView, TensorError};

use crate::neighbors::{neighborhood_offsets, unravel};
use crate::FeatureError;

/// Options for [`peak_local_max`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PeakOptions {
    /// Minimum intensity of peaks. Defaults to the minimum of the input.
    pub threshold_abs: Option<f32>,
    /// Minimum intensity of peaks relative to the maximum of the input.
    pub threshold_rel: Option<f32>,
    /// Per-axis width of the border in which peaks are discarded. Empty means no exclusion.
    pub exclude_border: Vec<usize>,
}

/// Find the local maxima of an N-dimensional array.
///
/// A sample is a peak when it is greater than or equal to every sample of its `3^ndim`
/// neighbourhood (neighbours outside the array are clamped to the nearest edge) and strictly
/// greater than the effective threshold `max(threshold_abs, threshold_rel * max)`. An array in
/// which every sample equals its neighbourhood maximum, such as a constant one, has no peaks.
///
/// No minimum spacing is enforced between peaks: every sample of a flat maximum is reported.
/// The scale-space detectors merge such neighbours afterwards with
/// [`prune_blobs`](super::prune_blobs).
///
/// # Arguments
///
/// * `src` - The input array.
/// * `options` - Thresholds and border exclusion.
///
/// # Returns
///
/// The multi-indices of the peaks, sorted by decreasing intensity. Equal intensities keep
/// row-major order.
pub fn peak_local_max(
    src: &NdView<'_, f32>,
    options: &PeakOptions,
) -> Result<Vec<Vec<usize>>, FeatureError> {
    let ndim = src.ndim();
    if !options.exclude_border.is_empty() && options.exclude_border.len() != ndim {
        return Err(TensorError::dimension_mismatch(
            "one border width per axis is required",
            &[ndim],
            &[options.exclude_border.len()],
        )
        .into());
    }

    let data = src.as_slice();
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let (min, max) = data
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let mut threshold = options.threshold_abs.unwrap_or(min);
    if let Some(rel) = options.threshold_rel {
        threshold = threshold.max(rel * max);
    }

    let offsets = neighborhood_offsets(ndim, ndim);
    let shape = &src.shape;
    let strides = &src.strides;

    let mut trivial = true;
    let mut candidates = Vec::new();
    for (flat, &value) in data.iter().enumerate() {
        let index = unravel(flat, shape);
        let is_max = offsets.iter().all(|offset| {
            let mut neighbor = 0;
            for axis in 0..ndim {
                let pos = (index[axis] as isize + offset[axis])
                    .clamp(0, shape[axis] as isize - 1) as usize;
                neighbor += pos * strides[axis];
            }
            data[neighbor] <= value
        });
        if !is_max {
            trivial = false;
            continue;
        }
        if value <= threshold {
            continue;
        }
        let inside = options
            .exclude_border
            .iter()
            .zip(&index)
            .zip(shape)
            .all(|((&border, &i), &n)| i >= border && i + border < n);
        if inside {
            candidates.push((value, index));
        }
    }

    if trivial {
        return Ok(Vec::new());
    }

    // stable sort keeps row-major order among equal intensities
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
    log::trace!("peak_local_max: {} peaks above {threshold}", candidates.len());

    Ok(candidates.into_iter().map(|(_, index)| index).collect())
}
