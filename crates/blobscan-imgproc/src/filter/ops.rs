use blobscan_tensor::{NdArray, NdView, TensorError};

use super::kernels::{gaussian_kernel_1d, kernel_radius};
use crate::FeatureError;

/// Maps a possibly out-of-range position onto `0..len` by half-sample symmetric reflection.
///
/// `-1` maps to `0`, `len` maps to `len - 1`; positions further out keep bouncing.
#[inline]
pub fn reflect_index(pos: isize, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    let period = 2 * len as isize;
    let m = pos.rem_euclid(period) as usize;
    if m >= len {
        2 * len - 1 - m
    } else {
        m
    }
}

/// Correlate an array with a 1D kernel along one axis.
///
/// Samples beyond the array are obtained by half-sample symmetric reflection.
///
/// # Arguments
///
/// * `src` - The input array.
/// * `axis` - The axis to filter along.
/// * `weights` - The kernel, of odd length; the center weight is aligned with the output sample.
///
/// # Returns
///
/// The filtered array, with the same shape as `src`.
pub fn correlate1d(
    src: &NdView<'_, f32>,
    axis: usize,
    weights: &[f32],
) -> Result<NdArray<f32>, FeatureError> {
    if axis >= src.ndim() {
        return Err(TensorError::dimension_mismatch(
            "filter axis out of range",
            &[src.ndim()],
            &[axis],
        )
        .into());
    }
    if weights.len() % 2 == 0 {
        return Err(FeatureError::invalid_parameter(
            "weights",
            format!("kernel length must be odd, got {}", weights.len()),
        ));
    }

    let data = src.as_slice();
    let len = src.shape[axis];
    let inner = src.strides[axis];
    let mut dst = vec![0.0f32; data.len()];
    if data.is_empty() {
        return Ok(NdArray::from_shape_vec(&src.shape, dst)?);
    }

    let outer = data.len() / (len * inner);
    let half = (weights.len() / 2) as isize;
    let mut line = vec![0.0f32; len];

    for o in 0..outer {
        for i in 0..inner {
            let base = o * len * inner + i;
            for (k, v) in line.iter_mut().enumerate() {
                *v = data[base + k * inner];
            }
            for k in 0..len {
                let mut acc = 0.0f32;
                for (w_idx, &w) in weights.iter().enumerate() {
                    let pos = k as isize + w_idx as isize - half;
                    acc += w * line[reflect_index(pos, len)];
                }
                dst[base + k * inner] = acc;
            }
        }
    }

    Ok(NdArray::from_shape_vec(&src.shape, dst)?)
}

/// Apply a 1D gaussian filter, or one of its derivatives, along one axis.
pub fn gaussian_filter1d(
    src: &NdView<'_, f32>,
    axis: usize,
    sigma: f32,
    order: usize,
) -> Result<NdArray<f32>, FeatureError> {
    let mut weights = gaussian_kernel_1d(sigma, order, kernel_radius(sigma))?;
    // correlating with the flipped kernel is a convolution
    weights.reverse();
    correlate1d(src, axis, &weights)
}

/// Apply a separable gaussian derivative filter.
///
/// # Arguments
///
/// * `src` - The input array.
/// * `sigma` - The standard deviation of the gaussian, shared by all axes.
/// * `orders` - The derivative order along each axis, 0 to 2.
///
/// # Returns
///
/// The filtered array.
pub fn gaussian_derivative(
    src: &NdView<'_, f32>,
    sigma: f32,
    orders: &[usize],
) -> Result<NdArray<f32>, FeatureError> {
    if orders.len() != src.ndim() {
        return Err(TensorError::dimension_mismatch(
            "one derivative order per axis is required",
            &[src.ndim()],
            &[orders.len()],
        )
        .into());
    }

    let mut dst = src.to_owned();
    for (axis, &order) in orders.iter().enumerate() {
        dst = gaussian_filter1d(&dst.view(), axis, sigma, order)?;
    }
    Ok(dst)
}

/// Apply an isotropic gaussian blur.
///
/// # Example
///
/// ```
/// use blobscan_imgproc::filter::gaussian_filter;
/// use blobscan_tensor::NdArray;
///
/// let src = NdArray::from_shape_val(&[5, 5], 2.0f32);
/// let dst = gaussian_filter(&src.view(), 1.0).unwrap();
/// assert!(dst.iter().all(|&v| (v - 2.0).abs() < 1e-5));
/// ```
pub fn gaussian_filter(src: &NdView<'_, f32>, sigma: f32) -> Result<NdArray<f32>, FeatureError> {
    gaussian_derivative(src, sigma, &vec![0; src.ndim()])
}

/// Compute the Laplacian of the gaussian-smoothed array.
///
/// The result is the sum over axes of the second gaussian derivative along that axis. It is
/// negative at the center of a bright blob.
pub fn gaussian_laplace(src: &NdView<'_, f32>, sigma: f32) -> Result<NdArray<f32>, FeatureError> {
    let ndim = src.ndim();
    let mut acc = NdArray::<f32>::zeros(&src.shape);
    for axis in 0..ndim {
        let mut orders = vec![0; ndim];
        orders[axis] = 2;
        let d2 = gaussian_derivative(src, sigma, &orders)?;
        acc.as_slice_mut()
            .iter_mut()
            .zip(d2.iter())
            .for_each(|(a, &d)| *a += d);
    }
    Ok(acc)
}
