use blobscan_tensor::{NdArray, TensorError};

use crate::FeatureError;

/// Set every sample of `mask` that lies inside an N-dimensional ball.
///
/// A sample `p` is inside when `sum(((p - center) / radius)^2) <= 1`. A zero radius marks the
/// sample at `center` only, if `center` falls exactly on the grid. Parts of the ball outside the
/// mask are clipped.
///
/// # Arguments
///
/// * `mask` - The mask to draw into.
/// * `center` - The ball center, one coordinate per axis of `mask`.
/// * `radius` - The ball radius, non-negative.
pub fn draw_ball(mask: &mut NdArray<bool>, center: &[f64], radius: f64) -> Result<(), FeatureError> {
    let ndim = mask.ndim();
    if center.len() != ndim {
        return Err(TensorError::dimension_mismatch(
            "ball center must have one coordinate per axis",
            &[ndim],
            &[center.len()],
        )
        .into());
    }
    if !radius.is_finite() || radius < 0.0 {
        return Err(FeatureError::invalid_parameter(
            "radius",
            format!("must be finite and non-negative, got {radius}"),
        ));
    }
    if center.iter().any(|c| !c.is_finite()) {
        return Err(FeatureError::invalid_parameter(
            "center",
            format!("coordinates must be finite, got {center:?}"),
        ));
    }

    // clipped bounding box, empty when the ball misses the mask
    let mut lo = Vec::with_capacity(ndim);
    let mut hi = Vec::with_capacity(ndim);
    for (&c, &n) in center.iter().zip(&mask.shape) {
        let start = (c - radius).ceil().max(0.0);
        let stop = (c + radius).floor().min(n as f64 - 1.0);
        if stop < start {
            return Ok(());
        }
        lo.push(start as usize);
        hi.push(stop as usize);
    }

    let extent = lo.iter().zip(&hi).map(|(l, h)| h - l + 1).collect::<Vec<_>>();
    let mut index = vec![0usize; ndim];
    for offset in blobscan_tensor::NdIndexIter::new(&extent) {
        let mut dist = 0.0;
        for axis in 0..ndim {
            index[axis] = lo[axis] + offset[axis];
            let d = index[axis] as f64 - center[axis];
            dist += if radius > 0.0 {
                (d / radius).powi(2)
            } else if d == 0.0 {
                0.0
            } else {
                f64::INFINITY
            };
        }
        if dist <= 1.0 {
            if let Some(v) = mask.get_mut(&index) {
                *v = true;
            }
        }
    }

    Ok(())
}
