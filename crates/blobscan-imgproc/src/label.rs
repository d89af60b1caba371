use std::collections::VecDeque;

use blobscan_tensor::{NdArray, TensorError};

use crate::neighbors::{neighborhood_offsets, unravel};
use crate::FeatureError;

/// Label the connected components of a boolean mask in row-major order.
///
/// # Arguments
///
/// * `mask` - The foreground mask.
/// * `connectivity` - Maximum number of axes a neighbour step may change, from 1 (face
///   neighbours) to `ndim` (full neighbourhood).
///
/// # Returns
///
/// The label array, 0 for background and `1..=count` for the components, and the component
/// count.
///
/// # Example
///
/// ```
/// use blobscan_imgproc::label::label;
/// use blobscan_tensor::NdArray;
///
/// let mask = NdArray::from_shape_vec(&[1, 5], vec![true, false, true, true, false]).unwrap();
/// let (labels, count) = label(&mask, 2).unwrap();
/// assert_eq!(count, 2);
/// assert_eq!(labels.as_slice(), &[1, 0, 2, 2, 0]);
/// ```
pub fn label(mask: &NdArray<bool>, connectivity: usize) -> Result<(NdArray<u32>, usize), FeatureError> {
    label_from_seeds(mask, connectivity, &[])
}

/// Label the connected components of a boolean mask, numbering seeded components first.
///
/// Components containing a seed are numbered in seed order; seeds on the background or in an
/// already numbered component are skipped. The remaining components follow in row-major order.
///
/// # Errors
///
/// Fails if `connectivity` is outside `1..=ndim` or a seed lies outside the mask.
pub fn label_from_seeds(
    mask: &NdArray<bool>,
    connectivity: usize,
    seeds: &[Vec<usize>],
) -> Result<(NdArray<u32>, usize), FeatureError> {
    let ndim = mask.ndim();
    if connectivity == 0 || connectivity > ndim.max(1) {
        return Err(FeatureError::invalid_parameter(
            "connectivity",
            format!("must lie in 1..={}, got {connectivity}", ndim.max(1)),
        ));
    }

    let offsets = neighborhood_offsets(ndim, connectivity);
    let mut labels = vec![0u32; mask.numel()];
    let mut count = 0u32;
    let mut queue = VecDeque::new();

    for seed in seeds {
        let start = mask.offset(seed).ok_or_else(|| {
            TensorError::dimension_mismatch("seed outside mask", &mask.shape, seed)
        })?;
        flood_fill(mask, &offsets, start, &mut labels, &mut count, &mut queue);
    }
    for start in 0..labels.len() {
        flood_fill(mask, &offsets, start, &mut labels, &mut count, &mut queue);
    }
    let count = count as usize;

    log::trace!("label: {count} components with connectivity {connectivity}");

    Ok((NdArray::from_shape_vec(&mask.shape, labels)?, count))
}

/// Assign a new label to the unlabeled foreground component containing `start`.
fn flood_fill(
    mask: &NdArray<bool>,
    offsets: &[Vec<isize>],
    start: usize,
    labels: &mut [u32],
    count: &mut u32,
    queue: &mut VecDeque<usize>,
) {
    let data = mask.as_slice();
    if !data[start] || labels[start] != 0 {
        return;
    }
    *count += 1;
    labels[start] = *count;
    queue.push_back(start);

    let shape = &mask.shape;
    while let Some(flat) = queue.pop_front() {
        let index = unravel(flat, shape);
        for offset in offsets {
            let mut neighbor = 0;
            let mut inside = true;
            for (axis, &o) in offset.iter().enumerate() {
                let pos = index[axis] as isize + o;
                if pos < 0 || pos >= shape[axis] as isize {
                    inside = false;
                    break;
                }
                neighbor += pos as usize * mask.strides[axis];
            }
            if inside && data[neighbor] && labels[neighbor] == 0 {
                labels[neighbor] = *count;
                queue.push_back(neighbor);
            }
        }
    }
}
