/// Offsets of the `3^ndim - 1` neighbours of a sample whose step changes at most
/// `max_changed_axes` axes.
///
/// `max_changed_axes == ndim` gives the full (8-/26-connected) neighbourhood, `1` gives the
/// face neighbours only.
pub(crate) fn neighborhood_offsets(ndim: usize, max_changed_axes: usize) -> Vec<Vec<isize>> {
    let mut offsets = Vec::new();
    let total = 3usize.pow(ndim as u32);
    for code in 0..total {
        let mut rem = code;
        let mut offset = vec![0isize; ndim];
        for axis in (0..ndim).rev() {
            offset[axis] = (rem % 3) as isize - 1;
            rem /= 3;
        }
        let changed = offset.iter().filter(|&&o| o != 0).count();
        if changed > 0 && changed <= max_changed_axes {
            offsets.push(offset);
        }
    }
    offsets
}

/// Converts a flat row-major offset into a multi-index.
pub(crate) fn unravel(mut flat: usize, shape: &[usize]) -> Vec<usize> {
    let mut index = vec![0; shape.len()];
    for axis in (0..shape.len()).rev() {
        let n = shape[axis].max(1);
        index[axis] = flat % n;
        flat /= n;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_count() {
        assert_eq!(neighborhood_offsets(2, 2).len(), 8);
        assert_eq!(neighborhood_offsets(2, 1).len(), 4);
        assert_eq!(neighborhood_offsets(3, 3).len(), 26);
        assert_eq!(neighborhood_offsets(3, 1).len(), 6);
        assert!(neighborhood_offsets(0, 0).is_empty());
    }

    #[test]
    fn unravel_row_major() {
        assert_eq!(unravel(7, &[2, 2, 3]), vec![1, 0, 1]);
        assert_eq!(unravel(0, &[]), Vec::<usize>::new());
    }
}
