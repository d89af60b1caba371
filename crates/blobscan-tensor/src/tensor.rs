use thiserror::Error;

use crate::view::NdView;

/// Error type for array creation and indexing.
#[derive(Error, Debug, PartialEq)]
pub enum TensorError {
    /// The data length does not match the product of the shape.
    ///
    /// # Example
    /// ```ignore
    /// // Error: shape [2, 3] expects 6 elements, but got 5
    /// let array = NdArray::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5])?;
    /// ```
    #[error("Shape mismatch: expected {expected} elements for shape, but got {actual} elements in data")]
    InvalidShape {
        /// Expected number of elements based on shape
        expected: usize,
        /// Actual number of elements in the data
        actual: usize,
    },

    /// An index exceeds the extent of its axis.
    #[error("Index {index} out of bounds for axis {axis} of size {size}")]
    IndexOutOfBounds {
        /// The axis being indexed
        axis: usize,
        /// The invalid index that was attempted
        index: usize,
        /// The extent of the axis
        size: usize,
    },

    /// The array rank does not fit the requested operation.
    #[error("Dimension mismatch: {message}. Expected: {expected}, got: {actual}")]
    DimensionMismatch {
        /// Human-readable description of the mismatch
        message: String,
        /// Expected shape or rank description
        expected: String,
        /// Actual shape or rank description
        actual: String,
    },
}

impl TensorError {
    /// Creates an InvalidShape error.
    pub fn invalid_shape(expected: usize, actual: usize) -> Self {
        Self::InvalidShape { expected, actual }
    }

    /// Creates an IndexOutOfBounds error.
    pub fn index_out_of_bounds(axis: usize, index: usize, size: usize) -> Self {
        Self::IndexOutOfBounds { axis, index, size }
    }

    /// Creates a DimensionMismatch error with formatted shapes.
    pub fn dimension_mismatch(
        message: impl Into<String>,
        expected: &[usize],
        actual: &[usize],
    ) -> Self {
        Self::DimensionMismatch {
            message: message.into(),
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }
}

/// Computes the strides for a row-major (C-contiguous) layout.
///
/// The last axis has stride 1 and each other axis has the product of the extents to its right.
///
/// # Examples
///
/// ```rust
/// use blobscan_tensor::get_strides_from_shape;
///
/// assert_eq!(get_strides_from_shape(&[2, 3, 4]), vec![12, 4, 1]);
/// assert!(get_strides_from_shape(&[]).is_empty());
/// ```
pub fn get_strides_from_shape(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut stride = 1;
    for i in (0..shape.len()).rev() {
        strides[i] = stride;
        stride *= shape[i];
    }
    strides
}

/// Computes the flat offset of `index` given `shape` and `strides`.
///
/// Returns `None` if the rank differs or any component is out of bounds.
pub(crate) fn flat_offset(shape: &[usize], strides: &[usize], index: &[usize]) -> Option<usize> {
    if index.len() != shape.len() {
        return None;
    }
    let mut offset = 0;
    for ((&i, &n), &s) in index.iter().zip(shape).zip(strides) {
        if i >= n {
            return None;
        }
        offset += i * s;
    }
    Some(offset)
}

/// An owned N-dimensional array with a runtime rank.
///
/// Samples are stored contiguously in row-major order, so every block obtained by fixing a
/// prefix of the indices is itself contiguous. The blob scanner relies on this to hand the
/// trailing axes of a stack to a detector without copying.
///
/// # Examples
///
/// ```rust
/// use blobscan_tensor::NdArray;
///
/// let array = NdArray::from_shape_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
/// assert_eq!(array.ndim(), 2);
/// assert_eq!(array.get(&[1, 0]), Some(&4));
/// assert_eq!(array.get(&[2, 0]), None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct NdArray<T> {
    data: Vec<T>,
    /// The extent of each axis.
    pub shape: Vec<usize>,
    /// The strides of the data in memory.
    pub strides: Vec<usize>,
}

impl<T> NdArray<T> {
    /// Creates a new array with the given shape and row-major data.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::InvalidShape`] if the data length does not match the shape.
    pub fn from_shape_vec(shape: &[usize], data: Vec<T>) -> Result<Self, TensorError> {
        let numel = shape.iter().product::<usize>();
        if numel != data.len() {
            return Err(TensorError::invalid_shape(numel, data.len()));
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
            strides: get_strides_from_shape(shape),
        })
    }

    // callers guarantee `data.len()` matches `shape`
    pub(crate) fn from_parts(data: Vec<T>, shape: Vec<usize>) -> Self {
        let strides = get_strides_from_shape(&shape);
        Self {
            data,
            shape,
            strides,
        }
    }

    /// Creates a new array filled with a single value.
    pub fn from_shape_val(shape: &[usize], value: T) -> Self
    where
        T: Clone,
    {
        let numel = shape.iter().product::<usize>();
        Self {
            data: vec![value; numel],
            shape: shape.to_vec(),
            strides: get_strides_from_shape(shape),
        }
    }

    /// Creates a new array by evaluating `f` at every multi-index in row-major order.
    pub fn from_shape_fn<F>(shape: &[usize], mut f: F) -> Self
    where
        F: FnMut(&[usize]) -> T,
    {
        let data = crate::NdIndexIter::new(shape)
            .map(|index| f(&index))
            .collect::<Vec<_>>();
        Self {
            data,
            shape: shape.to_vec(),
            strides: get_strides_from_shape(shape),
        }
    }

    /// Creates a zero-filled array.
    pub fn zeros(shape: &[usize]) -> Self
    where
        T: num_traits::Zero + Clone,
    {
        Self::from_shape_val(shape, T::zero())
    }

    /// Number of axes.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Total number of samples.
    #[inline]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the array holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The samples in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The samples in row-major order, mutably.
    #[inline]
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Returns an iterator over the samples in row-major order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Returns the flat offset of a multi-index, or `None` if it is out of bounds.
    #[inline]
    pub fn offset(&self, index: &[usize]) -> Option<usize> {
        flat_offset(&self.shape, &self.strides, index)
    }

    /// Returns a reference to the sample at `index`.
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        self.offset(index).and_then(|i| self.data.get(i))
    }

    /// Returns a mutable reference to the sample at `index`.
    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        self.offset(index).and_then(move |i| self.data.get_mut(i))
    }

    /// Applies `f` to every sample and returns a new array of the same shape.
    pub fn map<U, F>(&self, f: F) -> NdArray<U>
    where
        F: Fn(&T) -> U,
    {
        NdArray {
            data: self.data.iter().map(f).collect(),
            shape: self.shape.clone(),
            strides: self.strides.clone(),
        }
    }

    /// Iterates over the lanes of the last axis.
    ///
    /// For a `(count, N)` coordinate table this yields one `N`-long row per entry.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, T> {
        let width = self.shape.last().copied().unwrap_or(1).max(1);
        self.data.chunks_exact(width)
    }

    /// Borrows the whole array as a view.
    pub fn view(&self) -> NdView<'_, T> {
        NdView::new(&self.data, self.shape.clone())
    }

    /// Borrows the sub-array obtained by fixing the leading indices.
    ///
    /// With `k = leading.len()`, the view spans the full extent of the last `ndim - k` axes at
    /// position `leading`. An empty `leading` returns the whole array.
    ///
    /// # Errors
    ///
    /// Returns [`TensorError::DimensionMismatch`] if more indices than axes are given, and
    /// [`TensorError::IndexOutOfBounds`] if a leading index exceeds its axis.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use blobscan_tensor::NdArray;
    ///
    /// let array = NdArray::from_shape_vec(&[2, 2, 2], (0..8).collect()).unwrap();
    /// let plane = array.subview(&[1]).unwrap();
    /// assert_eq!(plane.as_slice(), &[4, 5, 6, 7]);
    /// ```
    pub fn subview(&self, leading: &[usize]) -> Result<NdView<'_, T>, TensorError> {
        if leading.len() > self.ndim() {
            return Err(TensorError::dimension_mismatch(
                "too many leading indices",
                &[self.ndim()],
                &[leading.len()],
            ));
        }
        let mut start = 0;
        for (axis, (&i, &n)) in leading.iter().zip(&self.shape).enumerate() {
            if i >= n {
                return Err(TensorError::index_out_of_bounds(axis, i, n));
            }
            start += i * self.strides[axis];
        }
        let trailing = &self.shape[leading.len()..];
        let len = trailing.iter().product::<usize>();
        Ok(NdView::new(&self.data[start..start + len], trailing.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_checks_length() {
        let res = NdArray::from_shape_vec(&[2, 3], vec![1u8; 5]);
        assert_eq!(res, Err(TensorError::invalid_shape(6, 5)));
    }

    #[test]
    fn zero_rank_array_has_one_sample() -> Result<(), TensorError> {
        let scalar = NdArray::from_shape_vec(&[], vec![7i32])?;
        assert_eq!(scalar.ndim(), 0);
        assert_eq!(scalar.get(&[]), Some(&7));
        Ok(())
    }

    #[test]
    fn from_shape_fn_is_row_major() {
        let array = NdArray::from_shape_fn(&[2, 3], |idx| idx[0] * 10 + idx[1]);
        assert_eq!(array.as_slice(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(array.strides, vec![3, 1]);
    }

    #[test]
    fn get_mut_writes_in_place() {
        let mut array = NdArray::<f32>::zeros(&[3, 3]);
        *array.get_mut(&[1, 2]).unwrap() = 4.0;
        assert_eq!(array.as_slice()[5], 4.0);
        assert!(array.get_mut(&[3, 0]).is_none());
    }

    #[test]
    fn subview_of_stack() -> Result<(), TensorError> {
        let array = NdArray::from_shape_fn(&[2, 3, 4, 5], |idx| {
            idx.iter().fold(0usize, |acc, &i| acc * 10 + i)
        });
        let block = array.subview(&[1, 2])?;
        assert_eq!(block.shape, vec![4, 5]);
        assert_eq!(block.get(&[3, 4]), Some(&1234));

        let whole = array.subview(&[])?;
        assert_eq!(whole.shape, array.shape);
        Ok(())
    }

    #[test]
    fn subview_errors() {
        let array = NdArray::<u8>::zeros(&[2, 3]);
        assert_eq!(
            array.subview(&[2]).unwrap_err(),
            TensorError::index_out_of_bounds(0, 2, 2)
        );
        assert!(matches!(
            array.subview(&[0, 0, 0]),
            Err(TensorError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn rows_of_empty_table() {
        let table = NdArray::<f64>::zeros(&[0, 3]);
        assert_eq!(table.rows().count(), 0);

        let table = NdArray::from_shape_vec(&[2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let rows = table.rows().collect::<Vec<_>>();
        assert_eq!(rows, vec![&[1.0, 2.0][..], &[3.0, 4.0][..]]);
    }
}
