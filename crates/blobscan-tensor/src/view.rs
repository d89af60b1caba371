use crate::{get_strides_from_shape, tensor::flat_offset, NdArray};

/// A non-owning, contiguous view into array data.
///
/// Views are produced by [`NdArray::view`] and [`NdArray::subview`]. Because the parent array
/// is row-major, a view over trailing axes is a plain sub-slice of the parent's storage.
///
/// # Examples
///
/// ```rust
/// use blobscan_tensor::NdArray;
///
/// let array = NdArray::from_shape_vec(&[2, 2], vec![1, 2, 3, 4]).unwrap();
/// let view = array.view();
/// assert_eq!(view.get(&[1, 1]), Some(&4));
/// assert_eq!(view.to_owned(), array);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct NdView<'a, T> {
    data: &'a [T],
    /// The extent of each axis of the view.
    pub shape: Vec<usize>,
    /// The strides of the view in memory.
    pub strides: Vec<usize>,
}

impl<'a, T> NdView<'a, T> {
    pub(crate) fn new(data: &'a [T], shape: Vec<usize>) -> Self {
        let strides = get_strides_from_shape(&shape);
        Self {
            data,
            shape,
            strides,
        }
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

    /// The viewed samples in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns a reference to the sample at `index`.
    pub fn get(&self, index: &[usize]) -> Option<&'a T> {
        flat_offset(&self.shape, &self.strides, index).and_then(|i| self.data.get(i))
    }

    /// Applies `f` to every viewed sample and returns an owned array.
    pub fn map<U, F>(&self, f: F) -> NdArray<U>
    where
        F: Fn(&T) -> U,
    {
        NdArray::from_parts(self.data.iter().map(f).collect(), self.shape.clone())
    }

    /// Copies the viewed samples into an owned array.
    pub fn to_owned(&self) -> NdArray<T>
    where
        T: Clone,
    {
        self.map(T::clone)
    }
}

#[cfg(test)]
mod tests {
    use crate::{NdArray, TensorError};

    #[test]
    fn view_borrows_parent_storage() -> Result<(), TensorError> {
        let array = NdArray::from_shape_vec(&[3, 2], vec![0u8, 1, 2, 3, 4, 5])?;
        let row = array.subview(&[2])?;
        assert_eq!(row.ndim(), 1);
        assert_eq!(row.numel(), 2);
        assert!(std::ptr::eq(row.as_slice(), &array.as_slice()[4..6]));
        Ok(())
    }

    #[test]
    fn map_keeps_shape() -> Result<(), TensorError> {
        let array = NdArray::from_shape_vec(&[2, 2], vec![1u8, 2, 3, 4])?;
        let doubled = array.view().map(|&v| v as f32 * 2.0);
        assert_eq!(doubled.shape, vec![2, 2]);
        assert_eq!(doubled.as_slice(), &[2.0, 4.0, 6.0, 8.0]);
        Ok(())
    }
}
