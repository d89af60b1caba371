/// Iterator over every multi-index of a shape in row-major (lexicographic) order.
///
/// A shape with no axes has exactly one multi-index, the empty one. A shape with a zero-extent
/// axis has none.
///
/// # Examples
///
/// ```rust
/// use blobscan_tensor::NdIndexIter;
///
/// let all = NdIndexIter::new(&[2, 2]).collect::<Vec<_>>();
/// assert_eq!(all, vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]);
///
/// assert_eq!(NdIndexIter::new(&[]).collect::<Vec<_>>(), vec![Vec::<usize>::new()]);
/// assert_eq!(NdIndexIter::new(&[3, 0]).count(), 0);
/// ```
#[derive(Clone, Debug)]
pub struct NdIndexIter {
    shape: Vec<usize>,
    next: Option<Vec<usize>>,
    remaining: usize,
}

impl NdIndexIter {
    /// Creates an iterator over the multi-indices of `shape`.
    pub fn new(shape: &[usize]) -> Self {
        let remaining = shape.iter().product::<usize>();
        let next = if remaining == 0 {
            None
        } else {
            Some(vec![0; shape.len()])
        };
        Self {
            shape: shape.to_vec(),
            next,
            remaining,
        }
    }
}

impl Iterator for NdIndexIter {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.remaining -= 1;

        // odometer increment, last axis fastest
        let mut successor = current.clone();
        for axis in (0..self.shape.len()).rev() {
            successor[axis] += 1;
            if successor[axis] < self.shape[axis] {
                self.next = Some(successor);
                break;
            }
            successor[axis] = 0;
        }

        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for NdIndexIter {}
