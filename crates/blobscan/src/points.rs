use blobscan_image::ImageVolume;
use blobscan_imgproc::{draw::draw_ball, label::label_from_seeds};
use blobscan_tensor::{NdArray, TensorError};

use crate::error::BlobscanError;
use crate::layer::{LabelsLayer, LabelsState, LayerData, LayerType};

/// Opacity of the labels layer produced by [`points_to_labels`].
pub const LABELS_OPACITY: f32 = 0.7;

/// Point annotations: positions with a display diameter each.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "PointsData"))]
pub struct Points {
    /// Display name of the annotations.
    pub name: String,
    data: NdArray<f64>,
    size: Vec<f64>,
}

/// Unchecked wire form of [`Points`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct PointsData {
    name: String,
    data: NdArray<f64>,
    size: Vec<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<PointsData> for Points {
    type Error = BlobscanError;

    fn try_from(value: PointsData) -> Result<Self, Self::Error> {
        Points::new(value.name, value.data, value.size)
    }
}

impl Points {
    /// Create point annotations.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name.
    /// * `data` - Positions, shape `(count, ndim)`.
    /// * `size` - One diameter per point, or a single diameter shared by all points.
    pub fn new(
        name: impl Into<String>,
        data: NdArray<f64>,
        size: Vec<f64>,
    ) -> Result<Self, BlobscanError> {
        if data.ndim() != 2 {
            return Err(TensorError::dimension_mismatch(
                "points must be a (count, ndim) array",
                &[2],
                &[data.ndim()],
            )
            .into());
        }
        let count = data.shape[0];
        if !(size.len() == 1 || size.len() == count) {
            return Err(BlobscanError::SizeCountMismatch {
                sizes: size.len(),
                points: count,
            });
        }
        if let Some((index, &size)) = size
            .iter()
            .enumerate()
            .find(|(_, s)| !s.is_finite() || **s < 0.0)
        {
            return Err(BlobscanError::InvalidPointSize { index, size });
        }
        Ok(Self {
            name: name.into(),
            data,
            size,
        })
    }

    /// Create point annotations from one row per point.
    ///
    /// An empty `rows` gives zero points of dimensionality `ndim`.
    pub fn from_rows(
        name: impl Into<String>,
        ndim: usize,
        rows: &[Vec<f64>],
        size: Vec<f64>,
    ) -> Result<Self, BlobscanError> {
        if let Some(row) = rows.iter().find(|r| r.len() != ndim) {
            return Err(BlobscanError::PointDimensionMismatch {
                points: row.len(),
                image: ndim,
            });
        }
        let flat = rows.iter().flatten().copied().collect();
        let data = NdArray::from_shape_vec(&[rows.len(), ndim], flat)?;
        Self::new(name, data, size)
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.data.shape[0]
    }

    /// Whether there are no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensionality of the positions.
    pub fn ndim(&self) -> usize {
        self.data.shape[1]
    }

    /// Positions, shape `(count, ndim)`.
    pub fn data(&self) -> &NdArray<f64> {
        &self.data
    }

    /// Position of point `index`.
    pub fn position(&self, index: usize) -> Option<&[f64]> {
        self.data.rows().nth(index)
    }

    /// Diameter of point `index`, broadcasting a single shared size.
    pub fn size(&self, index: usize) -> Option<f64> {
        if index >= self.len() {
            return None;
        }
        match self.size.as_slice() {
            [shared] => Some(*shared),
            sizes => sizes.get(index).copied(),
        }
    }
}

/// Convert point annotations into a label image shaped like `image`.
///
/// Every point becomes a ball of diameter `size` centered on its position. Touching or
/// overlapping balls share a label. Labels are numbered from 1 in point order; regions whose
/// center falls outside every ball are numbered afterwards in row-major order.
///
/// # Errors
///
/// Fails with [`BlobscanError::PointDimensionMismatch`] if the points and the image have a
/// different number of axes.
///
/// # Example
///
/// ```
/// use blobscan::image::ImageVolume;
/// use blobscan::points::{points_to_labels, Points};
/// use blobscan::tensor::NdArray;
///
/// let image = ImageVolume::new("cells", NdArray::<u8>::zeros(&[10, 10]));
/// let points = Points::from_rows("marks", 2, &[vec![4.0, 6.0], vec![7.0, 5.0]], vec![1.0]).unwrap();
/// let layer = points_to_labels(&points, &image).unwrap();
/// assert_eq!(layer.data.get(&[4, 6]), Some(&1));
/// assert_eq!(layer.data.get(&[7, 5]), Some(&2));
/// ```
pub fn points_to_labels<T>(
    points: &Points,
    image: &ImageVolume<T>,
) -> Result<LabelsLayer, BlobscanError> {
    let ndim = image.ndim();
    if !points.is_empty() && points.ndim() != ndim {
        return Err(BlobscanError::PointDimensionMismatch {
            points: points.ndim(),
            image: ndim,
        });
    }

    let shape = image.shape();
    let mut mask = NdArray::from_shape_val(shape, false);
    let mut seeds = Vec::with_capacity(points.len());
    for (index, center) in points.data.rows().enumerate().take(points.len()) {
        let size = points.size(index).unwrap_or_default();
        draw_ball(&mut mask, center, size / 2.0)?;

        let seed = center
            .iter()
            .zip(shape)
            .map(|(&c, &n)| {
                let i = c.round();
                (i >= 0.0 && i < n as f64).then_some(i as usize)
            })
            .collect::<Option<Vec<_>>>();
        if let Some(seed) = seed {
            seeds.push(seed);
        }
    }

    let (labels, count) = label_from_seeds(&mask, ndim.max(1), &seeds)?;
    log::debug!("points_to_labels: {} points, {count} regions", points.len());

    Ok(LayerData {
        data: labels,
        state: LabelsState {
            name: format!("{}-labels", points.name),
            spatial: image.spatial.clone(),
            opacity: LABELS_OPACITY,
        },
        layer_type: LayerType::Labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> ImageVolume<f32> {
        ImageVolume::new("ref", NdArray::<f32>::zeros(&[10, 10]))
    }

    #[test]
    fn test_points_size_broadcast() -> Result<(), BlobscanError> {
        let points = Points::from_rows("p", 2, &[vec![1.0, 1.0], vec![2.0, 2.0]], vec![3.0])?;
        assert_eq!(points.size(1), Some(3.0));
        assert_eq!(points.size(2), None);
        assert_eq!(points.position(1), Some(&[2.0, 2.0][..]));

        let err = Points::from_rows("p", 2, &[vec![1.0, 1.0]], vec![1.0, 2.0]).unwrap_err();
        assert_eq!(err, BlobscanError::SizeCountMismatch { sizes: 2, points: 1 });
        let err = Points::from_rows("p", 2, &[vec![1.0, 1.0]], vec![-1.0]).unwrap_err();
        assert_eq!(err, BlobscanError::InvalidPointSize { index: 0, size: -1.0 });
        Ok(())
    }

    #[test]
    fn test_no_points() -> Result<(), BlobscanError> {
        let image = reference();
        let points = Points::from_rows("empty", 2, &[], vec![10.0])?;
        let layer = points_to_labels(&points, &image)?;
        assert_eq!(layer.layer_type, LayerType::Labels);
        assert_eq!(layer.data.shape, vec![10, 10]);
        assert!(layer.data.iter().all(|&l| l == 0));
        assert_eq!(layer.state.spatial, image.spatial);
        assert_eq!(layer.state.name, "empty-labels");
        Ok(())
    }

    #[test]
    fn test_one_pixel_point() -> Result<(), BlobscanError> {
        let points = Points::from_rows("p", 2, &[vec![4.0, 6.0]], vec![1.0])?;
        let layer = points_to_labels(&points, &reference())?;
        let mut expected = NdArray::<u32>::zeros(&[10, 10]);
        *expected.get_mut(&[4, 6]).unwrap() = 1;
        assert_eq!(layer.data, expected);
        Ok(())
    }

    #[test]
    fn test_plus_shaped_point() -> Result<(), BlobscanError> {
        let points = Points::from_rows("p", 2, &[vec![4.0, 6.0]], vec![2.0])?;
        let layer = points_to_labels(&points, &reference())?;
        let mut expected = NdArray::<u32>::zeros(&[10, 10]);
        for index in [[4, 5], [4, 6], [4, 7], [3, 6], [5, 6]] {
            *expected.get_mut(&index).unwrap() = 1;
        }
        assert_eq!(layer.data, expected);
        Ok(())
    }

    #[test]
    fn test_labels_follow_point_order() -> Result<(), BlobscanError> {
        let points = Points::from_rows("p", 2, &[vec![7.0, 5.0], vec![4.0, 6.0]], vec![1.0])?;
        let layer = points_to_labels(&points, &reference())?;
        assert_eq!(layer.data.get(&[7, 5]), Some(&1));
        assert_eq!(layer.data.get(&[4, 6]), Some(&2));
        Ok(())
    }

    #[test]
    fn test_overlapping_points_merge() -> Result<(), BlobscanError> {
        let points = Points::from_rows("p", 2, &[vec![4.0, 4.0], vec![4.0, 5.0]], vec![2.0])?;
        let layer = points_to_labels(&points, &reference())?;
        assert_eq!(layer.data.iter().filter(|&&l| l == 1).count(), 8);
        assert!(layer.data.iter().all(|&l| l <= 1));
        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_checks_points() -> Result<(), serde_json::Error> {
        let json = r#"{"name":"p","data":{"shape":[1,2],"data":[4.0,6.0]},"size":[2.0]}"#;
        let points: Points = serde_json::from_str(json)?;
        assert_eq!(points.ndim(), 2);
        assert_eq!(points.size(0), Some(2.0));

        let flat = r#"{"name":"p","data":{"shape":[2],"data":[4.0,6.0]},"size":[1.0]}"#;
        assert!(serde_json::from_str::<Points>(flat).is_err());
        let sizes = r#"{"name":"p","data":{"shape":[1,2],"data":[4.0,6.0]},"size":[1.0,2.0,3.0]}"#;
        assert!(serde_json::from_str::<Points>(sizes).is_err());
        let negative = r#"{"name":"p","data":{"shape":[1,2],"data":[4.0,6.0]},"size":[-1.0]}"#;
        assert!(serde_json::from_str::<Points>(negative).is_err());
        Ok(())
    }

    #[test]
    fn test_dimension_mismatch() -> Result<(), BlobscanError> {
        let points = Points::from_rows("p", 3, &[vec![1.0, 1.0, 1.0]], vec![1.0])?;
        assert_eq!(
            points_to_labels(&points, &reference()),
            Err(BlobscanError::PointDimensionMismatch { points: 3, image: 2 })
        );
        Ok(())
    }
}
