use crate::ImageError;

/// World-space placement of a volume.
///
/// The scanner never interprets these values; it copies them onto its output so the detected
/// points land on top of the source image. The layout follows the usual viewer convention:
///
/// * `scale`, `translate`: one value per axis
/// * `rotate`: `ndim x ndim` matrix
/// * `shear`: upper-triangular entries, `ndim * (ndim - 1) / 2` values
/// * `affine`: `(ndim + 1) x (ndim + 1)` homogeneous matrix
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpatialMetadata {
    /// Per-axis scale factors.
    pub scale: Vec<f64>,
    /// Per-axis translation.
    pub translate: Vec<f64>,
    /// Rotation matrix.
    pub rotate: Vec<Vec<f64>>,
    /// Shear coefficients.
    pub shear: Vec<f64>,
    /// Homogeneous affine transform.
    pub affine: Vec<Vec<f64>>,
}

fn identity_matrix(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|r| (0..n).map(|c| if r == c { 1.0 } else { 0.0 }).collect())
        .collect()
}

impl SpatialMetadata {
    /// The identity placement for an `ndim`-dimensional volume.
    ///
    /// # Example
    ///
    /// ```
    /// use blobscan_image::SpatialMetadata;
    ///
    /// let meta = SpatialMetadata::identity(3);
    /// assert_eq!(meta.scale, vec![1.0; 3]);
    /// assert_eq!(meta.shear.len(), 3);
    /// assert_eq!(meta.affine.len(), 4);
    /// ```
    pub fn identity(ndim: usize) -> Self {
        Self {
            scale: vec![1.0; ndim],
            translate: vec![0.0; ndim],
            rotate: identity_matrix(ndim),
            shear: vec![0.0; ndim * ndim.saturating_sub(1) / 2],
            affine: identity_matrix(ndim + 1),
        }
    }

    /// Number of axes described by the metadata.
    pub fn ndim(&self) -> usize {
        self.scale.len()
    }

    /// Checks that every field is consistent with an `ndim`-dimensional volume.
    pub fn validate(&self, ndim: usize) -> Result<(), ImageError> {
        let check = |field: &'static str, expected: usize, actual: usize| {
            if expected == actual {
                Ok(())
            } else {
                Err(ImageError::InvalidMetadata {
                    field,
                    ndim,
                    expected,
                    actual,
                })
            }
        };

        check("scale", ndim, self.scale.len())?;
        check("translate", ndim, self.translate.len())?;
        check("shear", ndim * ndim.saturating_sub(1) / 2, self.shear.len())?;
        check("rotate", ndim, self.rotate.len())?;
        for row in &self.rotate {
            check("rotate", ndim, row.len())?;
        }
        check("affine", ndim + 1, self.affine.len())?;
        for row in &self.affine {
            check("affine", ndim + 1, row.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_valid() {
        for ndim in 0..5 {
            assert_eq!(SpatialMetadata::identity(ndim).validate(ndim), Ok(()));
        }
    }

    #[test]
    fn validate_reports_field() {
        let mut meta = SpatialMetadata::identity(2);
        meta.affine[1].pop();
        assert_eq!(
            meta.validate(2),
            Err(ImageError::InvalidMetadata {
                field: "affine",
                ndim: 2,
                expected: 3,
                actual: 2,
            })
        );
    }
}
