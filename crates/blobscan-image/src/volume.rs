use blobscan_tensor::NdArray;

use crate::{ImageError, Sample, SpatialMetadata};

/// An N-dimensional image together with its display name and spatial placement.
///
/// This is the input of every detection entry point. The array may have any rank; the
/// trailing axes are treated as the feature space and any leading axes (time, channel, ...)
/// are iterated over.
///
/// # Examples
///
/// ```
/// use blobscan_image::ImageVolume;
/// use blobscan_tensor::NdArray;
///
/// let volume = ImageVolume::new("nuclei", NdArray::<u16>::zeros(&[5, 64, 64]));
/// assert_eq!(volume.ndim(), 3);
/// assert_eq!(volume.spatial.scale, vec![1.0; 3]);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "VolumeData<T>"))]
pub struct ImageVolume<T> {
    data: NdArray<T>,
    /// Display name of the volume.
    pub name: String,
    /// World-space placement.
    pub spatial: SpatialMetadata,
}

/// Unchecked wire form of [`ImageVolume`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct VolumeData<T> {
    data: NdArray<T>,
    name: String,
    spatial: SpatialMetadata,
}

#[cfg(feature = "serde")]
impl<T> TryFrom<VolumeData<T>> for ImageVolume<T> {
    type Error = ImageError;

    fn try_from(value: VolumeData<T>) -> Result<Self, Self::Error> {
        ImageVolume::with_spatial(value.name, value.data, value.spatial)
    }
}

impl<T> ImageVolume<T> {
    /// Create a volume with an identity placement.
    pub fn new(name: impl Into<String>, data: NdArray<T>) -> Self {
        let spatial = SpatialMetadata::identity(data.ndim());
        Self {
            data,
            name: name.into(),
            spatial,
        }
    }

    /// Create a volume with an explicit placement.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidMetadata`] if a metadata field does not match the rank of
    /// `data`.
    pub fn with_spatial(
        name: impl Into<String>,
        data: NdArray<T>,
        spatial: SpatialMetadata,
    ) -> Result<Self, ImageError> {
        spatial.validate(data.ndim())?;
        Ok(Self {
            data,
            name: name.into(),
            spatial,
        })
    }

    /// The samples of the volume.
    #[inline]
    pub fn data(&self) -> &NdArray<T> {
        &self.data
    }

    /// Number of axes.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// Extent of each axis.
    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.data.shape
    }
}

impl<T: Sample> ImageVolume<T> {
    /// Convert the samples to float intensities.
    pub fn to_float(&self) -> NdArray<f32> {
        self.data.map(|&v| v.to_f32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_checks_spatial() -> Result<(), serde_json::Error> {
        let volume = ImageVolume::new("img", NdArray::<u8>::zeros(&[2, 2]));
        let json = serde_json::to_string(&volume)?;
        assert_eq!(serde_json::from_str::<ImageVolume<u8>>(&json)?, volume);

        let mut value = serde_json::to_value(&volume)?;
        value["spatial"]["scale"] = serde_json::json!([1.0, 1.0, 1.0]);
        assert!(serde_json::from_value::<ImageVolume<u8>>(value).is_err());
        Ok(())
    }

    #[test]
    fn with_spatial_checks_rank() {
        let data = NdArray::<u8>::zeros(&[4, 4]);
        let res = ImageVolume::with_spatial("img", data, SpatialMetadata::identity(3));
        assert!(matches!(res, Err(ImageError::InvalidMetadata { field: "scale", .. })));
    }

    #[test]
    fn to_float_rescales_integers() -> Result<(), ImageError> {
        let data = NdArray::from_shape_vec(&[2], vec![0u8, 255])?;
        let volume = ImageVolume::new("img", data);
        assert_eq!(volume.to_float().as_slice(), &[0.0, 1.0]);
        Ok(())
    }
}
