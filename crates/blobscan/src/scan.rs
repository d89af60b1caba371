use blobscan_image::{ImageVolume, Sample};
use blobscan_imgproc::features::BlobDetector;
use blobscan_tensor::{NdArray, NdIndexIter};

use crate::error::ScanError;
use crate::layer::{Features, LayerData, LayerType, PointsLayer, PointsState};

/// Opacity of the points layer produced by [`detect_blobs`].
pub const POINTS_OPACITY: f32 = 0.5;

/// Fill colour of the points layer produced by [`detect_blobs`].
pub const POINTS_FACE_COLOR: &str = "red";

/// Blobs found across every slice of an image.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanResult {
    /// Blob positions in the full index space, shape `(count, ndim)`.
    pub coordinates: NdArray<f64>,
    /// Detection scale of each blob, parallel to the rows of `coordinates`.
    pub sigmas: Vec<f64>,
    /// Number of trailing axes the detector ran on.
    pub feature_dim: usize,
}

impl ScanResult {
    /// Number of blobs.
    pub fn len(&self) -> usize {
        self.sigmas.len()
    }

    /// Whether no blob was found.
    pub fn is_empty(&self) -> bool {
        self.sigmas.is_empty()
    }

    /// Display diameter of each blob, `sqrt(feature_dim) * sigma`.
    pub fn display_sizes(&self) -> Vec<f64> {
        let factor = (self.feature_dim as f64).sqrt();
        self.sigmas.iter().map(|s| factor * s).collect()
    }
}

/// Run `detector` on every `feature_dim`-dimensional trailing slice of `src`.
///
/// The leading `ndim - feature_dim` axes are enumerated in row-major order and each blob's
/// coordinates are prefixed with the leading index of its slice. Blobs keep the order in which
/// the detector reported them.
///
/// # Errors
///
/// Fails with [`ScanError::InvalidDimensionality`] unless `1 <= feature_dim <= ndim`. Detector
/// errors are returned unchanged.
pub fn scan_array<B>(
    src: &NdArray<f32>,
    detector: &B,
    feature_dim: usize,
) -> Result<ScanResult, ScanError>
where
    B: BlobDetector + ?Sized,
{
    let ndim = src.ndim();
    if feature_dim == 0 || feature_dim > ndim {
        return Err(ScanError::InvalidDimensionality { ndim, feature_dim });
    }

    let leading_shape = &src.shape[..ndim - feature_dim];
    let slices = NdIndexIter::new(leading_shape);
    log::debug!(
        "{}: {} slices of shape {:?}",
        detector.name(),
        slices.len(),
        &src.shape[ndim - feature_dim..]
    );

    let mut coordinates = Vec::new();
    let mut sigmas = Vec::new();
    for leading in slices {
        log::trace!("{}: slice {leading:?}", detector.name());
        let slice = src.subview(&leading)?;
        let blobs = detector.detect(&slice)?;
        log::debug!("{}: {} blobs at {leading:?}", detector.name(), blobs.len());

        for blob in blobs {
            if blob.coords.len() != feature_dim {
                return Err(ScanError::MalformedDetection {
                    expected: feature_dim,
                    actual: blob.coords.len(),
                });
            }
            coordinates.extend(leading.iter().map(|&i| i as f64));
            coordinates.extend_from_slice(&blob.coords);
            sigmas.push(blob.sigma);
        }
    }

    let coordinates = NdArray::from_shape_vec(&[sigmas.len(), ndim], coordinates)?;
    Ok(ScanResult {
        coordinates,
        sigmas,
        feature_dim,
    })
}

/// Run `detector` on every `feature_dim`-dimensional trailing slice of an image.
///
/// The samples are converted to float intensities first, see [`Sample`].
pub fn scan_blobs<T, B>(
    image: &ImageVolume<T>,
    detector: &B,
    feature_dim: usize,
) -> Result<ScanResult, ScanError>
where
    T: Sample,
    B: BlobDetector + ?Sized,
{
    scan_array(&image.to_float(), detector, feature_dim)
}

/// Detect blobs across an image and package them as a points layer.
///
/// The layer is named `"{image name}-features-{detector name}"`, carries the placement of the
/// image, the display size `sqrt(feature_dim) * sigma` of each point and the sigmas as a
/// feature column.
///
/// # Example
///
/// ```
/// use blobscan::imgproc::features::DifferenceOfGaussian;
/// use blobscan::image::ImageVolume;
/// use blobscan::scan::detect_blobs;
/// use blobscan::tensor::NdArray;
///
/// let image = ImageVolume::new("cells", NdArray::<u8>::zeros(&[2, 10, 10]));
/// let layer = detect_blobs(&image, &DifferenceOfGaussian::default(), 2).unwrap();
/// assert_eq!(layer.data.shape, vec![0, 3]);
/// assert_eq!(layer.state.name, "cells-features-difference_of_gaussian");
/// ```
pub fn detect_blobs<T, B>(
    image: &ImageVolume<T>,
    detector: &B,
    feature_dim: usize,
) -> Result<PointsLayer, ScanError>
where
    T: Sample,
    B: BlobDetector + ?Sized,
{
    let result = scan_blobs(image, detector, feature_dim)?;
    let size = result.display_sizes();
    let state = PointsState {
        name: format!("{}-features-{}", image.name, detector.name()),
        spatial: image.spatial.clone(),
        opacity: POINTS_OPACITY,
        face_color: POINTS_FACE_COLOR.to_string(),
        size,
        features: Features {
            sigma: result.sigmas,
        },
    };
    Ok(LayerData {
        data: result.coordinates,
        state,
        layer_type: LayerType::Points,
    })
}
