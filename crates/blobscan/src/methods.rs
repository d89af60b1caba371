use std::fmt;

use blobscan_image::{ImageVolume, Sample};
use blobscan_imgproc::features::{
    Blob, BlobDetector, DeterminantOfHessian, DifferenceOfGaussian, LaplacianOfGaussian,
};
use blobscan_imgproc::FeatureError;
use blobscan_tensor::NdView;

use crate::error::BlobscanError;
use crate::layer::PointsLayer;
use crate::scan::detect_blobs;

/// Number of trailing axes a detector analyses at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dimensionality {
    /// Planes.
    #[default]
    TwoD,
    /// Volumes.
    ThreeD,
}

impl Dimensionality {
    /// The number of axes.
    pub fn ndim(self) -> usize {
        match self {
            Dimensionality::TwoD => 2,
            Dimensionality::ThreeD => 3,
        }
    }
}

/// A blob detection algorithm with its parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "method", content = "params"))]
pub enum Algorithm {
    /// Difference of Gaussian.
    DifferenceOfGaussian(DifferenceOfGaussian),
    /// Laplacian of Gaussian.
    LaplacianOfGaussian(LaplacianOfGaussian),
    /// Determinant of Hessian, 2D only.
    DeterminantOfHessian(DeterminantOfHessian),
}

impl Algorithm {
    /// Identifier used in layer names, e.g. `difference_of_gaussian`.
    pub fn slug(&self) -> &'static str {
        self.name()
    }

    /// The method this algorithm belongs to.
    pub fn method(&self) -> Method {
        match self {
            Algorithm::DifferenceOfGaussian(_) => Method::DifferenceOfGaussian,
            Algorithm::LaplacianOfGaussian(_) => Method::LaplacianOfGaussian,
            Algorithm::DeterminantOfHessian(_) => Method::DeterminantOfHessian,
        }
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::DifferenceOfGaussian(DifferenceOfGaussian::default())
    }
}

impl BlobDetector for Algorithm {
    fn name(&self) -> &'static str {
        match self {
            Algorithm::DifferenceOfGaussian(p) => p.name(),
            Algorithm::LaplacianOfGaussian(p) => p.name(),
            Algorithm::DeterminantOfHessian(p) => p.name(),
        }
    }

    fn detect(&self, src: &NdView<'_, f32>) -> Result<Vec<Blob>, FeatureError> {
        match self {
            Algorithm::DifferenceOfGaussian(p) => p.detect(src),
            Algorithm::LaplacianOfGaussian(p) => p.detect(src),
            Algorithm::DeterminantOfHessian(p) => p.detect(src),
        }
    }
}

/// Value type of a detector parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    /// A real number.
    Float,
    /// A non-negative integer.
    Int,
    /// A flag.
    Bool,
    /// A [`Dimensionality`].
    Dimensionality,
}

/// Default value of a detector parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    /// A real number.
    Float(f64),
    /// A non-negative integer.
    Int(usize),
    /// A flag.
    Bool(bool),
    /// A [`Dimensionality`].
    Dimensionality(Dimensionality),
}

/// Input constraints of one detector parameter, for building entry forms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSpec {
    /// Field name in the parameter struct.
    pub name: &'static str,
    /// Value type.
    pub kind: ParamKind,
    /// Smallest accepted value.
    pub min: Option<f64>,
    /// Largest accepted value.
    pub max: Option<f64>,
    /// Increment of the entry control.
    pub step: Option<f64>,
    /// Default value.
    pub default: ParamValue,
}

impl ParamSpec {
    const fn float(name: &'static str, min: f64, max: f64, step: Option<f64>, default: f64) -> Self {
        Self {
            name,
            kind: ParamKind::Float,
            min: Some(min),
            max: Some(max),
            step,
            default: ParamValue::Float(default),
        }
    }

    const fn int(name: &'static str, min: f64, max: Option<f64>, default: usize) -> Self {
        Self {
            name,
            kind: ParamKind::Int,
            min: Some(min),
            max,
            step: None,
            default: ParamValue::Int(default),
        }
    }

    const fn flag(name: &'static str, default: bool) -> Self {
        Self {
            name,
            kind: ParamKind::Bool,
            min: None,
            max: None,
            step: None,
            default: ParamValue::Bool(default),
        }
    }

    const fn dimensionality() -> Self {
        Self {
            name: "dimensionality",
            kind: ParamKind::Dimensionality,
            min: None,
            max: None,
            step: None,
            default: ParamValue::Dimensionality(Dimensionality::TwoD),
        }
    }
}

const DOG_SCHEMA: &[ParamSpec] = &[
    ParamSpec::dimensionality(),
    ParamSpec::float("min_sigma", 0.5, 15.0, Some(0.5), 1.0),
    ParamSpec::float("max_sigma", 1.0, 1000.0, Some(0.5), 50.0),
    ParamSpec::float("sigma_ratio", 1.0, 10.0, None, 1.6),
    ParamSpec::float("threshold", 0.0, 1000.0, Some(0.1), 0.5),
    ParamSpec::float("overlap", 0.0, 1.0, Some(0.01), 0.5),
    ParamSpec::int("exclude_border", 0.0, None, 0),
];

const DOH_SCHEMA: &[ParamSpec] = &[
    ParamSpec::float("min_sigma", 0.5, 15.0, Some(0.5), 1.0),
    ParamSpec::float("max_sigma", 1.0, 1000.0, Some(0.5), 30.0),
    ParamSpec::int("num_sigma", 1.0, Some(20.0), 10),
    ParamSpec::float("threshold", 0.0, 1000.0, Some(0.01), 0.01),
    ParamSpec::float("overlap", 0.0, 1.0, Some(0.01), 0.5),
    ParamSpec::flag("log_scale", false),
];

const LOG_SCHEMA: &[ParamSpec] = &[
    ParamSpec::dimensionality(),
    ParamSpec::float("min_sigma", 0.5, 15.0, Some(0.5), 1.0),
    ParamSpec::float("max_sigma", 1.0, 1000.0, Some(0.5), 50.0),
    ParamSpec::int("num_sigma", 1.0, Some(20.0), 10),
    ParamSpec::float("threshold", 0.0, 1000.0, Some(0.1), 0.2),
    ParamSpec::float("overlap", 0.0, 1.0, Some(0.01), 0.5),
    ParamSpec::flag("log_scale", false),
    ParamSpec::int("exclude_border", 0.0, None, 0),
];

/// The selectable detection methods, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Method {
    /// Difference of Gaussian.
    DifferenceOfGaussian,
    /// Determinant of Hessian.
    DeterminantOfHessian,
    /// Laplacian of Gaussian.
    LaplacianOfGaussian,
}

impl Method {
    /// Every method, in display order.
    pub const ALL: [Method; 3] = [
        Method::DifferenceOfGaussian,
        Method::DeterminantOfHessian,
        Method::LaplacianOfGaussian,
    ];

    /// Display name of the method.
    pub fn name(self) -> &'static str {
        match self {
            Method::DifferenceOfGaussian => "Difference of Gaussian",
            Method::DeterminantOfHessian => "Determinant of Hessian",
            Method::LaplacianOfGaussian => "Laplacian of Gaussian",
        }
    }

    /// Look a method up by its display name.
    pub fn from_name(name: &str) -> Result<Self, BlobscanError> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == name)
            .ok_or_else(|| BlobscanError::UnknownMethod(name.to_string()))
    }

    /// The algorithm with default parameters.
    pub fn default_algorithm(self) -> Algorithm {
        match self {
            Method::DifferenceOfGaussian => {
                Algorithm::DifferenceOfGaussian(DifferenceOfGaussian::default())
            }
            Method::DeterminantOfHessian => {
                Algorithm::DeterminantOfHessian(DeterminantOfHessian::default())
            }
            Method::LaplacianOfGaussian => {
                Algorithm::LaplacianOfGaussian(LaplacianOfGaussian::default())
            }
        }
    }

    /// Entry constraints of the method's parameters.
    pub fn schema(self) -> &'static [ParamSpec] {
        match self {
            Method::DifferenceOfGaussian => DOG_SCHEMA,
            Method::DeterminantOfHessian => DOH_SCHEMA,
            Method::LaplacianOfGaussian => LOG_SCHEMA,
        }
    }

    /// Whether the method accepts a dimensionality other than 2D.
    pub fn supports(self, dimensionality: Dimensionality) -> bool {
        self != Method::DeterminantOfHessian || dimensionality == Dimensionality::TwoD
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Method selection with one active parameter set.
///
/// Starts on Difference of Gaussian with default parameters. Selecting another method replaces
/// the active parameters with that method's defaults.
///
/// # Example
///
/// ```
/// use blobscan::methods::{Method, MethodSelector};
///
/// let mut selector = MethodSelector::new();
/// assert_eq!(selector.method(), Method::DifferenceOfGaussian);
/// selector.select("Laplacian of Gaussian").unwrap();
/// assert_eq!(selector.algorithm().slug(), "laplacian_of_gaussian");
/// assert!(selector.select("Watershed").is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MethodSelector {
    algorithm: Algorithm,
    dimensionality: Dimensionality,
}

impl Default for MethodSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl MethodSelector {
    /// Create a selector on Difference of Gaussian.
    pub fn new() -> Self {
        Self {
            algorithm: Method::DifferenceOfGaussian.default_algorithm(),
            dimensionality: Dimensionality::TwoD,
        }
    }

    /// Display names of the selectable methods.
    pub fn choices() -> [&'static str; 3] {
        Method::ALL.map(Method::name)
    }

    /// The active method.
    pub fn method(&self) -> Method {
        self.algorithm.method()
    }

    /// Switch to the method named `name`, resetting parameters and dimensionality.
    pub fn select(&mut self, name: &str) -> Result<(), BlobscanError> {
        let method = Method::from_name(name)?;
        log::debug!("selected method {method}");
        self.algorithm = method.default_algorithm();
        self.dimensionality = Dimensionality::TwoD;
        Ok(())
    }

    /// The active algorithm and its parameters.
    pub fn algorithm(&self) -> &Algorithm {
        &self.algorithm
    }

    /// The active algorithm, for editing its parameters.
    pub fn algorithm_mut(&mut self) -> &mut Algorithm {
        &mut self.algorithm
    }

    /// The active dimensionality.
    pub fn dimensionality(&self) -> Dimensionality {
        self.dimensionality
    }

    /// Change the dimensionality. Determinant of Hessian only accepts 2D.
    pub fn set_dimensionality(&mut self, dimensionality: Dimensionality) -> Result<(), BlobscanError> {
        let method = self.method();
        if !method.supports(dimensionality) {
            return Err(FeatureError::UnsupportedDimensionality {
                detector: self.algorithm.slug(),
                ndim: dimensionality.ndim(),
            }
            .into());
        }
        self.dimensionality = dimensionality;
        Ok(())
    }

    /// Run the active algorithm over `image`.
    pub fn invoke<T: Sample>(&self, image: &ImageVolume<T>) -> Result<PointsLayer, BlobscanError> {
        Ok(detect_blobs(image, &self.algorithm, self.dimensionality.ndim())?)
    }
}

/// Detect blobs with the Difference of Gaussian method.
pub fn difference_of_gaussian<T: Sample>(
    image: &ImageVolume<T>,
    dimensionality: Dimensionality,
    params: &DifferenceOfGaussian,
) -> Result<PointsLayer, BlobscanError> {
    Ok(detect_blobs(image, params, dimensionality.ndim())?)
}

/// Detect blobs with the Laplacian of Gaussian method.
pub fn laplacian_of_gaussian<T: Sample>(
    image: &ImageVolume<T>,
    dimensionality: Dimensionality,
    params: &LaplacianOfGaussian,
) -> Result<PointsLayer, BlobscanError> {
    Ok(detect_blobs(image, params, dimensionality.ndim())?)
}

/// Detect blobs with the Determinant of Hessian method, on the trailing two axes.
pub fn determinant_of_hessian<T: Sample>(
    image: &ImageVolume<T>,
    params: &DeterminantOfHessian,
) -> Result<PointsLayer, BlobscanError> {
    Ok(detect_blobs(image, params, Dimensionality::TwoD.ndim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobscan_tensor::NdArray;

    #[test]
    fn test_method_registry() -> Result<(), BlobscanError> {
        assert_eq!(
            MethodSelector::choices(),
            [
                "Difference of Gaussian",
                "Determinant of Hessian",
                "Laplacian of Gaussian"
            ]
        );
        for method in Method::ALL {
            assert_eq!(Method::from_name(method.name())?, method);
            assert_eq!(method.default_algorithm().method(), method);
        }
        assert_eq!(
            Method::from_name("dog"),
            Err(BlobscanError::UnknownMethod("dog".to_string()))
        );
        Ok(())
    }

    #[test]
    fn test_schema_matches_defaults() {
        let dog = DifferenceOfGaussian::default();
        let spec = Method::DifferenceOfGaussian
            .schema()
            .iter()
            .find(|s| s.name == "threshold")
            .copied();
        let threshold = dog.threshold.map(|t| ParamValue::Float(t as f64));
        assert_eq!(spec.map(|s| s.default), threshold);

        let names = Method::DeterminantOfHessian
            .schema()
            .iter()
            .map(|s| s.name)
            .collect::<Vec<_>>();
        assert!(!names.contains(&"dimensionality"));
        assert!(!names.contains(&"exclude_border"));
        assert_eq!(Method::LaplacianOfGaussian.schema().len(), 8);
    }

    #[test]
    fn test_selector_swaps_parameters() -> Result<(), BlobscanError> {
        let mut selector = MethodSelector::default();
        assert_eq!(selector.algorithm(), &Algorithm::default());

        if let Algorithm::DifferenceOfGaussian(p) = selector.algorithm_mut() {
            p.threshold = Some(0.1);
        }
        selector.set_dimensionality(Dimensionality::ThreeD)?;
        selector.select("Difference of Gaussian")?;
        assert_eq!(selector.algorithm(), &Algorithm::default());
        assert_eq!(selector.dimensionality(), Dimensionality::TwoD);

        selector.select("Determinant of Hessian")?;
        assert_eq!(selector.method(), Method::DeterminantOfHessian);
        assert!(selector.set_dimensionality(Dimensionality::ThreeD).is_err());
        assert_eq!(selector.dimensionality(), Dimensionality::TwoD);
        Ok(())
    }

    #[test]
    fn test_selector_invoke() -> Result<(), BlobscanError> {
        let image = ImageVolume::new("zeros", NdArray::<f32>::zeros(&[3, 8, 8]));
        let mut selector = MethodSelector::new();
        selector.select("Laplacian of Gaussian")?;
        let layer = selector.invoke(&image)?;
        assert_eq!(layer.data.shape, vec![0, 3]);
        assert_eq!(layer.state.name, "zeros-features-laplacian_of_gaussian");
        Ok(())
    }

    #[test]
    fn test_entry_functions_reject_deep_features() {
        let image = ImageVolume::new("plane", NdArray::<f32>::zeros(&[10, 10]));
        let res = difference_of_gaussian(
            &image,
            Dimensionality::ThreeD,
            &DifferenceOfGaussian::default(),
        );
        assert!(matches!(
            res,
            Err(BlobscanError::Scan(crate::ScanError::InvalidDimensionality {
                ndim: 2,
                feature_dim: 3
            }))
        ));
    }
}
