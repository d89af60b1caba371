use std::fmt;

use blobscan_image::SpatialMetadata;
use blobscan_tensor::NdArray;

/// Kind of viewer layer a result should be displayed as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayerType {
    /// A set of points.
    Points,
    /// An integer label image.
    Labels,
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerType::Points => write!(f, "Points"),
            LayerType::Labels => write!(f, "Labels"),
        }
    }
}

/// Data, display state and kind of a layer to hand over to a viewer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerData<D, S> {
    /// The layer payload.
    pub data: D,
    /// Display and placement state.
    pub state: S,
    /// Kind of the layer.
    pub layer_type: LayerType,
}

/// Per-point feature columns of a points layer.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Features {
    /// Detection scale of each point.
    pub sigma: Vec<f64>,
}

/// Display state of a points layer produced by blob detection.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointsState {
    /// Layer name.
    pub name: String,
    /// Placement copied from the analysed image.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub spatial: SpatialMetadata,
    /// Layer opacity.
    pub opacity: f32,
    /// Fill colour of the points.
    pub face_color: String,
    /// Display diameter of each point.
    pub size: Vec<f64>,
    /// Per-point feature columns.
    pub features: Features,
}

/// Display state of a labels layer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabelsState {
    /// Layer name.
    pub name: String,
    /// Placement copied from the reference image.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub spatial: SpatialMetadata,
    /// Layer opacity.
    pub opacity: f32,
}

/// Points layer: detection coordinates of shape `(count, ndim)`.
pub type PointsLayer = LayerData<NdArray<f64>, PointsState>;

/// Labels layer: one label per sample of the reference image.
pub type LabelsLayer = LayerData<NdArray<u32>, LabelsState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_type_display() {
        assert_eq!(LayerType::Points.to_string(), "Points");
        assert_eq!(LayerType::Labels.to_string(), "Labels");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn labels_state_flattens_spatial() -> Result<(), serde_json::Error> {
        let state = LabelsState {
            name: "pts-labels".to_string(),
            spatial: SpatialMetadata::identity(1),
            opacity: 0.7,
        };
        let value = serde_json::to_value(&state)?;
        assert_eq!(value["scale"], serde_json::json!([1.0]));
        assert_eq!(value["name"], "pts-labels");
        Ok(())
    }
}
