use serde::ser::SerializeStruct;
use serde::Deserialize;

use crate::NdArray;

impl<T> serde::Serialize for NdArray<T>
where
    T: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("NdArray", 2)?;
        state.serialize_field("shape", &self.shape)?;
        state.serialize_field("data", self.as_slice())?;
        state.end()
    }
}

impl<'de, T> serde::Deserialize<'de> for NdArray<T>
where
    T: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ArrayData<T> {
            shape: Vec<usize>,
            data: Vec<T>,
        }

        let ArrayData { shape, data } = ArrayData::deserialize(deserializer)?;
        NdArray::from_shape_vec(&shape, data).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use crate::NdArray;

    #[test]
    fn test_serde() -> Result<(), Box<dyn std::error::Error>> {
        let array = NdArray::from_shape_vec(&[2, 3], vec![1u8, 2, 3, 4, 5, 6])?;
        let serialized = serde_json::to_string(&array)?;
        assert_eq!(serialized, r#"{"shape":[2,3],"data":[1,2,3,4,5,6]}"#);
        let deserialized: NdArray<u8> = serde_json::from_str(&serialized)?;
        assert_eq!(array, deserialized);
        Ok(())
    }

    #[test]
    fn test_serde_rejects_bad_shape() {
        let res = serde_json::from_str::<NdArray<u8>>(r#"{"shape":[2,2],"data":[1,2,3]}"#);
        assert!(res.is_err());
    }
}
