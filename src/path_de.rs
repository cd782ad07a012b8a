use serde::de::DeserializeOwned;
use thiserror::Error;

/// A decoding failure, located by JSON path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at JSON path {path} → {message}")]
pub struct DecodeError {
    pub path: String,
    pub message: String,
}

impl DecodeError {
    fn from_path_error(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        Self {
            path: err.path().to_string(),
            message: err.into_inner().to_string(),
        }
    }
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, DecodeError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(DecodeError::from_path_error)
}

/// Same, for documents already parsed (after JSON Pointer / jq selection).
pub fn from_value_with_path<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, DecodeError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(DecodeError::from_path_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClassModelDocument;
    use serde_json::json;

    #[test]
    fn reports_nested_paths() {
        let doc = json!({ "classes": [
            { "name": "com.example.A" },
            { "name": "com.example.B", "fields": [{ "name": "x", "type": "Map<K," }] }
        ]});
        let err = from_value_with_path::<ClassModelDocument>(doc).unwrap_err();
        assert_eq!(err.path, "classes[1].fields[0].type");
        assert!(err.to_string().starts_with("at JSON path classes[1].fields[0].type"));
    }
}
