use snaptrack_core::TrackError;
use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store-side error taxonomy
///
/// Engine errors propagate through the `Track` variant unchanged, so their
/// stable codes survive the crate boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No persisted row exists for the key
    #[error("Row not found: {key}")]
    RowNotFound { key: String },

    /// No JSON codec registered for a complex property type
    ///
    /// Same policy as comparers: a complex type the store cannot serialize
    /// is a configuration error, fatal at first use.
    #[error("No JSON codec registered for complex type {type_name}")]
    CodecMissing { type_name: String },

    /// A codec for this type was already registered
    #[error("JSON codec already registered for type {type_name}")]
    CodecAlreadyRegistered { type_name: String },

    /// No entity model registered for the kind
    #[error("No entity model registered for kind {kind}")]
    ModelMissing { kind: String },

    /// A scalar column holds structured JSON (corrupt or mis-modelled row)
    #[error("Column {column} does not hold a scalar value")]
    ColumnNotScalar { column: String },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// The persistence backend rejected or failed an operation
    #[error("Backend failure: {message}")]
    Backend { message: String },

    /// Engine-level error propagated unchanged
    #[error(transparent)]
    Track(#[from] TrackError),
}

impl StoreError {
    /// Get the stable error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::RowNotFound { .. } => "ERR_ROW_NOT_FOUND",
            StoreError::CodecMissing { .. } => "ERR_CODEC_MISSING",
            StoreError::CodecAlreadyRegistered { .. } => "ERR_CODEC_ALREADY_REGISTERED",
            StoreError::ModelMissing { .. } => "ERR_MODEL_MISSING",
            StoreError::ColumnNotScalar { .. } => "ERR_COLUMN_NOT_SCALAR",
            StoreError::Serialization { .. } => "ERR_SERIALIZATION",
            StoreError::Backend { .. } => "ERR_BACKEND",
            StoreError::Track(err) => err.code(),
        }
    }
}

/// Conversion from serde_json::Error to StoreError
impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_codes() {
        let cases = [
            (
                StoreError::RowNotFound {
                    key: "customer:1".to_string(),
                },
                "ERR_ROW_NOT_FOUND",
            ),
            (
                StoreError::CodecMissing {
                    type_name: "Address".to_string(),
                },
                "ERR_CODEC_MISSING",
            ),
            (
                StoreError::ModelMissing {
                    kind: "customer".to_string(),
                },
                "ERR_MODEL_MISSING",
            ),
            (
                StoreError::Backend {
                    message: "write refused".to_string(),
                },
                "ERR_BACKEND",
            ),
        ];
        for (err, expected_code) in cases {
            assert_eq!(err.code(), expected_code, "Wrong code for {:?}", err);
        }
    }

    #[test]
    fn test_track_error_code_survives_wrapping() {
        let err: StoreError = TrackError::ComparerMissing {
            type_name: "Address".to_string(),
        }
        .into();
        assert_eq!(err.code(), "ERR_COMPARER_MISSING");
    }
}
