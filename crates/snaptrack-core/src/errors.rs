use thiserror::Error;

/// Result type alias using TrackError
pub type Result<T> = std::result::Result<T, TrackError>;

/// Error taxonomy for tracking operations
///
/// Configuration errors (`ComparerMissing`, `ComparerAlreadyRegistered`) are
/// fatal at first use: a complex property without a registered comparer must
/// abort the operation rather than be silently skipped, since skipping would
/// let an in-place mutation go unsaved.
///
/// A comparer whose clone function is not a true deep-enough copy cannot be
/// detected at runtime by this engine; that contract is a documented
/// precondition of [`crate::comparer::ValueComparer`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackError {
    // ===== Configuration Errors =====
    /// No comparer registered for a complex property type
    ///
    /// Complex/structured property types require explicit comparer
    /// registration: reference identity is almost always the wrong equality
    /// for detecting content mutation, and there is no implicit clone.
    #[error("No value comparer registered for complex type {type_name}")]
    ComparerMissing { type_name: String },

    /// A comparer for this type was already registered
    #[error("Value comparer already registered for type {type_name}")]
    ComparerAlreadyRegistered { type_name: String },

    // ===== Tracking Errors =====
    /// Entity is not in the tracking scope
    #[error("Entity not tracked: {key}")]
    EntityNotTracked { key: String },

    /// Entity is already in the tracking scope
    #[error("Entity already tracked: {key}")]
    EntityAlreadyTracked { key: String },

    /// Entity is marked for deletion and cannot be mutated
    #[error("Entity is marked deleted: {key}")]
    EntityDeleted { key: String },

    /// Requested entity state transition is not allowed
    #[error("Invalid entity state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// A tracked entity has no stored snapshot (internal inconsistency)
    #[error("No snapshot stored for tracked entity: {key}")]
    SnapshotMissing { key: String },

    // ===== Property Errors =====
    /// Property is not declared on the entity's model
    #[error("Property not found: {property}")]
    PropertyNotFound { property: String },

    /// Property value type does not match the declared or stored type
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Property is declared read-only and already has a value
    #[error("Property is read-only: {property}")]
    PropertyImmutable { property: String },

    /// Entity model declares the same property name twice
    #[error("Duplicate property in entity model: {property}")]
    DuplicateProperty { property: String },

    // ===== Generic Errors =====
    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl TrackError {
    /// Get the stable error code for this error
    ///
    /// Codes are part of the public contract and safe to match on in
    /// external tooling and tests.
    pub fn code(&self) -> &'static str {
        match self {
            TrackError::ComparerMissing { .. } => "ERR_COMPARER_MISSING",
            TrackError::ComparerAlreadyRegistered { .. } => "ERR_COMPARER_ALREADY_REGISTERED",
            TrackError::EntityNotTracked { .. } => "ERR_ENTITY_NOT_TRACKED",
            TrackError::EntityAlreadyTracked { .. } => "ERR_ENTITY_ALREADY_TRACKED",
            TrackError::EntityDeleted { .. } => "ERR_ENTITY_DELETED",
            TrackError::InvalidTransition { .. } => "ERR_INVALID_TRANSITION",
            TrackError::SnapshotMissing { .. } => "ERR_SNAPSHOT_MISSING",
            TrackError::PropertyNotFound { .. } => "ERR_PROPERTY_NOT_FOUND",
            TrackError::TypeMismatch { .. } => "ERR_TYPE_MISMATCH",
            TrackError::PropertyImmutable { .. } => "ERR_PROPERTY_IMMUTABLE",
            TrackError::DuplicateProperty { .. } => "ERR_DUPLICATE_PROPERTY",
            TrackError::Serialization { .. } => "ERR_SERIALIZATION",
            TrackError::Internal { .. } => "ERR_INTERNAL",
        }
    }

    /// True for errors that indicate engine misconfiguration rather than
    /// a bad call at runtime
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TrackError::ComparerMissing { .. } | TrackError::ComparerAlreadyRegistered { .. }
        )
    }
}

/// Conversion from serde_json::Error to TrackError
impl From<serde_json::Error> for TrackError {
    fn from(err: serde_json::Error) -> Self {
        TrackError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        let cases = [
            (
                TrackError::ComparerMissing {
                    type_name: "Address".to_string(),
                },
                "ERR_COMPARER_MISSING",
            ),
            (
                TrackError::EntityNotTracked {
                    key: "customer:1".to_string(),
                },
                "ERR_ENTITY_NOT_TRACKED",
            ),
            (
                TrackError::TypeMismatch {
                    expected: "Address".to_string(),
                    actual: "Profile".to_string(),
                },
                "ERR_TYPE_MISMATCH",
            ),
            (
                TrackError::PropertyImmutable {
                    property: "id".to_string(),
                },
                "ERR_PROPERTY_IMMUTABLE",
            ),
        ];
        for (err, expected_code) in cases {
            assert_eq!(err.code(), expected_code, "Wrong code for {:?}", err);
        }
    }

    #[test]
    fn test_comparer_missing_is_configuration() {
        let err = TrackError::ComparerMissing {
            type_name: "Address".to_string(),
        };
        assert!(err.is_configuration());

        let err = TrackError::EntityNotTracked {
            key: "customer:1".to_string(),
        };
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_display_carries_context() {
        let err = TrackError::ComparerMissing {
            type_name: "demo::Address".to_string(),
        };
        assert!(err.to_string().contains("demo::Address"));
    }
}
