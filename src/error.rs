//! Error types for registry operations.
//!
//! Every operation surfaces one of a small set of error kinds: validation
//! failures the caller must fix, uniqueness conflicts, and lookups that did
//! not resolve inside the caller's tenant. The message of each kind carries a
//! stable substring ("not unique", "not found") that callers may match on.

use crate::storage::StorageError;

/// Main error type for registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Malformed input or a label value rejected by its definition
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A name that must be unique within the tenant is already taken
    #[error("{resource_type} {attribute} '{value}' is not unique within the tenant")]
    Conflict {
        resource_type: String,
        attribute: String,
        value: String,
    },

    /// The referenced object is absent or belongs to another tenant
    #[error("{resource_type} with ID '{id}' not found")]
    NotFound { resource_type: String, id: String },

    /// A concurrent writer kept changing the object between retries
    #[error("Concurrent modification of {resource_type} '{id}', retry the operation")]
    ConcurrentModification { resource_type: String, id: String },

    /// Storage backend failure unrelated to the request content
    #[error("Storage error: {0}")]
    Storage(#[source] StorageError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse category of a [`RegistryError`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    ConcurrentModification,
    Internal,
}

impl ErrorKind {
    /// Error code used in operation responses.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Conflict => "NOT_UNIQUE",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::ConcurrentModification => "CONCURRENT_MODIFICATION",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Validation errors for registry input and label values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Required field is missing or empty
    #[error("Required field '{field}' is missing")]
    MissingRequiredField { field: String },

    /// Field value has the wrong shape
    #[error("Field '{field}' is invalid: {reason}")]
    InvalidField { field: String, reason: String },

    /// Label key does not follow the key format
    #[error("Label key '{key}' is invalid: {reason}")]
    InvalidLabelKey { key: String, reason: String },

    /// Label value is not a sequence of scalar values
    #[error("Value of label '{key}' is invalid: {reason}")]
    InvalidLabelValue { key: String, reason: String },

    /// Label value rejected by the tenant's label definition
    #[error("Value of label '{key}' does not match its definition: {details}")]
    LabelSchemaViolation { key: String, details: String },

    /// Label definition schema outside the supported subset
    #[error("Schema of label definition '{key}' is invalid: {details}")]
    InvalidLabelSchema { key: String, details: String },

    /// Label definition still has labels attached to entities
    #[error("Label definition '{key}' is used by {count} labels")]
    LabelDefinitionInUse { key: String, count: usize },

    /// The scenarios label definition is built in
    #[error("Label definition '{key}' cannot be deleted")]
    ProtectedLabelDefinition { key: String },

    /// Credential input does not select exactly one credential kind
    #[error("Invalid credential: {details}")]
    InvalidCredential { details: String },

    /// Pagination cursor was not produced by this registry
    #[error("Invalid pagination cursor")]
    InvalidCursor,

    /// Requested page size outside the configured bounds
    #[error("Page size {requested} is invalid, it must be between 1 and {max}")]
    InvalidPageSize { requested: usize, max: usize },
}

/// Errors that can occur while building a registry.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl RegistryError {
    /// Create a not found error
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Create a name conflict error
    pub fn conflict(
        resource_type: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Conflict {
            resource_type: resource_type.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::Validation(_) => ErrorKind::Validation,
            RegistryError::Conflict { .. } => ErrorKind::Conflict,
            RegistryError::NotFound { .. } => ErrorKind::NotFound,
            RegistryError::ConcurrentModification { .. } => ErrorKind::ConcurrentModification,
            RegistryError::Storage(_) | RegistryError::Json(_) => {
                ErrorKind::Internal
            }
        }
    }
}

impl From<StorageError> for RegistryError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::ResourceNotFound {
                resource_type, id, ..
            } => RegistryError::NotFound { resource_type, id },
            StorageError::DuplicateAttribute {
                resource_type,
                attribute,
                value,
                ..
            } => RegistryError::Conflict {
                resource_type,
                attribute,
                value,
            },
            StorageError::ConcurrentModification {
                resource_type, id, ..
            } => RegistryError::ConcurrentModification { resource_type, id },
            other => RegistryError::Storage(other),
        }
    }
}

impl ValidationError {
    /// Create a missing required field error
    pub fn missing_required(field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
        }
    }

    /// Create an invalid field error
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
pub type BuildResult<T> = Result<T, BuildError>;
