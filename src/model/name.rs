//! EntityName value object for runtime and application names.

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Longest accepted name, in characters.
pub const MAX_NAME_LENGTH: usize = 256;

/// A validated runtime or application name.
///
/// Names are unique per tenant and entity type; uniqueness itself is checked
/// by the registry when the name is written.
///
/// ## Validation Rules
///
/// - Must not be empty or whitespace only
/// - At most 256 characters
///
/// ```rust
/// use runtime_registry::model::EntityName;
///
/// let name = EntityName::new("runtime-1".to_string()).unwrap();
/// assert_eq!(name.as_str(), "runtime-1");
/// assert!(EntityName::new("  ".to_string()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityName(String);

impl EntityName {
    /// Create a new EntityName with validation.
    pub fn new(value: String) -> ValidationResult<Self> {
        Self::validate_format(&value)?;
        Ok(Self(value))
    }

    /// Get the string representation of the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the owned string value of the name.
    pub fn into_string(self) -> String {
        self.0
    }

    fn validate_format(value: &str) -> ValidationResult<()> {
        if value.trim().is_empty() {
            return Err(ValidationError::missing_required("name"));
        }

        if value.chars().count() > MAX_NAME_LENGTH {
            return Err(ValidationError::invalid_field(
                "name",
                format!("must be at most {} characters", MAX_NAME_LENGTH),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for EntityName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EntityName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<String> for EntityName {
    type Error = ValidationError;

    fn try_from(value: String) -> ValidationResult<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for EntityName {
    type Error = ValidationError;

    fn try_from(value: &str) -> ValidationResult<Self> {
        Self::new(value.to_string())
    }
}
