//! Labels attached to runtimes and applications.
//!
//! A label is a key with an ordered sequence of scalar JSON values. Each
//! entity holds at most one value per key; setting a key again replaces it.

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Longest accepted label key, in characters.
pub const MAX_LABEL_KEY_LENGTH: usize = 256;

/// Labels of an entity, ordered by key.
pub type Labels = BTreeMap<String, Vec<Value>>;

/// A single label as returned by label mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub key: String,
    pub value: Vec<Value>,
}

impl Label {
    pub fn new(key: impl Into<String>, value: Vec<Value>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Selects entities by label.
///
/// An entity matches when it has the key and, if `values` is given, its
/// label shares at least one value with it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelFilter {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

impl LabelFilter {
    /// Match entities that have the key, whatever its value.
    pub fn has_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: None,
        }
    }

    /// Match entities whose label shares at least one of `values`.
    pub fn any_of(key: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            key: key.into(),
            values: Some(values),
        }
    }

    pub fn matches(&self, labels: &Labels) -> bool {
        let Some(value) = labels.get(&self.key) else {
            return false;
        };
        match &self.values {
            None => true,
            Some(wanted) => value.iter().any(|v| wanted.contains(v)),
        }
    }
}

/// Check a label key against the key format: non-empty, at most 256
/// characters from `[A-Za-z0-9._/-]`.
pub fn validate_label_key(key: &str) -> ValidationResult<()> {
    if key.is_empty() {
        return Err(ValidationError::InvalidLabelKey {
            key: key.to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    if key.chars().count() > MAX_LABEL_KEY_LENGTH {
        return Err(ValidationError::InvalidLabelKey {
            key: key.to_string(),
            reason: format!("must be at most {} characters", MAX_LABEL_KEY_LENGTH),
        });
    }

    if let Some(c) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '/' | '-')))
    {
        return Err(ValidationError::InvalidLabelKey {
            key: key.to_string(),
            reason: format!("contains invalid character '{}'", c),
        });
    }

    Ok(())
}

/// Check that a label value is a sequence of scalar values.
pub fn validate_label_value(key: &str, value: &[Value]) -> ValidationResult<()> {
    for item in value {
        if !matches!(item, Value::String(_) | Value::Number(_) | Value::Bool(_)) {
            return Err(ValidationError::InvalidLabelValue {
                key: key.to_string(),
                reason: "values must be strings, numbers or booleans".to_string(),
            });
        }
    }
    Ok(())
}

/// Check every key and value of a label set.
pub fn validate_labels(labels: &Labels) -> ValidationResult<()> {
    for (key, value) in labels {
        validate_label_key(key)?;
        validate_label_value(key, value)?;
    }
    Ok(())
}
