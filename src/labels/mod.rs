//! Label definitions and label validation.
//!
//! A tenant may define a label key with an optional schema. Every label
//! written under that key is validated against the schema; keys without a
//! definition, or with a definition without schema, accept any scalar
//! sequence.
//!
//! ```rust
//! use runtime_registry::labels::LabelDefinitionInput;
//! use serde_json::json;
//!
//! let definition = LabelDefinitionInput::new("region")
//!     .with_schema(json!({"type": "string", "enum": ["eu", "us"]}))
//!     .into_definition()
//!     .unwrap();
//! assert!(definition.validate_value(&[json!("eu")]).is_ok());
//! assert!(definition.validate_value(&[json!("ap")]).is_err());
//! ```

pub mod scenarios;
pub mod schema;

pub use scenarios::{DEFAULT_SCENARIO, SCENARIOS_KEY};
pub use schema::{LabelSchema, SchemaType};

use crate::error::ValidationResult;
use crate::model::label::validate_label_key;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tenant-scoped label definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDefinition {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

impl LabelDefinition {
    /// Parse the stored schema, if any.
    pub fn parsed_schema(&self) -> ValidationResult<Option<LabelSchema>> {
        self.schema
            .as_ref()
            .map(|schema| LabelSchema::parse(&self.key, schema))
            .transpose()
    }

    /// Validate a label value written under this definition's key.
    pub fn validate_value(&self, value: &[Value]) -> ValidationResult<()> {
        match self.parsed_schema()? {
            Some(schema) => schema.validate_label(&self.key, value),
            None => Ok(()),
        }
    }
}

/// Input of `createLabelDefinition` and `updateLabelDefinition`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDefinitionInput {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

impl LabelDefinitionInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Validate the key and schema and produce the definition to store.
    pub fn into_definition(self) -> ValidationResult<LabelDefinition> {
        validate_label_key(&self.key)?;

        let parsed = self
            .schema
            .as_ref()
            .map(|schema| LabelSchema::parse(&self.key, schema))
            .transpose()?;

        if self.key == SCENARIOS_KEY {
            scenarios::validate_scenarios_schema(parsed.as_ref())?;
        }

        Ok(LabelDefinition {
            key: self.key,
            schema: self.schema,
        })
    }
}
