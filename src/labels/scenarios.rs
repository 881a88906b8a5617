//! The built-in `scenarios` label.
//!
//! Scenarios group runtimes and applications: a runtime sees the
//! applications that share at least one scenario with it. Every tenant's
//! scenarios definition must allow the `DEFAULT` scenario, which new
//! entities receive when they are registered without one.

use crate::error::{ValidationError, ValidationResult};
use crate::labels::schema::{LabelSchema, SchemaType};
use crate::labels::LabelDefinition;
use crate::model::label::Labels;
use serde_json::{Value, json};

pub const SCENARIOS_KEY: &str = "scenarios";
pub const DEFAULT_SCENARIO: &str = "DEFAULT";

/// Label value assigned to entities registered without scenarios.
pub fn default_scenarios_value() -> Vec<Value> {
    vec![Value::String(DEFAULT_SCENARIO.to_string())]
}

/// Schema of the definition created for tenants that have none.
pub fn default_scenarios_schema() -> Value {
    json!({
        "type": "array",
        "minItems": 1,
        "uniqueItems": true,
        "items": {
            "type": "string",
            "enum": [DEFAULT_SCENARIO]
        }
    })
}

pub fn default_scenarios_definition() -> LabelDefinition {
    LabelDefinition {
        key: SCENARIOS_KEY.to_string(),
        schema: Some(default_scenarios_schema()),
    }
}

/// Scenarios of an entity, empty when it has none.
pub fn scenarios_of(labels: &Labels) -> &[Value] {
    labels
        .get(SCENARIOS_KEY)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Whether two label sets share at least one scenario.
pub fn share_scenario(a: &Labels, b: &Labels) -> bool {
    let theirs = scenarios_of(b);
    scenarios_of(a).iter().any(|scenario| theirs.contains(scenario))
}

/// A scenarios schema must be an array of string enums that includes `DEFAULT`.
pub(crate) fn validate_scenarios_schema(schema: Option<&LabelSchema>) -> ValidationResult<()> {
    let invalid = |details: &str| ValidationError::InvalidLabelSchema {
        key: SCENARIOS_KEY.to_string(),
        details: details.to_string(),
    };

    let schema = schema.ok_or_else(|| invalid("a schema is required"))?;
    if schema.schema_type != Some(SchemaType::Array) {
        return Err(invalid("type must be 'array'"));
    }

    let items = schema
        .items
        .as_deref()
        .ok_or_else(|| invalid("'items' must be defined"))?;
    if items.schema_type != Some(SchemaType::String) {
        return Err(invalid("items type must be 'string'"));
    }

    let default = Value::String(DEFAULT_SCENARIO.to_string());
    let allowed = items
        .enum_values
        .as_ref()
        .ok_or_else(|| invalid("items must define an 'enum'"))?;
    if !allowed.contains(&default) {
        return Err(invalid("items enum must contain 'DEFAULT'"));
    }

    Ok(())
}
