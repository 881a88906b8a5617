//! Narrow JSON-schema subset used by label definitions.
//!
//! Supported keywords are `type` (`array`, `string`, `number`, `integer`,
//! `boolean`), `items`, `minItems`, `maxItems`, `uniqueItems` and `enum`.
//! The annotations `$schema`, `$id`, `title` and `description` are accepted
//! and ignored. Any other keyword makes the schema invalid, so a definition
//! can never silently promise a constraint that is not enforced.
//!
//! Label values are sequences. A schema whose top-level `type` is a scalar
//! type constrains each element; any other schema constrains the sequence as
//! a whole.

use crate::error::{ValidationError, ValidationResult};
use serde_json::Value;

const ANNOTATIONS: [&str; 4] = ["$schema", "$id", "title", "description"];

/// JSON type accepted by a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    Array,
    String,
    Number,
    Integer,
    Boolean,
}

impl SchemaType {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "array" => Some(SchemaType::Array),
            "string" => Some(SchemaType::String),
            "number" => Some(SchemaType::Number),
            "integer" => Some(SchemaType::Integer),
            "boolean" => Some(SchemaType::Boolean),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            SchemaType::Array => value.is_array(),
            SchemaType::String => value.is_string(),
            SchemaType::Number => value.is_number(),
            SchemaType::Integer => match value {
                Value::Number(n) => {
                    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
                }
                _ => false,
            },
            SchemaType::Boolean => value.is_boolean(),
        }
    }
}

/// A parsed label schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelSchema {
    pub schema_type: Option<SchemaType>,
    pub items: Option<Box<LabelSchema>>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,
    pub enum_values: Option<Vec<Value>>,
}

impl LabelSchema {
    /// Parse a schema document, rejecting keywords outside the subset.
    pub fn parse(key: &str, schema: &Value) -> ValidationResult<Self> {
        Self::parse_at(schema, "").map_err(|details| ValidationError::InvalidLabelSchema {
            key: key.to_string(),
            details,
        })
    }

    fn parse_at(schema: &Value, path: &str) -> Result<Self, String> {
        let object = schema
            .as_object()
            .ok_or_else(|| format!("schema{} must be a JSON object", path))?;
        let mut parsed = LabelSchema::default();

        for (keyword, value) in object {
            match keyword.as_str() {
                "type" => {
                    let name = value
                        .as_str()
                        .ok_or_else(|| format!("'type'{} must be a string", path))?;
                    parsed.schema_type = Some(
                        SchemaType::parse(name)
                            .ok_or_else(|| format!("unsupported type '{}'{}", name, path))?,
                    );
                }
                "items" => {
                    let items_path = if path.is_empty() {
                        " at items".to_string()
                    } else {
                        format!("{}.items", path)
                    };
                    parsed.items = Some(Box::new(Self::parse_at(value, &items_path)?));
                }
                "minItems" => parsed.min_items = Some(Self::parse_count(value, "minItems", path)?),
                "maxItems" => parsed.max_items = Some(Self::parse_count(value, "maxItems", path)?),
                "uniqueItems" => {
                    parsed.unique_items = value
                        .as_bool()
                        .ok_or_else(|| format!("'uniqueItems'{} must be a boolean", path))?;
                }
                "enum" => {
                    let values = value
                        .as_array()
                        .filter(|values| !values.is_empty())
                        .ok_or_else(|| format!("'enum'{} must be a non-empty array", path))?;
                    parsed.enum_values = Some(values.clone());
                }
                annotation if ANNOTATIONS.contains(&annotation) => {}
                other => return Err(format!("unsupported keyword '{}'{}", other, path)),
            }
        }

        if let (Some(min), Some(max)) = (parsed.min_items, parsed.max_items) {
            if min > max {
                return Err(format!("'minItems'{} is greater than 'maxItems'", path));
            }
        }

        Ok(parsed)
    }

    fn parse_count(value: &Value, keyword: &str, path: &str) -> Result<usize, String> {
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| format!("'{}'{} must be a non-negative integer", keyword, path))
    }

    /// Validate a label value against this schema.
    pub fn validate_label(&self, key: &str, value: &[Value]) -> ValidationResult<()> {
        let result = match self.schema_type {
            Some(scalar) if scalar != SchemaType::Array => {
                value.iter().try_for_each(|item| self.check(item))
            }
            _ => self.check(&Value::Array(value.to_vec())),
        };

        result.map_err(|details| ValidationError::LabelSchemaViolation {
            key: key.to_string(),
            details,
        })
    }

    fn check(&self, value: &Value) -> Result<(), String> {
        if let Some(expected) = self.schema_type.filter(|t| !t.accepts(value)) {
            return Err(format!("{} is not of type '{}'", value, expected.as_str()));
        }

        if self
            .enum_values
            .as_ref()
            .is_some_and(|allowed| !allowed.contains(value))
        {
            return Err(format!("{} is not one of the allowed values", value));
        }

        let Some(items) = value.as_array() else {
            return Ok(());
        };

        if let Some(min) = self.min_items.filter(|&min| items.len() < min) {
            return Err(format!("expected at least {} items, got {}", min, items.len()));
        }

        if let Some(max) = self.max_items.filter(|&max| items.len() > max) {
            return Err(format!("expected at most {} items, got {}", max, items.len()));
        }

        if self.unique_items {
            for (index, item) in items.iter().enumerate() {
                if items[..index].contains(item) {
                    return Err(format!("items must be unique, {} is repeated", item));
                }
            }
        }

        if let Some(item_schema) = &self.items {
            for item in items {
                item_schema.check(item)?;
            }
        }

        Ok(())
    }
}
