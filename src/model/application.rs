//! Application entity, its API definitions and their inputs.

use crate::error::{ValidationError, ValidationResult};
use crate::model::label::Labels;
use crate::model::name::EntityName;
use crate::model::runtime::{Status, StatusCondition};
use serde::{Deserialize, Serialize};
use url::Url;

/// A registered application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub tenant: String,
    pub name: EntityName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Labels,
    pub status: Status,
    #[serde(default)]
    pub api_definitions: Vec<ApiDefinition>,
}

impl Application {
    pub fn api_definition(&self, api_id: &str) -> Option<&ApiDefinition> {
        self.api_definitions.iter().find(|api| api.id == api_id)
    }
}

/// An API exposed by an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDefinition {
    pub id: String,
    pub application_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "targetURL")]
    pub target_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// Input describing one API definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDefinitionInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "targetURL")]
    pub target_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl ApiDefinitionInput {
    pub fn new(name: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_url: target_url.into(),
            ..Default::default()
        }
    }

    /// Validate the input and turn it into a definition owned by `application_id`.
    pub fn into_definition(self, id: String, application_id: &str) -> ValidationResult<ApiDefinition> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::missing_required("apiDefinitions.name"));
        }
        validate_target_url(&self.target_url)?;

        Ok(ApiDefinition {
            id,
            application_id: application_id.to_string(),
            name: self.name,
            description: self.description,
            target_url: self.target_url,
            group: self.group,
        })
    }
}

/// Check that a target URL is an absolute http or https URL with a host.
pub fn validate_target_url(target_url: &str) -> ValidationResult<()> {
    let parsed = Url::parse(target_url)
        .map_err(|e| ValidationError::invalid_field("targetURL", e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::invalid_field(
            "targetURL",
            format!("scheme '{}' is not http or https", parsed.scheme()),
        ));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::invalid_field("targetURL", "must contain a host"));
    }

    Ok(())
}

/// Input of `registerApplication`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRegisterInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub api_definitions: Vec<ApiDefinitionInput>,
}

impl ApplicationRegisterInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: Vec<serde_json::Value>) -> Self {
        self.labels.insert(key.into(), value);
        self
    }

    pub fn with_api_definition(mut self, api: ApiDefinitionInput) -> Self {
        self.api_definitions.push(api);
        self
    }
}

/// Input of `updateApplication`. API definitions are managed separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationUpdateInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_condition: Option<StatusCondition>,
}

impl ApplicationUpdateInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: Vec<serde_json::Value>) -> Self {
        self.labels.insert(key.into(), value);
        self
    }

    pub fn with_status_condition(mut self, condition: StatusCondition) -> Self {
        self.status_condition = Some(condition);
        self
    }
}
