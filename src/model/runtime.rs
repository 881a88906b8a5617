//! Runtime entity and its input.

use crate::model::label::Labels;
use crate::model::name::EntityName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle condition of a runtime or application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCondition {
    #[default]
    Initial,
    Ready,
    Failed,
}

/// Current condition and when it was set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub condition: StatusCondition,
    pub timestamp: DateTime<Utc>,
}

impl Status {
    /// Status with the given condition, stamped now.
    pub fn new(condition: StatusCondition) -> Self {
        Self {
            condition,
            timestamp: Utc::now(),
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::new(StatusCondition::default())
    }
}

/// A registered runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Runtime {
    pub id: String,
    pub tenant: String,
    pub name: EntityName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Labels,
    pub status: Status,
}

/// Input of `registerRuntime` and `updateRuntime`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_condition: Option<StatusCondition>,
}

impl RuntimeInput {
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
