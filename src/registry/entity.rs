//! Common view of the labelled entity types.

use crate::model::{Application, Labels, Runtime};
use crate::registry::resource_types;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// An entity stored under its own resource type that carries labels.
pub(crate) trait LabeledEntity: Serialize + DeserializeOwned + Send + Sync {
    const RESOURCE_TYPE: &'static str;

    fn id(&self) -> &str;
    fn labels(&self) -> &Labels;
    fn labels_mut(&mut self) -> &mut Labels;
}

impl LabeledEntity for Runtime {
    const RESOURCE_TYPE: &'static str = resource_types::RUNTIME;

    fn id(&self) -> &str {
        &self.id
    }

    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn labels_mut(&mut self) -> &mut Labels {
        &mut self.labels
    }
}

impl LabeledEntity for Application {
    const RESOURCE_TYPE: &'static str = resource_types::APPLICATION;

    fn id(&self) -> &str {
        &self.id
    }

    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn labels_mut(&mut self) -> &mut Labels {
        &mut self.labels
    }
}
