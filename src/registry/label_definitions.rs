//! Label definition operations.
//!
//! Changing a definition never leaves labels behind that the new definition
//! rejects: every entity carrying the key is validated and version-guarded in
//! the same batch that writes the definition.

use super::entity::LabeledEntity;
use super::resource_types::LABEL_DEFINITION;
use super::{Registry, to_document};
use crate::error::{RegistryError, RegistryResult, ValidationError};
use crate::labels::scenarios::SCENARIOS_KEY;
use crate::labels::{LabelDefinition, LabelDefinitionInput};
use crate::model::{Application, Runtime};
use crate::storage::{ContentVersion, StorageError, StorageProvider, WriteBatch};
use crate::tenant::RequestContext;
use log::{debug, info};

impl<S: StorageProvider<Error = StorageError>> Registry<S> {
    /// Create or replace a label definition.
    pub async fn create_label_definition(
        &self,
        input: LabelDefinitionInput,
        context: &RequestContext,
    ) -> RegistryResult<LabelDefinition> {
        self.put_label_definition("createLabelDefinition", input, false, context)
            .await
    }

    /// Replace an existing label definition.
    pub async fn update_label_definition(
        &self,
        input: LabelDefinitionInput,
        context: &RequestContext,
    ) -> RegistryResult<LabelDefinition> {
        self.put_label_definition("updateLabelDefinition", input, true, context)
            .await
    }

    pub async fn label_definition(
        &self,
        key: &str,
        context: &RequestContext,
    ) -> RegistryResult<Option<LabelDefinition>> {
        let tenant_id = self.tenant(context)?;
        Ok(self
            .load::<LabelDefinition>(tenant_id, LABEL_DEFINITION, key)
            .await?
            .map(|(definition, _)| definition))
    }

    /// All label definitions of the tenant, ordered by key.
    pub async fn label_definitions(
        &self,
        context: &RequestContext,
    ) -> RegistryResult<Vec<LabelDefinition>> {
        let tenant_id = self.tenant(context)?;
        Ok(self
            .load_all::<LabelDefinition>(tenant_id, LABEL_DEFINITION)
            .await?
            .into_iter()
            .map(|(definition, _)| definition)
            .collect())
    }

    /// Delete a label definition.
    ///
    /// Labels using the key are removed with it when `delete_related_labels`
    /// is set; otherwise their presence fails the operation.
    pub async fn delete_label_definition(
        &self,
        key: &str,
        delete_related_labels: bool,
        context: &RequestContext,
    ) -> RegistryResult<LabelDefinition> {
        let tenant_id = self.tenant(context)?;
        if key == SCENARIOS_KEY {
            return Err(ValidationError::ProtectedLabelDefinition {
                key: key.to_string(),
            }
            .into());
        }

        info!(
            "Deleting label definition '{}' (related labels: {}) for tenant '{}' (request: '{}')",
            key, delete_related_labels, tenant_id, context.request_id
        );

        self.with_retries("deleteLabelDefinition", context, || {
            self.try_delete_label_definition(tenant_id, key, delete_related_labels)
        })
        .await
    }

    async fn put_label_definition(
        &self,
        operation: &str,
        input: LabelDefinitionInput,
        must_exist: bool,
        context: &RequestContext,
    ) -> RegistryResult<LabelDefinition> {
        let tenant_id = self.tenant(context)?;
        let definition = input.into_definition()?;

        info!(
            "Writing label definition '{}' for tenant '{}' (request: '{}')",
            definition.key, tenant_id, context.request_id
        );

        self.with_retries(operation, context, || {
            self.try_put_label_definition(tenant_id, &definition, must_exist)
        })
        .await?;

        Ok(definition)
    }
}

impl<S: StorageProvider<Error = StorageError>> Registry<S> {
    async fn try_put_label_definition(
        &self,
        tenant_id: &str,
        definition: &LabelDefinition,
        must_exist: bool,
    ) -> RegistryResult<()> {
        let key = definition.key.as_str();
        let current = self
            .load::<LabelDefinition>(tenant_id, LABEL_DEFINITION, key)
            .await?;
        if must_exist && current.is_none() {
            return Err(RegistryError::not_found(LABEL_DEFINITION, key));
        }

        let mut batch = WriteBatch::new(tenant_id).require_version(
            LABEL_DEFINITION,
            key,
            current.map(|(_, version)| version),
        );
        batch = self
            .guard_existing_labels::<Runtime>(tenant_id, definition, batch)
            .await?;
        batch = self
            .guard_existing_labels::<Application>(tenant_id, definition, batch)
            .await?;

        self.commit(batch.put(LABEL_DEFINITION, key, to_document(definition)?))
            .await
    }

    /// Validate every existing label with the definition's key and guard the
    /// entities carrying them.
    async fn guard_existing_labels<E: LabeledEntity>(
        &self,
        tenant_id: &str,
        definition: &LabelDefinition,
        mut batch: WriteBatch,
    ) -> RegistryResult<WriteBatch> {
        for (entity, version) in self
            .entities_with_label::<E>(tenant_id, &definition.key)
            .await?
        {
            let value = entity.labels().get(&definition.key).map(Vec::as_slice);
            definition
                .validate_value(value.unwrap_or_default())
                .map_err(|error| ValidationError::LabelSchemaViolation {
                    key: definition.key.clone(),
                    details: format!(
                        "existing label on {} '{}' would be rejected: {}",
                        E::RESOURCE_TYPE,
                        entity.id(),
                        error
                    ),
                })?;
            batch = batch.require_version(E::RESOURCE_TYPE, entity.id(), Some(version));
        }
        Ok(batch)
    }

    async fn try_delete_label_definition(
        &self,
        tenant_id: &str,
        key: &str,
        delete_related_labels: bool,
    ) -> RegistryResult<LabelDefinition> {
        let (definition, version) = self
            .load_existing::<LabelDefinition>(tenant_id, LABEL_DEFINITION, key)
            .await?;

        let runtimes = self.entities_with_label::<Runtime>(tenant_id, key).await?;
        let applications = self
            .entities_with_label::<Application>(tenant_id, key)
            .await?;

        let count = runtimes.len() + applications.len();
        if count > 0 && !delete_related_labels {
            return Err(ValidationError::LabelDefinitionInUse {
                key: key.to_string(),
                count,
            }
            .into());
        }

        let batch = WriteBatch::new(tenant_id)
            .require_version(LABEL_DEFINITION, key, Some(version))
            .delete(LABEL_DEFINITION, key);
        let batch = strip_label(batch, runtimes, key)?;
        let batch = strip_label(batch, applications, key)?;
        self.commit(batch).await?;

        debug!("Removed label definition '{}' and {} labels", key, count);
        Ok(definition)
    }
}

/// Remove `key` from every entity, guarded on the version it was read at.
fn strip_label<E: LabeledEntity>(
    mut batch: WriteBatch,
    entities: Vec<(E, ContentVersion)>,
    key: &str,
) -> RegistryResult<WriteBatch> {
    for (mut entity, version) in entities {
        entity.labels_mut().remove(key);
        let id = entity.id().to_string();
        batch = batch
            .require_version(E::RESOURCE_TYPE, id.as_str(), Some(version))
            .put(E::RESOURCE_TYPE, id, to_document(&entity)?);
    }
    Ok(batch)
}
