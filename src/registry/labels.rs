//! Label writes shared by runtimes and applications.

use super::entity::LabeledEntity;
use super::resource_types::LABEL_DEFINITION;
use super::{Registry, to_document};
use crate::error::{RegistryError, RegistryResult};
use crate::labels::LabelDefinition;
use crate::labels::scenarios::{SCENARIOS_KEY, default_scenarios_definition};
use crate::model::label::{validate_label_key, validate_label_value};
use crate::model::{Label, LabelFilter, Labels};
use crate::pagination::{Page, PageRequest, paginate};
use crate::storage::{ContentVersion, StorageError, StorageProvider, WriteBatch};
use crate::tenant::RequestContext;
use log::{info, trace};
use serde_json::Value;

impl<S: StorageProvider<Error = StorageError>> Registry<S> {
    /// Validate labels against the tenant's definitions and extend `batch`
    /// with a version guard on every definition consulted.
    ///
    /// Keys without a definition are guarded on the definition's absence. A
    /// missing `scenarios` definition is created in the same batch.
    pub(super) async fn guard_labels(
        &self,
        tenant_id: &str,
        labels: &Labels,
        mut batch: WriteBatch,
    ) -> RegistryResult<WriteBatch> {
        for (key, value) in labels {
            validate_label_key(key)?;
            validate_label_value(key, value)?;

            match self
                .load::<LabelDefinition>(tenant_id, LABEL_DEFINITION, key)
                .await?
            {
                Some((definition, version)) => {
                    definition.validate_value(value)?;
                    batch = batch.require_version(LABEL_DEFINITION, key, Some(version));
                }
                None if key == SCENARIOS_KEY => {
                    let definition = default_scenarios_definition();
                    definition.validate_value(value)?;
                    trace!("Creating default scenarios definition for tenant '{}'", tenant_id);
                    batch = batch
                        .require_version(LABEL_DEFINITION, key, None)
                        .put(LABEL_DEFINITION, key, to_document(&definition)?);
                }
                None => {
                    batch = batch.require_version(LABEL_DEFINITION, key, None);
                }
            }
        }
        Ok(batch)
    }

    pub(super) async fn set_entity_label<E: LabeledEntity>(
        &self,
        id: &str,
        key: &str,
        value: Vec<Value>,
        context: &RequestContext,
    ) -> RegistryResult<Label> {
        let tenant_id = self.tenant(context)?;
        validate_label_key(key)?;
        validate_label_value(key, &value)?;

        info!(
            "Setting label '{}' on {} '{}' for tenant '{}' (request: '{}')",
            key, E::RESOURCE_TYPE, id, tenant_id, context.request_id
        );

        let _guard = self.lock_entity(tenant_id, E::RESOURCE_TYPE, id).await;
        self.with_retries("setLabel", context, || {
            self.try_set_entity_label::<E>(tenant_id, id, key, &value)
        })
        .await
    }

    async fn try_set_entity_label<E: LabeledEntity>(
        &self,
        tenant_id: &str,
        id: &str,
        key: &str,
        value: &[Value],
    ) -> RegistryResult<Label> {
        let (mut entity, version) = self
            .load_existing::<E>(tenant_id, E::RESOURCE_TYPE, id)
            .await?;

        let mut written = Labels::new();
        written.insert(key.to_string(), value.to_vec());
        let batch =
            WriteBatch::new(tenant_id).require_version(E::RESOURCE_TYPE, id, Some(version));
        let batch = self.guard_labels(tenant_id, &written, batch).await?;

        entity.labels_mut().extend(written);
        self.commit(batch.put(E::RESOURCE_TYPE, id, to_document(&entity)?))
            .await?;

        Ok(Label::new(key, value.to_vec()))
    }

    pub(super) async fn delete_entity_label<E: LabeledEntity>(
        &self,
        id: &str,
        key: &str,
        context: &RequestContext,
    ) -> RegistryResult<Label> {
        let tenant_id = self.tenant(context)?;

        info!(
            "Deleting label '{}' from {} '{}' for tenant '{}' (request: '{}')",
            key, E::RESOURCE_TYPE, id, tenant_id, context.request_id
        );

        let _guard = self.lock_entity(tenant_id, E::RESOURCE_TYPE, id).await;
        self.with_retries("deleteLabel", context, || {
            self.try_delete_entity_label::<E>(tenant_id, id, key)
        })
        .await
    }

    async fn try_delete_entity_label<E: LabeledEntity>(
        &self,
        tenant_id: &str,
        id: &str,
        key: &str,
    ) -> RegistryResult<Label> {
        let (mut entity, version) = self
            .load_existing::<E>(tenant_id, E::RESOURCE_TYPE, id)
            .await?;

        let value = entity
            .labels_mut()
            .remove(key)
            .ok_or_else(|| RegistryError::not_found("Label", key))?;

        let batch = WriteBatch::new(tenant_id)
            .require_version(E::RESOURCE_TYPE, id, Some(version))
            .put(E::RESOURCE_TYPE, id, to_document(&entity)?);
        self.commit(batch).await?;

        Ok(Label::new(key, value))
    }

    /// List entities matching every filter, one page at a time.
    pub(super) async fn list_entities<E: LabeledEntity>(
        &self,
        filters: &[LabelFilter],
        page: &PageRequest,
        context: &RequestContext,
    ) -> RegistryResult<Page<E>> {
        let tenant_id = self.tenant(context)?;

        let entities: Vec<E> = self
            .load_all::<E>(tenant_id, E::RESOURCE_TYPE)
            .await?
            .into_iter()
            .map(|(entity, _)| entity)
            .filter(|entity| filters.iter().all(|filter| filter.matches(entity.labels())))
            .collect();

        Ok(paginate(
            entities,
            E::id,
            page,
            self.config.default_page_size,
            self.config.max_page_size,
        )?)
    }

    /// Entities of one type that carry a label key, with their versions.
    pub(super) async fn entities_with_label<E: LabeledEntity>(
        &self,
        tenant_id: &str,
        key: &str,
    ) -> RegistryResult<Vec<(E, ContentVersion)>> {
        Ok(self
            .load_all::<E>(tenant_id, E::RESOURCE_TYPE)
            .await?
            .into_iter()
            .filter(|(entity, _)| entity.labels().contains_key(key))
            .collect())
    }
}
