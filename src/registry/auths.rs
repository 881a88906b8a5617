//! Credential bindings between API definitions and runtimes.

use super::resource_types::{API_DEFINITION, API_RUNTIME_AUTH, RUNTIME};
use super::{Registry, to_document};
use crate::error::{RegistryError, RegistryResult};
use crate::model::{ApiRuntimeAuth, Auth, AuthInput};
use crate::storage::{StorageError, StorageKey, StorageProvider, WriteBatch};
use crate::tenant::RequestContext;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Stored form of a binding. The owning application is kept so that
/// unregistering it can remove the binding in the same batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredApiAuth {
    api_id: String,
    runtime_id: String,
    application_id: String,
    auth: Auth,
}

impl From<StoredApiAuth> for ApiRuntimeAuth {
    fn from(stored: StoredApiAuth) -> Self {
        ApiRuntimeAuth {
            api_id: stored.api_id,
            runtime_id: stored.runtime_id,
            auth: Some(stored.auth),
        }
    }
}

fn binding_id(api_id: &str, runtime_id: &str) -> String {
    format!("{}:{}", api_id, runtime_id)
}

impl<S: StorageProvider<Error = StorageError>> Registry<S> {
    /// Set the credential a runtime uses to call an API, replacing any
    /// previous one.
    pub async fn set_api_auth(
        &self,
        api_id: &str,
        runtime_id: &str,
        input: AuthInput,
        context: &RequestContext,
    ) -> RegistryResult<ApiRuntimeAuth> {
        let tenant_id = self.tenant(context)?;
        let auth = Auth::try_from(input)?;

        info!(
            "Setting {} auth of API '{}' for runtime '{}' in tenant '{}' (request: '{}')",
            auth.credential.kind(),
            api_id,
            runtime_id,
            tenant_id,
            context.request_id
        );

        let _guard = self
            .lock_entity(tenant_id, API_RUNTIME_AUTH, &binding_id(api_id, runtime_id))
            .await;
        self.with_retries("setAPIAuth", context, || {
            self.try_set_api_auth(tenant_id, api_id, runtime_id, &auth)
        })
        .await?;

        Ok(ApiRuntimeAuth {
            api_id: api_id.to_string(),
            runtime_id: runtime_id.to_string(),
            auth: Some(auth),
        })
    }

    /// Remove a binding and return it.
    pub async fn delete_api_auth(
        &self,
        api_id: &str,
        runtime_id: &str,
        context: &RequestContext,
    ) -> RegistryResult<ApiRuntimeAuth> {
        let tenant_id = self.tenant(context)?;

        info!(
            "Deleting auth of API '{}' for runtime '{}' in tenant '{}' (request: '{}')",
            api_id, runtime_id, tenant_id, context.request_id
        );

        let _guard = self
            .lock_entity(tenant_id, API_RUNTIME_AUTH, &binding_id(api_id, runtime_id))
            .await;
        self.with_retries("deleteAPIAuth", context, || {
            self.try_delete_api_auth(tenant_id, api_id, runtime_id)
        })
        .await
    }

    /// The binding of an API and a runtime; `auth` is `None` when no
    /// credential has been set.
    pub async fn api_auth(
        &self,
        api_id: &str,
        runtime_id: &str,
        context: &RequestContext,
    ) -> RegistryResult<ApiRuntimeAuth> {
        let tenant_id = self.tenant(context)?;
        self.require_api_and_runtime(tenant_id, api_id, runtime_id)
            .await?;

        let binding = self
            .load::<StoredApiAuth>(tenant_id, API_RUNTIME_AUTH, &binding_id(api_id, runtime_id))
            .await?;

        Ok(match binding {
            Some((stored, _)) => stored.into(),
            None => ApiRuntimeAuth {
                api_id: api_id.to_string(),
                runtime_id: runtime_id.to_string(),
                auth: None,
            },
        })
    }

    /// All bindings of an API, ordered by runtime ID.
    pub async fn api_auths(
        &self,
        api_id: &str,
        context: &RequestContext,
    ) -> RegistryResult<Vec<ApiRuntimeAuth>> {
        let tenant_id = self.tenant(context)?;
        self.api_definition_index(tenant_id, api_id).await?;

        let prefix = StorageKey::prefix(tenant_id, API_RUNTIME_AUTH);
        self.storage
            .find_by_attribute(prefix, "apiId", api_id)
            .await?
            .into_iter()
            .map(|(_, data)| -> RegistryResult<ApiRuntimeAuth> {
                let stored: StoredApiAuth = serde_json::from_value(data)?;
                Ok(stored.into())
            })
            .collect()
    }
}

impl<S: StorageProvider<Error = StorageError>> Registry<S> {
    async fn require_api_and_runtime(
        &self,
        tenant_id: &str,
        api_id: &str,
        runtime_id: &str,
    ) -> RegistryResult<String> {
        let index = self.api_definition_index(tenant_id, api_id).await?;
        if !self.exists(tenant_id, RUNTIME, runtime_id).await? {
            return Err(RegistryError::not_found(RUNTIME, runtime_id));
        }
        Ok(index.application_id)
    }

    async fn try_set_api_auth(
        &self,
        tenant_id: &str,
        api_id: &str,
        runtime_id: &str,
        auth: &Auth,
    ) -> RegistryResult<()> {
        let application_id = self
            .require_api_and_runtime(tenant_id, api_id, runtime_id)
            .await?;

        let stored = StoredApiAuth {
            api_id: api_id.to_string(),
            runtime_id: runtime_id.to_string(),
            application_id,
            auth: auth.clone(),
        };

        // The API or runtime may be removed between the lookups and the commit
        let batch = WriteBatch::new(tenant_id)
            .require_exists(API_DEFINITION, api_id)
            .require_exists(RUNTIME, runtime_id)
            .put(
                API_RUNTIME_AUTH,
                binding_id(api_id, runtime_id),
                to_document(&stored)?,
            );
        self.commit(batch).await
    }

    async fn try_delete_api_auth(
        &self,
        tenant_id: &str,
        api_id: &str,
        runtime_id: &str,
    ) -> RegistryResult<ApiRuntimeAuth> {
        self.require_api_and_runtime(tenant_id, api_id, runtime_id)
            .await?;

        let id = binding_id(api_id, runtime_id);
        let (stored, version) = self
            .load_existing::<StoredApiAuth>(tenant_id, API_RUNTIME_AUTH, &id)
            .await?;

        let batch = WriteBatch::new(tenant_id)
            .require_version(API_RUNTIME_AUTH, id.as_str(), Some(version))
            .delete(API_RUNTIME_AUTH, id.as_str());
        self.commit(batch).await?;

        debug!("Deleted {} auth binding '{}'", stored.auth.credential.kind(), id);
        Ok(stored.into())
    }
}
