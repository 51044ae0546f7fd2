//! Secret resource
//!
//! Secrets have no remote-assigned id; the name is the id. Create posts a
//! list-of-one, read scans the project's secret listing, delete removes by
//! name. The secret value is never echoed into create outputs. No in-place
//! update: a changed value is re-applied by the engine as a fresh create.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use supabase_provider_core::codec::{decode, encode};
use supabase_provider_core::error::{ProviderError, ProviderResult};
use supabase_provider_core::handler::{
    BoxFuture, DeleteResource, ResourceHandler, ResourceKind, ResourceState,
};
use supabase_provider_core::property::{PropertyBag, UnwrapContext};

use crate::client::{CreateSecretBody, SupabaseClient};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretInputs {
    project_id: String,
    name: String,
    // Unknown during preview when sourced from another resource's output;
    // required once the create actually posts.
    #[serde(default)]
    value: Option<String>,
}

/// Addressing keys for read/delete; the value is not needed to address
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretAddress {
    project_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SecretOutputs {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

pub struct SecretHandler {
    client: Arc<SupabaseClient>,
}

impl SecretHandler {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

impl ResourceHandler for SecretHandler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Secret
    }

    fn create(
        &self,
        input: &PropertyBag,
        preview: bool,
    ) -> BoxFuture<'_, ProviderResult<ResourceState>> {
        let input = input.clone();
        Box::pin(async move {
            let inputs: SecretInputs = decode(&input, UnwrapContext::preview(preview))?;
            let outputs = encode(&SecretOutputs {
                name: inputs.name.clone(),
                value: None,
            })?;
            if preview {
                return Ok(ResourceState::pending(outputs));
            }
            let value = inputs.value.ok_or_else(|| {
                ProviderError::SchemaMismatch("missing required field `value`".to_string())
            })?;
            self.client
                .create_secrets(
                    &inputs.project_id,
                    &[CreateSecretBody {
                        name: inputs.name.clone(),
                        value,
                    }],
                )
                .await?;
            Ok(ResourceState::new(inputs.name, outputs))
        })
    }

    fn read(&self, id: &str, input: &PropertyBag) -> BoxFuture<'_, ProviderResult<ResourceState>> {
        let id = id.to_string();
        let input = input.clone();
        Box::pin(async move {
            let address: SecretAddress = decode(&input, UnwrapContext::default())?;
            let secrets = self.client.list_secrets(&address.project_id).await?;
            match secrets.into_iter().find(|secret| secret.name == id) {
                Some(secret) => {
                    let outputs = encode(&SecretOutputs {
                        name: secret.name.clone(),
                        value: secret.value,
                    })?;
                    Ok(ResourceState::new(secret.name, outputs))
                }
                None => Ok(ResourceState::not_found()),
            }
        })
    }

    fn deleter(&self) -> Option<&dyn DeleteResource> {
        Some(self)
    }
}

impl DeleteResource for SecretHandler {
    fn delete(&self, id: &str, input: &PropertyBag) -> BoxFuture<'_, ProviderResult<()>> {
        let id = id.to_string();
        let input = input.clone();
        Box::pin(async move {
            let address: SecretAddress = decode(&input, UnwrapContext::default())?;
            self.client
                .delete_secrets(&address.project_id, &[id])
                .await
        })
    }
}
