//! Edge function resource
//!
//! The only kind with the full lifecycle: functions are addressed by project
//! id and slug (their natural key), created with the source as a raw payload,
//! patched in place, and deleted by slug. Read fetches the function and its
//! deployed source; the source is part of the observable output. A slug
//! change renames the address and therefore forces destroy-and-recreate.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use supabase_provider_core::codec::{decode, encode};
use supabase_provider_core::diff::{DiffDecision, KeyPolicy};
use supabase_provider_core::error::{ProviderError, ProviderResult};
use supabase_provider_core::handler::{
    BoxFuture, DeleteResource, ResourceHandler, ResourceKind, ResourceState, UpdateResource,
};
use supabase_provider_core::property::{PropertyBag, UnwrapContext};

use crate::client::{CreateFunctionParams, SupabaseClient, UpdateFunctionParams};

/// Status reported for a function that has not been deployed yet
const PREVIEW_STATUS: &str = "ACTIVE";

const DIFF_POLICY: KeyPolicy = KeyPolicy {
    update: &["name", "body", "verifyJwt"],
    replace: &["slug"],
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FunctionInputs {
    project_id: String,
    slug: String,
    name: String,
    // The source may still be unknown during preview; required at deploy time
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    verify_jwt: Option<bool>,
}

impl FunctionInputs {
    fn require_body(body: Option<String>) -> ProviderResult<String> {
        body.ok_or_else(|| {
            ProviderError::SchemaMismatch("missing required field `body`".to_string())
        })
    }
}

/// Addressing keys carried in the prior state for read/update/delete
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FunctionAddress {
    project_id: String,
    slug: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct FunctionOutputs {
    name: String,
    slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verify_jwt: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<String>,
}

pub struct FunctionHandler {
    client: Arc<SupabaseClient>,
}

impl FunctionHandler {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

impl ResourceHandler for FunctionHandler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Function
    }

    fn create(
        &self,
        input: &PropertyBag,
        preview: bool,
    ) -> BoxFuture<'_, ProviderResult<ResourceState>> {
        let input = input.clone();
        Box::pin(async move {
            let inputs: FunctionInputs = decode(&input, UnwrapContext::preview(preview))?;
            if preview {
                let outputs = encode(&FunctionOutputs {
                    name: inputs.name,
                    slug: inputs.slug,
                    status: Some(PREVIEW_STATUS.to_string()),
                    verify_jwt: inputs.verify_jwt,
                    ..Default::default()
                })?;
                return Ok(ResourceState::pending(outputs));
            }
            let body = FunctionInputs::require_body(inputs.body)?;
            let function = self
                .client
                .create_function(
                    &inputs.project_id,
                    &CreateFunctionParams {
                        slug: inputs.slug,
                        name: inputs.name,
                        verify_jwt: inputs.verify_jwt,
                    },
                    &body,
                )
                .await?;
            let outputs = encode(&FunctionOutputs {
                name: function.name,
                slug: function.slug,
                status: Some(function.status),
                verify_jwt: function.verify_jwt,
                version: function.version,
                body: Some(body),
            })?;
            Ok(ResourceState::new(function.id, outputs))
        })
    }

    fn read(&self, _id: &str, input: &PropertyBag) -> BoxFuture<'_, ProviderResult<ResourceState>> {
        let input = input.clone();
        Box::pin(async move {
            let address: FunctionAddress = decode(&input, UnwrapContext::default())?;
            let Some(function) = self
                .client
                .get_function(&address.project_id, &address.slug)
                .await?
            else {
                return Ok(ResourceState::not_found());
            };
            let body = self
                .client
                .get_function_body(&address.project_id, &address.slug)
                .await?;
            let outputs = encode(&FunctionOutputs {
                name: function.name,
                slug: function.slug,
                status: Some(function.status),
                verify_jwt: function.verify_jwt,
                version: function.version,
                body: Some(body),
            })?;
            Ok(ResourceState::new(function.id, outputs))
        })
    }

    fn diff(&self, old: &PropertyBag, new: &PropertyBag) -> DiffDecision {
        DIFF_POLICY.decide(old, new)
    }

    fn updater(&self) -> Option<&dyn UpdateResource> {
        Some(self)
    }

    fn deleter(&self) -> Option<&dyn DeleteResource> {
        Some(self)
    }
}

impl UpdateResource for FunctionHandler {
    fn update(
        &self,
        old: &PropertyBag,
        new: &PropertyBag,
        preview: bool,
    ) -> BoxFuture<'_, ProviderResult<PropertyBag>> {
        let old = old.clone();
        let new = new.clone();
        Box::pin(async move {
            // The prior state owns the address; the new input carries the
            // desired configuration and source.
            let address: FunctionAddress = decode(&old, UnwrapContext::preview(preview))?;
            let inputs: FunctionInputs = decode(&new, UnwrapContext::preview(preview))?;
            if preview {
                return encode(&FunctionOutputs {
                    name: inputs.name,
                    slug: address.slug,
                    verify_jwt: inputs.verify_jwt,
                    body: inputs.body,
                    ..Default::default()
                });
            }
            let body = FunctionInputs::require_body(inputs.body)?;
            let function = self
                .client
                .update_function(
                    &address.project_id,
                    &address.slug,
                    &UpdateFunctionParams {
                        name: Some(inputs.name),
                        verify_jwt: inputs.verify_jwt,
                    },
                    &body,
                )
                .await?;
            encode(&FunctionOutputs {
                name: function.name,
                slug: function.slug,
                status: Some(function.status),
                verify_jwt: function.verify_jwt,
                version: function.version,
                body: Some(body),
            })
        })
    }
}

impl DeleteResource for FunctionHandler {
    fn delete(&self, _id: &str, input: &PropertyBag) -> BoxFuture<'_, ProviderResult<()>> {
        let input = input.clone();
        Box::pin(async move {
            let address: FunctionAddress = decode(&input, UnwrapContext::default())?;
            self.client
                .delete_function(&address.project_id, &address.slug)
                .await
        })
    }
}
