//! Organization resource
//!
//! Created by name; read scans the full organization listing and matches by
//! id. The management API offers no update or delete for organizations, so
//! neither capability is registered.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use supabase_provider_core::codec::{decode, encode};
use supabase_provider_core::error::ProviderResult;
use supabase_provider_core::handler::{BoxFuture, ResourceHandler, ResourceKind, ResourceState};
use supabase_provider_core::property::{PropertyBag, UnwrapContext};

use crate::client::{CreateOrganizationBody, SupabaseClient};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrganizationInputs {
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrganizationOutputs {
    name: String,
}

pub struct OrganizationHandler {
    client: Arc<SupabaseClient>,
}

impl OrganizationHandler {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }
}

impl ResourceHandler for OrganizationHandler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Organization
    }

    fn create(
        &self,
        input: &PropertyBag,
        preview: bool,
    ) -> BoxFuture<'_, ProviderResult<ResourceState>> {
        let input = input.clone();
        Box::pin(async move {
            let inputs: OrganizationInputs = decode(&input, UnwrapContext::preview(preview))?;
            if preview {
                let outputs = encode(&OrganizationOutputs { name: inputs.name })?;
                return Ok(ResourceState::pending(outputs));
            }
            let organization = self
                .client
                .create_organization(&CreateOrganizationBody { name: inputs.name })
                .await?;
            let outputs = encode(&OrganizationOutputs {
                name: organization.name,
            })?;
            Ok(ResourceState::new(organization.id, outputs))
        })
    }

    fn read(&self, id: &str, _input: &PropertyBag) -> BoxFuture<'_, ProviderResult<ResourceState>> {
        let id = id.to_string();
        Box::pin(async move {
            let organizations = self.client.list_organizations().await?;
            match organizations.into_iter().find(|org| org.id == id) {
                Some(organization) => {
                    let outputs = encode(&OrganizationOutputs {
                        name: organization.name,
                    })?;
                    Ok(ResourceState::new(organization.id, outputs))
                }
                None => Ok(ResourceState::not_found()),
            }
        })
    }
}
