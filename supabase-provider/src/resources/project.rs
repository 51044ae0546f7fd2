//! Project resource
//!
//! Created under an organization in a fixed region; read scans the project
//! listing and matches by id. After any successful create or read the
//! handler decorates the outputs with connection metadata the management API
//! does not return yet (fixed postgres credentials host, ports, endpoint) -
//! derived from the project id and provisional until exposed upstream.
//!
//! A region change forces destroy-and-recreate; everything else listed in the
//! policy updates in place from the engine's point of view.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use supabase_provider_core::codec::{decode, encode};
use supabase_provider_core::diff::{DiffDecision, KeyPolicy};
use supabase_provider_core::error::{ProviderError, ProviderResult};
use supabase_provider_core::handler::{BoxFuture, ResourceHandler, ResourceKind, ResourceState};
use supabase_provider_core::property::{PropertyBag, PropertyValue, UnwrapContext};

use crate::client::{CreateProjectBody, SupabaseClient};

const DIFF_POLICY: KeyPolicy = KeyPolicy {
    update: &["name", "dbPass", "organizationId", "kpsEnabled", "plan"],
    replace: &["region"],
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectInputs {
    name: String,
    organization_id: String,
    region: String,
    // Often unknown during preview (sourced from a not-yet-created resource),
    // so only required when the create actually goes out.
    #[serde(default)]
    db_pass: Option<String>,
    #[serde(default)]
    plan: Option<String>,
    #[serde(default)]
    kps_enabled: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectOutputs {
    name: String,
    organization_id: String,
    region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<String>,
}

pub struct ProjectHandler {
    client: Arc<SupabaseClient>,
}

impl ProjectHandler {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self { client }
    }

    /// Connection metadata not returned by the management API.
    /// TODO: derive from the API once it exposes connection info.
    fn decorate(outputs: &mut PropertyBag, id: &str) {
        outputs.insert("dbUsername".to_string(), PropertyValue::from("postgres"));
        outputs.insert(
            "dbHost".to_string(),
            PropertyValue::from(format!("db.{id}.supabase.co")),
        );
        outputs.insert("dbPort".to_string(), PropertyValue::from(5432i64));
        outputs.insert("dbName".to_string(), PropertyValue::from("postgres"));
        outputs.insert("dbPoolingPort".to_string(), PropertyValue::from(6543i64));
        outputs.insert(
            "endpoint".to_string(),
            PropertyValue::from(format!("https://{id}.supabase.co")),
        );
    }
}

impl ResourceHandler for ProjectHandler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Project
    }

    fn create(
        &self,
        input: &PropertyBag,
        preview: bool,
    ) -> BoxFuture<'_, ProviderResult<ResourceState>> {
        let input = input.clone();
        Box::pin(async move {
            let inputs: ProjectInputs = decode(&input, UnwrapContext::preview(preview))?;
            if preview {
                let outputs = encode(&ProjectOutputs {
                    name: inputs.name,
                    organization_id: inputs.organization_id,
                    region: inputs.region,
                    created_at: None,
                })?;
                return Ok(ResourceState::pending(outputs));
            }
            let db_pass = inputs.db_pass.ok_or_else(|| {
                ProviderError::SchemaMismatch("missing required field `dbPass`".to_string())
            })?;
            let project = self
                .client
                .create_project(&CreateProjectBody {
                    name: inputs.name,
                    organization_id: inputs.organization_id,
                    db_pass,
                    region: inputs.region,
                    plan: inputs.plan,
                    kps_enabled: inputs.kps_enabled,
                })
                .await?;
            let mut outputs = encode(&ProjectOutputs {
                name: project.name,
                organization_id: project.organization_id,
                region: project.region,
                created_at: project.created_at,
            })?;
            Self::decorate(&mut outputs, &project.id);
            Ok(ResourceState::new(project.id, outputs))
        })
    }

    fn read(&self, id: &str, _input: &PropertyBag) -> BoxFuture<'_, ProviderResult<ResourceState>> {
        let id = id.to_string();
        Box::pin(async move {
            let projects = self.client.list_projects().await?;
            match projects.into_iter().find(|project| project.id == id) {
                Some(project) => {
                    let mut outputs = encode(&ProjectOutputs {
                        name: project.name,
                        organization_id: project.organization_id,
                        region: project.region,
                        created_at: project.created_at,
                    })?;
                    Self::decorate(&mut outputs, &project.id);
                    Ok(ResourceState::new(project.id, outputs))
                }
                None => Ok(ResourceState::not_found()),
            }
        })
    }

    fn diff(&self, old: &PropertyBag, new: &PropertyBag) -> DiffDecision {
        DIFF_POLICY.decide(old, new)
    }
}
