//! Lifecycle dispatcher
//!
//! Routes incoming lifecycle requests to the handler registered for the
//! addressed resource kind. The provider itself is an immutable context
//! built once by [`SupabaseProvider::configure`]; every call is independent
//! and the only shared state is the bound HTTP client and the cancellation
//! token, so concurrent calls need no locking.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use supabase_provider_core::codec::{decode, encode};
use supabase_provider_core::diff::DiffDecision;
use supabase_provider_core::error::{ProviderError, ProviderResult};
use supabase_provider_core::handler::{ResourceHandler, ResourceKind, ResourceState};
use supabase_provider_core::property::{PropertyBag, UnwrapContext};

use crate::client::SupabaseClient;
use crate::config::{ConfigOptions, ProviderConfig};
use crate::resources;

/// Invoke token for fetching generated TypeScript definitions of a project
pub const GET_TYPESCRIPT_TYPES: &str = "supabase:index:getTypescriptTypes";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypescriptTypesArgs {
    project_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TypescriptTypesResult {
    types: String,
}

/// The configured provider: handler registry plus the bound API client
pub struct SupabaseProvider {
    version: String,
    schema: Vec<u8>,
    client: Arc<SupabaseClient>,
    handlers: HashMap<ResourceKind, Box<dyn ResourceHandler>>,
    cancel: CancellationToken,
}

impl SupabaseProvider {
    /// Resolve configuration and bind the HTTP capability once. The returned
    /// provider is read-only for its lifetime.
    pub fn configure(
        options: ConfigOptions,
        version: impl Into<String>,
        schema: Vec<u8>,
    ) -> ProviderResult<Self> {
        let config = ProviderConfig::resolve(options)?;
        let cancel = CancellationToken::new();
        let client = Arc::new(SupabaseClient::new(
            config.server,
            config.token,
            cancel.clone(),
        )?);
        let handlers = resources::handlers(client.clone())
            .into_iter()
            .map(|handler| (handler.kind(), handler))
            .collect();
        Ok(Self {
            version: version.into(),
            schema,
            client,
            handlers,
            cancel,
        })
    }

    fn handler(&self, kind: &str) -> ProviderResult<&dyn ResourceHandler> {
        let kind = ResourceKind::parse(kind)?;
        self.handlers
            .get(&kind)
            .map(|handler| handler.as_ref())
            .ok_or_else(|| ProviderError::UnsupportedResourceKind(kind.token().to_string()))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Validate resource inputs. Inputs pass through unmodified so the
    /// engine renders diffs against the original representation.
    pub fn check(&self, news: PropertyBag) -> PropertyBag {
        news
    }

    /// Diff two property bags under the kind's policy
    pub fn diff(
        &self,
        kind: &str,
        olds: &PropertyBag,
        news: &PropertyBag,
    ) -> ProviderResult<DiffDecision> {
        tracing::debug!(kind, "diff");
        Ok(self.handler(kind)?.diff(olds, news))
    }

    /// Create a resource; preview synthesizes outputs without remote calls
    pub async fn create(
        &self,
        kind: &str,
        input: &PropertyBag,
        preview: bool,
    ) -> ProviderResult<ResourceState> {
        tracing::debug!(kind, preview, "create");
        self.handler(kind)?.create(input, preview).await
    }

    /// Read live state; an empty result signals the resource no longer exists
    pub async fn read(
        &self,
        kind: &str,
        id: &str,
        input: &PropertyBag,
    ) -> ProviderResult<ResourceState> {
        tracing::debug!(kind, id, "read");
        self.handler(kind)?.read(id, input).await
    }

    /// Update in place; kinds without the capability fail with instructions
    /// to remediate out of band.
    pub async fn update(
        &self,
        kind: &str,
        olds: &PropertyBag,
        news: &PropertyBag,
        preview: bool,
    ) -> ProviderResult<PropertyBag> {
        tracing::debug!(kind, preview, "update");
        let handler = self.handler(kind)?;
        let updater = handler
            .updater()
            .ok_or_else(|| ProviderError::unsupported_operation(handler.kind().token(), "update"))?;
        updater.update(olds, news, preview).await
    }

    /// Delete; any upstream error means the remote object still exists
    pub async fn delete(&self, kind: &str, id: &str, input: &PropertyBag) -> ProviderResult<()> {
        tracing::debug!(kind, id, "delete");
        let handler = self.handler(kind)?;
        let deleter = handler
            .deleter()
            .ok_or_else(|| ProviderError::unsupported_operation(handler.kind().token(), "delete"))?;
        deleter.delete(id, input).await
    }

    /// Named utility calls outside the CRUD model
    pub async fn invoke(&self, token: &str, args: &PropertyBag) -> ProviderResult<PropertyBag> {
        tracing::debug!(token, "invoke");
        match token {
            GET_TYPESCRIPT_TYPES => {
                let args: TypescriptTypesArgs = decode(args, UnwrapContext::default())?;
                let types = self.client.typescript_types(&args.project_id).await?;
                encode(&TypescriptTypesResult { types: types.types })
            }
            other => Err(ProviderError::UnknownInvokeToken(other.to_string())),
        }
    }

    /// The schema blob, returned verbatim; only version 0 exists
    pub fn get_schema(&self, version: u32) -> ProviderResult<&[u8]> {
        if version != 0 {
            return Err(ProviderError::UnsupportedSchemaVersion(version));
        }
        Ok(&self.schema)
    }

    /// Best-effort cooperative cancellation: trips the shared token that
    /// every in-flight client call observes. Non-blocking.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}
