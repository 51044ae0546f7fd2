//! Resource handler - traits abstracting per-kind lifecycle operations
//!
//! Each resource kind implements [`ResourceHandler`]. Update and delete are
//! optional capabilities a handler opts into by overriding [`ResourceHandler::updater`]
//! and [`ResourceHandler::deleter`]; the dispatcher turns their absence into
//! an `UnsupportedOperation` error. Extending the provider to a new kind
//! means a new handler and a registry entry, never new dispatcher logic.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::diff::{DiffDecision, diff_any_key};
use crate::error::{ProviderError, ProviderResult};
use crate::property::PropertyBag;

/// Return type for async handler operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The resource kinds this provider manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Organization,
    Project,
    Function,
    Secret,
}

impl ResourceKind {
    /// Namespaced kind token, `<provider>:<module>:<Kind>`
    pub fn token(&self) -> &'static str {
        match self {
            ResourceKind::Organization => "supabase:index:Organization",
            ResourceKind::Project => "supabase:index:Project",
            ResourceKind::Function => "supabase:project:Function",
            ResourceKind::Secret => "supabase:project:Secret",
        }
    }

    /// Parse a kind token; unknown tokens are an error naming the token
    pub fn parse(token: &str) -> ProviderResult<Self> {
        match token {
            "supabase:index:Organization" => Ok(ResourceKind::Organization),
            "supabase:index:Project" => Ok(ResourceKind::Project),
            "supabase:project:Function" => Ok(ResourceKind::Function),
            "supabase:project:Secret" => Ok(ResourceKind::Secret),
            other => Err(ProviderError::UnsupportedResourceKind(other.to_string())),
        }
    }

    pub fn all() -> [ResourceKind; 4] {
        [
            ResourceKind::Organization,
            ResourceKind::Project,
            ResourceKind::Function,
            ResourceKind::Secret,
        ]
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Live state of a single resource: remote-assigned id plus observable outputs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceState {
    /// Remote-assigned id, stable for the resource's lifetime.
    /// Empty during preview (unknown until real creation) and for reads of
    /// resources that no longer exist.
    pub id: String,
    pub outputs: PropertyBag,
}

impl ResourceState {
    pub fn new(id: impl Into<String>, outputs: PropertyBag) -> Self {
        Self {
            id: id.into(),
            outputs,
        }
    }

    /// Read result for a resource that no longer exists (not an error)
    pub fn not_found() -> Self {
        Self::default()
    }

    /// Preview result: plausible outputs, id not yet assigned
    pub fn pending(outputs: PropertyBag) -> Self {
        Self {
            id: String::new(),
            outputs,
        }
    }

    pub fn exists(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Lifecycle operations for one resource kind
pub trait ResourceHandler: Send + Sync {
    /// The kind this handler owns
    fn kind(&self) -> ResourceKind;

    /// Create the resource. With `preview` set, the remote API must not be
    /// called; outputs are synthesized from the input and the id left empty.
    fn create(&self, input: &PropertyBag, preview: bool)
    -> BoxFuture<'_, ProviderResult<ResourceState>>;

    /// Fetch the current remote state. Returns [`ResourceState::not_found`]
    /// when the resource is gone.
    fn read(&self, id: &str, input: &PropertyBag) -> BoxFuture<'_, ProviderResult<ResourceState>>;

    /// Diff policy for this kind; defaults to flagging any changed key
    fn diff(&self, old: &PropertyBag, new: &PropertyBag) -> DiffDecision {
        diff_any_key(old, new)
    }

    /// In-place update capability, if this kind offers one
    fn updater(&self) -> Option<&dyn UpdateResource> {
        None
    }

    /// Delete capability, if this kind offers one
    fn deleter(&self) -> Option<&dyn DeleteResource> {
        None
    }
}

/// Optional in-place update capability
pub trait UpdateResource: Send + Sync {
    /// Apply `new` on top of the state described by `old`. With `preview`
    /// set, outputs are synthesized from the new input plus the prior
    /// addressing keys and the remote API is not called.
    fn update(
        &self,
        old: &PropertyBag,
        new: &PropertyBag,
        preview: bool,
    ) -> BoxFuture<'_, ProviderResult<PropertyBag>>;
}

/// Optional delete capability
pub trait DeleteResource: Send + Sync {
    /// Delete the resource. Any upstream error means the remote object must
    /// be assumed to still exist.
    fn delete(&self, id: &str, input: &PropertyBag) -> BoxFuture<'_, ProviderResult<()>>;
}
