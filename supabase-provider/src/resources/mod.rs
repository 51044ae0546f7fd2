//! Resource handlers, one per kind
//!
//! Each handler owns the shape knowledge for its kind: which camelCase bag
//! keys map to which snake_case API fields, and which output fields are
//! synthesized rather than returned by the API.

pub mod function;
pub mod organization;
pub mod project;
pub mod secret;

use std::sync::Arc;

use supabase_provider_core::handler::ResourceHandler;

use crate::client::SupabaseClient;

pub use function::FunctionHandler;
pub use organization::OrganizationHandler;
pub use project::ProjectHandler;
pub use secret::SecretHandler;

/// All handlers this provider registers, bound to one client
pub fn handlers(client: Arc<SupabaseClient>) -> Vec<Box<dyn ResourceHandler>> {
    vec![
        Box::new(OrganizationHandler::new(client.clone())),
        Box::new(ProjectHandler::new(client.clone())),
        Box::new(FunctionHandler::new(client.clone())),
        Box::new(SecretHandler::new(client)),
    ]
}
