//! Supabase Resource Provider
//!
//! Translates lifecycle requests from a declarative orchestration engine into
//! calls against the Supabase management API, and API responses back into the
//! engine's property-bag model.
//!
//! ## Module Structure
//!
//! - `client` - Typed client for the management API
//! - `config` - Endpoint and token resolution, config check/diff
//! - `provider` - The lifecycle dispatcher
//! - `resources` - One handler per resource kind

pub mod client;
pub mod config;
pub mod provider;
pub mod resources;

pub use client::SupabaseClient;
pub use config::{CheckFailure, ConfigOptions, ProviderConfig, check_config, diff_config};
pub use provider::SupabaseProvider;
