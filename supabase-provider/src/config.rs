//! Provider configuration - endpoint and token resolution
//!
//! Resolution order: explicit options, then environment, then the fixed
//! default server. Check/diff of the configuration run before the provider
//! is configured, so they are free functions over property bags.

use std::env;

use url::Url;

use supabase_provider_core::diff::{DiffDecision, changed_keys};
use supabase_provider_core::error::{ProviderError, ProviderResult};
use supabase_provider_core::property::{PropertyBag, PropertyValue, UnwrapContext};

pub const DEFAULT_SERVER: &str = "https://api.supabase.com/v1/";
pub const SERVER_ENV: &str = "SUPABASE_SERVER";
pub const TOKEN_ENV: &str = "SUPABASE_TOKEN";

/// Explicit configuration supplied by the engine
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    pub server: Option<String>,
    pub token: Option<String>,
}

impl ConfigOptions {
    /// Extract `server`/`token` from an engine-supplied config bag. The token
    /// usually arrives secret-wrapped.
    pub fn from_bag(bag: &PropertyBag) -> ProviderResult<Self> {
        let get = |key: &str| -> ProviderResult<Option<String>> {
            match bag.get(key) {
                Some(value) => Ok(value
                    .unwrap(UnwrapContext::preview(true))?
                    .as_str()
                    .map(str::to_string)),
                None => Ok(None),
            }
        };
        Ok(Self {
            server: get("server")?,
            token: get("token")?,
        })
    }
}

/// Resolved, immutable provider configuration
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub server: Url,
    pub token: String,
}

impl ProviderConfig {
    /// Resolve from explicit options, environment, then defaults
    pub fn resolve(options: ConfigOptions) -> ProviderResult<Self> {
        Self::resolve_with_env(
            options,
            env::var(SERVER_ENV).ok(),
            env::var(TOKEN_ENV).ok(),
        )
    }

    fn resolve_with_env(
        options: ConfigOptions,
        env_server: Option<String>,
        env_token: Option<String>,
    ) -> ProviderResult<Self> {
        let mut server = options
            .server
            .or(env_server)
            .unwrap_or_else(|| DEFAULT_SERVER.to_string());
        // A trailing slash keeps the API version prefix when joining paths
        if !server.ends_with('/') {
            server.push('/');
        }
        let server = Url::parse(&server).map_err(|e| ProviderError::ConfigValidation {
            property: "server".to_string(),
            reason: format!("error parsing supabase url: {e}"),
        })?;
        let token = options.token.or(env_token).unwrap_or_default();
        Ok(Self { server, token })
    }
}

/// A single config validation failure, reported at Check time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFailure {
    pub property: String,
    pub reason: String,
}

/// Validate a candidate config bag: `server` must parse as a URL and `token`
/// must be present.
pub fn check_config(news: &PropertyBag) -> Vec<CheckFailure> {
    let mut failures = Vec::new();
    if let Some(server) = news.get("server") {
        // A still-unknown value (computed) cannot be validated yet
        let parseable = match server.unwrap(UnwrapContext::preview(true)) {
            Ok(PropertyValue::Null) => true,
            Ok(value) => value.as_str().is_some_and(|s| Url::parse(s).is_ok()),
            Err(_) => false,
        };
        if !parseable {
            failures.push(CheckFailure {
                property: "server".to_string(),
                reason: "error parsing supabase url".to_string(),
            });
        }
    }
    if !news.contains_key("token") {
        failures.push(CheckFailure {
            property: "token".to_string(),
            reason: "missing supabase token".to_string(),
        });
    }
    failures
}

/// Diff two config bags. Any change to `server` or `token` rebinds the HTTP
/// capability, so both always force replacement.
pub fn diff_config(old: &PropertyBag, new: &PropertyBag) -> DiffDecision {
    let changed: Vec<String> = changed_keys(old, new)
        .into_iter()
        .filter(|key| key == "server" || key == "token")
        .collect();
    DiffDecision {
        requires_replace: !changed.is_empty(),
        changed_keys: changed,
    }
}
