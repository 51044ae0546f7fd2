//! Error taxonomy for provider operations
//!
//! Every failure aborts the current lifecycle call; nothing is retried or
//! swallowed. Variants carry enough context (kind, operation, status, body)
//! to diagnose without re-running with verbose tracing.

use thiserror::Error;

/// Errors that can occur during a lifecycle call
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Provider configuration is invalid (bad URL, missing token)
    #[error("invalid provider configuration for '{property}': {reason}")]
    ConfigValidation { property: String, reason: String },

    /// The resource kind token is not handled by this provider
    #[error("unsupported resource kind '{0}'")]
    UnsupportedResourceKind(String),

    /// The kind exists but does not offer this operation
    #[error("{kind} has no {operation} available: apply the change out of band and refresh")]
    UnsupportedOperation { kind: String, operation: String },

    /// A property wrapper could not be resolved to a plain value
    #[error("cannot unwrap property value: {0}")]
    Unwrap(String),

    /// The property bag does not match the expected typed shape
    #[error("property bag does not match expected shape: {0}")]
    SchemaMismatch(String),

    /// The remote API rejected the request with a non-2xx status
    #[error("upstream API error: HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Network-level failure before any status was known
    #[error("transport failure: {0}")]
    Transport(String),

    /// An Invoke token outside the known utility calls
    #[error("unknown invoke token '{0}'")]
    UnknownInvokeToken(String),

    /// A schema blob version this provider does not publish
    #[error("unsupported schema version {0}")]
    UnsupportedSchemaVersion(u32),
}

impl ProviderError {
    pub fn unsupported_operation(kind: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            kind: kind.into(),
            operation: operation.into(),
        }
    }
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_status_and_body() {
        let error = ProviderError::Upstream {
            status: 404,
            body: "{\"message\":\"not found\"}".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "upstream API error: HTTP 404: {\"message\":\"not found\"}"
        );
    }

    #[test]
    fn display_names_the_unsupported_kind() {
        let error = ProviderError::UnsupportedResourceKind("supabase:index:Bucket".to_string());
        assert_eq!(
            error.to_string(),
            "unsupported resource kind 'supabase:index:Bucket'"
        );
    }

    #[test]
    fn unsupported_operation_instructs_out_of_band_remediation() {
        let error = ProviderError::unsupported_operation("supabase:index:Organization", "update");
        assert!(error.to_string().contains("out of band"));
    }
}
