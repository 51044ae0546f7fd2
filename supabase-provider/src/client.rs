//! Typed client for the Supabase management API
//!
//! One method per remote operation, bound once with a base URL and bearer
//! token at configuration time and read-only afterwards. Every call observes
//! the shared cancellation token before and during the request. No retries,
//! no caching: a transient upstream failure is reported immediately.

use reqwest::{Client, RequestBuilder, StatusCode, header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use url::Url;

use supabase_provider_core::error::{ProviderError, ProviderResult};

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrganizationBody {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateProjectBody {
    pub name: String,
    pub organization_id: String,
    pub db_pass: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kps_enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_jwt: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// Query parameters for function creation; the function source travels as the
/// raw request payload.
#[derive(Debug, Clone, Serialize)]
pub struct CreateFunctionParams {
    pub slug: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_jwt: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateFunctionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_jwt: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateSecretBody {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypescriptTypes {
    pub types: String,
}

// =============================================================================
// Client
// =============================================================================

/// HTTP client bound to one management-API endpoint and bearer token
pub struct SupabaseClient {
    http: Client,
    base_url: Url,
    token: String,
    cancel: CancellationToken,
}

impl SupabaseClient {
    pub fn new(base_url: Url, token: String, cancel: CancellationToken) -> ProviderResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("supabase-provider/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            token,
            cancel,
        })
    }

    fn endpoint(&self, path: &str) -> ProviderResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::Transport(format!("invalid request URL '{path}': {e}")))
    }

    /// Send a request, racing it against cancellation. Non-2xx statuses are
    /// upstream errors carrying the response body.
    async fn send(&self, request: RequestBuilder) -> ProviderResult<(StatusCode, String)> {
        if self.cancel.is_cancelled() {
            return Err(ProviderError::Transport("operation cancelled".to_string()));
        }

        let pending = request.bearer_auth(&self.token).send();
        let response = tokio::select! {
            _ = self.cancel.cancelled() => {
                return Err(ProviderError::Transport("operation cancelled".to_string()));
            }
            result = pending => result.map_err(|e| ProviderError::Transport(e.to_string()))?,
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::error!(status = %status, "supabase API error");
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok((status, body))
    }

    fn parse<T: DeserializeOwned>(body: &str) -> ProviderResult<T> {
        serde_json::from_str(body)
            .map_err(|e| ProviderError::SchemaMismatch(format!("invalid upstream response: {e}")))
    }

    // =========================================================================
    // Organizations
    // =========================================================================

    pub async fn create_organization(
        &self,
        body: &CreateOrganizationBody,
    ) -> ProviderResult<Organization> {
        tracing::debug!(name = %body.name, "POST organizations");
        let url = self.endpoint("organizations")?;
        let (_, text) = self.send(self.http.post(url).json(body)).await?;
        Self::parse(&text)
    }

    pub async fn list_organizations(&self) -> ProviderResult<Vec<Organization>> {
        tracing::debug!("GET organizations");
        let url = self.endpoint("organizations")?;
        let (_, text) = self.send(self.http.get(url)).await?;
        Self::parse(&text)
    }

    // =========================================================================
    // Projects
    // =========================================================================

    pub async fn create_project(&self, body: &CreateProjectBody) -> ProviderResult<Project> {
        tracing::debug!(name = %body.name, region = %body.region, "POST projects");
        let url = self.endpoint("projects")?;
        let (_, text) = self.send(self.http.post(url).json(body)).await?;
        Self::parse(&text)
    }

    pub async fn list_projects(&self) -> ProviderResult<Vec<Project>> {
        tracing::debug!("GET projects");
        let url = self.endpoint("projects")?;
        let (_, text) = self.send(self.http.get(url)).await?;
        Self::parse(&text)
    }

    pub async fn typescript_types(&self, project_id: &str) -> ProviderResult<TypescriptTypes> {
        tracing::debug!(project_id, "GET typescript types");
        let url = self.endpoint(&format!("projects/{project_id}/types/typescript"))?;
        let (_, text) = self.send(self.http.get(url)).await?;
        Self::parse(&text)
    }

    // =========================================================================
    // Functions
    // =========================================================================

    pub async fn create_function(
        &self,
        project_id: &str,
        params: &CreateFunctionParams,
        body: &str,
    ) -> ProviderResult<Function> {
        tracing::debug!(project_id, slug = %params.slug, "POST function");
        let url = self.endpoint(&format!("projects/{project_id}/functions"))?;
        let request = self
            .http
            .post(url)
            .query(params)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.to_string());
        let (_, text) = self.send(request).await?;
        Self::parse(&text)
    }

    /// Fetch a function by slug; a 404 means it no longer exists
    pub async fn get_function(
        &self,
        project_id: &str,
        slug: &str,
    ) -> ProviderResult<Option<Function>> {
        tracing::debug!(project_id, slug, "GET function");
        let url = self.endpoint(&format!("projects/{project_id}/functions/{slug}"))?;
        match self.send(self.http.get(url)).await {
            Ok((_, text)) => Ok(Some(Self::parse(&text)?)),
            Err(ProviderError::Upstream { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Fetch the deployed function source
    pub async fn get_function_body(&self, project_id: &str, slug: &str) -> ProviderResult<String> {
        tracing::debug!(project_id, slug, "GET function body");
        let url = self.endpoint(&format!("projects/{project_id}/functions/{slug}/body"))?;
        let (_, text) = self.send(self.http.get(url)).await?;
        Ok(text)
    }

    pub async fn update_function(
        &self,
        project_id: &str,
        slug: &str,
        params: &UpdateFunctionParams,
        body: &str,
    ) -> ProviderResult<Function> {
        tracing::debug!(project_id, slug, "PATCH function");
        let url = self.endpoint(&format!("projects/{project_id}/functions/{slug}"))?;
        let request = self
            .http
            .patch(url)
            .query(params)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.to_string());
        let (_, text) = self.send(request).await?;
        Self::parse(&text)
    }

    pub async fn delete_function(&self, project_id: &str, slug: &str) -> ProviderResult<()> {
        tracing::debug!(project_id, slug, "DELETE function");
        let url = self.endpoint(&format!("projects/{project_id}/functions/{slug}"))?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    // =========================================================================
    // Secrets
    // =========================================================================

    pub async fn create_secrets(
        &self,
        project_id: &str,
        secrets: &[CreateSecretBody],
    ) -> ProviderResult<()> {
        tracing::debug!(project_id, count = secrets.len(), "POST secrets");
        let url = self.endpoint(&format!("projects/{project_id}/secrets"))?;
        self.send(self.http.post(url).json(secrets)).await?;
        Ok(())
    }

    pub async fn list_secrets(&self, project_id: &str) -> ProviderResult<Vec<Secret>> {
        tracing::debug!(project_id, "GET secrets");
        let url = self.endpoint(&format!("projects/{project_id}/secrets"))?;
        let (_, text) = self.send(self.http.get(url)).await?;
        Self::parse(&text)
    }

    pub async fn delete_secrets(&self, project_id: &str, names: &[String]) -> ProviderResult<()> {
        tracing::debug!(project_id, count = names.len(), "DELETE secrets");
        let url = self.endpoint(&format!("projects/{project_id}/secrets"))?;
        self.send(self.http.delete(url).json(names)).await?;
        Ok(())
    }
}
