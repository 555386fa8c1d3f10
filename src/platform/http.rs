//! HTTP implementation of the platform client.
//!
//! WIRE FORMAT
//! ===========
//! Three endpoint families under one base URL:
//! - `/auth/v1/*` — credential exchange; sessions arrive as JSON with an
//!   `access_token`, or as a bare user object while email confirmation is
//!   pending.
//! - `/rest/v1/*` — relational access with filters in the query string and
//!   behavior switched by `Accept`/`Prefer` headers. A single-row fetch uses
//!   the single-object `Accept` and fails with 406 when zero rows match.
//! - `/storage/v1/object/*` — byte upload and signed-URL minting; the
//!   signing endpoint returns a relative URL to prefix with the base.
//!
//! Every call sends the project `apikey` plus a bearer token; the bearer is
//! what the platform's row policies evaluate.

use std::time::Duration;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::config::PlatformConfig;
use super::types::{
    AuthSession, ClientBalanceRow, InvoiceRow, NewInvoice, NewProject, PlatformError,
    ProfilePatch, ProfileRow, ProjectPatch, ProjectRow, ProjectStatus, ProjectWithOwner,
};
use super::Platform;

/// Single-object response negotiation; zero matching rows yields 406.
const ACCEPT_SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

pub struct HttpPlatform {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl HttpPlatform {
    /// Build a platform client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a credential is missing or the HTTP client fails
    /// to build.
    pub fn from_env() -> Result<Self, PlatformError> {
        Self::from_config(PlatformConfig::from_env()?)
    }

    /// Build a platform client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: PlatformConfig) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| PlatformError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url, anon_key: config.anon_key })
    }

    /// The configured platform base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    /// Send a request and return `(status, body)`; transport failures only.
    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<(u16, String), PlatformError> {
        let response = builder
            .send()
            .await
            .map_err(|e| PlatformError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::Request(e.to_string()))?;
        Ok((status, body))
    }

    /// Send and require a success status, mapping failures to [`PlatformError::Api`].
    async fn send_ok(&self, builder: reqwest::RequestBuilder) -> Result<String, PlatformError> {
        let (status, body) = self.send(builder).await?;
        if !(200..300).contains(&status) {
            return Err(api_error(status, &body));
        }
        Ok(body)
    }

    async fn get_rows<T: serde::de::DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
    ) -> Result<Vec<T>, PlatformError> {
        let body = self.send_ok(self.request(Method::GET, path, token)).await?;
        serde_json::from_str(&body).map_err(|e| PlatformError::Parse(e.to_string()))
    }

    async fn write_rows(
        &self,
        method: Method,
        token: &str,
        path: &str,
        payload: Option<&impl Serialize>,
    ) -> Result<(), PlatformError> {
        let mut builder = self
            .request(method, path, token)
            .header("Prefer", "return=minimal");
        if let Some(payload) = payload {
            builder = builder.json(payload);
        }
        self.send_ok(builder).await.map(|_| ())
    }
}

#[async_trait::async_trait]
impl Platform for HttpPlatform {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<AuthSession>, PlatformError> {
        let body = self
            .send_ok(
                self.request(Method::POST, "/auth/v1/signup", &self.anon_key)
                    .json(&serde_json::json!({ "email": email, "password": password })),
            )
            .await?;
        parse_auth_response(&body)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, PlatformError> {
        let body = self
            .send_ok(
                self.request(
                    Method::POST,
                    "/auth/v1/token?grant_type=password",
                    &self.anon_key,
                )
                .json(&serde_json::json!({ "email": email, "password": password })),
            )
            .await?;
        parse_auth_response(&body)?
            .ok_or_else(|| PlatformError::Parse("sign-in response carried no session".into()))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), PlatformError> {
        self.send_ok(self.request(Method::POST, "/auth/v1/logout", access_token))
            .await
            .map(|_| ())
    }

    async fn fetch_profile(&self, token: &str, user_id: Uuid) -> Result<ProfileRow, PlatformError> {
        let path = format!("/rest/v1/profiles?id=eq.{user_id}&select=*");
        let builder = self
            .request(Method::GET, &path, token)
            .header("Accept", ACCEPT_SINGLE_OBJECT);
        let (status, body) = self.send(builder).await?;
        if status == 406 {
            return Err(PlatformError::NotFound);
        }
        if !(200..300).contains(&status) {
            return Err(api_error(status, &body));
        }
        serde_json::from_str(&body).map_err(|e| PlatformError::Parse(e.to_string()))
    }

    async fn update_profile(
        &self,
        token: &str,
        user_id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<(), PlatformError> {
        let path = format!("/rest/v1/profiles?id=eq.{user_id}");
        self.write_rows(Method::PATCH, token, &path, Some(patch)).await
    }

    async fn list_client_profiles(&self, token: &str) -> Result<Vec<ProfileRow>, PlatformError> {
        self.get_rows(token, "/rest/v1/profiles?role=eq.client&select=*")
            .await
    }

    async fn list_projects(&self, token: &str) -> Result<Vec<ProjectRow>, PlatformError> {
        self.get_rows(token, "/rest/v1/projects?select=*&order=created_at.desc")
            .await
    }

    async fn list_projects_with_owner(
        &self,
        token: &str,
    ) -> Result<Vec<ProjectWithOwner>, PlatformError> {
        self.get_rows(
            token,
            "/rest/v1/projects?select=*,profiles(full_name,email)&order=created_at.desc",
        )
        .await
    }

    async fn insert_project(
        &self,
        token: &str,
        project: &NewProject,
    ) -> Result<ProjectRow, PlatformError> {
        let body = self
            .send_ok(
                self.request(Method::POST, "/rest/v1/projects", token)
                    .header("Prefer", "return=representation")
                    .json(project),
            )
            .await?;
        // Inserts answer with an array of stored rows.
        let rows: Vec<ProjectRow> =
            serde_json::from_str(&body).map_err(|e| PlatformError::Parse(e.to_string()))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| PlatformError::Parse("insert returned no rows".into()))
    }

    async fn update_project(
        &self,
        token: &str,
        project_id: Uuid,
        patch: &ProjectPatch,
    ) -> Result<(), PlatformError> {
        let path = format!("/rest/v1/projects?id=eq.{project_id}");
        self.write_rows(Method::PATCH, token, &path, Some(patch)).await
    }

    async fn update_project_status(
        &self,
        token: &str,
        project_id: Uuid,
        status: ProjectStatus,
    ) -> Result<(), PlatformError> {
        let path = format!("/rest/v1/projects?id=eq.{project_id}");
        self.write_rows(
            Method::PATCH,
            token,
            &path,
            Some(&serde_json::json!({ "status": status })),
        )
        .await
    }

    async fn delete_project(&self, token: &str, project_id: Uuid) -> Result<(), PlatformError> {
        let path = format!("/rest/v1/projects?id=eq.{project_id}");
        self.write_rows(Method::DELETE, token, &path, None::<&Value>)
            .await
    }

    async fn list_invoices(
        &self,
        token: &str,
        project_id: Uuid,
    ) -> Result<Vec<InvoiceRow>, PlatformError> {
        let path =
            format!("/rest/v1/invoices?project_id=eq.{project_id}&select=*&order=created_at.desc");
        self.get_rows(token, &path).await
    }

    async fn insert_invoice(
        &self,
        token: &str,
        invoice: &NewInvoice,
    ) -> Result<(), PlatformError> {
        self.write_rows(Method::POST, token, "/rest/v1/invoices", Some(invoice))
            .await
    }

    async fn client_balances(&self, token: &str) -> Result<Vec<ClientBalanceRow>, PlatformError> {
        let body = self
            .send_ok(
                self.request(Method::POST, "/rest/v1/rpc/get_client_balances", token)
                    .json(&serde_json::json!({})),
            )
            .await?;
        serde_json::from_str(&body).map_err(|e| PlatformError::Parse(e.to_string()))
    }

    async fn upload_object(
        &self,
        token: &str,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), PlatformError> {
        let endpoint = format!("/storage/v1/object/{bucket}/{path}");
        self.send_ok(
            self.request(Method::POST, &endpoint, token)
                .header("Content-Type", content_type)
                .body(bytes),
        )
        .await
        .map(|_| ())
    }

    async fn create_signed_url(
        &self,
        token: &str,
        bucket: &str,
        path: &str,
        expires_secs: u32,
    ) -> Result<String, PlatformError> {
        let endpoint = format!("/storage/v1/object/sign/{bucket}/{path}");
        let body = self
            .send_ok(
                self.request(Method::POST, &endpoint, token)
                    .json(&serde_json::json!({ "expiresIn": expires_secs })),
            )
            .await?;
        parse_signed_url(&self.base_url, &body)
    }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

/// Map a non-success response to [`PlatformError::Api`] with the platform's
/// own message when one can be extracted.
pub(crate) fn api_error(status: u16, body: &str) -> PlatformError {
    PlatformError::Api { status, message: extract_error_message(body) }
}

/// Pull the human-readable message out of a platform error body. The auth
/// and relational families use different keys; fall back to the raw body.
pub(crate) fn extract_error_message(body: &str) -> String {
    let Ok(root) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    for key in ["message", "msg", "error_description", "error"] {
        if let Some(text) = root.get(key).and_then(Value::as_str) {
            return text.to_string();
        }
    }
    body.to_string()
}

/// Parse an auth response: a session when `access_token` is present, `None`
/// for a bare user object (email confirmation pending).
pub(crate) fn parse_auth_response(body: &str) -> Result<Option<AuthSession>, PlatformError> {
    let root: Value =
        serde_json::from_str(body).map_err(|e| PlatformError::Parse(e.to_string()))?;
    if root.get("access_token").is_some() {
        let session: AuthSession =
            serde_json::from_value(root).map_err(|e| PlatformError::Parse(e.to_string()))?;
        return Ok(Some(session));
    }
    if root.get("id").is_some() || root.get("user").is_some() {
        return Ok(None);
    }
    Err(PlatformError::Parse("auth response carried neither session nor user".into()))
}

/// Parse a signing response and resolve its relative URL against the base.
pub(crate) fn parse_signed_url(base_url: &str, body: &str) -> Result<String, PlatformError> {
    let root: Value =
        serde_json::from_str(body).map_err(|e| PlatformError::Parse(e.to_string()))?;
    let relative = root
        .get("signedURL")
        .and_then(Value::as_str)
        .ok_or_else(|| PlatformError::Parse("signing response missing signedURL".into()))?;
    Ok(format!("{base_url}/storage/v1{relative}"))
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
