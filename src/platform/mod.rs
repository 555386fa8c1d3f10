//! Platform — adapter for the external backend-as-a-service.
//!
//! DESIGN
//! ======
//! Every durable row, credential check, stored file, and aggregation lives
//! on the external platform; this module is the only place the portal talks
//! to it. [`Platform`] names exactly the capabilities the portal needs, and
//! [`HttpPlatform`] implements them over the platform's HTTP surface. Calls
//! carry the signed-in user's bearer token so the platform's row-level
//! policies scope what each caller can see.

pub mod config;
pub mod http;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use http::HttpPlatform;
pub use types::{
    AuthSession, AuthUser, ClientBalanceRow, InvoiceRow, InvoiceStatus, NewInvoice, NewProject,
    PlatformError, ProfilePatch, ProfileRow, ProjectPatch, ProjectRow, ProjectStatus,
    ProjectWithOwner, Role,
};

use uuid::Uuid;

/// Platform capabilities, mockable in tests.
///
/// Data methods take the caller's platform access token; the platform's
/// access policies do the scoping. The portal never widens a query itself.
#[async_trait::async_trait]
pub trait Platform: Send + Sync {
    // ----- auth -------------------------------------------------------------

    /// Register a new user. Returns `None` when the platform withholds a
    /// session pending email confirmation.
    async fn sign_up(&self, email: &str, password: &str)
    -> Result<Option<AuthSession>, PlatformError>;

    /// Exchange email/password credentials for a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, PlatformError>;

    /// Revoke the given access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), PlatformError>;

    // ----- relational store -------------------------------------------------

    /// Fetch exactly one profile row by user id.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NotFound`] when zero rows match — a normal
    /// condition for freshly signed-up users.
    async fn fetch_profile(&self, token: &str, user_id: Uuid) -> Result<ProfileRow, PlatformError>;

    async fn update_profile(
        &self,
        token: &str,
        user_id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<(), PlatformError>;

    /// All profiles with role `client`.
    async fn list_client_profiles(&self, token: &str) -> Result<Vec<ProfileRow>, PlatformError>;

    /// Projects visible to the caller, newest first.
    async fn list_projects(&self, token: &str) -> Result<Vec<ProjectRow>, PlatformError>;

    /// All projects joined with the owning profile's name/email, newest first.
    async fn list_projects_with_owner(
        &self,
        token: &str,
    ) -> Result<Vec<ProjectWithOwner>, PlatformError>;

    /// Insert a project and return the stored row.
    async fn insert_project(
        &self,
        token: &str,
        project: &NewProject,
    ) -> Result<ProjectRow, PlatformError>;

    async fn update_project(
        &self,
        token: &str,
        project_id: Uuid,
        patch: &ProjectPatch,
    ) -> Result<(), PlatformError>;

    async fn update_project_status(
        &self,
        token: &str,
        project_id: Uuid,
        status: ProjectStatus,
    ) -> Result<(), PlatformError>;

    /// Delete a project; the platform cascades to its invoices.
    async fn delete_project(&self, token: &str, project_id: Uuid) -> Result<(), PlatformError>;

    /// Invoices for one project, newest first.
    async fn list_invoices(
        &self,
        token: &str,
        project_id: Uuid,
    ) -> Result<Vec<InvoiceRow>, PlatformError>;

    async fn insert_invoice(&self, token: &str, invoice: &NewInvoice)
    -> Result<(), PlatformError>;

    /// The `get_client_balances` remote aggregation.
    async fn client_balances(&self, token: &str) -> Result<Vec<ClientBalanceRow>, PlatformError>;

    // ----- object storage ---------------------------------------------------

    /// Upload bytes to a private bucket at `path`.
    async fn upload_object(
        &self,
        token: &str,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), PlatformError>;

    /// Create a time-bounded signed download URL for a stored path.
    async fn create_signed_url(
        &self,
        token: &str,
        bucket: &str,
        path: &str,
        expires_secs: u32,
    ) -> Result<String, PlatformError>;
}
