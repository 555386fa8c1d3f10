//! Platform types — wire rows and errors shared by the HTTP client and mocks.
//!
//! The platform owns every schema; these structs only mirror the JSON it
//! returns. Timestamps stay as the platform's ISO strings since the portal
//! never computes with them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by platform operations.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// A required connection credential is not set.
    #[error("missing platform credential: env var {var} not set")]
    MissingCredential { var: String },

    /// The HTTP request to the platform failed at the transport level.
    #[error("platform request failed: {0}")]
    Request(String),

    /// The platform returned a non-success status. `message` is the
    /// human-readable error extracted from the response body.
    #[error("platform error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Distinguished zero-rows condition on a single-row fetch.
    #[error("no rows matched")]
    NotFound,

    /// The platform response body could not be deserialized.
    #[error("platform response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl PlatformError {
    /// `true` for the expected "no rows" condition on single-row fetches.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

// =============================================================================
// ENUMS
// =============================================================================

/// Access class determining which top-level view a session receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Completed,
}

impl ProjectStatus {
    /// The other status: `active` ↔ `completed`.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Completed,
            Self::Completed => Self::Active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Paid,
    Unpaid,
}

// =============================================================================
// ROWS
// =============================================================================

/// A row of the `profiles` table. `id` equals the auth user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: Uuid,
    pub role: Role,
    pub full_name: Option<String>,
    pub company_name: Option<String>,
    pub email: Option<String>,
}

/// A row of the `projects` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub client_id: Uuid,
    pub status: ProjectStatus,
    pub created_at: Option<String>,
}

/// Owner attributes embedded by the projects/profiles join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectOwner {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// A project joined with its owning profile's display attributes, as the
/// admin portal lists them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectWithOwner {
    #[serde(flatten)]
    pub project: ProjectRow,
    /// `None` when the owning profile row is missing.
    pub profiles: Option<ProjectOwner>,
}

/// A row of the `invoices` table. `pdf_url` is a private storage path until
/// the dashboard exchanges it for a signed URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub amount: f64,
    pub status: InvoiceStatus,
    pub pdf_url: Option<String>,
    pub created_at: Option<String>,
}

/// One row of the `get_client_balances` aggregation: outstanding unpaid
/// total per client. Derived remotely, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientBalanceRow {
    pub client_id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub total_outstanding: f64,
}

// =============================================================================
// AUTH
// =============================================================================

/// The authenticated user inside a platform auth response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// A platform auth session: bearer token plus its lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    /// Seconds until `access_token` expires.
    pub expires_in: u64,
    pub user: AuthUser,
}

// =============================================================================
// WRITE PAYLOADS
// =============================================================================

/// Fields for a project insert.
#[derive(Debug, Clone, Serialize)]
pub struct NewProject {
    pub title: String,
    pub description: Option<String>,
    pub client_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
}

/// Mutable project fields for an update-by-id.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectPatch {
    pub title: String,
    pub description: Option<String>,
}

/// Mutable profile fields for the owner's edit-profile flow.
#[derive(Debug, Clone, Serialize)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub company_name: Option<String>,
}

/// Fields for an invoice insert. `pdf_url` carries the storage *path*.
#[derive(Debug, Clone, Serialize)]
pub struct NewInvoice {
    pub project_id: Uuid,
    pub amount: f64,
    pub status: InvoiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
