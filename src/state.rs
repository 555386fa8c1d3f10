//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the platform client handle, the in-memory portal session map,
//! and per-user dashboard snapshots. Snapshots are refreshed from the
//! platform on every listing and mutated in place by the optimistic
//! status toggle; the platform remains the authority for all rows.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::platform::{InvoiceStatus, Platform, ProjectStatus, Role};

// =============================================================================
// PORTAL SESSION
// =============================================================================

/// An authenticated portal session. Holds the platform access token that
/// scopes every data call to the signed-in user.
#[derive(Debug, Clone)]
pub struct PortalSession {
    /// Random portal token, stored in the session cookie.
    pub token: String,
    /// Bearer token for platform calls on this user's behalf.
    pub access_token: String,
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: Role,
    pub expires_at: OffsetDateTime,
}

impl PortalSession {
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

// =============================================================================
// DASHBOARD SNAPSHOT
// =============================================================================

/// An invoice as shown on the client dashboard. `pdf_url` is either a
/// time-bounded signed URL, the raw path when signing failed, or `None`
/// while the PDF reference is still empty ("processing").
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceView {
    pub id: Uuid,
    pub amount: f64,
    pub status: InvoiceStatus,
    pub pdf_url: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub created_at: Option<String>,
    pub invoices: Vec<InvoiceView>,
}

/// The client dashboard as last fetched for one user: projects newest-first
/// with their invoices, plus the outstanding total across all of them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSnapshot {
    pub projects: Vec<ProjectView>,
    pub total_due: f64,
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum — all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    /// The external platform: auth, rows, storage, aggregation.
    pub platform: Arc<dyn Platform>,
    /// Live portal sessions keyed by portal token.
    pub sessions: Arc<RwLock<HashMap<String, PortalSession>>>,
    /// Last-fetched dashboard per user, mutated by the optimistic toggle.
    pub dashboards: Arc<RwLock<HashMap<Uuid, DashboardSnapshot>>>,
}

impl AppState {
    #[must_use]
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self {
            platform,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            dashboards: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
