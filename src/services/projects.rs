//! Client dashboard orchestration — listing, totals, and project mutations.
//!
//! DESIGN
//! ======
//! Listing is a fan-out/fan-in: every project's invoices load concurrently,
//! and within each project every bare PDF path is exchanged for a signed URL
//! concurrently. The response is assembled only after every branch resolves
//! or fails. The finished snapshot is cached per user so the status toggle
//! can flip it optimistically before the remote write lands; a failed write
//! reverts by refetching the authoritative list, not by patching back.
//!
//! ERROR HANDLING
//! ==============
//! Listing failures degrade: a failed project fetch keeps the previous
//! snapshot, a failed invoice fetch yields an empty invoice list, a failed
//! URL exchange leaves the raw path in place. Mutation failures propagate to
//! the caller with the platform's message.

use futures::future::join_all;
use tracing::{error, warn};
use uuid::Uuid;

use crate::platform::{
    InvoiceRow, InvoiceStatus, NewProject, Platform, PlatformError, ProjectPatch, ProjectRow,
    ProjectStatus,
};
use crate::state::{AppState, DashboardSnapshot, InvoiceView, PortalSession, ProjectView};

/// Signed download links stay valid for one hour.
pub const SIGNED_URL_TTL_SECS: u32 = 3600;
/// Private bucket holding invoice PDFs.
pub const INVOICE_BUCKET: &str = "invoices";

/// Sum of unpaid invoice amounts across all projects. Paid invoices never
/// count.
#[must_use]
pub fn outstanding_total(projects: &[ProjectView]) -> f64 {
    projects
        .iter()
        .flat_map(|p| &p.invoices)
        .filter(|i| i.status == InvoiceStatus::Unpaid)
        .map(|i| i.amount)
        .sum()
}

/// Exchange a stored reference for something the view can link to: `None`
/// while the reference is empty, the value as-is when it is already an
/// absolute URL, otherwise a 1-hour signed URL (falling back to the raw
/// path if signing fails).
async fn resolve_pdf_url(
    platform: &dyn Platform,
    token: &str,
    pdf_url: Option<String>,
) -> Option<String> {
    let path = match pdf_url {
        None => return None,
        Some(p) if p.is_empty() => return None,
        Some(p) if p.starts_with("http") => return Some(p),
        Some(p) => p,
    };
    match platform
        .create_signed_url(token, INVOICE_BUCKET, &path, SIGNED_URL_TTL_SECS)
        .await
    {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(error = %e, %path, "signed URL exchange failed; keeping raw path");
            Some(path)
        }
    }
}

async fn to_invoice_view(platform: &dyn Platform, token: &str, invoice: InvoiceRow) -> InvoiceView {
    let pdf_url = resolve_pdf_url(platform, token, invoice.pdf_url).await;
    InvoiceView {
        id: invoice.id,
        amount: invoice.amount,
        status: invoice.status,
        pdf_url,
        created_at: invoice.created_at,
    }
}

async fn to_project_view(platform: &dyn Platform, token: &str, project: ProjectRow) -> ProjectView {
    let invoices = match platform.list_invoices(token, project.id).await {
        Ok(rows) => rows,
        Err(e) => {
            warn!(error = %e, project_id = %project.id, "invoice fetch failed; showing none");
            Vec::new()
        }
    };
    let invoices = join_all(
        invoices
            .into_iter()
            .map(|invoice| to_invoice_view(platform, token, invoice)),
    )
    .await;

    ProjectView {
        id: project.id,
        title: project.title,
        description: project.description,
        status: project.status,
        created_at: project.created_at,
        invoices,
    }
}

/// Fetch the caller's dashboard from the platform and cache the snapshot.
///
/// On a failed project fetch the previous snapshot (or an empty one) is
/// returned unchanged rather than surfacing an error.
pub async fn refresh_dashboard(state: &AppState, session: &PortalSession) -> DashboardSnapshot {
    let token = session.access_token.as_str();
    let projects = match state.platform.list_projects(token).await {
        Ok(rows) => rows,
        Err(e) => {
            error!(error = %e, user_id = %session.user_id, "project fetch failed");
            let dashboards = state.dashboards.read().await;
            return dashboards.get(&session.user_id).cloned().unwrap_or_default();
        }
    };

    // Fan out per project; each project fans out per invoice. Nothing is
    // returned until every branch has resolved or failed.
    let projects = join_all(
        projects
            .into_iter()
            .map(|project| to_project_view(state.platform.as_ref(), token, project)),
    )
    .await;

    let snapshot = DashboardSnapshot { total_due: outstanding_total(&projects), projects };

    let mut dashboards = state.dashboards.write().await;
    dashboards.insert(session.user_id, snapshot.clone());
    snapshot
}

/// Insert a project owned by the caller.
pub async fn create_project(
    platform: &dyn Platform,
    session: &PortalSession,
    title: String,
    description: Option<String>,
) -> Result<ProjectRow, PlatformError> {
    let project = NewProject { title, description, client_id: session.user_id, status: None };
    platform.insert_project(&session.access_token, &project).await
}

/// Update a project's title/description in place.
pub async fn update_project(
    platform: &dyn Platform,
    session: &PortalSession,
    project_id: Uuid,
    title: String,
    description: Option<String>,
) -> Result<(), PlatformError> {
    let patch = ProjectPatch { title, description };
    platform
        .update_project(&session.access_token, project_id, &patch)
        .await
}

/// Delete a project; the platform cascades to its invoices.
pub async fn delete_project(
    platform: &dyn Platform,
    session: &PortalSession,
    project_id: Uuid,
) -> Result<(), PlatformError> {
    platform
        .delete_project(&session.access_token, project_id)
        .await
}

/// Flip a project between `active` and `completed`.
///
/// The cached snapshot is updated before the remote write (optimistic). A
/// failed write is logged, the authoritative list is refetched, and the
/// status from that refetch is returned. `None` means the project is not
/// visible to the caller at all.
pub async fn toggle_status(
    state: &AppState,
    session: &PortalSession,
    project_id: Uuid,
) -> Option<ProjectStatus> {
    // A toggle without a prior listing has nothing to flip; hydrate first.
    if !state
        .dashboards
        .read()
        .await
        .contains_key(&session.user_id)
    {
        refresh_dashboard(state, session).await;
    }

    let new_status = {
        let mut dashboards = state.dashboards.write().await;
        let snapshot = dashboards.get_mut(&session.user_id)?;
        let project = snapshot.projects.iter_mut().find(|p| p.id == project_id)?;
        let flipped = project.status.toggled();
        project.status = flipped;
        flipped
    };

    match state
        .platform
        .update_project_status(&session.access_token, project_id, new_status)
        .await
    {
        Ok(()) => Some(new_status),
        Err(e) => {
            error!(error = %e, %project_id, "status update failed; refetching authoritative list");
            let snapshot = refresh_dashboard(state, session).await;
            snapshot
                .projects
                .iter()
                .find(|p| p.id == project_id)
                .map(|p| p.status)
        }
    }
}

#[cfg(test)]
#[path = "projects_test.rs"]
mod tests;
