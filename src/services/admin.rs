//! Admin portal orchestration — data load, project creation, demo seeding.
//!
//! DESIGN
//! ======
//! The admin load issues its three fetches concurrently and tolerates
//! partial failure: a dead aggregation endpoint must not blank the client
//! and project lists. Balances come from the remote aggregation verbatim;
//! the portal displays what the platform computed and never recomputes
//! them here.

use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::platform::{
    ClientBalanceRow, InvoiceStatus, NewInvoice, NewProject, Platform, PlatformError, ProfileRow,
    ProjectRow, ProjectStatus, ProjectWithOwner,
};

pub const SEED_PAID_AMOUNT: f64 = 1500.0;
pub const SEED_UNPAID_AMOUNT: f64 = 2500.0;
pub const SEED_DESCRIPTION: &str = "Complete overhaul of the corporate website.";

/// Everything the admin portal renders, fetched in one load.
#[derive(Debug, Clone, Serialize)]
pub struct AdminData {
    pub clients: Vec<ProfileRow>,
    pub projects: Vec<ProjectWithOwner>,
    pub balances: Vec<ClientBalanceRow>,
}

/// Fetch clients, projects-with-owner, and per-client balances concurrently.
///
/// Each fetch is independent; failures are logged and degrade to an empty
/// list so the rest of the portal still renders.
pub async fn load_admin_data(platform: &dyn Platform, token: &str) -> AdminData {
    let (clients, projects, balances) = tokio::join!(
        platform.list_client_profiles(token),
        platform.list_projects_with_owner(token),
        platform.client_balances(token),
    );

    let clients = clients.unwrap_or_else(|e| {
        error!(error = %e, "client list fetch failed");
        Vec::new()
    });
    let projects = projects.unwrap_or_else(|e| {
        error!(error = %e, "project list fetch failed");
        Vec::new()
    });
    let balances = balances.unwrap_or_else(|e| {
        // The aggregation function may simply not be installed yet.
        warn!(error = %e, "client balances fetch failed");
        Vec::new()
    });

    AdminData { clients, projects, balances }
}

/// Insert a project on behalf of the chosen client.
pub async fn create_project_for_client(
    platform: &dyn Platform,
    token: &str,
    client_id: Uuid,
    title: String,
    description: Option<String>,
) -> Result<ProjectRow, PlatformError> {
    let project = NewProject { title, description, client_id, status: None };
    platform.insert_project(token, &project).await
}

/// Counts of rows created by a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub projects: usize,
    pub invoices: usize,
}

pub(crate) fn seed_project_title(date: time::Date) -> String {
    format!("Website Redesign ({date})")
}

/// Create one demo project and two invoices (one paid, one unpaid) for every
/// known client.
///
/// A failed project insert skips that client's invoices without aborting the
/// run; individual invoice failures are logged the same way.
pub async fn seed_demo_data(
    platform: &dyn Platform,
    token: &str,
) -> Result<SeedSummary, PlatformError> {
    let clients = platform.list_client_profiles(token).await?;
    let title = seed_project_title(time::OffsetDateTime::now_utc().date());
    let mut summary = SeedSummary::default();

    for client in &clients {
        let project = NewProject {
            title: title.clone(),
            description: Some(SEED_DESCRIPTION.to_string()),
            client_id: client.id,
            status: Some(ProjectStatus::Active),
        };
        let row = match platform.insert_project(token, &project).await {
            Ok(row) => row,
            Err(e) => {
                warn!(error = %e, client_id = %client.id, "demo project insert failed; skipping client");
                continue;
            }
        };
        summary.projects += 1;

        for (amount, status) in [
            (SEED_PAID_AMOUNT, InvoiceStatus::Paid),
            (SEED_UNPAID_AMOUNT, InvoiceStatus::Unpaid),
        ] {
            let invoice =
                NewInvoice { project_id: row.id, amount, status, pdf_url: None };
            match platform.insert_invoice(token, &invoice).await {
                Ok(()) => summary.invoices += 1,
                Err(e) => {
                    warn!(error = %e, project_id = %row.id, "demo invoice insert failed");
                }
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
