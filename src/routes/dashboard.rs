//! Client dashboard routes.
//!
//! Listing never fails (it degrades inside the service); mutations surface
//! the platform's error message and are followed by a refetch so the
//! response always carries the authoritative list.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::platform::PlatformError;
use crate::routes::auth::{platform_error_message, AuthUser};
use crate::services::{profile, projects};
use crate::state::AppState;

pub(crate) fn platform_error_status(err: &PlatformError) -> StatusCode {
    match err {
        PlatformError::NotFound => StatusCode::NOT_FOUND,
        PlatformError::Api { status, .. } if (400..500).contains(status) => {
            StatusCode::BAD_REQUEST
        }
        PlatformError::Api { .. } | PlatformError::Request(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn mutation_error(err: &PlatformError) -> Response {
    (
        platform_error_status(err),
        Json(serde_json::json!({ "error": platform_error_message(err) })),
    )
        .into_response()
}

fn validation_error(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

// =============================================================================
// PROJECTS
// =============================================================================

/// `GET /api/projects` — the caller's projects with invoices and totals.
pub async fn list_projects(State(state): State<AppState>, auth: AuthUser) -> Response {
    let snapshot = projects::refresh_dashboard(&state, &auth.session).await;
    Json(snapshot).into_response()
}

#[derive(Deserialize)]
pub struct ProjectBody {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// `POST /api/projects` — create a project owned by the caller.
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ProjectBody>,
) -> Response {
    if body.title.trim().is_empty() {
        return validation_error("Project title is required");
    }

    match projects::create_project(
        state.platform.as_ref(),
        &auth.session,
        body.title,
        body.description,
    )
    .await
    {
        Ok(_) => {
            let snapshot = projects::refresh_dashboard(&state, &auth.session).await;
            (StatusCode::CREATED, Json(snapshot)).into_response()
        }
        Err(e) => mutation_error(&e),
    }
}

/// `PATCH /api/projects/{id}` — update title/description in place.
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
    Json(body): Json<ProjectBody>,
) -> Response {
    if body.title.trim().is_empty() {
        return validation_error("Project title is required");
    }

    match projects::update_project(
        state.platform.as_ref(),
        &auth.session,
        project_id,
        body.title,
        body.description,
    )
    .await
    {
        Ok(()) => {
            let snapshot = projects::refresh_dashboard(&state, &auth.session).await;
            Json(snapshot).into_response()
        }
        Err(e) => mutation_error(&e),
    }
}

#[derive(Deserialize)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

/// `DELETE /api/projects/{id}?confirm=true` — delete a project and, via the
/// platform cascade, its invoices. Refused without explicit confirmation.
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
    Query(query): Query<ConfirmQuery>,
) -> Response {
    if !query.confirm {
        return validation_error(
            "Deleting a project also deletes all associated invoices; pass confirm=true",
        );
    }

    match projects::delete_project(state.platform.as_ref(), &auth.session, project_id).await {
        Ok(()) => {
            let snapshot = projects::refresh_dashboard(&state, &auth.session).await;
            Json(snapshot).into_response()
        }
        Err(e) => mutation_error(&e),
    }
}

/// `POST /api/projects/{id}/status` — optimistic `active`↔`completed` flip.
/// A failed remote write is not surfaced; the response carries whatever
/// status the corrective refetch settled on.
pub async fn toggle_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<Uuid>,
) -> Response {
    match projects::toggle_status(&state, &auth.session, project_id).await {
        Some(status) => Json(serde_json::json!({ "status": status })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// =============================================================================
// PROFILE
// =============================================================================

/// `GET /api/profile` — the caller's own profile for the edit form.
pub async fn get_profile(State(state): State<AppState>, auth: AuthUser) -> Response {
    match profile::fetch_own_profile(
        state.platform.as_ref(),
        &auth.session.access_token,
        auth.session.user_id,
    )
    .await
    {
        Ok(row) => {
            let (full_name, company_name) = row
                .map(|p| (p.full_name, p.company_name))
                .unwrap_or_default();
            Json(serde_json::json!({
                "full_name": full_name.unwrap_or_default(),
                "company_name": company_name.unwrap_or_default(),
                "email": auth.session.email,
            }))
            .into_response()
        }
        Err(e) => mutation_error(&e),
    }
}

#[derive(Deserialize)]
pub struct ProfileBody {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
}

/// `PUT /api/profile` — update the caller's display attributes.
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ProfileBody>,
) -> Response {
    match profile::update_own_profile(
        state.platform.as_ref(),
        &auth.session.access_token,
        auth.session.user_id,
        body.full_name,
        body.company_name,
    )
    .await
    {
        Ok(()) => Json(serde_json::json!({ "message": "Profile updated!" })).into_response(),
        Err(e) => mutation_error(&e),
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
