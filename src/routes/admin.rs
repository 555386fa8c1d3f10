//! Admin portal routes.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use uuid::Uuid;

use crate::routes::auth::{platform_error_message, AdminUser};
use crate::routes::dashboard::platform_error_status;
use crate::services::{admin, invoices};
use crate::state::AppState;

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// `GET /api/admin` — clients, projects with owners, per-client balances.
pub async fn admin_data(State(state): State<AppState>, auth: AdminUser) -> Response {
    let data = admin::load_admin_data(state.platform.as_ref(), &auth.session.access_token).await;
    Json(data).into_response()
}

// =============================================================================
// CREATE PROJECT
// =============================================================================

#[derive(Deserialize)]
pub struct AdminProjectBody {
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Client-side-style required-field checks, before any platform call.
pub(crate) fn validate_admin_project(body: &AdminProjectBody) -> Result<Uuid, &'static str> {
    let Some(client_id) = body.client_id else {
        return Err("Select a client");
    };
    if body.title.trim().is_empty() {
        return Err("Project title is required");
    }
    Ok(client_id)
}

/// `POST /api/admin/projects` — create a project for the chosen client and
/// answer with refreshed admin data.
pub async fn create_project(
    State(state): State<AppState>,
    auth: AdminUser,
    Json(body): Json<AdminProjectBody>,
) -> Response {
    let client_id = match validate_admin_project(&body) {
        Ok(id) => id,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    match admin::create_project_for_client(
        state.platform.as_ref(),
        &auth.session.access_token,
        client_id,
        body.title,
        body.description,
    )
    .await
    {
        Ok(_) => {
            let data =
                admin::load_admin_data(state.platform.as_ref(), &auth.session.access_token).await;
            (StatusCode::CREATED, Json(data)).into_response()
        }
        Err(e) => error_response(platform_error_status(&e), &platform_error_message(&e)),
    }
}

// =============================================================================
// SEED DEMO DATA
// =============================================================================

#[derive(Deserialize)]
pub struct SeedBody {
    #[serde(default)]
    pub confirm: bool,
}

/// `POST /api/admin/seed` — demo project + two invoices per client.
/// Refused without explicit confirmation.
pub async fn seed_demo_data(
    State(state): State<AppState>,
    auth: AdminUser,
    Json(body): Json<SeedBody>,
) -> Response {
    if !body.confirm {
        return error_response(
            StatusCode::BAD_REQUEST,
            "This creates dummy projects and invoices for ALL current clients; pass confirm=true",
        );
    }

    match admin::seed_demo_data(state.platform.as_ref(), &auth.session.access_token).await {
        Ok(summary) => Json(serde_json::json!({
            "message": "Dummy data created!",
            "projects": summary.projects,
            "invoices": summary.invoices,
        }))
        .into_response(),
        Err(e) => error_response(platform_error_status(&e), &platform_error_message(&e)),
    }
}

// =============================================================================
// UPLOAD INVOICE
// =============================================================================

struct UploadFields {
    project_id: Option<Uuid>,
    amount: Option<f64>,
    file_name: String,
    bytes: Vec<u8>,
}

async fn read_upload_fields(mut multipart: Multipart) -> Result<UploadFields, String> {
    let mut fields = UploadFields {
        project_id: None,
        amount: None,
        file_name: String::new(),
        bytes: Vec::new(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("malformed upload: {e}"))?
    {
        match field.name().unwrap_or_default() {
            "project_id" => {
                let text = field.text().await.map_err(|e| e.to_string())?;
                fields.project_id = Uuid::parse_str(text.trim()).ok();
            }
            "amount" => {
                let text = field.text().await.map_err(|e| e.to_string())?;
                fields.amount = text.trim().parse::<f64>().ok();
            }
            "file" => {
                fields.file_name = field.file_name().unwrap_or_default().to_string();
                fields.bytes = field
                    .bytes()
                    .await
                    .map_err(|e| e.to_string())?
                    .to_vec();
            }
            _ => {}
        }
    }

    Ok(fields)
}

/// `POST /api/admin/invoices` — multipart amount + PDF upload against a
/// selected project. Validation happens before any platform call; the file
/// is uploaded first and the invoice row recorded second.
pub async fn upload_invoice(
    State(state): State<AppState>,
    auth: AdminUser,
    multipart: Multipart,
) -> Response {
    let fields = match read_upload_fields(multipart).await {
        Ok(fields) => fields,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, &message),
    };

    let upload = match invoices::validate_upload(
        fields.project_id,
        fields.amount,
        &fields.file_name,
        fields.bytes,
    ) {
        Ok(upload) => upload,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    match invoices::upload_invoice(state.platform.as_ref(), &auth.session.access_token, upload)
        .await
    {
        Ok(_) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "message": "Invoice Uploaded!" })),
        )
            .into_response(),
        Err(invoices::UploadError::Platform(e)) => {
            error_response(platform_error_status(&e), &platform_error_message(&e))
        }
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
