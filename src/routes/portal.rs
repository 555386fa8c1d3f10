//! Role routing — which top-level view a session receives.

use axum::extract::State;
use axum::response::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;

use crate::platform::Role;
use crate::routes::auth::COOKIE_NAME;
use crate::services::session;
use crate::state::{AppState, PortalSession};

/// The three top-level views the frontend can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortalView {
    Auth,
    Client,
    Admin,
}

/// Pure decision: no session → auth view; admin role → admin portal;
/// any other role → client dashboard.
#[must_use]
pub fn resolve_view(session: Option<&PortalSession>) -> PortalView {
    match session {
        None => PortalView::Auth,
        Some(s) if s.role == Role::Admin => PortalView::Admin,
        Some(_) => PortalView::Client,
    }
}

/// `GET /api/portal` — report the view to mount and the header identity.
/// Never fails: an absent or expired session simply resolves to the auth
/// view.
pub async fn portal_view(State(state): State<AppState>, jar: CookieJar) -> Json<serde_json::Value> {
    let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
    let session = if token.is_empty() {
        None
    } else {
        session::validate_session(&state, token).await
    };

    let view = resolve_view(session.as_ref());
    Json(serde_json::json!({
        "view": view,
        "email": session.and_then(|s| s.email),
    }))
}

#[cfg(test)]
#[path = "portal_test.rs"]
mod tests;
