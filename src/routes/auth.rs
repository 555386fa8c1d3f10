//! Auth routes — signup, login, logout, and the session extractors.

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use crate::platform::{PlatformError, Role};
use crate::routes::portal::resolve_view;
use crate::services::{profile, session};
use crate::state::{AppState, PortalSession};

pub(crate) const COOKIE_NAME: &str = "portal_session";

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    if let Some(value) = env_bool("COOKIE_SECURE") {
        return value;
    }

    std::env::var("PORTAL_PUBLIC_URL")
        .map(|uri| uri.starts_with("https://"))
        .unwrap_or(false)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .build()
}

fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub session: PortalSession,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let app_state = AppState::from_ref(state);
        let session = session::validate_session(&app_state, token)
            .await
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { session })
    }
}

/// Authenticated admin. Rejects non-admin sessions with 403.
pub struct AdminUser {
    pub session: PortalSession,
}

impl<S> axum::extract::FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth =
            <AuthUser as axum::extract::FromRequestParts<S>>::from_request_parts(parts, state)
                .await?;
        if auth.session.role != Role::Admin {
            return Err(StatusCode::FORBIDDEN);
        }
        Ok(Self { session: auth.session })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// The message shown to the user: the platform's own text when it sent one.
pub(crate) fn platform_error_message(err: &PlatformError) -> String {
    match err {
        PlatformError::Api { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

/// Auth failures surface the platform's message for the inline form banner.
pub(crate) fn auth_error_parts(err: &PlatformError) -> (StatusCode, String) {
    let status = match err {
        PlatformError::Api { status, .. } if (400..500).contains(status) => {
            StatusCode::UNAUTHORIZED
        }
        PlatformError::Api { .. } | PlatformError::Request(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, platform_error_message(err))
}

fn auth_error(err: &PlatformError) -> Response {
    let (status, message) = auth_error_parts(err);
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

async fn open_session(
    state: &AppState,
    jar: CookieJar,
    auth: &crate::platform::AuthSession,
) -> Response {
    let role = profile::resolve_role(state.platform.as_ref(), &auth.access_token, auth.user.id).await;
    let portal_session = session::create_session(state, auth, role).await;
    let view = resolve_view(Some(&portal_session));

    let jar = jar.add(session_cookie(portal_session.token.clone()));
    (
        jar,
        Json(serde_json::json!({ "view": view, "email": portal_session.email })),
    )
        .into_response()
}

/// `POST /api/auth/signup` — register with email/password.
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<Credentials>,
) -> Response {
    match state.platform.sign_up(&body.email, &body.password).await {
        Ok(Some(auth)) => open_session(&state, jar, &auth).await,
        // Email confirmation pending: no session yet, just the banner text.
        Ok(None) => Json(serde_json::json!({
            "message": "Check your email for the confirmation link!"
        }))
        .into_response(),
        Err(e) => auth_error(&e),
    }
}

/// `POST /api/auth/login` — exchange credentials for a portal session.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<Credentials>,
) -> Response {
    match state.platform.sign_in(&body.email, &body.password).await {
        Ok(auth) => open_session(&state, jar, &auth).await,
        Err(e) => auth_error(&e),
    }
}

/// `POST /api/auth/logout` — drop the portal session, revoke the platform
/// token best-effort, clear the cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Some(removed) = session::delete_session(&state, &auth.session.token).await {
        if let Err(e) = state.platform.sign_out(&removed.access_token).await {
            tracing::warn!(error = %e, "platform sign-out failed");
        }
        state.dashboards.write().await.remove(&removed.user_id);
    }

    let jar = CookieJar::new().add(clear_session_cookie());
    (jar, StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
