//! Profile resolution and the owner's edit-profile flow.

use tracing::error;
use uuid::Uuid;

use crate::platform::{Platform, PlatformError, ProfilePatch, ProfileRow, Role};

/// Resolve a user's role from their profile row.
///
/// Zero rows is a normal condition — the platform-side trigger that creates
/// profiles may not have run yet for a fresh signup — and defaults to
/// `client`. Any other fetch error is logged and also defaults to `client`;
/// see DESIGN.md for why this stays fail-open. Always returns a role.
pub async fn resolve_role(platform: &dyn Platform, token: &str, user_id: Uuid) -> Role {
    match platform.fetch_profile(token, user_id).await {
        Ok(profile) => profile.role,
        Err(e) if e.is_not_found() => Role::Client,
        Err(e) => {
            error!(error = %e, %user_id, "profile fetch failed; defaulting to client role");
            Role::Client
        }
    }
}

/// Fetch the caller's own profile for the edit form. Absent rows read as
/// `None` rather than an error.
pub async fn fetch_own_profile(
    platform: &dyn Platform,
    token: &str,
    user_id: Uuid,
) -> Result<Option<ProfileRow>, PlatformError> {
    match platform.fetch_profile(token, user_id).await {
        Ok(profile) => Ok(Some(profile)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Update the caller's display attributes.
pub async fn update_own_profile(
    platform: &dyn Platform,
    token: &str,
    user_id: Uuid,
    full_name: Option<String>,
    company_name: Option<String>,
) -> Result<(), PlatformError> {
    let patch = ProfilePatch { full_name, company_name };
    platform.update_profile(token, user_id, &patch).await
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
