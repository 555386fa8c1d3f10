//! Portal session management.
//!
//! DESIGN
//! ======
//! Sessions are in-memory only: a random portal token in the cookie maps to
//! the platform access token it fronts. Restarting the process signs
//! everyone out, which is acceptable because the platform, not the portal,
//! is the durable authority. A sweeper task watches the map for the process
//! lifetime and evicts sessions whose platform token has expired.

use std::fmt::Write;
use std::time::Duration;

use rand::Rng;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::platform::{AuthSession, Role};
use crate::state::{AppState, PortalSession};

const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 60;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Create a portal session fronting the given platform session.
pub async fn create_session(
    state: &AppState,
    auth: &AuthSession,
    role: Role,
) -> PortalSession {
    let session = PortalSession {
        token: generate_token(),
        access_token: auth.access_token.clone(),
        user_id: auth.user.id,
        email: auth.user.email.clone(),
        role,
        expires_at: OffsetDateTime::now_utc()
            + time::Duration::seconds(i64::try_from(auth.expires_in).unwrap_or(3600)),
    };
    let mut sessions = state.sessions.write().await;
    sessions.insert(session.token.clone(), session.clone());
    session
}

/// Look up a live session by portal token. Expired tokens read as absent.
pub async fn validate_session(state: &AppState, token: &str) -> Option<PortalSession> {
    let sessions = state.sessions.read().await;
    sessions
        .get(token)
        .filter(|s| !s.is_expired(OffsetDateTime::now_utc()))
        .cloned()
}

/// Remove a session by portal token, returning it for platform revocation.
pub async fn delete_session(state: &AppState, token: &str) -> Option<PortalSession> {
    let mut sessions = state.sessions.write().await;
    sessions.remove(token)
}

fn sweep_interval_secs() -> u64 {
    std::env::var("SESSION_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_SESSION_SWEEP_INTERVAL_SECS)
}

/// Evict expired sessions and their dashboard snapshots. Returns the
/// number of sessions removed.
pub async fn sweep_expired(state: &AppState) -> usize {
    let now = OffsetDateTime::now_utc();
    let expired: Vec<PortalSession> = {
        let mut sessions = state.sessions.write().await;
        let tokens: Vec<String> = sessions
            .iter()
            .filter(|(_, s)| s.is_expired(now))
            .map(|(token, _)| token.clone())
            .collect();
        tokens
            .iter()
            .filter_map(|token| sessions.remove(token))
            .collect()
    };

    if !expired.is_empty() {
        let mut dashboards = state.dashboards.write().await;
        for session in &expired {
            dashboards.remove(&session.user_id);
        }
    }
    expired.len()
}

/// Spawn the background session sweeper. Returns a handle for shutdown.
pub fn spawn_session_sweeper(state: AppState) -> JoinHandle<()> {
    let interval_secs = sweep_interval_secs();
    info!(interval_secs, "session sweeper configured");
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(interval_secs)).await;
            let removed = sweep_expired(&state).await;
            if removed > 0 {
                debug!(removed, "expired sessions evicted");
            }
        }
    })
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
