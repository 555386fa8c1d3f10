//! Platform connection configuration parsed from environment variables.

use super::types::PlatformError;

pub const DEFAULT_PLATFORM_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PLATFORM_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`.
    pub base_url: String,
    /// Public anon key sent as the `apikey` header on every call.
    pub anon_key: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl PlatformConfig {
    /// Build typed platform config from environment variables.
    ///
    /// Required:
    /// - `PLATFORM_URL`
    /// - `PLATFORM_ANON_KEY`
    ///
    /// Optional:
    /// - `PLATFORM_REQUEST_TIMEOUT_SECS`: default 30
    /// - `PLATFORM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::MissingCredential`] when a required variable
    /// is absent.
    pub fn from_env() -> Result<Self, PlatformError> {
        let base_url = std::env::var("PLATFORM_URL")
            .map_err(|_| PlatformError::MissingCredential { var: "PLATFORM_URL".into() })?
            .trim_end_matches('/')
            .to_string();
        let anon_key = std::env::var("PLATFORM_ANON_KEY")
            .map_err(|_| PlatformError::MissingCredential { var: "PLATFORM_ANON_KEY".into() })?;

        Ok(Self {
            base_url,
            anon_key,
            request_timeout_secs: env_parse_u64(
                "PLATFORM_REQUEST_TIMEOUT_SECS",
                DEFAULT_PLATFORM_REQUEST_TIMEOUT_SECS,
            ),
            connect_timeout_secs: env_parse_u64(
                "PLATFORM_CONNECT_TIMEOUT_SECS",
                DEFAULT_PLATFORM_CONNECT_TIMEOUT_SECS,
            ),
        })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
