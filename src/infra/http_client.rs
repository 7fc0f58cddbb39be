use std::time::Duration;

use crate::config::RegistryConfig;
use crate::error::Result;
use crate::types::LookupFailure;

/// Build the shared HTTP client used for registry lookups.
pub fn build_client(config: &RegistryConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.as_str())
        .build()?;
    Ok(client)
}

/// Map a `reqwest` failure onto the lookup failure category it represents.
pub fn classify_error(err: &reqwest::Error) -> LookupFailure {
    if err.is_timeout() {
        LookupFailure::Timeout
    } else if err.is_connect() {
        LookupFailure::ConnectionRefused
    } else if let Some(status) = err.status() {
        LookupFailure::HttpStatus(status.as_u16())
    } else if err.is_decode() {
        LookupFailure::Decode
    } else {
        LookupFailure::Transport
    }
}
