/// Extension settings persisted in chrome.storage.sync

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Base URL of the Lynx API when the user has not configured one
pub const DEFAULT_SERVICE_ENDPOINT: &str = "http://lynx:3000/api";

/// Storage key holding the service base URL
pub const SERVICE_ENDPOINT_KEY: &str = "lynxServerUrl";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("Server URL is not a valid URL: {0}")]
    Unparseable(String),
    #[error("Server URL must start with http:// or https://")]
    UnsupportedScheme,
}

/// Root settings structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub lynx_server_url: Option<String>,
}

impl Settings {
    /// The endpoint to use for the next request
    pub fn service_endpoint(&self) -> String {
        normalize_endpoint(self.lynx_server_url.as_deref().unwrap_or_default())
    }
}

/// Read access to the configured service endpoint.
///
/// Implementations must read the backing store on every call; the lookup
/// client never caches the result past one request.
#[allow(async_fn_in_trait)]
pub trait SettingsSource {
    async fn service_endpoint(&self) -> String;
}

/// Trim whitespace and trailing slashes, falling back to the default
pub fn normalize_endpoint(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_SERVICE_ENDPOINT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Validate a user-entered endpoint before it is saved
pub fn validate_endpoint(raw: &str) -> Result<String, SettingsError> {
    let endpoint = normalize_endpoint(raw);
    let parsed = Url::parse(&endpoint).map_err(|e| SettingsError::Unparseable(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(endpoint),
        _ => Err(SettingsError::UnsupportedScheme),
    }
}
