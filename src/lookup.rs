/// Client for the Lynx reverse-lookup and link-creation API

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::form_urlencoded;

use crate::link_data::LinkEntry;
use crate::link_name::{is_resolvable_url, normalize_source};
use crate::settings::SettingsSource;

/// Host every go link is created under
const GO_HOST: &str = "go";

/// A raw HTTP response as seen by the client
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal HTTP capability the client needs from its host.
///
/// `Err` means the request never produced a response.
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, String>;
    async fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse, String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("lookup request failed: {0}")]
    Transport(String),
    #[error("lookup service answered with status {0}")]
    Status(u16),
    #[error("lookup response was not a link list: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    #[error("{0}")]
    Rejected(String),
    #[error("Failed to create go link: {0}")]
    Failed(String),
}

/// Outcome of a reverse lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Links(Vec<LinkEntry>),
    /// Not an http(s) URL; answered locally
    InvalidUrlScheme,
    /// The service could not be asked or gave an unusable answer
    LookupFailed(LookupError),
}

impl Resolution {
    pub fn links(&self) -> &[LinkEntry] {
        match self {
            Resolution::Links(links) => links,
            Resolution::InvalidUrlScheme | Resolution::LookupFailed(_) => &[],
        }
    }

    pub fn into_links(self) -> Vec<LinkEntry> {
        match self {
            Resolution::Links(links) => links,
            Resolution::InvalidUrlScheme | Resolution::LookupFailed(_) => Vec::new(),
        }
    }
}

#[derive(Serialize)]
struct CreateLinkBody<'a> {
    host: &'a str,
    source: &'a str,
    target: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct LookupClient<T, S> {
    transport: T,
    settings: S,
}

impl<T: HttpTransport, S: SettingsSource> LookupClient<T, S> {
    pub fn new(transport: T, settings: S) -> Self {
        LookupClient { transport, settings }
    }

    /// Find every go link whose target is exactly `url`
    pub async fn resolve_reverse(&self, url: &str) -> Resolution {
        if !is_resolvable_url(url) {
            return Resolution::InvalidUrlScheme;
        }

        let endpoint = self.settings.service_endpoint().await;
        let encoded: String = form_urlencoded::byte_serialize(url.as_bytes()).collect();
        let request_url = format!("{}/links/reverse?target={}", endpoint, encoded);

        let response = match self.transport.get(&request_url).await {
            Ok(response) => response,
            Err(e) => return failed(url, LookupError::Transport(e)),
        };

        if !response.is_success() {
            return failed(url, LookupError::Status(response.status));
        }

        match serde_json::from_str::<Vec<LinkEntry>>(&response.body) {
            Ok(links) => {
                debug!("Reverse lookup for {} returned {} link(s)", url, links.len());
                Resolution::Links(links)
            }
            Err(e) => failed(url, LookupError::Malformed(e.to_string())),
        }
    }

    /// Create a go link from `source` to `target`
    pub async fn create_link(&self, source: &str, target: &str) -> Result<LinkEntry, CreateError> {
        let source = normalize_source(source).map_err(|e| CreateError::Rejected(e.to_string()))?;
        if target.trim().is_empty() {
            return Err(CreateError::Rejected("Target URL is required".to_string()));
        }

        let endpoint = self.settings.service_endpoint().await;
        let body = serde_json::to_string(&CreateLinkBody {
            host: GO_HOST,
            source: &source,
            target,
        })
        .map_err(|e| CreateError::Failed(e.to_string()))?;

        let response = self
            .transport
            .post_json(&format!("{}/links", endpoint), &body)
            .await
            .map_err(CreateError::Failed)?;

        if !response.is_success() {
            let reason = serde_json::from_str::<ErrorBody>(&response.body)
                .ok()
                .and_then(|b| b.error);
            return Err(match reason {
                Some(reason) => CreateError::Rejected(reason),
                None => CreateError::Failed(format!("service answered with status {}", response.status)),
            });
        }

        serde_json::from_str::<LinkEntry>(&response.body)
            .map_err(|e| CreateError::Failed(format!("unreadable response: {}", e)))
    }
}

fn failed(url: &str, error: LookupError) -> Resolution {
    warn!("Error checking go links for {}: {}", url, error);
    Resolution::LookupFailed(error)
}
