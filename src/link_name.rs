/// URL classification and go link name handling
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use url::Url;

static LINK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/[A-Za-z0-9\-_/]+$").expect("link name pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkNameError {
    #[error("Please enter a go link name")]
    Empty,
    #[error("Go link name can only contain letters, numbers, hyphens, underscores, and forward slashes")]
    InvalidCharacters,
}

/// Whether the lookup service can know anything about this URL.
///
/// Only absolute `http`/`https` URLs qualify. Browser-internal pages
/// (`chrome://`, `about:blank`, `file://`, the new tab page) and anything
/// that does not parse are answered locally with "no links".
pub fn is_resolvable_url(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.has_host(),
        Err(_) => false,
    }
}

/// Normalize user input into a go link source path
///
/// Algorithm:
/// 1. Trim surrounding whitespace
/// 2. Reject empty input
/// 3. Prefix "/" if missing
/// 4. Validate against `^/[A-Za-z0-9\-_/]+$`
///
/// Examples:
/// - "docs" → "/docs"
/// - "/team/wiki" → "/team/wiki"
/// - "my link" → error
pub fn normalize_source(raw: &str) -> Result<String, LinkNameError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LinkNameError::Empty);
    }

    let source = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    };

    if LINK_NAME.is_match(&source) {
        Ok(source)
    } else {
        Err(LinkNameError::InvalidCharacters)
    }
}

/// Human-facing form of a source path, e.g. "/docs" → "go/docs"
pub fn short_form(source: &str) -> String {
    format!("go/{}", source.trim_start_matches('/'))
}
