/// Data structures for Lynx go links
use std::fmt;

use serde::{Deserialize, Serialize};

/// Browser-assigned tab handle
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(i32);

impl TabId {
    pub fn new(raw: i32) -> TabId {
        TabId(raw)
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A go link as returned by the lookup service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkEntry {
    pub source: String,
    pub target: String,
}

impl LinkEntry {
    pub fn new(source: &str, target: &str) -> LinkEntry {
        LinkEntry {
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

/// Everything the extension knows about one tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabRecord {
    pub tab_id: TabId,
    pub url: String,
    pub resolved_links: Vec<LinkEntry>,
    /// Milliseconds since the epoch
    pub last_resolved_at: f64,
}

impl TabRecord {
    pub fn has_links(&self) -> bool {
        !self.resolved_links.is_empty()
    }
}

/// Minimal view of a live browser tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabSnapshot {
    pub id: TabId,
    #[serde(default)]
    pub url: Option<String>,
}

impl TabSnapshot {
    pub fn new(id: TabId, url: &str) -> TabSnapshot {
        TabSnapshot {
            id,
            url: Some(url.to_string()),
        }
    }
}

/// Request payload for a new go link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLink {
    pub source: String,
    pub target: String,
}

/// Messages sent to the background context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    GetCurrentTabData,
    CreateGoLink { data: NewLink },
    UrlChanged { url: String },
}

/// Reply to `getCurrentTabData`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTabData {
    pub go_links: Vec<LinkEntry>,
    pub current_url: String,
}

/// Reply to `createGoLink`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<LinkEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CreateResponse {
    pub fn created(link: LinkEntry) -> CreateResponse {
        CreateResponse {
            success: true,
            data: Some(link),
            error: None,
        }
    }

    pub fn failed(error: String) -> CreateResponse {
        CreateResponse {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Any reply the background context sends back
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    TabData(CurrentTabData),
    Created(CreateResponse),
}
