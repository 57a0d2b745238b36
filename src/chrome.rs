/// chrome.* implementations of the host capabilities

use std::collections::BTreeMap;

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::affordance::Affordance;
use crate::controller::BrowserHost;
use crate::link_data::{TabId, TabRecord, TabSnapshot};
use crate::lookup::{HttpResponse, HttpTransport};
use crate::settings::{SERVICE_ENDPOINT_KEY, Settings, SettingsSource};

// Import JS bridge functions
#[wasm_bindgen(module = "/js/chrome_bridge.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getTab(tab_id: i32) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryActiveTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn queryAllTabs() -> Result<JsValue, JsValue>;

    fn setActionIcon(tab_id: i32, paths: JsValue);

    fn setActionTitle(tab_id: i32, title: &str);

    #[wasm_bindgen(catch)]
    async fn saveTabRecord(key: &str, record: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeTabRecords(keys: Vec<String>) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn loadTabRecords() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getSyncSetting(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSyncSetting(key: &str, value: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn httpRequest(method: &str, url: &str, body: Option<String>) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    pub(crate) async fn sendRuntimeMessage(message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    pub(crate) async fn copyToClipboard(text: &str) -> Result<(), JsValue>;

    pub(crate) fn onTabEvent(callback: &js_sys::Function);

    pub(crate) fn onRuntimeMessage(callback: &js_sys::Function);

    pub(crate) fn onStartup(callback: &js_sys::Function);
}

/// Serialize into plain JS objects (not `Map`s), as the chrome APIs expect
pub fn to_js<T: Serialize>(value: &T) -> Result<JsValue, String> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| format!("Failed to serialize: {:?}", e))
}

pub fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, String> {
    serde_wasm_bindgen::from_value(value).map_err(|e| format!("Failed to parse: {:?}", e))
}

/// chrome.storage.session key for a tab's record
fn record_key(tab_id: TabId) -> String {
    format!("tab:{}", tab_id)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeHost;

impl BrowserHost for ChromeHost {
    async fn tab_url(&self, tab_id: TabId) -> Option<String> {
        let tab = getTab(tab_id.get())
            .await
            .map_err(|e| format!("Failed to get tab: {:?}", e))
            .and_then(from_js::<Option<TabSnapshot>>);
        match tab {
            Ok(tab) => tab.and_then(|tab| tab.url),
            Err(e) => {
                warn!("tab {}: {}", tab_id, e);
                None
            }
        }
    }

    async fn active_tab(&self) -> Option<TabSnapshot> {
        let tab = queryActiveTab()
            .await
            .map_err(|e| format!("Failed to query active tab: {:?}", e))
            .and_then(from_js::<Option<TabSnapshot>>);
        tab.unwrap_or_else(|e| {
            warn!("{}", e);
            None
        })
    }

    async fn open_tabs(&self) -> Vec<TabSnapshot> {
        let tabs = queryAllTabs()
            .await
            .map_err(|e| format!("Failed to query tabs: {:?}", e))
            .and_then(from_js::<Vec<TabSnapshot>>);
        tabs.unwrap_or_else(|e| {
            warn!("{}", e);
            Vec::new()
        })
    }

    fn show_affordance(&self, tab_id: TabId, affordance: &Affordance) {
        let paths: BTreeMap<String, String> = affordance
            .icon
            .paths()
            .into_iter()
            .map(|(size, path)| (size.to_string(), path))
            .collect();

        match to_js(&paths) {
            Ok(paths) => setActionIcon(tab_id.get(), paths),
            Err(e) => warn!("tab {}: {}", tab_id, e),
        }
        setActionTitle(tab_id.get(), &affordance.title);
    }

    fn save_record(&self, record: &TabRecord) {
        let key = record_key(record.tab_id);
        let value = match to_js(record) {
            Ok(value) => value,
            Err(e) => {
                warn!("tab {}: {}", record.tab_id, e);
                return;
            }
        };
        spawn_local(async move {
            if let Err(e) = saveTabRecord(&key, value).await {
                warn!("Failed to save {}: {:?}", key, e);
            }
        });
    }

    fn forget_records(&self, tab_ids: &[TabId]) {
        let keys: Vec<String> = tab_ids.iter().map(|tab_id| record_key(*tab_id)).collect();
        spawn_local(async move {
            if let Err(e) = removeTabRecords(keys).await {
                warn!("Failed to forget tab records: {:?}", e);
            }
        });
    }

    async fn saved_records(&self) -> Vec<TabRecord> {
        let records = loadTabRecords()
            .await
            .map_err(|e| format!("Failed to load tab records: {:?}", e))
            .and_then(from_js::<Vec<TabRecord>>);
        records.unwrap_or_else(|e| {
            warn!("{}", e);
            Vec::new()
        })
    }

    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// Service endpoint read from chrome.storage.sync on every call
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeSettings;

impl ChromeSettings {
    pub async fn save_endpoint(endpoint: &str) -> Result<(), String> {
        setSyncSetting(SERVICE_ENDPOINT_KEY, endpoint)
            .await
            .map_err(|e| format!("Failed to save setting: {:?}", e))
    }

    pub async fn load() -> Settings {
        match getSyncSetting(SERVICE_ENDPOINT_KEY).await {
            Ok(value) => Settings {
                lynx_server_url: value.as_string(),
            },
            Err(e) => {
                warn!("Failed to read settings: {:?}", e);
                Settings::default()
            }
        }
    }
}

impl SettingsSource for ChromeSettings {
    async fn service_endpoint(&self) -> String {
        ChromeSettings::load().await.service_endpoint()
    }
}

#[derive(Deserialize)]
struct BridgeResponse {
    status: u16,
    body: String,
}

/// HTTP over the page's `fetch`
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeTransport;

impl ChromeTransport {
    async fn request(&self, method: &str, url: &str, body: Option<String>) -> Result<HttpResponse, String> {
        let response = httpRequest(method, url, body)
            .await
            .map_err(|e| format!("{} {} failed: {:?}", method, url, e))?;
        let response: BridgeResponse = from_js(response)?;

        Ok(HttpResponse {
            status: response.status,
            body: response.body,
        })
    }
}

impl HttpTransport for ChromeTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, String> {
        self.request("GET", url, None).await
    }

    async fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse, String> {
        self.request("POST", url, Some(body.to_string())).await
    }
}
