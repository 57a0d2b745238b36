/// Background service worker: routes browser events into the controller

use std::rc::Rc;

use log::{info, warn};
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::chrome::{self, ChromeHost, ChromeSettings, ChromeTransport, from_js, to_js};
use crate::controller::{SyncController, TabEvent};
use crate::link_data::{Request, TabId, TabSnapshot};
use crate::lookup::LookupClient;
use crate::viewer::ViewerQuery;

type Controller = SyncController<ChromeHost, ChromeTransport, ChromeSettings>;

/// Shape of the tab events forwarded by the JS bridge
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
enum BrowserEvent {
    Created {
        tab_id: TabId,
        #[serde(default)]
        url: Option<String>,
    },
    Updated {
        tab_id: TabId,
        #[serde(default)]
        complete: bool,
        #[serde(default)]
        url: Option<String>,
    },
    Activated {
        tab_id: TabId,
    },
    Removed {
        tab_id: TabId,
    },
    Replaced {
        added_tab_id: TabId,
        removed_tab_id: TabId,
    },
}

impl From<BrowserEvent> for TabEvent {
    fn from(event: BrowserEvent) -> TabEvent {
        match event {
            BrowserEvent::Created { tab_id, url } => TabEvent::Created { tab_id, url },
            BrowserEvent::Updated { tab_id, complete, url } => TabEvent::Updated { tab_id, complete, url },
            BrowserEvent::Activated { tab_id } => TabEvent::Activated { tab_id },
            BrowserEvent::Removed { tab_id } => TabEvent::Removed { tab_id },
            BrowserEvent::Replaced {
                added_tab_id,
                removed_tab_id,
            } => TabEvent::Replaced {
                added: added_tab_id,
                removed: removed_tab_id,
            },
        }
    }
}

pub fn start() {
    let lookup = LookupClient::new(ChromeTransport, ChromeSettings);
    let controller = Rc::new(SyncController::new(ChromeHost, lookup));
    let viewer = Rc::new(ViewerQuery::new(controller.clone()));

    let restoring = controller.clone();
    spawn_local(async move {
        restoring.rehydrate().await;
    });

    listen_for_tab_events(controller.clone());
    listen_for_messages(viewer);
    listen_for_startup(controller);

    info!("Lynx background ready");
}

fn listen_for_tab_events(controller: Rc<Controller>) {
    let on_event = Closure::<dyn Fn(JsValue)>::new(move |event: JsValue| {
        let event = match from_js::<BrowserEvent>(event) {
            Ok(event) => TabEvent::from(event),
            Err(e) => {
                warn!("Unrecognized tab event: {}", e);
                return;
            }
        };

        let controller = controller.clone();
        spawn_local(async move {
            controller.handle_event(event).await;
        });
    });

    chrome::onTabEvent(on_event.as_ref().unchecked_ref());
    on_event.forget();
}

fn listen_for_messages(viewer: Rc<ViewerQuery<ChromeHost, ChromeTransport, ChromeSettings>>) {
    let on_message = Closure::<dyn Fn(JsValue, JsValue) -> js_sys::Promise>::new(
        move |message: JsValue, sender: JsValue| {
            let viewer = viewer.clone();
            future_to_promise(async move {
                let request: Request = from_js(message).map_err(|e| JsValue::from_str(&e))?;
                let sender: Option<TabSnapshot> = from_js(sender).unwrap_or_default();

                match viewer.handle_request(request, sender).await {
                    Some(response) => to_js(&response).map_err(|e| JsValue::from_str(&e)),
                    None => Ok(JsValue::UNDEFINED),
                }
            })
        },
    );

    chrome::onRuntimeMessage(on_message.as_ref().unchecked_ref());
    on_message.forget();
}

fn listen_for_startup(controller: Rc<Controller>) {
    let on_startup = Closure::<dyn Fn()>::new(move || {
        let controller = controller.clone();
        spawn_local(async move {
            let resolved = controller.startup().await;
            info!("Resolved go links for {} open tab(s)", resolved);
        });
    });

    chrome::onStartup(on_startup.as_ref().unchecked_ref());
    on_startup.forget();
}
