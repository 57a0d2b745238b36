/// Content script: reports the document's URL whenever it changes

use std::cell::RefCell;
use std::rc::Rc;

use log::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{MutationObserver, MutationObserverInit, Window};

use crate::chrome::{sendRuntimeMessage, to_js};
use crate::link_data::Request;
use crate::navigation::NavigationWatcher;

pub(crate) fn start() -> Result<(), JsValue> {
    watch_location(report)
}

/// Call `on_change` with the current URL, then again whenever it changes
pub fn watch_location(on_change: impl Fn(String) + 'static) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let (watcher, initial) = NavigationWatcher::attach(&window.location().href()?);
    on_change(initial);

    let watcher = Rc::new(RefCell::new(watcher));
    let check = Rc::new(url_check(window.clone(), watcher, on_change));

    // pushState/replaceState fire no event in the content script's world;
    // DOM churn is the only signal they leave behind.
    let on_mutation = {
        let check = check.clone();
        Closure::<dyn Fn()>::new(move || check())
    };
    let observer = MutationObserver::new(on_mutation.as_ref().unchecked_ref())?;
    let options = MutationObserverInit::new();
    options.set_subtree(true);
    options.set_child_list(true);
    if let Some(document) = window.document() {
        observer.observe_with_options(&document, &options)?;
    }
    on_mutation.forget();

    for event in ["popstate", "hashchange"] {
        let check = check.clone();
        let listener = Closure::<dyn Fn()>::new(move || check());
        window.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
        listener.forget();
    }

    Ok(())
}

fn url_check(
    window: Window,
    watcher: Rc<RefCell<NavigationWatcher>>,
    on_change: impl Fn(String),
) -> impl Fn() {
    move || {
        let Ok(href) = window.location().href() else {
            return;
        };
        let changed = watcher.borrow_mut().observe(&href);
        if let Some(url) = changed {
            on_change(url);
        }
    }
}

fn report(url: String) {
    spawn_local(async move {
        let message = match to_js(&Request::UrlChanged { url }) {
            Ok(message) => message,
            Err(e) => {
                warn!("{}", e);
                return;
            }
        };
        if let Err(e) = sendRuntimeMessage(message).await {
            warn!("Failed to report URL change: {:?}", e);
        }
    });
}
