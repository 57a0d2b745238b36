/// Lynx - Chrome Extension for go links
/// Built with Rust + WASM + Yew

pub mod affordance;
mod background;
pub mod chrome;
pub mod content;
pub mod controller;
pub mod link_data;
pub mod link_name;
pub mod lookup;
pub mod navigation;
pub mod settings;
pub mod tab_state;
pub mod viewer;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export URL classification for JavaScript access
#[wasm_bindgen]
pub fn is_resolvable_url(url: &str) -> bool {
    link_name::is_resolvable_url(url)
}

// Start the background service worker
#[wasm_bindgen]
pub fn start_background() {
    background::start();
}

// Start URL change reporting in a page
#[wasm_bindgen]
pub fn start_content_script() -> Result<(), JsValue> {
    content::start()
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
