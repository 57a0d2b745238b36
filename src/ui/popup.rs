/// Popup UI for the Lynx extension

use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use crate::chrome::{ChromeSettings, copyToClipboard, from_js, sendRuntimeMessage, to_js};
use crate::link_data::{CreateResponse, CurrentTabData, LinkEntry, NewLink, Request};
use crate::link_name::{normalize_source, short_form};
use crate::settings::validate_endpoint;
use crate::ui::components::{LinkItem, Notice, NoticeKind};

#[derive(Clone, PartialEq)]
enum AppState {
    Loading,
    Idle,
    Saving,
    Error(String),
}

#[derive(Clone, PartialEq)]
struct Message {
    kind: NoticeKind,
    text: String,
}

impl Message {
    fn success(text: String) -> Option<Message> {
        Some(Message { kind: NoticeKind::Success, text })
    }

    fn error(text: String) -> Option<Message> {
        Some(Message { kind: NoticeKind::Error, text })
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Loading);
    let tab_data = use_state(|| None::<CurrentTabData>);
    let source_input = use_state(String::new);
    let message = use_state(|| None::<Message>);
    let copied = use_state(|| None::<String>);
    let settings_open = use_state(|| false);
    let endpoint_input = use_state(String::new);

    let reload = {
        let state = state.clone();
        let tab_data = tab_data.clone();

        Callback::from(move |_: ()| {
            let state = state.clone();
            let tab_data = tab_data.clone();
            spawn_local(async move {
                match load_current_tab_data().await {
                    Ok(data) => {
                        tab_data.set(Some(data));
                        state.set(AppState::Idle);
                    }
                    Err(e) => {
                        log::warn!("{}", e);
                        state.set(AppState::Error("Failed to load go links data".to_string()));
                    }
                }
            });
        })
    };

    // Load tab data on mount
    {
        let reload = reload.clone();
        use_effect_with((), move |_| {
            reload.emit(());
            || ()
        });
    }

    let on_source_input = {
        let source_input = source_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                source_input.set(input.value());
            }
        })
    };

    // Add go link handler
    let submit = {
        let state = state.clone();
        let tab_data = tab_data.clone();
        let source_input = source_input.clone();
        let message = message.clone();
        let reload = reload.clone();

        Callback::from(move |_: ()| {
            let source = match normalize_source(&source_input) {
                Ok(source) => source,
                Err(e) => {
                    message.set(Message::error(e.to_string()));
                    return;
                }
            };
            let target = (*tab_data)
                .as_ref()
                .map(|data| data.current_url.clone())
                .unwrap_or_default();

            let state = state.clone();
            let source_input = source_input.clone();
            let message = message.clone();
            let reload = reload.clone();

            state.set(AppState::Saving);
            message.set(None);

            spawn_local(async move {
                match create_go_link(NewLink { source, target }).await {
                    Ok(link) => {
                        message.set(Message::success(format!("Go link created: {}", short_form(&link.source))));
                        source_input.set(String::new());
                        reload.emit(());
                    }
                    Err(e) => {
                        message.set(Message::error(e));
                        state.set(AppState::Idle);
                    }
                }
            });
        })
    };

    let on_add = submit.reform(|_: MouseEvent| ());

    let on_keypress = {
        let submit = submit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                submit.emit(());
            }
        })
    };

    let on_copy = {
        let copied = copied.clone();
        let message = message.clone();

        Callback::from(move |text: String| {
            let copied = copied.clone();
            let message = message.clone();
            spawn_local(async move {
                match copyToClipboard(&text).await {
                    Ok(_) => copied.set(Some(text)),
                    Err(e) => {
                        log::warn!("Failed to copy to clipboard: {:?}", e);
                        message.set(Message::error("Failed to copy to clipboard".to_string()));
                    }
                }
            });
        })
    };

    let on_toggle_settings = {
        let settings_open = settings_open.clone();
        let endpoint_input = endpoint_input.clone();

        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            if *settings_open {
                settings_open.set(false);
                return;
            }

            let settings_open = settings_open.clone();
            let endpoint_input = endpoint_input.clone();
            spawn_local(async move {
                let settings = ChromeSettings::load().await;
                endpoint_input.set(settings.service_endpoint());
                settings_open.set(true);
            });
        })
    };

    let on_endpoint_input = {
        let endpoint_input = endpoint_input.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                endpoint_input.set(input.value());
            }
        })
    };

    let on_save_settings = {
        let endpoint_input = endpoint_input.clone();
        let settings_open = settings_open.clone();
        let message = message.clone();

        Callback::from(move |_: MouseEvent| {
            let endpoint = match validate_endpoint(&endpoint_input) {
                Ok(endpoint) => endpoint,
                Err(e) => {
                    message.set(Message::error(e.to_string()));
                    return;
                }
            };

            let settings_open = settings_open.clone();
            let message = message.clone();
            spawn_local(async move {
                match ChromeSettings::save_endpoint(&endpoint).await {
                    Ok(_) => {
                        settings_open.set(false);
                        message.set(Message::success("Server URL updated".to_string()));
                    }
                    Err(e) => message.set(Message::error(e)),
                }
            });
        })
    };

    let is_busy = matches!(*state, AppState::Loading | AppState::Saving);

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Lynx"}</h1>

            {match &*state {
                AppState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{"Loading go links..."}</p>
                    </div>
                },
                AppState::Error(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
                AppState::Idle | AppState::Saving => html! {}
            }}

            if let Some(data) = (*tab_data).clone() {
                <div class="current-url">{data.current_url.clone()}</div>

                <div class="go-links-section">
                    if data.go_links.is_empty() {
                        <div class="no-links">{"No go links found for this URL"}</div>
                    } else {
                        {for data.go_links.iter().map(|link: &LinkEntry| {
                            let is_copied = (*copied).as_deref() == Some(short_form(&link.source).as_str());
                            html! {
                                <LinkItem link={link.clone()} on_copy={on_copy.clone()} copied={is_copied} />
                            }
                        })}
                    }
                </div>
            }

            <div class="add-link">
                <input
                    type="text"
                    placeholder="new-link-name"
                    value={(*source_input).clone()}
                    oninput={on_source_input}
                    onkeypress={on_keypress}
                    disabled={is_busy}
                    class="search-input"
                />
                <Button onclick={on_add} disabled={is_busy} variant={ButtonVariant::Primary}>
                    {if *state == AppState::Saving { "..." } else { "+" }}
                </Button>
            </div>

            if let Some(msg) = (*message).clone() {
                <Notice message={msg.text} kind={msg.kind} />
            }

            if *settings_open {
                <div class="settings">
                    <input
                        type="text"
                        placeholder="http://lynx:3000/api"
                        value={(*endpoint_input).clone()}
                        oninput={on_endpoint_input}
                        class="search-input"
                    />
                    <Button onclick={on_save_settings} variant={ButtonVariant::Secondary} block={true}>
                        {"Save"}
                    </Button>
                </div>
            }

            <p class="footer-popup">
                <a href="#" onclick={on_toggle_settings}>{"Settings"}</a>
            </p>
        </div>
    }
}

// Helper functions

async fn load_current_tab_data() -> Result<CurrentTabData, String> {
    let request = to_js(&Request::GetCurrentTabData)?;
    let response = sendRuntimeMessage(request)
        .await
        .map_err(|e| format!("Failed to get tab data: {:?}", e))?;
    from_js(response)
}

async fn create_go_link(link: NewLink) -> Result<LinkEntry, String> {
    let request = to_js(&Request::CreateGoLink { data: link })?;
    let response = sendRuntimeMessage(request)
        .await
        .map_err(|e| format!("Failed to create go link: {:?}", e))?;
    let response: CreateResponse = from_js(response)?;

    match (response.success, response.data) {
        (true, Some(link)) => Ok(link),
        _ => Err(response.error.unwrap_or_else(|| "Failed to create go link".to_string())),
    }
}
