/// Reusable UI components

use yew::prelude::*;

use crate::link_data::LinkEntry;
use crate::link_name::short_form;

#[derive(Properties, PartialEq)]
pub struct LinkItemProps {
    pub link: LinkEntry,
    pub on_copy: Callback<String>,
    #[prop_or(false)]
    pub copied: bool,
}

/// One go link row with a copy button
#[function_component(LinkItem)]
pub fn link_item(props: &LinkItemProps) -> Html {
    let name = short_form(&props.link.source);

    let onclick = {
        let on_copy = props.on_copy.clone();
        let name = name.clone();
        Callback::from(move |_: MouseEvent| on_copy.emit(name.clone()))
    };

    let button_style = if props.copied {
        "background: #10b981; color: white; border: none; border-radius: 4px; padding: 4px 10px; cursor: pointer;"
    } else {
        "background: #3b82f6; color: white; border: none; border-radius: 4px; padding: 4px 10px; cursor: pointer;"
    };

    html! {
        <div class="go-link-item">
            <span class="go-link-text" title={props.link.target.clone()}>{name}</span>
            <button class="copy-btn" style={button_style} {onclick}>
                {if props.copied { "Copied!" } else { "Copy" }}
            </button>
        </div>
    }
}

#[derive(PartialEq, Clone, Debug)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Properties, PartialEq)]
pub struct NoticeProps {
    pub message: String,
    pub kind: NoticeKind,
}

/// Inline success/error message under the form
#[function_component(Notice)]
pub fn notice(props: &NoticeProps) -> Html {
    let (bg_color, border_color) = match props.kind {
        NoticeKind::Success => ("#e8f5e9", "#4caf50"),
        NoticeKind::Error => ("#ffebee", "#f44336"),
    };

    html! {
        <div style={format!("padding: 12px; border-radius: 4px; background-color: {}; border-left: 4px solid {}; margin: 10px 0;", bg_color, border_color)}>
            <p class="message-paragraph">{&props.message}</p>
        </div>
    }
}
