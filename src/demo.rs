use dioxus::prelude::*;
use modal_dialog::{BrowserHost, Modal, ModalConfig};

const TERMS_URL: &str = "/terms.html";
const CLOSE_HTML: &str = "&times;";

#[component]
pub fn App() -> Element {
    let greeting = use_hook(|| {
        build(ModalConfig {
            close_affordance_content: CLOSE_HTML.into(),
            ..Default::default()
        })
    });

    let terms = use_hook(|| {
        build(ModalConfig {
            ajax_error_message: "Could not load the terms, please try again later.".into(),
            loading_content: "<p class=\"loading\">Loading…</p>".into(),
            close_affordance_content: CLOSE_HTML.into(),
            width: Some(480.0.into()),
            max_height: Some("80%".into()),
            ..Default::default()
        })
    });

    // Only the close button dismisses this one, and only after confirmation
    let sticky = use_hook(|| {
        build(
            ModalConfig {
                close_on_outside_click: false,
                close_on_escape: false,
                close_affordance_content: CLOSE_HTML.into(),
                ..Default::default()
            }
            .on_close(|| confirm("Close this dialog?")),
        )
    });

    let mut signup = use_signal(|| None::<Modal<BrowserHost>>);

    rsx! {
        main {
            class: "demo",

            h1 { "Modal dialogs" }

            button {
                onclick: move |_| {
                    if let Some(modal) = &greeting {
                        modal.open_with("<h2>Hello!</h2><p>Click outside or press Escape to close.</p>");
                    }
                },
                "Say hello"
            }

            button {
                onclick: move |_| {
                    if let Some(modal) = &terms {
                        modal.spawn_fetch(TERMS_URL, &[("lang", "en")]);
                    }
                },
                "Read the terms"
            }

            button {
                onclick: move |_| {
                    if let Some(modal) = &sticky {
                        modal.open_with("<p>This dialog asks before it closes.</p>");
                    }
                },
                "Sticky dialog"
            }

            button {
                onclick: move |_| {
                    let existing = signup.read().clone();
                    match existing {
                        Some(modal) => {
                            modal.open();
                        }
                        None => signup.set(bind_template("signup-template")),
                    }
                },
                "Sign up"
            }

            // Template for the bound dialog; copied into the dialog, never shown in place
            div {
                id: "signup-template",
                style: "display: none",
                form {
                    h2 { "Sign up" }
                    input { r#type: "email", placeholder: "you@example.com" }
                    button { r#type: "submit", "Join" }
                }
            }
        }
    }
}

fn build(config: ModalConfig) -> Option<Modal<BrowserHost>> {
    match Modal::in_browser(config) {
        Ok(modal) => Some(modal),
        Err(e) => {
            log::error!("Failed to build modal: {}", e);
            None
        }
    }
}

fn bind_template(id: &str) -> Option<Modal<BrowserHost>> {
    let fragment = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(id));
    let Some(fragment) = fragment else {
        log::warn!("Template #{} not found", id);
        return None;
    };

    let host = match BrowserHost::new() {
        Ok(host) => host,
        Err(e) => {
            log::error!("No page to bind to: {}", e);
            return None;
        }
    };

    match Modal::bind(host, &fragment, ModalConfig { close_affordance_content: CLOSE_HTML.into(), ..Default::default() }) {
        Ok(modal) => Some(modal),
        Err(e) => {
            log::error!("Failed to bind #{}: {}", id, e);
            None
        }
    }
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(true)
}
