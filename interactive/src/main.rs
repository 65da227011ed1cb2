mod api;
mod auth;
mod comments;
mod config;
mod reactions;
mod services;

use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::config::ClientConfig;

fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let config = ClientConfig::from_document();
    let document = web_sys::window()
        .expect("no window")
        .document()
        .expect("no document");

    // Mount comment section if the mount point exists
    if let Some(el) = document.get_element_by_id("pearl-comments") {
        let blog_id = el.get_attribute("data-blog-id").unwrap_or_default();
        let config = config.clone();
        let html_el: web_sys::HtmlElement = el.unchecked_into();
        leptos::mount::mount_to(html_el, move || {
            view! {
                <auth::AuthProvider config=config.clone()>
                    <comments::CommentSection blog_id=blog_id.clone() />
                </auth::AuthProvider>
            }
        })
        .forget();
    }

    // Mount article reactions if the mount point exists
    if let Some(el) = document.get_element_by_id("pearl-reactions") {
        let blog_id = el.get_attribute("data-blog-id").unwrap_or_default();
        let html_el: web_sys::HtmlElement = el.unchecked_into();
        leptos::mount::mount_to(html_el, move || {
            view! {
                <auth::AuthProvider config=config.clone()>
                    <reactions::ArticleReactions blog_id=blog_id.clone() />
                </auth::AuthProvider>
            }
        })
        .forget();
    }
}
