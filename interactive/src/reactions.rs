use leptos::prelude::*;
use pearl_shared::error::ServiceError;
use pearl_shared::{ArticleReactionsModel, ReactionCounts, ThreadError};
use wasm_bindgen_futures::spawn_local;
use web_sys::AbortController;

use crate::api::ApiClient;
use crate::auth::AuthState;
use crate::config::ClientConfig;
use crate::services::HttpServices;

type Model = ArticleReactionsModel<HttpServices, AuthState>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Reaction {
    Like,
    Dislike,
}

/// Article-level like / dislike counts (for embedding under the post body).
#[component]
pub fn ArticleReactions(blog_id: String) -> impl IntoView {
    let auth = expect_context::<AuthState>();
    let config = expect_context::<ClientConfig>();

    let controller = AbortController::new().ok();
    let api = ApiClient::new(&config).with_abort(controller.as_ref().map(AbortController::signal));
    let controller = StoredValue::new_local(controller);
    on_cleanup(move || {
        controller.try_with_value(|c| {
            if let Some(c) = c {
                c.abort();
            }
        });
    });

    let model: StoredValue<Model, LocalStorage> =
        StoredValue::new_local(ArticleReactionsModel::new(HttpServices::new(api), auth, blog_id));
    let counts = RwSignal::new(ReactionCounts::default());
    let pending: RwSignal<Option<Reaction>> = RwSignal::new(None);
    let notice: RwSignal<Option<String>> = RwSignal::new(None);

    // Fetch counts on mount
    if let Some(m) = model.try_get_value() {
        spawn_local(async move {
            if let Ok(c) = m.counts().await {
                counts.try_set(c);
            }
        });
    }

    let react = move |reaction: Reaction| {
        if pending.get_untracked().is_some() {
            return;
        }
        let Some(m) = model.try_get_value() else {
            return;
        };
        pending.set(Some(reaction));
        notice.set(None);
        spawn_local(async move {
            let result = match reaction {
                Reaction::Like => m.like().await,
                Reaction::Dislike => m.dislike().await,
            };
            match result {
                Ok(c) => {
                    counts.try_set(c);
                }
                Err(
                    ThreadError::Write {
                        source: ServiceError::Aborted,
                        ..
                    }
                    | ThreadError::Fetch(ServiceError::Aborted),
                ) => return,
                Err(e) => {
                    notice.try_set(Some(e.notice()));
                }
            }
            pending.try_set(None);
        });
    };

    view! {
        <div class="pearl-post-reactions">
            <span>"Was this article helpful? "</span>
            <button
                class="pearl-vote-btn"
                class:active=move || pending.get() == Some(Reaction::Like)
                disabled=move || pending.get().is_some()
                on:click=move |_| react(Reaction::Like)
            >
                "\u{1F44D} "
                {move || counts.get().likes}
            </button>
            <button
                class="pearl-vote-btn"
                class:active=move || pending.get() == Some(Reaction::Dislike)
                disabled=move || pending.get().is_some()
                on:click=move |_| react(Reaction::Dislike)
            >
                "\u{1F44E} "
                {move || counts.get().dislikes}
            </button>
            <Show when=move || notice.with(Option::is_some)>
                <span class="pearl-notice" role="status">
                    {move || notice.get().unwrap_or_default()}
                </span>
            </Show>
        </div>
    }
}
