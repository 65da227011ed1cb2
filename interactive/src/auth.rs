use leptos::prelude::*;
use pearl_shared::error::ServiceError;
use pearl_shared::{CurrentUser, Session};
use wasm_bindgen_futures::spawn_local;

use crate::api::{self, ApiClient};
use crate::config::ClientConfig;

/// Reactive session shared via context. The sign-in flow itself belongs to
/// the clinic's auth service; this only reads the token it leaves behind.
#[derive(Clone, Copy, Debug)]
pub struct AuthState {
    pub user: RwSignal<Option<CurrentUser>>,
    pub token: RwSignal<Option<String>>,
}

impl Session for AuthState {
    fn current_user(&self) -> Option<CurrentUser> {
        self.user.try_get_untracked().flatten()
    }
}

/// Provider component — wraps children with config and auth context.
#[component]
pub fn AuthProvider(config: ClientConfig, children: Children) -> impl IntoView {
    let token = RwSignal::new(api::get_token(&config.token_key));
    let user: RwSignal<Option<CurrentUser>> = RwSignal::new(None);

    let auth = AuthState { user, token };
    provide_context(auth);
    provide_context(config.clone());

    // Fetch user profile when we have a token
    Effect::new(move |_| {
        if token.get().is_some() {
            let client = ApiClient::new(&config);
            let token_key = config.token_key.clone();
            spawn_local(async move {
                match client.get::<CurrentUser>("/api/auth/me").await {
                    Ok(u) => {
                        tracing::debug!(user = %u.id, "session restored");
                        user.try_set(Some(u));
                    }
                    Err(ServiceError::Status { status: 401 | 403, .. }) => {
                        // Token rejected — clear it
                        api::clear_token(&token_key);
                        token.try_set(None);
                        user.try_set(None);
                    }
                    Err(e) => tracing::warn!(error = %e, "could not load current user"),
                }
            });
        } else {
            user.set(None);
        }
    });

    children()
}

/// Signed-in user badge, or a link to the clinic's sign-in page.
#[component]
pub fn SessionBadge() -> impl IntoView {
    let auth = expect_context::<AuthState>();
    let config = expect_context::<ClientConfig>();

    let on_logout = move |_| {
        api::clear_token(&config.token_key);
        auth.token.set(None);
        auth.user.set(None);
    };

    move || {
        if let Some(user) = auth.user.get() {
            view! {
                <div class="pearl-auth">
                    {user.avatar.clone().map(|src| view! {
                        <img src=src alt="" class="pearl-avatar" width="24" height="24" />
                    })}
                    <span class="pearl-username">{user.name.clone()}</span>
                    <button class="pearl-btn pearl-btn-sm" on:click=on_logout.clone()>"Sign out"</button>
                </div>
            }
            .into_any()
        } else {
            let url = expect_context::<ClientConfig>().login_url;
            view! {
                <a class="pearl-btn" href=url>"Sign in to join the discussion"</a>
            }
            .into_any()
        }
    }
}
