use web_sys::window;

const DEFAULT_API: &str = "http://localhost:8080";
const DEFAULT_LOGIN: &str = "/login";
const DEFAULT_TOKEN_KEY: &str = "pearl_token";

/// Settings the host page passes to the widgets through `<meta>` tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub login_url: String,
    pub token_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API.to_string(),
            login_url: DEFAULT_LOGIN.to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_document() -> Self {
        let defaults = Self::default();
        Self {
            api_base: meta("pearl-api")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            login_url: meta("pearl-login").unwrap_or(defaults.login_url),
            token_key: meta("pearl-token-key").unwrap_or(defaults.token_key),
        }
    }
}

fn meta(name: &str) -> Option<String> {
    let document = window()?.document()?;
    let el = document
        .query_selector(&format!("meta[name='{name}']"))
        .ok()
        .flatten()?;
    el.get_attribute("content").filter(|v| !v.trim().is_empty())
}
