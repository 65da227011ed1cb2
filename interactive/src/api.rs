use std::rc::Rc;

use gloo_net::http::{Request, RequestBuilder, Response};
use pearl_shared::error::{ServiceError, ServiceResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use web_sys::{window, AbortSignal};

use crate::config::ClientConfig;

pub fn get_token(key: &str) -> Option<String> {
    window()?.local_storage().ok()??.get_item(key).ok()?
}

pub fn clear_token(key: &str) {
    if let Some(storage) = window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
    {
        let _ = storage.remove_item(key);
    }
}

/// JSON client for the clinic backend. Every request carries the bearer token
/// from local storage and, when set, the owning view's abort signal.
#[derive(Clone)]
pub struct ApiClient {
    base: Rc<str>,
    token_key: Rc<str>,
    abort: Option<AbortSignal>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base: config.api_base.as_str().into(),
            token_key: config.token_key.as_str().into(),
            abort: None,
        }
    }

    pub fn with_abort(mut self, signal: Option<AbortSignal>) -> Self {
        self.abort = signal;
        self
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        let resp = send(self.prepare(Request::get(&self.url(path)))).await?;
        decode(resp).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ServiceResult<T> {
        let req = self.with_body(Request::post(&self.url(path)), body)?;
        let resp = check(req.send().await.map_err(network)?).await?;
        decode(resp).await
    }

    /// POST without a body, ignoring whatever the backend answers.
    pub async fn post_empty(&self, path: &str) -> ServiceResult<()> {
        send(self.prepare(Request::post(&self.url(path)))).await?;
        Ok(())
    }

    pub async fn post_ignore<B: Serialize>(&self, path: &str, body: &B) -> ServiceResult<()> {
        let req = self.with_body(Request::post(&self.url(path)), body)?;
        check(req.send().await.map_err(network)?).await?;
        Ok(())
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ServiceResult<T> {
        let req = self.with_body(Request::put(&self.url(path)), body)?;
        let resp = check(req.send().await.map_err(network)?).await?;
        decode(resp).await
    }

    pub async fn delete(&self, path: &str) -> ServiceResult<()> {
        send(self.prepare(Request::delete(&self.url(path)))).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn prepare(&self, mut req: RequestBuilder) -> RequestBuilder {
        if let Some(token) = get_token(&self.token_key) {
            req = req.header("Authorization", &format!("Bearer {}", token));
        }
        req.abort_signal(self.abort.as_ref())
    }

    fn with_body<B: Serialize>(&self, req: RequestBuilder, body: &B) -> ServiceResult<Request> {
        let json = serde_json::to_string(body).map_err(|e| ServiceError::Decode(e.to_string()))?;
        self.prepare(req)
            .header("Content-Type", "application/json")
            .body(json)
            .map_err(network)
    }
}

async fn send(req: RequestBuilder) -> ServiceResult<Response> {
    check(req.send().await.map_err(network)?).await
}

async fn check(resp: Response) -> ServiceResult<Response> {
    if resp.ok() {
        return Ok(resp);
    }
    let message = resp.text().await.unwrap_or_default();
    Err(ServiceError::status(resp.status(), message))
}

async fn decode<T: DeserializeOwned>(resp: Response) -> ServiceResult<T> {
    resp.json().await.map_err(|e| ServiceError::Decode(e.to_string()))
}

fn network(err: gloo_net::Error) -> ServiceError {
    match err {
        gloo_net::Error::JsError(ref js) if js.name == "AbortError" => ServiceError::Aborted,
        other => ServiceError::Network(other.to_string()),
    }
}
