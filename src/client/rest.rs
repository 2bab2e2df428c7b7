//! REST resource client.
//!
//! Maps resource verbs onto a [`ProxyClient`] whose base URI is the collection
//! (e.g. `http://svc/api/widgets/`). Each verb has expected status codes; any other
//! status is logged as a warning and the response is still returned.
//!
//! | verb     | method | endpoint | expected |
//! |----------|--------|----------|----------|
//! | `create` | POST   | `""`     | 200, 201 |
//! | `update` | PUT    | `{id}/`  | 200      |
//! | `delete` | DELETE | `{id}/`  | 204      |
//! | `get`    | GET    | `{id}/`  | 200      |
//! | `list`   | GET    | `""`     | 200      |

use std::fmt::Display;

use crate::client::proxy::{ProxyClient, SendRequest};
use crate::config::ClientConfig;
use crate::dispatch::DrainOutcome;
use crate::error::ProxyResult;
use crate::http::{Body, Response};

pub const CREATE_EXPECTED: &[u16] = &[200, 201];
pub const UPDATE_EXPECTED: &[u16] = &[200];
pub const DELETE_EXPECTED: &[u16] = &[204];
pub const GET_EXPECTED: &[u16] = &[200];
pub const LIST_EXPECTED: &[u16] = &[200];

#[derive(Debug)]
pub struct RestClient {
    proxy: ProxyClient,
}

impl RestClient {
    pub fn new(config: ClientConfig) -> ProxyResult<Self> {
        Ok(Self::from_proxy(ProxyClient::new(config)?))
    }

    pub fn from_proxy(proxy: ProxyClient) -> Self {
        Self { proxy }
    }

    /// The underlying client, for calls outside the five verbs.
    pub fn proxy(&self) -> &ProxyClient {
        &self.proxy
    }

    pub async fn create(
        &self,
        body: Option<Body>,
        params: &[(&str, &str)],
    ) -> ProxyResult<Response> {
        let request = with_body(SendRequest::post(""), body).queries(params.iter().copied());
        let response = self.proxy.send(request).await?;
        check_status("CREATE", &response, CREATE_EXPECTED);
        Ok(response)
    }

    pub async fn update(
        &self,
        id: impl Display,
        body: Option<Body>,
        params: &[(&str, &str)],
    ) -> ProxyResult<Response> {
        let request =
            with_body(SendRequest::put(format!("{id}/")), body).queries(params.iter().copied());
        let response = self.proxy.send(request).await?;
        check_status("UPDATE", &response, UPDATE_EXPECTED);
        Ok(response)
    }

    pub async fn delete(&self, id: impl Display, params: &[(&str, &str)]) -> ProxyResult<Response> {
        let request = SendRequest::delete(format!("{id}/")).queries(params.iter().copied());
        let response = self.proxy.send(request).await?;
        check_status("DELETE", &response, DELETE_EXPECTED);
        Ok(response)
    }

    pub async fn get(&self, id: impl Display, params: &[(&str, &str)]) -> ProxyResult<Response> {
        let request = SendRequest::get(format!("{id}/")).queries(params.iter().copied());
        let response = self.proxy.send(request).await?;
        check_status("GET", &response, GET_EXPECTED);
        Ok(response)
    }

    pub async fn list(&self, params: &[(&str, &str)]) -> ProxyResult<Response> {
        let request = SendRequest::get("").queries(params.iter().copied());
        let response = self.proxy.send(request).await?;
        check_status("LIST", &response, LIST_EXPECTED);
        Ok(response)
    }

    pub async fn shutdown(&self) -> DrainOutcome {
        self.proxy.shutdown().await
    }
}

fn with_body(request: SendRequest, body: Option<Body>) -> SendRequest {
    match body {
        Some(body) => request.body(body),
        None => request,
    }
}

/// Warn when `response` carries a status outside `expected`. Returns whether it matched.
pub(crate) fn check_status(verb: &str, response: &Response, expected: &[u16]) -> bool {
    let status = response.status_code();
    if expected.contains(&status) {
        return true;
    }
    tracing::warn!(
        verb,
        url = %response.url(),
        status,
        ?expected,
        "{verb} {} returned status code {status}.",
        response.url()
    );
    false
}
