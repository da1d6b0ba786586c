//! Thin HTTP client wrapper.
//!
//! Every request passes through [`ApiClient::authorize`], which injects the
//! bearer token held by the shared session. Every response passes through
//! [`ApiClient::intercept`], which turns a 401 into a cleared session and
//! [`ApiError::Unauthorized`].

use std::{collections::BTreeMap, fmt, sync::Arc};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    errors::ApiError,
    session::{SessionStore, SharedSession},
};

use super::envelope::ApiEnvelope;

pub const AUTHORIZATION: &str = "Authorization";
pub const CONTENT_TYPE: &str = "Content-Type";
const JSON_CONTENT_TYPE: &str = "application/json";
const STATUS_UNAUTHORIZED: u16 = 401;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request over the wire. Network failures map to
/// [`ApiError::Transport`].
pub trait HttpTransport: Send + Sync {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

pub struct ApiClient<T: HttpTransport> {
    transport: T,
    base_url: String,
    session: SharedSession,
    store: Arc<dyn SessionStore>,
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn new(
        transport: T,
        base_url: impl Into<String>,
        session: SharedSession,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            store,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends a request and decodes the envelope.
    ///
    /// Non-2xx responses are still decoded so the server's `error.message`
    /// reaches the caller; they are never reported as `success`. A non-2xx
    /// body that is not an envelope becomes a bare failure.
    pub fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiEnvelope<R>, ApiError> {
        let request = self.authorize(ApiRequest {
            method,
            url: format!("{}/{}", self.base_url, path.trim_start_matches('/')),
            headers: BTreeMap::new(),
            body,
        });
        tracing::debug!(method = %request.method, url = %request.url, "api request");

        let response = self.intercept(self.transport.send(&request)?)?;
        let status_ok = response.is_success();
        let decoded = serde_json::from_value::<ApiEnvelope<R>>(response.body);
        if status_ok {
            return decoded.map_err(|err| ApiError::Decode(err.to_string()));
        }

        tracing::warn!(status = response.status, url = %request.url, "api request failed");
        match decoded {
            Ok(mut envelope) => {
                envelope.success = false;
                Ok(envelope)
            }
            Err(err) => {
                tracing::debug!(error = %err, "error response carried no envelope");
                Ok(ApiEnvelope {
                    success: false,
                    data: None,
                    error: None,
                })
            }
        }
    }

    fn authorize(&self, mut request: ApiRequest) -> ApiRequest {
        request
            .headers
            .insert(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string());
        let bearer = self
            .session
            .read()
            .ok()
            .and_then(|session| session.bearer());
        if let Some(bearer) = bearer {
            request.headers.insert(AUTHORIZATION.to_string(), bearer);
        }
        request
    }

    fn intercept(&self, response: ApiResponse) -> Result<ApiResponse, ApiError> {
        if response.status != STATUS_UNAUTHORIZED {
            return Ok(response);
        }
        tracing::warn!("api rejected credentials, clearing session");
        match self.session.write() {
            Ok(mut session) => session.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
        if let Err(err) = self.store.clear() {
            tracing::error!(error = %err, "failed to clear persisted session");
        }
        Err(ApiError::Unauthorized)
    }
}
