//! HTTP request wrapper with bearer-token injection and JSON handling

use crate::error::{ClientError, Result};
use crate::session::Session;
use crate::storage::StorageArea;
use crate::types::NormalizedResponse;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Body of an outgoing request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured value, sent as JSON text
    Json(Value),
    /// Sent verbatim
    Text(String),
}

/// Optional inputs of a gateway request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Send `value` as a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self> {
        self.body = Some(RequestBody::Json(serde_json::to_value(value)?));
        Ok(self)
    }

    /// Send `text` as the body without encoding it
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(text.into()));
        self
    }
}

/// Issues requests on behalf of a session
///
/// Every request carries `Authorization: Bearer <access token>` when the
/// session holds one and the caller did not set the header. Responses are
/// normalized into [`NormalizedResponse`]; non-2xx statuses are not errors.
/// Transport failures are returned as [`ClientError::HttpRequest`] and are
/// never retried.
#[derive(Clone)]
pub struct RequestGateway<S> {
    http_client: Client,
    base_url: Url,
    session: Session<S>,
}

impl<S: StorageArea> RequestGateway<S> {
    pub fn new(base_url: Url, session: Session<S>) -> Self {
        Self::with_client(Client::new(), base_url, session)
    }

    /// Create a gateway around an existing HTTP client
    pub fn with_client(http_client: Client, base_url: Url, session: Session<S>) -> Self {
        Self {
            http_client,
            base_url,
            session,
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `url` against the base URL; absolute URLs are used as given
    pub fn resolve(&self, url: &str) -> Result<Url> {
        self.base_url
            .join(url)
            .map_err(|e| ClientError::Configuration(format!("Invalid request URL {url:?}: {e}")))
    }

    /// Send a request and normalize the response
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<NormalizedResponse> {
        let url = self.resolve(url)?;
        let RequestOptions { mut headers, body } = options;

        // Caller-supplied Authorization wins over the session token
        if !headers.contains_key(AUTHORIZATION) {
            if let Some(token) = self.session.access_token() {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }

        let body = match body {
            Some(RequestBody::Json(value)) => Some(serde_json::to_string(&value)?),
            Some(RequestBody::Text(text)) => Some(text),
            None => None,
        };

        if body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        debug!(
            method = %method,
            url = %url,
            authorized = headers.contains_key(AUTHORIZATION),
            "Sending request"
        );

        let mut builder = self.http_client.request(method.clone(), url.clone()).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();

        // An empty, non-JSON or unreadable body is reported as no body
        let body = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice::<Value>(&bytes).ok(),
            Err(e) => {
                debug!(url = %url, error = %e, "Failed to read response body");
                None
            }
        };

        debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            has_body = body.is_some(),
            "Received response"
        );

        Ok(NormalizedResponse {
            succeeded: status.is_success(),
            status_code: status.as_u16(),
            body,
        })
    }

    pub async fn get(&self, url: &str) -> Result<NormalizedResponse> {
        self.request(Method::GET, url, RequestOptions::new()).await
    }

    pub async fn delete(&self, url: &str) -> Result<NormalizedResponse> {
        self.request(Method::DELETE, url, RequestOptions::new()).await
    }

    pub async fn post<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<NormalizedResponse> {
        self.request(Method::POST, url, RequestOptions::new().json(body)?).await
    }

    pub async fn put<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<NormalizedResponse> {
        self.request(Method::PUT, url, RequestOptions::new().json(body)?).await
    }

    pub async fn patch<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<NormalizedResponse> {
        self.request(Method::PATCH, url, RequestOptions::new().json(body)?).await
    }
}
