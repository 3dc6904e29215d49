//! Authenticated request gateway.
//!
//! Every outbound call to the backend funnels through [`Gateway::send`],
//! which attaches the default `Content-Type` and, when a session credential
//! is stored, the `Authorization` header. The response comes back untouched:
//! a 404 or a 500 is a normal return value here, and only transport-level
//! failures surface as errors. Callers that want typed payloads and errors
//! use [`super::ApiClient`] on top of this.

use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use tracing::warn;

use crate::auth::TokenProvider;

use super::ApiError;

/// What to do with the stored credential when the backend answers 401.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnauthorizedPolicy {
    /// Hand the 401 back to the caller and leave the credential in place.
    #[default]
    Ignore,
    /// Drop the stored credential so later calls go out unauthenticated.
    InvalidateSession,
}

/// Per-call request settings. The default is a plain GET with no extra
/// headers and no body.
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }
}

/// The authenticated request gateway.
///
/// Holds the shared HTTP client, the credential provider injected at
/// construction, and the 401 policy. Clone is cheap - the underlying
/// `reqwest::Client` shares its connection pool.
#[derive(Clone)]
pub struct Gateway {
    client: Client,
    provider: Arc<dyn TokenProvider>,
    on_unauthorized: UnauthorizedPolicy,
}

impl Gateway {
    pub fn new(client: Client, provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            client,
            provider,
            on_unauthorized: UnauthorizedPolicy::default(),
        }
    }

    /// Replace the 401 policy (defaults to [`UnauthorizedPolicy::Ignore`])
    pub fn with_unauthorized_policy(mut self, policy: UnauthorizedPolicy) -> Self {
        self.on_unauthorized = policy;
        self
    }

    /// Issue a call and return the raw response.
    ///
    /// Non-2xx statuses are returned, not raised; the only error here is a
    /// transport failure (DNS, refused connection, aborted request). The
    /// call is never blocked for lacking a credential - without one it goes
    /// out unauthenticated and the backend gets to reject it.
    pub async fn send(&self, url: &str, options: RequestOptions) -> Result<Response, ApiError> {
        let headers = resolve_headers(options.headers, self.provider.token());

        let mut request = self.client.request(options.method, url).headers(headers);
        if let Some(body) = options.body {
            request = request.body(body);
        }

        let response = request.send().await?;

        if response.status() == StatusCode::UNAUTHORIZED
            && self.on_unauthorized == UnauthorizedPolicy::InvalidateSession
        {
            warn!(url = url, "Backend rejected the session credential, dropping it");
            self.provider.invalidate();
        }

        Ok(response)
    }
}

/// Build the final header set for a call.
///
/// Caller headers come first; `Content-Type: application/json` fills in only
/// when absent, and a non-empty token always wins the `Authorization` slot.
fn resolve_headers(mut headers: HeaderMap, token: Option<String>) -> HeaderMap {
    if !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
    }

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                headers.insert(header::AUTHORIZATION, value);
            }
            Err(_) => {
                warn!("Stored token is not a valid header value, sending unauthenticated");
            }
        }
    }

    headers
}
