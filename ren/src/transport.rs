//! HTTP transport seam.
//!
//! [`Client`](crate::Client) talks to the backend only through [`Transport`]. The default
//! implementation, [`HttpTransport`], wraps a blocking `ureq` agent; tests plug in scripted
//! transports instead.

use std::fmt;
use std::io;

use ureq::typestate::WithBody;
use ureq::{Agent, Body, RequestBuilder};

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// HTTP method of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single API call, fully resolved.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Bearer token for the `Authorization` header.
    pub bearer: Option<String>,
    /// JSON body.
    pub body: Option<String>,
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bodies may carry passwords and the bearer is a credential.
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("body_len", &self.body.as_ref().map(String::len))
            .finish()
    }
}

/// Status and body text of a completed round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text (empty when the backend sent none).
    pub body: String,
}

impl ApiResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes API requests. One call is one round-trip; implementations must not retry.
pub trait Transport: Send + Sync + fmt::Debug {
    /// Perform `request` and return whatever status the backend answered with.
    ///
    /// Only failures to obtain a response at all are errors ([`Error::Transport`],
    /// [`Error::Timeout`]); non-2xx statuses are returned as responses.
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// Blocking HTTP transport backed by a `ureq` agent.
pub struct HttpTransport {
    agent: Agent,
    user_agent: String,
}

impl HttpTransport {
    /// Build a transport honouring the timeout and user agent of `config`.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let agent_config = Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .http_status_as_error(false)
            .build();
        Self {
            agent: Agent::new_with_config(agent_config),
            user_agent: config.user_agent().to_owned(),
        }
    }

    fn headers<B>(&self, builder: RequestBuilder<B>, request: &ApiRequest) -> RequestBuilder<B> {
        let builder = builder
            .header("Accept", "application/json")
            .header("User-Agent", self.user_agent.as_str());
        match &request.bearer {
            Some(token) => builder.header("Authorization", format!("Bearer {token}")),
            None => builder,
        }
    }

    fn send_with_body(
        &self,
        builder: RequestBuilder<WithBody>,
        request: &ApiRequest,
    ) -> std::result::Result<ureq::http::Response<Body>, ureq::Error> {
        let builder = self.headers(builder, request);
        match &request.body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .send(body.as_str()),
            None => builder.send_empty(),
        }
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl Transport for HttpTransport {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = request.url.as_str();
        let sent = match request.method {
            Method::Get => self.headers(self.agent.get(url), request).call(),
            Method::Delete => self.headers(self.agent.delete(url), request).call(),
            Method::Post => self.send_with_body(self.agent.post(url), request),
            Method::Patch => self.send_with_body(self.agent.patch(url), request),
        };
        let mut response = sent.map_err(map_ureq_error)?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(map_ureq_error)?;
        Ok(ApiResponse { status, body })
    }
}

fn map_ureq_error(err: ureq::Error) -> Error {
    match err {
        ureq::Error::Timeout(_) => Error::Timeout,
        ureq::Error::Io(e) if e.kind() == io::ErrorKind::TimedOut => Error::Timeout,
        other => Error::Transport(other.to_string()),
    }
}
