//! Client configuration: endpoint validation, timeout and user agent.

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Backend used when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8001";

/// Per-call timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Validated client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    endpoint: String,
    timeout: Duration,
    user_agent: String,
}

impl ClientConfig {
    /// Validate `endpoint` and build a configuration with default timeout and user agent.
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: normalize_endpoint(endpoint)?,
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
        })
    }

    /// Base endpoint without a trailing slash.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Upper bound for a single round-trip.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `User-Agent` header sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Absolute URL for an API `path` (which must start with `/`).
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    pub(crate) const fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub(crate) fn set_user_agent(&mut self, user_agent: String) {
        self.user_agent = user_agent;
    }
}

fn default_user_agent() -> String {
    format!("ren-sdk/{}", env!("CARGO_PKG_VERSION"))
}

/// Check that `raw` is an absolute `http`/`https` URL with a host, and trim trailing slashes.
fn normalize_endpoint(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument("endpoint is empty".into()));
    }
    let parsed = Url::parse(trimmed)
        .map_err(|e| Error::InvalidArgument(format!("invalid endpoint {trimmed:?}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::InvalidArgument(format!(
            "unsupported endpoint scheme: {}",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(Error::InvalidArgument(format!("endpoint has no host: {trimmed}")));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(Error::InvalidArgument(
            "endpoint must not carry a query or fragment".into(),
        ));
    }
    Ok(trimmed.trim_end_matches('/').to_owned())
}
