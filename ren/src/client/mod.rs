//! Ren client: the primary entry point for the SDK.
//!
//! A [`Client`] owns one backend session: the validated endpoint, a transport and,
//! after a successful [`login`](Client::login), the bearer credential. Calls block
//! for exactly one round-trip and never retry.

mod auth;
mod chats;
mod users;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{ClientConfig, DEFAULT_ENDPOINT};
use crate::error::{Error, Result};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};

/// Credential installed by a successful login (or [`Client::set_token`]).
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token.
    pub token: String,
    /// Id of the authenticated user, when known.
    pub user_id: Option<i64>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// A client bound to one backend endpoint.
#[derive(Debug)]
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    session: RwLock<Option<Session>>,
}

/// Whether a request carries the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    Anonymous,
    Bearer,
}

impl Client {
    /// Create a new [`ClientBuilder`].
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client for `endpoint` with default settings. No network I/O happens here.
    pub fn new(endpoint: &str) -> Result<Self> {
        Self::builder().endpoint(endpoint).build()
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Base endpoint of the backend.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.config.endpoint()
    }

    /// Install a bearer token obtained elsewhere, replacing any current session.
    pub fn set_token(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::InvalidArgument("token is empty".into()));
        }
        *self.session.write() = Some(Session {
            token,
            user_id: None,
        });
        Ok(())
    }

    /// The current bearer token, if authenticated.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.session.read().as_ref().map(|s| s.token.clone())
    }

    /// Id of the authenticated user, if the backend reported one.
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.session.read().as_ref().and_then(|s| s.user_id)
    }

    /// A copy of the current session.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    /// Whether a credential is installed.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.read().is_some()
    }

    /// Replace the session in one step, so readers never observe a half-installed credential.
    pub(crate) fn install_session(&self, session: Session) {
        *self.session.write() = Some(session);
    }

    /// Drop the local session. Returns whether one was installed.
    pub(crate) fn clear_session(&self) -> bool {
        self.session.write().take().is_some()
    }

    /// Perform one round-trip. `Auth::Bearer` fails fast with [`Error::NotAuthenticated`]
    /// before any I/O when no session is installed.
    pub(crate) fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        auth: Auth,
    ) -> Result<ApiResponse> {
        let bearer = match auth {
            Auth::Anonymous => None,
            Auth::Bearer => Some(self.token().ok_or(Error::NotAuthenticated)?),
        };
        let request = ApiRequest {
            method,
            url: self.config.url(path),
            bearer,
            body,
        };
        debug!(%method, path, "api request");
        let response = self.transport.execute(&request).inspect_err(|e| {
            warn!(%method, path, error = %e, "api request failed");
        })?;
        debug!(%method, path, status = response.status, "api response");
        Ok(response)
    }

    /// Serialize `payload` as the JSON body of a request.
    pub(crate) fn encode<T: Serialize>(payload: &T) -> Result<String> {
        serde_json::to_string(payload)
            .map_err(|e| Error::InvalidArgument(format!("unserializable request: {e}")))
    }
}

/// Turn a non-2xx response into [`Error::Api`], using the body text as detail.
pub(crate) fn ensure_success(response: ApiResponse) -> Result<ApiResponse> {
    if response.is_success() {
        return Ok(response);
    }
    Err(Error::from_status(response.status, response.body.trim()))
}

/// Decode a successful JSON body.
pub(crate) fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T> {
    serde_json::from_str(&response.body).map_err(|e| Error::MalformedResponse(e.to_string()))
}

/// Builder for constructing a [`Client`].
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Set the backend endpoint (default: [`DEFAULT_ENDPOINT`]).
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Bound each round-trip. A zero duration keeps the default.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Use a custom transport instead of the HTTP one.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validate the configuration and build the client. No network I/O happens here.
    pub fn build(self) -> Result<Client> {
        let mut config = ClientConfig::new(self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT))?;
        if let Some(timeout) = self.timeout.filter(|t| !t.is_zero()) {
            config.set_timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            config.set_user_agent(user_agent);
        }
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new(&config)));
        debug!(
            endpoint = config.endpoint(),
            timeout_ms = config.timeout().as_millis(),
            "client created"
        );
        Ok(Client {
            config,
            transport,
            session: RwLock::new(None),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport shared by the client unit tests.

    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use super::*;

    /// Replays queued responses and records every request it sees.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<ApiResponse>>>,
        pub(crate) seen: Mutex<Vec<ApiRequest>>,
    }

    impl ScriptedTransport {
        pub(crate) fn reply(&self, status: u16, body: &str) {
            self.replies.lock().push_back(Ok(ApiResponse {
                status,
                body: body.to_owned(),
            }));
        }

        pub(crate) fn fail(&self, err: Error) {
            self.replies.lock().push_back(Err(err));
        }

        pub(crate) fn requests(&self) -> Vec<ApiRequest> {
            self.seen.lock().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
            self.seen.lock().push(request.clone());
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(Error::Transport("no scripted reply".into())))
        }
    }

    pub(crate) fn client() -> (Client, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::default());
        let client = Client::builder()
            .endpoint("http://backend.test")
            .transport(transport.clone())
            .build()
            .unwrap();
        (client, transport)
    }

    pub(crate) const LOGIN_OK: &str = r#"{"message":"ok","token":"tok-1",
        "user":{"id":42,"login":"user123","username":"User","avatar":null}}"#;
}
