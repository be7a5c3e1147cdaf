//! Unified error types for the Ren SDK.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the Ren SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An argument passed to the SDK was invalid (bad endpoint, malformed request payload, ...).
    #[error("{0}")]
    InvalidArgument(String),

    /// The operation requires a session but the client has not logged in.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The backend rejected the supplied login or password.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The backend answered with a non-success status.
    #[error("api error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Reason phrase plus whatever text the backend sent.
        message: String,
    },

    /// The request never produced an HTTP response (connection refused, DNS, I/O).
    #[error("transport: {0}")]
    Transport(String),

    /// The round-trip exceeded the client timeout.
    #[error("request timed out")]
    Timeout,

    /// The backend answered with a body that does not match the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Key or randomness generation failed.
    #[error("crypto: {0}")]
    Crypto(String),
}

impl Error {
    /// Build an [`Error::Api`] for a non-success `status`, prefixing the reason phrase.
    pub(crate) fn from_status(status: u16, detail: &str) -> Self {
        let reason = match status {
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            409 => "Conflict",
            _ => "Server error",
        };
        let message = if detail.is_empty() {
            reason.to_owned()
        } else {
            format!("{reason}: {detail}")
        };
        Self::Api { status, message }
    }

    /// HTTP status carried by this error, if it came from a backend response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::InvalidCredentials(_) => Some(401),
            _ => None,
        }
    }
}
