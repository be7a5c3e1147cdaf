//! Error codes and the result envelope returned by fallible operations.

use std::ffi::c_char;
use std::ptr;

use crate::ffi::{replace_nul, to_c_string};

/// Result code carried by [`RenResult`] and reported by
/// [`ren_sdk_last_error_code`](crate::ren_sdk_last_error_code).
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenErrorCode {
    /// Operation succeeded.
    Ok = 0,
    /// Null pointer, invalid UTF-8, malformed endpoint or payload.
    InvalidArgument = 1,
    /// The handle was already freed or never issued.
    InvalidHandle = 2,
    /// The operation needs a session and the handle has none.
    NotAuthenticated = 3,
    /// The backend rejected the login or password.
    InvalidCredentials = 4,
    /// The backend answered with a non-success status.
    Api = 5,
    /// No HTTP response was obtained.
    Transport = 6,
    /// The round-trip exceeded the handle timeout.
    Timeout = 7,
    /// The backend answered with an unexpected body.
    MalformedResponse = 8,
    /// Key or randomness generation failed.
    Crypto = 9,
    /// A panic was caught at the boundary.
    Internal = 10,
}

impl RenErrorCode {
    /// Numeric value as seen by C callers.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Inverse of [`RenErrorCode::as_i32`]. Unknown values map to [`RenErrorCode::Internal`].
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::InvalidArgument,
            2 => Self::InvalidHandle,
            3 => Self::NotAuthenticated,
            4 => Self::InvalidCredentials,
            5 => Self::Api,
            6 => Self::Transport,
            7 => Self::Timeout,
            8 => Self::MalformedResponse,
            9 => Self::Crypto,
            _ => Self::Internal,
        }
    }
}

impl From<&ren::Error> for RenErrorCode {
    fn from(err: &ren::Error) -> Self {
        match err {
            ren::Error::InvalidArgument(_) => Self::InvalidArgument,
            ren::Error::NotAuthenticated => Self::NotAuthenticated,
            ren::Error::InvalidCredentials(_) => Self::InvalidCredentials,
            ren::Error::Api { .. } => Self::Api,
            ren::Error::Transport(_) => Self::Transport,
            ren::Error::Timeout => Self::Timeout,
            ren::Error::MalformedResponse(_) => Self::MalformedResponse,
            ren::Error::Crypto(_) => Self::Crypto,
        }
    }
}

/// Outcome of a fallible mutation.
///
/// `code` is 0 on success. On failure `message` is an owned, NUL-terminated description
/// that must be released with [`ren_sdk_free_string`](crate::ren_sdk_free_string).
/// On success `message` is null today; callers should still release it when non-null.
#[repr(C)]
#[derive(Debug)]
pub struct RenResult {
    /// [`RenErrorCode`] as an integer.
    pub code: i32,
    /// Owned failure description, or null.
    pub message: *mut c_char,
}

impl RenResult {
    pub(crate) const fn ok() -> Self {
        Self {
            code: RenErrorCode::Ok.as_i32(),
            message: ptr::null_mut(),
        }
    }

    pub(crate) fn err(code: RenErrorCode, message: &str) -> Self {
        Self {
            code: code.as_i32(),
            message: to_c_string(&replace_nul(message.to_owned())),
        }
    }

    /// Whether `code` is [`RenErrorCode::Ok`].
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code == RenErrorCode::Ok.as_i32()
    }
}
