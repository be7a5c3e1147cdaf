//! Client lifecycle, session and backend operations.

use std::ffi::c_char;
use std::time::Duration;

use ren::{Client, CreateChatRequest, LoginFlags};

use crate::ffi::{
    FfiError, c_str_to_string, catch_or, catch_ptr, catch_result, into_c_string, to_c_json,
};
use crate::registry::{self, RenClientHandle};
use crate::result::{RenErrorCode, RenResult};

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

unsafe fn create(
    endpoint: *const c_char,
    timeout: Duration,
) -> Result<*mut RenClientHandle, FfiError> {
    let endpoint = unsafe { c_str_to_string(endpoint, "endpoint")? };
    let client = Client::builder().endpoint(endpoint).timeout(timeout).build()?;
    registry::register(client)
        .ok_or_else(|| FfiError::new(RenErrorCode::Internal, "client registry is full"))
}

/// Create a client bound to `endpoint` (for example `"http://localhost:8001"`).
/// No network I/O happens here. Returns null on failure; see
/// [`ren_sdk_last_error_message`](crate::ren_sdk_last_error_message).
/// Caller must free with [`ren_sdk_client_free`].
///
/// # Safety
///
/// `endpoint` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_client_new(endpoint: *const c_char) -> *mut RenClientHandle {
    catch_ptr(|| unsafe { create(endpoint, Duration::ZERO) })
}

/// Like [`ren_sdk_client_new`], bounding every round-trip by `timeout_ms` milliseconds.
/// `0` selects the default of 30 seconds.
///
/// # Safety
///
/// `endpoint` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_client_new_with_timeout(
    endpoint: *const c_char,
    timeout_ms: u64,
) -> *mut RenClientHandle {
    catch_ptr(|| unsafe { create(endpoint, Duration::from_millis(timeout_ms)) })
}

/// Release a client and its session. Null is a no-op. A handle that was already freed
/// is detected, reported through the last error and otherwise ignored.
///
/// # Safety
///
/// `handle` must be null or a value returned by [`ren_sdk_client_new`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_client_free(handle: *mut RenClientHandle) {
    catch_or((), || {
        registry::unregister(handle).inspect_err(|_| {
            tracing::warn!("ignoring free of a stale client handle");
        })
    });
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Install a bearer token obtained elsewhere, replacing the current session.
///
/// # Safety
///
/// `handle` must be null or issued by this library; `token` must be null or a valid
/// NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_client_set_token(
    handle: *const RenClientHandle,
    token: *const c_char,
) -> RenResult {
    catch_result(|| {
        let client = registry::resolve(handle)?;
        let token = unsafe { c_str_to_string(token, "token")? };
        client.set_token(token)?;
        Ok(())
    })
}

/// Current bearer token, or null when the handle has no session.
/// Caller must free with [`ren_sdk_free_string`](crate::ren_sdk_free_string).
///
/// # Safety
///
/// `handle` must be null or issued by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_client_get_token(handle: *const RenClientHandle) -> *mut c_char {
    catch_ptr(|| {
        let client = registry::resolve(handle)?;
        let token = client.token().ok_or(ren::Error::NotAuthenticated)?;
        into_c_string(token)
    })
}

/// Drop the local session. The backend is not contacted. Succeeds on a handle
/// without a session too.
///
/// # Safety
///
/// `handle` must be null or issued by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_client_logout(handle: *const RenClientHandle) -> RenResult {
    catch_result(|| {
        registry::resolve(handle)?.logout();
        Ok(())
    })
}

/// 1 if the handle has a session, 0 if not, -1 if the handle is invalid.
///
/// # Safety
///
/// `handle` must be null or issued by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_client_is_authenticated(handle: *const RenClientHandle) -> i32 {
    catch_or(-1, || {
        Ok(i32::from(registry::resolve(handle)?.is_authenticated()))
    })
}

/// Id of the logged-in user, or -1 when unknown (no session, token installed by
/// [`ren_sdk_client_set_token`], or an invalid handle).
///
/// # Safety
///
/// `handle` must be null or issued by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_client_user_id(handle: *const RenClientHandle) -> i64 {
    catch_or(-1, || Ok(registry::resolve(handle)?.user_id().unwrap_or(-1)))
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

/// Log in with `username` and `password` in a single round-trip.
///
/// `flags` bit 0 requests a long-lived session; other bits are ignored. On success the
/// session is installed on the handle. On failure the previous session is kept and the
/// envelope carries the reason; release its `message` with
/// [`ren_sdk_free_string`](crate::ren_sdk_free_string).
///
/// # Safety
///
/// `handle` must be null or issued by this library; `username` and `password` must be
/// null or valid NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_login(
    handle: *const RenClientHandle,
    username: *const c_char,
    password: *const c_char,
    flags: u32,
) -> RenResult {
    catch_result(|| {
        let client = registry::resolve(handle)?;
        let username = unsafe { c_str_to_string(username, "username")? };
        let password = unsafe { c_str_to_string(password, "password")? };
        client.login(&username, &password, LoginFlags::from_bits_truncate(flags))?;
        Ok(())
    })
}

/// Delete the account of the logged-in user. On success the handle's session is dropped;
/// on failure it is kept.
///
/// # Safety
///
/// `handle` must be null or issued by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_delete_account(handle: *const RenClientHandle) -> RenResult {
    catch_result(|| {
        registry::resolve(handle)?.delete_account()?;
        Ok(())
    })
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Profile of the logged-in user as JSON, or null on failure.
/// Caller must free with [`ren_sdk_free_string`](crate::ren_sdk_free_string).
///
/// # Safety
///
/// `handle` must be null or issued by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_get_me(handle: *const RenClientHandle) -> *mut c_char {
    catch_ptr(|| to_c_json(&registry::resolve(handle)?.me()?))
}

/// Chats of the logged-in user as a JSON array, or null on failure.
/// Caller must free with [`ren_sdk_free_string`](crate::ren_sdk_free_string).
///
/// # Safety
///
/// `handle` must be null or issued by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_get_chats(handle: *const RenClientHandle) -> *mut c_char {
    catch_ptr(|| to_c_json(&registry::resolve(handle)?.chats()?))
}

/// Messages of `chat_id` as a JSON array, or null on failure.
/// Caller must free with [`ren_sdk_free_string`](crate::ren_sdk_free_string).
///
/// # Safety
///
/// `handle` must be null or issued by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_get_messages(
    handle: *const RenClientHandle,
    chat_id: i64,
) -> *mut c_char {
    catch_ptr(|| to_c_json(&registry::resolve(handle)?.messages(chat_id)?))
}

/// Public key of `user_id` as JSON `{"user_id", "public_key"}`, or null on failure.
/// Works without a session.
///
/// # Safety
///
/// `handle` must be null or issued by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_get_public_key(
    handle: *const RenClientHandle,
    user_id: i64,
) -> *mut c_char {
    catch_ptr(|| to_c_json(&registry::resolve(handle)?.public_key(user_id)?))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// Change the display name; returns the updated profile as JSON, or null on failure.
///
/// # Safety
///
/// `handle` must be null or issued by this library; `username` must be null or a valid
/// NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_update_username(
    handle: *const RenClientHandle,
    username: *const c_char,
) -> *mut c_char {
    catch_ptr(|| {
        let client = registry::resolve(handle)?;
        let username = unsafe { c_str_to_string(username, "username")? };
        to_c_json(&client.update_username(&username)?)
    })
}

/// Create a chat from a JSON request `{"kind", "title", "user_ids"}`; returns the chat as
/// JSON, or null on failure.
///
/// # Safety
///
/// `handle` must be null or issued by this library; `request_json` must be null or a
/// valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_create_chat(
    handle: *const RenClientHandle,
    request_json: *const c_char,
) -> *mut c_char {
    catch_ptr(|| {
        let client = registry::resolve(handle)?;
        let raw = unsafe { c_str_to_string(request_json, "request_json")? };
        let request: CreateChatRequest = serde_json::from_str(&raw)
            .map_err(|e| FfiError::invalid_argument(format!("invalid chat request: {e}")))?;
        to_c_json(&client.create_chat(&request)?)
    })
}

/// Delete `chat_id`. `for_all`: -1 leaves the backend default, 0 deletes for the caller
/// only, 1 deletes for every participant.
///
/// # Safety
///
/// `handle` must be null or issued by this library.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_delete_chat(
    handle: *const RenClientHandle,
    chat_id: i64,
    for_all: i32,
) -> RenResult {
    catch_result(|| {
        let client = registry::resolve(handle)?;
        let for_all = match for_all {
            -1 => None,
            0 => Some(false),
            1 => Some(true),
            other => {
                return Err(FfiError::invalid_argument(format!(
                    "for_all must be -1, 0 or 1, got {other}"
                )));
            }
        };
        client.delete_chat(chat_id, for_all)?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use std::ffi::CStr;
    use std::ptr;

    use super::*;
    use crate::ffi::{ren_sdk_free_string, ren_sdk_last_error_code};

    #[test]
    fn lifecycle_without_network() {
        unsafe {
            let handle = ren_sdk_client_new(c"http://localhost:8001".as_ptr());
            assert!(!handle.is_null());
            assert_eq!(ren_sdk_client_is_authenticated(handle), 0);
            assert_eq!(ren_sdk_client_user_id(handle), -1);

            assert!(ren_sdk_get_me(handle).is_null());
            assert_eq!(ren_sdk_last_error_code(), RenErrorCode::NotAuthenticated.as_i32());

            let result = ren_sdk_client_set_token(handle, c"tok".as_ptr());
            assert!(result.is_ok());
            let token = ren_sdk_client_get_token(handle);
            assert_eq!(CStr::from_ptr(token).to_str().unwrap(), "tok");
            ren_sdk_free_string(token);
            assert_eq!(ren_sdk_client_is_authenticated(handle), 1);

            assert!(ren_sdk_client_logout(handle).is_ok());
            assert!(ren_sdk_client_get_token(handle).is_null());

            ren_sdk_client_free(handle);
            assert_eq!(ren_sdk_client_is_authenticated(handle), -1);
            assert_eq!(ren_sdk_last_error_code(), RenErrorCode::InvalidHandle.as_i32());
        }
    }

    #[test]
    fn bad_endpoints_yield_null() {
        unsafe {
            assert!(ren_sdk_client_new(ptr::null()).is_null());
            assert_eq!(ren_sdk_last_error_code(), RenErrorCode::InvalidArgument.as_i32());
            assert!(ren_sdk_client_new(c"not a url".as_ptr()).is_null());
            assert!(ren_sdk_client_new_with_timeout(c"ftp://host".as_ptr(), 10).is_null());
        }
    }

    #[test]
    fn delete_chat_rejects_unknown_for_all() {
        unsafe {
            let handle = ren_sdk_client_new(c"http://localhost:8001".as_ptr());
            ren_sdk_client_set_token(handle, c"tok".as_ptr());
            let result = ren_sdk_delete_chat(handle, 1, 7);
            assert_eq!(result.code, RenErrorCode::InvalidArgument.as_i32());
            ren_sdk_free_string(result.message);
            ren_sdk_client_free(handle);
        }
    }

    #[test]
    fn create_chat_rejects_bad_json() {
        unsafe {
            let handle = ren_sdk_client_new(c"http://localhost:8001".as_ptr());
            ren_sdk_client_set_token(handle, c"tok".as_ptr());
            assert!(ren_sdk_create_chat(handle, c"{not json".as_ptr()).is_null());
            assert_eq!(ren_sdk_last_error_code(), RenErrorCode::InvalidArgument.as_i32());
            ren_sdk_client_free(handle);
        }
    }
}
