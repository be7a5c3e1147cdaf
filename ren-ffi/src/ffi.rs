//! Core FFI infrastructure: error plumbing, panic guard, string bridge, logger.

use std::any::Any;
use std::cell::RefCell;
use std::ffi::{CStr, CString, c_char};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::OnceLock;

use serde::Serialize;

use crate::result::{RenErrorCode, RenResult};

// ---------------------------------------------------------------------------
// Boundary error
// ---------------------------------------------------------------------------

/// An error on its way out through the C ABI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FfiError {
    pub(crate) code: RenErrorCode,
    pub(crate) message: String,
}

impl FfiError {
    pub(crate) fn new(code: RenErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: replace_nul(message.into()),
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(RenErrorCode::InvalidArgument, message)
    }

    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_owned());
        Self::new(RenErrorCode::Internal, format!("internal error: {detail}"))
    }
}

impl From<ren::Error> for FfiError {
    fn from(err: ren::Error) -> Self {
        Self::new(RenErrorCode::from(&err), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Thread-local error
// ---------------------------------------------------------------------------

thread_local! {
    static LAST_ERROR: RefCell<Option<FfiError>> = const { RefCell::new(None) };
}

/// Record `err` as the last error of the calling thread.
pub(crate) fn set_last_error(err: FfiError) {
    tracing::debug!(code = err.code.as_i32(), message = %err.message, "ffi call failed");
    LAST_ERROR.with(|e| *e.borrow_mut() = Some(err));
}

/// Forget the last error of the calling thread.
pub(crate) fn clear_last_error() {
    LAST_ERROR.with(|e| *e.borrow_mut() = None);
}

/// Code of the last failed call on this thread, or 0 if the last call succeeded.
#[unsafe(no_mangle)]
pub extern "C" fn ren_sdk_last_error_code() -> i32 {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map_or(RenErrorCode::Ok.as_i32(), |err| err.code.as_i32())
    })
}

/// Length of the last error message including the NUL terminator, or 0 if there is none.
#[unsafe(no_mangle)]
pub extern "C" fn ren_sdk_last_error_length() -> i32 {
    LAST_ERROR.with(|e| {
        e.borrow().as_ref().map_or(0, |err| {
            i32::try_from(err.message.len() + 1).unwrap_or(i32::MAX)
        })
    })
}

/// Copy the last error message into `buf`, truncating to `buf_len - 1` bytes.
/// Returns the bytes written (excluding NUL), or -1 if `buf` is null or `buf_len <= 0`.
///
/// # Safety
///
/// `buf` must be null or point to at least `buf_len` writable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_last_error_message(buf: *mut c_char, buf_len: i32) -> i32 {
    let Ok(capacity) = usize::try_from(buf_len) else {
        return -1;
    };
    if buf.is_null() || capacity == 0 {
        return -1;
    }
    LAST_ERROR.with(|e| {
        let guard = e.borrow();
        let bytes = guard.as_ref().map_or(&[][..], |err| err.message.as_bytes());
        let copy_len = bytes.len().min(capacity - 1);
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), buf.cast::<u8>(), copy_len);
            *buf.add(copy_len) = 0;
        }
        i32::try_from(copy_len).unwrap_or(i32::MAX)
    })
}

// ---------------------------------------------------------------------------
// Panic-guarding wrappers
// ---------------------------------------------------------------------------

/// Run `f`, turning a panic into an [`RenErrorCode::Internal`] error.
fn guard<T, F>(f: F) -> Result<T, FfiError>
where
    F: FnOnce() -> Result<T, FfiError>,
{
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        tracing::error!("panic caught at the C boundary");
        Err(FfiError::from_panic(payload.as_ref()))
    })
}

/// Run an envelope-returning operation. Failures are also recorded as the last error.
pub(crate) fn catch_result<F>(f: F) -> RenResult
where
    F: FnOnce() -> Result<(), FfiError>,
{
    match guard(f) {
        Ok(()) => {
            clear_last_error();
            RenResult::ok()
        }
        Err(err) => {
            let result = RenResult::err(err.code, &err.message);
            set_last_error(err);
            result
        }
    }
}

/// Run a pointer-returning operation. Failures yield null and set the last error.
pub(crate) fn catch_ptr<T, F>(f: F) -> *mut T
where
    F: FnOnce() -> Result<*mut T, FfiError>,
{
    catch_or(ptr::null_mut(), f)
}

/// Run a value-returning operation. Failures yield `fallback` and set the last error.
pub(crate) fn catch_or<T, F>(fallback: T, f: F) -> T
where
    F: FnOnce() -> Result<T, FfiError>,
{
    match guard(f) {
        Ok(value) => {
            clear_last_error();
            value
        }
        Err(err) => {
            set_last_error(err);
            fallback
        }
    }
}

// ---------------------------------------------------------------------------
// String helpers
// ---------------------------------------------------------------------------

/// Copy a borrowed C string into an owned `String`. `what` names the argument in errors.
pub(crate) unsafe fn c_str_to_string(s: *const c_char, what: &str) -> Result<String, FfiError> {
    if s.is_null() {
        return Err(FfiError::invalid_argument(format!("{what} is null")));
    }
    unsafe { CStr::from_ptr(s) }
        .to_str()
        .map(str::to_owned)
        .map_err(|e| FfiError::invalid_argument(format!("{what} is not valid UTF-8: {e}")))
}

/// Replace interior NUL bytes, which a C string cannot carry, with U+FFFD.
pub(crate) fn replace_nul(text: String) -> String {
    if text.contains('\0') {
        text.replace('\0', "\u{FFFD}")
    } else {
        text
    }
}

/// Allocate a C string from `s`, or null if it contains a NUL byte.
/// Caller must free with [`ren_sdk_free_string`].
pub(crate) fn to_c_string(s: &str) -> *mut c_char {
    CString::new(s).map_or(ptr::null_mut(), CString::into_raw)
}

/// Hand `s` over to the caller as an owned C string.
pub(crate) fn into_c_string(s: String) -> Result<*mut c_char, FfiError> {
    CString::new(s)
        .map(CString::into_raw)
        .map_err(|_| FfiError::new(RenErrorCode::Internal, "string contains a NUL byte"))
}

/// Serialize `value` as JSON and hand it over as an owned C string.
pub(crate) fn to_c_json<T: Serialize>(value: &T) -> Result<*mut c_char, FfiError> {
    let json = serde_json::to_string(value)
        .map_err(|e| FfiError::new(RenErrorCode::Internal, format!("serialize: {e}")))?;
    into_c_string(json)
}

/// Release a string previously returned by this library. Null is a no-op.
///
/// # Safety
///
/// `s` must be null or a pointer returned by this library that has not been released yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Version of this library. Caller must free with [`ren_sdk_free_string`].
#[unsafe(no_mangle)]
pub extern "C" fn ren_sdk_version() -> *mut c_char {
    to_c_string(env!("CARGO_PKG_VERSION"))
}

// ---------------------------------------------------------------------------
// Logger initialization
// ---------------------------------------------------------------------------

static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Install a `tracing` subscriber writing to stderr. Only the first call has an effect.
/// `level` is a filter such as `"debug"` or `"ren=trace,warn"`; null means `"info"`.
/// Returns 0 on success.
///
/// # Safety
///
/// `level` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ren_sdk_init_logger(level: *const c_char) -> i32 {
    catch_or(RenErrorCode::InvalidArgument.as_i32(), || {
        let filter = if level.is_null() {
            "info".to_owned()
        } else {
            unsafe { c_str_to_string(level, "level")? }
        };
        LOGGER_INIT.get_or_init(|| {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};
            let filter = EnvFilter::builder().parse_lossy(&filter);
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .try_init();
        });
        Ok(RenErrorCode::Ok.as_i32())
    })
}
