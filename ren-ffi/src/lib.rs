//! `ren-ffi`: C ABI over the Ren messenger SDK.
//!
//! Design principles:
//! - Fallible mutations return a [`RenResult`] envelope (`code == 0` on success).
//! - Reads and utilities return an owned string, or null with the reason stored in a
//!   thread-local last error ([`ren_sdk_last_error_code`], [`ren_sdk_last_error_message`]).
//! - Every string handed out is released with [`ren_sdk_free_string`].
//! - Client handles are generation-tagged registry ids, so a stale handle is reported
//!   as [`RenErrorCode::InvalidHandle`].
//! - Calls block for at most one HTTP round-trip; there is no runtime and no background thread.
//! - Panics are caught at the boundary and reported as [`RenErrorCode::Internal`].
#![allow(unsafe_code)]

#[cfg(not(panic = "unwind"))]
compile_error!("ren-ffi catches panics at the C boundary; build it with panic = \"unwind\"");

mod ffi;
mod registry;

pub mod client;
pub mod crypto;
pub mod result;

pub use client::*;
pub use crypto::*;
pub use ffi::{
    ren_sdk_free_string, ren_sdk_init_logger, ren_sdk_last_error_code, ren_sdk_last_error_length,
    ren_sdk_last_error_message, ren_sdk_version,
};
pub use registry::RenClientHandle;
pub use result::{RenErrorCode, RenResult};
