#![doc = include_str!("../README.md")]

mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{Client, ClientBuilder, Session};
pub use config::{ClientConfig, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
pub use crypto::KeyPair;
pub use error::{Error, Result};
pub use types::*;
