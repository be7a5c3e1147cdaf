//! Backend payload types and login options.

use std::collections::HashMap;
use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// Options for [`Client::login`](crate::Client::login), carried across the C ABI as a bitmask.
///
/// Unknown bits are dropped so that callers built against newer headers keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LoginFlags(u32);

impl LoginFlags {
    /// Ask the backend for a long-lived session.
    pub const REMEMBER_ME: Self = Self(1);

    const KNOWN: u32 = Self::REMEMBER_ME.0;

    /// No options.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Keep the known bits of `bits`, ignore the rest.
    #[must_use]
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::KNOWN)
    }

    /// Raw bit value.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether [`LoginFlags::REMEMBER_ME`] is set.
    #[must_use]
    pub const fn remember_me(self) -> bool {
        self.contains(Self::REMEMBER_ME)
    }
}

impl BitOr for LoginFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Body of `POST /auth/login`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    /// Account login.
    pub login: String,
    /// Plain-text password, sent over the configured transport.
    pub password: String,
    /// Long-lived session request.
    pub remember_me: Option<bool>,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("remember_me", &self.remember_me)
            .finish()
    }
}

/// Successful answer of `POST /auth/login`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    /// Human-readable status from the backend.
    pub message: String,
    /// The authenticated user.
    pub user: UserResponse,
    /// Bearer token for subsequent calls.
    pub token: String,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("message", &self.message)
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// A user profile.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserResponse {
    /// Backend user id.
    pub id: i64,
    /// Account login.
    pub login: String,
    /// Display name.
    pub username: String,
    /// Avatar path, if one is set.
    pub avatar: Option<String>,
}

/// Body of `PATCH /users/username`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UpdateUsernameRequest {
    /// New display name.
    pub username: String,
}

/// Answer of `GET /users/{id}/public-key`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyResponse {
    /// Owner of the key.
    pub user_id: i64,
    /// Base64 public key.
    pub public_key: String,
}

/// A conversation visible to the authenticated user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    /// Backend chat id.
    pub id: i64,
    /// `"private"` or `"group"`.
    pub kind: String,
    /// Group title.
    pub title: Option<String>,
    /// ISO 8601 creation time.
    pub created_at: String,
    /// ISO 8601 time of the last change.
    pub updated_at: String,
    /// Archived flag, when the backend reports it.
    pub is_archived: Option<bool>,
    /// Avatar of the other participant in a private chat.
    pub peer_avatar: Option<String>,
    /// Name of the other participant in a private chat.
    pub peer_username: String,
}

/// Body of `POST /chats`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateChatRequest {
    /// `"private"` or `"group"`.
    pub kind: String,
    /// Group title.
    pub title: Option<String>,
    /// Participants.
    pub user_ids: Vec<i64>,
}

/// Per-recipient wrapped message key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Wrapped key, base64.
    pub key: String,
    /// Ephemeral public key, base64.
    pub ephem_pub_key: String,
    /// Wrapping nonce, base64.
    pub iv: String,
}

/// Attachment metadata.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// Backend file id.
    pub file_id: Option<i64>,
    /// Original file name.
    pub filename: String,
    /// MIME type.
    pub mimetype: String,
    /// Size in bytes.
    pub size: i64,
    /// Encrypted content, base64.
    pub enc_file: Option<String>,
    /// Content nonce, base64.
    pub nonce: Option<String>,
    /// ISO 8601 creation time.
    pub file_creation_date: Option<String>,
    /// Per-chunk nonces for chunked uploads.
    pub nonces: Option<Vec<String>>,
    /// Chunk size for chunked uploads.
    pub chunk_size: Option<i64>,
    /// Chunk count for chunked uploads.
    pub chunk_count: Option<i64>,
}

/// A stored chat message. The text is end-to-end encrypted and opaque to the SDK.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Backend message id.
    pub id: i64,
    /// Owning chat.
    pub chat_id: i64,
    /// Author.
    pub sender_id: i64,
    /// Ciphertext.
    pub message: String,
    /// `"text"`, `"file"`, `"image"`, ...
    pub message_type: String,
    /// ISO 8601 creation time.
    pub created_at: String,
    /// ISO 8601 time of the last edit.
    pub edited_at: Option<String>,
    /// Read marker.
    pub is_read: bool,
    /// Whether attachments exist.
    pub has_files: Option<bool>,
    /// Attachment metadata.
    pub metadata: Option<Vec<FileMetadata>>,
    /// Wrapped keys keyed by recipient user id.
    pub envelopes: Option<HashMap<String, Envelope>>,
    /// Client-side delivery status.
    pub status: Option<String>,
}
