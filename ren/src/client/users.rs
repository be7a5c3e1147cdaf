//! Profile, account and public-key calls.

use tracing::info;

use super::{Auth, Client, decode, ensure_success};
use crate::error::{Error, Result};
use crate::transport::Method;
use crate::types::{PublicKeyResponse, UpdateUsernameRequest, UserResponse};

impl Client {
    /// Fetch the profile of the logged-in user (`GET /users/me`).
    pub fn me(&self) -> Result<UserResponse> {
        let response = self.send(Method::Get, "/users/me", None, Auth::Bearer)?;
        decode(&ensure_success(response)?)
    }

    /// Delete the account of the logged-in user (`DELETE /users/me`).
    ///
    /// The local session is dropped once the backend confirms. On failure it is kept.
    pub fn delete_account(&self) -> Result<()> {
        let response = self.send(Method::Delete, "/users/me", None, Auth::Bearer)?;
        ensure_success(response)?;
        let user_id = self.user_id();
        self.clear_session();
        info!(?user_id, "account deleted");
        Ok(())
    }

    /// Fetch the published public key of `user_id`. Does not require a session.
    pub fn public_key(&self, user_id: i64) -> Result<PublicKeyResponse> {
        let path = format!("/users/{user_id}/public-key");
        let auth = if self.is_authenticated() {
            Auth::Bearer
        } else {
            Auth::Anonymous
        };
        let response = self.send(Method::Get, &path, None, auth)?;
        decode(&ensure_success(response)?)
    }

    /// Change the display name of the logged-in user (`PATCH /users/username`).
    pub fn update_username(&self, username: &str) -> Result<UserResponse> {
        let username = username.trim();
        if username.is_empty() {
            return Err(Error::InvalidArgument("username is empty".into()));
        }
        let body = Self::encode(&UpdateUsernameRequest {
            username: username.to_owned(),
        })?;
        let response = self.send(Method::Patch, "/users/username", Some(body), Auth::Bearer)?;
        decode(&ensure_success(response)?)
    }
}
