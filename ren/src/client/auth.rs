//! Login and logout.

use tracing::info;

use super::{Auth, Client, Session, decode, ensure_success};
use crate::error::{Error, Result};
use crate::transport::Method;
use crate::types::{LoginFlags, LoginRequest, LoginResponse};

impl Client {
    /// Authenticate with `login` and `password` in a single `POST /auth/login` round-trip.
    ///
    /// On success the token and user id are installed together. On any failure the
    /// previous session, if there was one, is left as it was.
    pub fn login(&self, login: &str, password: &str, flags: LoginFlags) -> Result<LoginResponse> {
        if login.is_empty() {
            return Err(Error::InvalidArgument("login is empty".into()));
        }
        if password.is_empty() {
            return Err(Error::InvalidArgument("password is empty".into()));
        }
        let body = Self::encode(&LoginRequest {
            login: login.to_owned(),
            password: password.to_owned(),
            remember_me: Some(flags.remember_me()),
        })?;
        let response = self.send(Method::Post, "/auth/login", Some(body), Auth::Anonymous)?;
        if response.status == 401 {
            let detail = response.body.trim();
            return Err(Error::InvalidCredentials(if detail.is_empty() {
                "login or password rejected".to_owned()
            } else {
                detail.to_owned()
            }));
        }
        let response = ensure_success(response)?;
        let login_response: LoginResponse = decode(&response)?;
        if login_response.token.is_empty() {
            return Err(Error::MalformedResponse("login response carries an empty token".into()));
        }
        self.install_session(Session {
            token: login_response.token.clone(),
            user_id: Some(login_response.user.id),
        });
        info!(user_id = login_response.user.id, remember_me = flags.remember_me(), "logged in");
        Ok(login_response)
    }

    /// Forget the local session. The backend is not contacted.
    ///
    /// Returns whether a session was installed.
    pub fn logout(&self) -> bool {
        let had_session = self.clear_session();
        if had_session {
            info!("logged out");
        }
        had_session
    }
}
