//! Commands that talk to the backend.

use std::time::Duration;

use ren::{Client, LoginFlags};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use super::{AuthArgs, ConnectionArgs};

/// Pretty-print `value` as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> ren::Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| ren::Error::InvalidArgument(format!("unprintable value: {e}")))?;
    println!("{text}");
    Ok(())
}

/// Build a client for the configured endpoint. No network I/O happens here.
pub fn connect(connection: &ConnectionArgs) -> ren::Result<Client> {
    Client::builder()
        .endpoint(connection.endpoint.as_str())
        .timeout(Duration::from_millis(connection.timeout_ms))
        .build()
}

const fn login_flags(auth: &AuthArgs) -> LoginFlags {
    if auth.remember_me {
        LoginFlags::REMEMBER_ME
    } else {
        LoginFlags::empty()
    }
}

/// Install a session from `--token`, or log in with `--login`/`--password`.
fn authenticate(client: &Client, auth: &AuthArgs) -> ren::Result<()> {
    if let Some(token) = &auth.token {
        return client.set_token(token.as_str());
    }
    match (&auth.login, &auth.password) {
        (Some(login), Some(password)) => {
            client.login(login, password, login_flags(auth))?;
            Ok(())
        }
        _ => Err(ren::Error::InvalidArgument(
            "pass --token, or both --login and --password".into(),
        )),
    }
}

fn open(connection: &ConnectionArgs, auth: &AuthArgs) -> ren::Result<Client> {
    let client = connect(connection)?;
    authenticate(&client, auth)?;
    Ok(client)
}

pub fn login(connection: &ConnectionArgs, auth: &AuthArgs) -> ren::Result<()> {
    let client = connect(connection)?;
    let (Some(login), Some(password)) = (&auth.login, &auth.password) else {
        return Err(ren::Error::InvalidArgument(
            "login needs --login and --password".into(),
        ));
    };
    let response = client.login(login, password, login_flags(auth))?;
    print_json(&json!({
        "message": response.message,
        "token": response.token,
        "user": response.user,
    }))
}

pub fn profile(connection: &ConnectionArgs, auth: &AuthArgs) -> ren::Result<()> {
    print_json(&open(connection, auth)?.me()?)
}

pub fn chats(connection: &ConnectionArgs, auth: &AuthArgs) -> ren::Result<()> {
    print_json(&open(connection, auth)?.chats()?)
}

pub fn messages(connection: &ConnectionArgs, auth: &AuthArgs, chat_id: i64) -> ren::Result<()> {
    print_json(&open(connection, auth)?.messages(chat_id)?)
}

pub fn public_key(connection: &ConnectionArgs, user_id: i64) -> ren::Result<()> {
    print_json(&connect(connection)?.public_key(user_id)?)
}

pub fn rename(connection: &ConnectionArgs, auth: &AuthArgs, username: &str) -> ren::Result<()> {
    print_json(&open(connection, auth)?.update_username(username)?)
}

pub fn delete_chat(
    connection: &ConnectionArgs,
    auth: &AuthArgs,
    chat_id: i64,
    for_all: Option<bool>,
) -> ren::Result<()> {
    open(connection, auth)?.delete_chat(chat_id, for_all)?;
    info!(chat_id, ?for_all, "chat deleted");
    print_json(&json!({ "deleted_chat": chat_id }))
}

pub fn delete_account(connection: &ConnectionArgs, auth: &AuthArgs) -> ren::Result<()> {
    let client = open(connection, auth)?;
    let user_id = client.user_id();
    client.delete_account()?;
    print_json(&json!({ "deleted_account": user_id }))
}

/// Login, profile, chats, key pair and salt in one go, printed as one JSON document.
pub fn demo(connection: &ConnectionArgs, auth: &AuthArgs) -> ren::Result<()> {
    let client = open(connection, auth)?;
    info!(endpoint = client.endpoint(), "authenticated");
    let me = client.me()?;
    let chats = client.chats()?;
    let keypair = ren::crypto::generate_key_pair()?;
    let salt = ren::crypto::generate_salt()?;
    print_json(&json!({
        "me": me,
        "chats": chats,
        "keypair": { "public_key": keypair.public_key },
        "salt": salt,
    }))?;
    client.logout();
    Ok(())
}
