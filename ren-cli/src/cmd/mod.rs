//! CLI argument definitions.

pub mod crypto;
pub mod session;

use clap::{Args, Parser, Subcommand};

/// Command-line client for the Ren messenger backend.
///
/// Every command is one-shot: it opens a client, authenticates if needed, prints JSON
/// to stdout and exits.
#[derive(Parser)]
#[command(name = "ren", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Log filter, e.g. `debug` or `ren=trace`.
    #[arg(long, global = true, env = "REN_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Where and how to reach the backend.
#[derive(Args)]
pub struct ConnectionArgs {
    /// Backend endpoint.
    #[arg(short, long, global = true, env = "REN_ENDPOINT", default_value = ren::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Per-request timeout in milliseconds (0 = 30 s default).
    #[arg(long, global = true, default_value_t = 0)]
    pub timeout_ms: u64,
}

/// Credentials for commands that need a session.
#[derive(Args)]
pub struct AuthArgs {
    /// Bearer token from an earlier login; skips the login round-trip.
    #[arg(
        long,
        env = "REN_TOKEN",
        hide_env_values = true,
        conflicts_with_all = ["login", "password"]
    )]
    pub token: Option<String>,

    /// Account login.
    #[arg(short, long, env = "REN_LOGIN")]
    pub login: Option<String>,

    /// Account password.
    #[arg(short, long, env = "REN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Ask for a long-lived session.
    #[arg(long)]
    pub remember_me: bool,
}

/// One-shot operations.
#[derive(Subcommand)]
pub enum Command {
    /// Log in and print the session token and user.
    Login(AuthArgs),
    /// Print the profile of the logged-in user.
    #[command(alias = "me")]
    Profile(AuthArgs),
    /// List chats.
    Chats(AuthArgs),
    /// List the messages of a chat.
    Messages {
        /// Chat id.
        chat_id: i64,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// Print the public key of a user (no login needed).
    PublicKey {
        /// User id.
        user_id: i64,
    },
    /// Change the display name.
    Rename {
        /// New display name.
        username: String,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// Delete a chat.
    DeleteChat {
        /// Chat id.
        chat_id: i64,
        /// Delete for every participant.
        #[arg(long)]
        for_all: Option<bool>,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// Delete the account of the logged-in user.
    DeleteAccount(AuthArgs),
    /// Generate an X25519 key pair.
    Keypair,
    /// Generate a password salt.
    Salt,
    /// Generate an AEAD nonce.
    Nonce,
    /// Recompute the public key of a base64 private key.
    DerivePublic {
        /// Base64 private key.
        private_key: String,
    },
    /// Derive the master key of a password and a base64 salt.
    DeriveKey {
        /// Password.
        #[arg(long, env = "REN_PASSWORD", hide_env_values = true)]
        password: String,
        /// Base64 salt, as printed by `salt`.
        salt: String,
    },
    /// Run the full sample flow: login, profile, chats, key pair, salt.
    Demo(AuthArgs),
}
