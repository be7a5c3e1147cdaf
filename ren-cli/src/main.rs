//! Command-line driver for the Ren messenger backend.

#![allow(
    missing_docs,
    missing_debug_implementations,
    clippy::print_stderr,
    clippy::print_stdout
)]

mod cmd;

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cmd::{Cli, Command, crypto, session};

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::builder().parse_lossy(&cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("fatal: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> ren::Result<()> {
    let connection = &cli.connection;
    match cli.command {
        Command::Login(auth) => session::login(connection, &auth),
        Command::Profile(auth) => session::profile(connection, &auth),
        Command::Chats(auth) => session::chats(connection, &auth),
        Command::Messages { chat_id, auth } => session::messages(connection, &auth, chat_id),
        Command::PublicKey { user_id } => session::public_key(connection, user_id),
        Command::Rename { username, auth } => session::rename(connection, &auth, &username),
        Command::DeleteChat {
            chat_id,
            for_all,
            auth,
        } => session::delete_chat(connection, &auth, chat_id, for_all),
        Command::DeleteAccount(auth) => session::delete_account(connection, &auth),
        Command::Keypair => crypto::keypair(),
        Command::Salt => crypto::salt(),
        Command::Nonce => crypto::nonce(),
        Command::DerivePublic { private_key } => crypto::derive_public(&private_key),
        Command::DeriveKey { password, salt } => crypto::derive_key(&password, &salt),
        Command::Demo(auth) => session::demo(connection, &auth),
    }
}
