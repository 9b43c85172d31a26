//! AetherChat - terminal client for a retrieval-augmented ML tutor.
//!
//! Architecture:
//! - A `Conversation` owns the message log and the pending gate
//! - `RagClient` is the only thing that talks to the backend over HTTP
//! - The REPL and other commands only read the log and call `submit`

mod chat;
mod cli;
mod client;
mod config;
mod models;
mod settings;
mod upload;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    execute(cli).await
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "aetherchat=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}
