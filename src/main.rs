//! vecsumd: a vector sum server
//!
//! A single-client-at-a-time TCP service. Each connection authenticates
//! with a salted challenge-response handshake, then streams a batch of
//! integer vectors in a compact binary framing; the server answers each
//! vector with its saturating 32-bit sum.
//!
//! Features:
//! - Challenge-response authentication against a flat credential file
//! - Little-endian binary framing, independent of host byte order
//! - Overflow-safe saturating sums
//! - Configuration via CLI arguments or TOML file

mod auth;
mod config;
mod connection;
mod credentials;
mod logging;
mod protocol;
mod server;
mod sum;

use config::Config;
use credentials::CredentialStore;
use server::Server;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration; help/version and argument errors exit here.
    let config = Config::load()?;

    logging::init(&config.log_level, config.log_file.as_deref())?;

    info!(
        port = config.port,
        credentials = %config.credentials.display(),
        recv_timeout_secs = config.recv_timeout_secs,
        "Starting vecsumd"
    );

    // Read-once credential table; unreadable file is startup-fatal.
    let store = CredentialStore::load(&config.credentials)?;
    info!(clients = store.len(), "Credential store loaded");

    let server = Server::bind(config, store).await?;

    // Ctrl+C requests a stop; it takes effect at the next accept boundary.
    server
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
