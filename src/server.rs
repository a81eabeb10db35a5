//! TCP server: accept loop and per-connection orchestration.
//!
//! One connection at a time: each accepted client runs its handshake and
//! batch phase to completion before the next accept. A shutdown future is
//! observed only at the accept boundary, so an in-flight connection always
//! finishes naturally. Per-connection errors never leave the connection.

use crate::auth::Authenticator;
use crate::config::Config;
use crate::connection::Connection;
use crate::credentials::CredentialStore;
use crate::protocol::batch;
use crate::protocol::handshake::{self, HandshakeOutcome};
use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::{TcpSocket, TcpStream};
use tracing::{debug, error, info};

/// Listen backlog.
const BACKLOG: u32 = 10;

/// Server instance owning the listening socket and all per-process state.
pub struct Server {
    config: Config,
    store: CredentialStore,
    auth: Authenticator,
    listener: tokio::net::TcpListener,
}

impl Server {
    /// Bind the listening socket on all interfaces.
    ///
    /// Bind or listen failure is startup-fatal and propagates to the
    /// caller.
    pub async fn bind(config: Config, store: CredentialStore) -> io::Result<Self> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));

        let socket = TcpSocket::new_v4()?;
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(BACKLOG)?;

        info!(port = config.port, "Server listening");

        Ok(Self {
            config,
            store,
            auth: Authenticator::new(),
            listener,
        })
    }

    /// The bound address, for tests binding port 0.
    #[cfg(test)]
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until `shutdown` completes.
    ///
    /// Connections are processed sequentially; the shutdown future is only
    /// polled between connections. Accept errors are logged and the loop
    /// continues; interrupted accepts are retried transparently.
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) -> io::Result<()> {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping accept loop");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        info!(peer = %peer, "Connection opened");
                        self.handle_client(stream).await;
                        info!(peer = %peer, "Connection closed");
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        error!(error = %e, "Failed to accept connection");
                    }
                }
            }
        }

        info!("Server stopped");
        Ok(())
    }

    /// Handle one client: handshake, then the batch loop, then an orderly
    /// shutdown of the socket regardless of outcome.
    async fn handle_client(&mut self, stream: TcpStream) {
        let timeout = Duration::from_secs(self.config.recv_timeout_secs);
        let mut conn = Connection::new(stream, timeout);

        match handshake::run(&mut conn, &self.store, &mut self.auth).await {
            Ok(HandshakeOutcome::Authenticated(login)) => {
                // Silent toward the peer on failure; only logged locally.
                if let Err(e) = batch::process(&mut conn).await {
                    error!(login = %login, error = %e, "Batch aborted");
                }
                info!(login = %login, "Session finished");
            }
            Ok(HandshakeOutcome::Rejected) => {}
            Err(e) => {
                error!(error = %e, "Handshake failed");
            }
        }

        if let Err(e) = conn.shutdown().await {
            debug!(error = %e, "Socket shutdown failed");
        }
    }
}
