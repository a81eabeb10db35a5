//! Authentication handshake state machine.
//!
//! Wire exchange, in order:
//! 1. client sends a delimited login token (at most 32 bytes)
//! 2. server answers with 16 raw salt bytes (hex ASCII, no terminator),
//!    or `ERR\0` and close if the login is unknown
//! 3. client sends the hex digest of `SHA256(salt ++ secret)`
//! 4. server answers `OK\0` on a match, `ERR\0` otherwise, and on `ERR`
//!    the connection ends without reaching the batch phase
//!
//! The salt needs no terminator because its length is fixed; the text
//! tokens carry their NUL so a client can use a generic string read.

use crate::auth::{self, Authenticator, DIGEST_LEN, SALT_LEN};
use crate::connection::Connection;
use crate::credentials::CredentialStore;
use crate::protocol::{MAX_LOGIN_LEN, TOKEN_ERR, TOKEN_OK};
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

/// Terminal state of a handshake that ran to completion on the wire.
#[derive(Debug, PartialEq, Eq)]
pub enum HandshakeOutcome {
    /// The client proved knowledge of the stored secret.
    Authenticated(String),
    /// Unknown login or failed verification; `ERR` was sent (best effort).
    Rejected,
}

/// Run the handshake on an accepted connection.
///
/// I/O failures (timeout, peer closed mid-exchange) propagate as errors;
/// a clean rejection is a normal `Rejected` outcome. There is no retry
/// within a connection.
pub async fn run<S: AsyncRead + AsyncWrite + Unpin>(
    conn: &mut Connection<S>,
    store: &CredentialStore,
    auth: &mut Authenticator,
) -> io::Result<HandshakeOutcome> {
    let login = conn.read_token(MAX_LOGIN_LEN).await?;
    info!(login = %login, "Login received");

    let Some(secret) = store.secret(&login) else {
        warn!(login = %login, "Unknown login");
        reject(conn, &login).await;
        return Ok(HandshakeOutcome::Rejected);
    };

    // Fixed-length salt, sent raw with no terminator.
    let salt = auth.generate_salt();
    debug_assert_eq!(salt.len(), SALT_LEN);
    debug!(login = %login, "Salt issued");
    conn.write_all(salt.as_bytes()).await?;

    let submitted = conn.read_token(DIGEST_LEN).await?;

    if !auth::verify(&submitted, &salt, secret) {
        warn!(login = %login, "Digest verification failed");
        reject(conn, &login).await;
        return Ok(HandshakeOutcome::Rejected);
    }

    conn.write_all(TOKEN_OK).await?;
    info!(login = %login, "Client authenticated");
    Ok(HandshakeOutcome::Authenticated(login))
}

/// Send the rejection token. Best effort: a send failure is logged, not
/// propagated, since the connection is being torn down either way.
async fn reject<S: AsyncRead + AsyncWrite + Unpin>(conn: &mut Connection<S>, login: &str) {
    if let Err(e) = conn.write_all(TOKEN_ERR).await {
        warn!(login = %login, error = %e, "Failed to send ERR token");
    }
}
