//! Wire protocol: authentication handshake followed by vector batches.
//!
//! Per connection the handshake runs exactly once; only an authenticated
//! client reaches the batch phase. Handshake failures are answered with an
//! explicit `ERR` token, while malformed batch frames abort the connection
//! silently. The asymmetry is deliberate and part of the protocol.

pub mod batch;
pub mod handshake;

/// Maximum login token length in bytes.
pub const MAX_LOGIN_LEN: usize = 32;

/// Maximum number of vectors in one batch.
pub const MAX_VECTORS: u32 = 100;

/// Maximum number of elements in one vector.
pub const MAX_VECTOR_LEN: u32 = 1000;

/// Handshake acceptance token, NUL-terminated.
pub const TOKEN_OK: &[u8] = b"OK\0";

/// Handshake rejection token, NUL-terminated.
pub const TOKEN_ERR: &[u8] = b"ERR\0";
