//! Vector batch decoding and response loop.
//!
//! Framing, all integers little-endian:
//! - u32 vector count, 1..=100
//! - per vector: u32 element count, 1..=1000, then `count * 4` bytes of
//!   signed 32-bit elements
//! - per vector the server answers immediately with the 4-byte saturated
//!   sum before reading the next vector
//!
//! A malformed count or length, or a short read anywhere, aborts the
//! connection with no notice to the peer. Unlike the handshake there is
//! no `ERR` token in this phase.

use crate::connection::Connection;
use crate::protocol::{MAX_VECTORS, MAX_VECTOR_LEN};
use crate::sum::saturating_sum;
use std::fmt;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

/// Errors that abort the batch phase.
#[derive(Debug)]
pub enum BatchError {
    /// Socket-level failure: short read, timeout, failed send.
    Io(io::Error),
    /// Declared vector count outside 1..=100.
    BadVectorCount(u32),
    /// Declared element count outside 1..=1000.
    BadVectorLength(u32),
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchError::Io(e) => write!(f, "batch I/O failed: {}", e),
            BatchError::BadVectorCount(n) => write!(f, "invalid vector count: {}", n),
            BatchError::BadVectorLength(n) => write!(f, "invalid vector length: {}", n),
        }
    }
}

impl std::error::Error for BatchError {}

impl From<io::Error> for BatchError {
    fn from(e: io::Error) -> Self {
        BatchError::Io(e)
    }
}

/// Process one batch: decode each vector, sum it, send the result.
///
/// Responses are pipelined one per vector; the sum for vector `i` is on
/// the wire before vector `i + 1` is read.
pub async fn process<S: AsyncRead + AsyncWrite + Unpin>(
    conn: &mut Connection<S>,
) -> Result<(), BatchError> {
    let num_vectors = conn.read_u32_le().await?;
    if num_vectors == 0 || num_vectors > MAX_VECTORS {
        return Err(BatchError::BadVectorCount(num_vectors));
    }
    debug!(vectors = num_vectors, "Batch started");

    for index in 1..=num_vectors {
        let len = conn.read_u32_le().await?;
        if len == 0 || len > MAX_VECTOR_LEN {
            return Err(BatchError::BadVectorLength(len));
        }

        let vector = conn.read_i32_block(len as usize).await?;
        let sum = saturating_sum(&vector);
        conn.write_i32_le(sum).await?;

        debug!(vector = index, len, sum, "Vector processed");
    }

    info!(vectors = num_vectors, "All vectors processed");
    Ok(())
}
