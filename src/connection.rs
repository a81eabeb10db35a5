//! Buffered connection I/O for the wire protocol.
//!
//! Wraps the accepted socket with a read buffer, a per-read timeout, and
//! the two read disciplines the protocol needs: delimited text tokens for
//! the handshake and exact-length binary frames for vector batches.
//!
//! All multi-byte integers are little-endian on the wire regardless of
//! host byte order.

use bytes::{Buf, Bytes, BytesMut};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time;

/// Read buffer size.
const BUFFER_SIZE: usize = 4 * 1024;

/// A buffered stream with a read timeout.
pub struct Connection<S> {
    stream: S,
    buf: BytesMut,
    read_timeout: Duration,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    /// Wrap a stream. Every read waits at most `read_timeout`.
    pub fn new(stream: S, read_timeout: Duration) -> Self {
        Self {
            stream,
            buf: BytesMut::with_capacity(BUFFER_SIZE),
            read_timeout,
        }
    }

    /// Read once from the stream into the buffer, bounded by the timeout.
    /// Returns the number of bytes read; 0 means the peer closed.
    async fn fill(&mut self) -> io::Result<usize> {
        match time::timeout(self.read_timeout, self.stream.read_buf(&mut self.buf)).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out")),
        }
    }

    /// Read a delimited text token of at most `max_len` bytes.
    ///
    /// A single read is done if the buffer is empty, then the buffered data
    /// is scanned within the `max_len` window: a NUL terminates the token
    /// and is consumed with it; otherwise the first space, CR or LF
    /// terminates the token and stays buffered; otherwise the whole window
    /// is the token, trimmed of trailing whitespace. This tolerates clients
    /// that delimit with NUL, with whitespace, or not at all.
    pub async fn read_token(&mut self, max_len: usize) -> io::Result<String> {
        if self.buf.is_empty() && self.fill().await? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "peer closed before sending token",
            ));
        }

        let window = self.buf.len().min(max_len);

        if let Some(pos) = self.buf[..window].iter().position(|&b| b == 0) {
            let token = self.buf.split_to(pos + 1);
            return Ok(String::from_utf8_lossy(&token[..pos]).into_owned());
        }

        if let Some(pos) = self.buf[..window]
            .iter()
            .position(|&b| matches!(b, b' ' | b'\r' | b'\n'))
        {
            let token = self.buf.split_to(pos);
            return Ok(String::from_utf8_lossy(&token).into_owned());
        }

        let token = self.buf.split_to(window);
        let token = String::from_utf8_lossy(&token);
        Ok(token.trim_end_matches([' ', '\t', '\r', '\n']).to_string())
    }

    /// Read exactly `n` bytes. A short read (peer closed or timed out
    /// mid-frame) is an error.
    async fn read_exact(&mut self, n: usize) -> io::Result<Bytes> {
        while self.buf.len() < n {
            if self.fill().await? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "peer closed mid-frame",
                ));
            }
        }
        Ok(self.buf.split_to(n).freeze())
    }

    /// Read a 4-byte little-endian unsigned integer.
    pub async fn read_u32_le(&mut self) -> io::Result<u32> {
        let mut bytes = self.read_exact(4).await?;
        Ok(bytes.get_u32_le())
    }

    /// Read `count` little-endian signed 32-bit integers as one contiguous
    /// block.
    pub async fn read_i32_block(&mut self, count: usize) -> io::Result<Vec<i32>> {
        let bytes = self.read_exact(count * 4).await?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Write all of `data` to the peer.
    pub async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.stream.write_all(data).await
    }

    /// Write a 4-byte little-endian signed integer.
    pub async fn write_i32_le(&mut self, value: i32) -> io::Result<()> {
        self.stream.write_all(&value.to_le_bytes()).await
    }

    /// Orderly shutdown of the write direction; reads stop when we drop
    /// the stream.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }
}
