//! Transport trait definitions
//!
//! The protocol engine never touches sockets directly. It asks a
//! `Transport` for a connected pair of byte-stream halves; the read half is
//! owned by the inbound frame task and the write half by the single-writer
//! outbound task, so one logical message's chunks are never interleaved
//! with another's on the wire.

use async_trait::async_trait;
use opcua_core::OpcUaResult;
use tokio::io::{AsyncRead, AsyncWrite};

/// Boxed read half handed to the inbound frame task
pub type TransportReader = Box<dyn AsyncRead + Send + Unpin>;

/// Boxed write half handed to the outbound writer task
pub type TransportWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A connectable byte-stream transport
///
/// Implementations are reusable: `connect` may be called again after a
/// connection is lost, yielding a fresh pair of halves for the next
/// handshake attempt.
#[async_trait]
pub trait Transport: Send {
    /// Establish the connection and return its read/write halves
    async fn connect(&mut self) -> OpcUaResult<(TransportReader, TransportWriter)>;
}
