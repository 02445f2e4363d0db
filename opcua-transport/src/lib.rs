//! Transport layer for the OPC UA TCP binary client
//!
//! Provides the byte-stream boundary the protocol engine builds on: a
//! `Transport` trait yielding split read/write halves, and the TCP
//! implementation with no-delay and a connect timeout.

pub mod stream;
pub mod tcp;

pub use stream::{Transport, TransportReader, TransportWriter};
pub use tcp::{TcpSettings, TcpTransport};
