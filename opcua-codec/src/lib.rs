//! Binary primitive codec for the OPC UA TCP binary protocol
//!
//! Encoding rules implemented here:
//!
//! - fixed-width integers and IEEE 754 floats, little-endian
//! - booleans as a single byte, `0x01` = true
//! - strings and byte strings with a `u32` length prefix where
//!   `0xFFFF_FFFF` is the null sentinel for an absent value
//! - collections with the same count-then-elements convention
//! - node identifiers in their per-variant compact layouts

pub mod decoder;
pub mod encoder;

pub use decoder::BinaryDecoder;
pub use encoder::{BinaryEncoder, NULL_SENTINEL};
