//! Core types for the OPC UA TCP binary client
//!
//! This crate holds the pieces every other layer depends on:
//!
//! - `OpcUaError` / `OpcUaResult`: the error taxonomy shared across the
//!   transport, codec, session and client crates
//! - `StatusCode`: the closed enumeration of service status codes
//! - `NodeId`: the polymorphic node identifier model

pub mod error;
pub mod node_id;
pub mod status;

pub use error::{OpcUaError, OpcUaResult};
pub use node_id::NodeId;
pub use status::{StatusClass, StatusCode};
