//! Service message catalog for the OPC UA TCP binary client
//!
//! This crate defines the request and response structures the client
//! exchanges with a server and their exact binary layouts: connection
//! negotiation, secure channel establishment, discovery, session
//! lifecycle, attribute access, browsing and subscriptions.

pub mod attribute;
pub mod discovery;
pub mod header;
pub mod message;
pub mod secure_channel;
pub mod session;
pub mod subscription;
pub mod transport;
pub mod type_ids;
pub mod types;
pub mod view;

pub use header::{now_timestamp, RequestHeader, ResponseHeader};
pub use message::{decode_message, decode_service_response, encode_message, MessageBody, ServiceResponse};
