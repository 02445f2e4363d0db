//! Security layer for the OPC UA client
//!
//! Holds the message security mode and policy-URI model used during
//! endpoint selection, and the certificate thumbprint digest consumed by
//! the OpenSecureChannel negotiation.

pub mod crypto;
pub mod policy;

pub use crypto::sha1_thumbprint;
pub use policy::{MessageSecurityMode, SecurityPolicy};
