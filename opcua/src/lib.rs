//! OPC UA TCP binary client protocol engine
//!
//! A client-side implementation of the OPC UA binary transport: framing
//! and chunking, the binary type codec, the connection handshake ladder,
//! request correlation and subscription publish loops.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `opcua-core`: Error taxonomy, status codes and node identifiers
//! - `opcua-codec`: Little-endian binary encoder/decoder
//! - `opcua-transport`: Byte-stream transports (TCP)
//! - `opcua-session`: Frame codec, chunk assembly and splitting
//! - `opcua-security`: Security modes, policies and the crypto boundary
//! - `opcua-application`: Service request/response message catalog
//! - `opcua-client`: Connection engine and high-level client API
//!
//! # Usage
//!
//! ```no_run
//! use opcua::client::{ClientConfig, OpcUaClient};
//! ```

// Re-export core types
pub use opcua_core::{NodeId, OpcUaError, OpcUaResult, StatusCode};

// Re-export the client API
pub mod client {
    pub use opcua_client::*;
}

// Re-export the service message catalog
pub mod application {
    pub use opcua_application::*;
}

// Re-export the transport layer
pub mod transport {
    pub use opcua_transport::*;
}

// Re-export the frame codec
pub mod session {
    pub use opcua_session::*;
}

// Re-export the binary codec
pub mod codec {
    pub use opcua_codec::*;
}

// Re-export the security layer
pub mod security {
    pub use opcua_security::*;
}
