use crate::status::StatusCode;
use thiserror::Error;

/// Main error type for OPC UA client operations
#[derive(Error, Debug)]
pub enum OpcUaError {
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Timeout")]
    Timeout,

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Malformed node id: unrecognized encoding mask 0x{0:02X}")]
    MalformedNodeId(u8),

    #[error("Service returned status {0:?}")]
    Status(StatusCode),

    #[error("Session not ready")]
    SessionNotReady,

    #[error("Endpoint selection failed: {0}")]
    EndpointSelection(String),

    #[error("No user token policy matches the configured credential: {0}")]
    CredentialPolicyMismatch(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl OpcUaError {
    /// Whether this error is fatal to the current connection.
    ///
    /// Fatal errors tear the connection down and trigger the reconnect
    /// policy when it is enabled; non-fatal errors only fail the request
    /// they belong to.
    pub fn is_fatal(&self) -> bool {
        matches!(self, OpcUaError::Connection(_) | OpcUaError::Timeout)
    }
}

/// Result type alias for OPC UA client operations
pub type OpcUaResult<T> = Result<T, OpcUaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let io = OpcUaError::Connection(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ));
        assert!(io.is_fatal());
        assert!(!OpcUaError::SessionNotReady.is_fatal());
        assert!(!OpcUaError::Status(StatusCode::BadTimeout).is_fatal());
    }
}
