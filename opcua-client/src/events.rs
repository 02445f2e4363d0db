//! Events delivered to client subscribers

use opcua_application::types::DataValue;
use opcua_core::StatusCode;

/// Asynchronous happenings a client consumer can listen for
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The handshake finished; the session is live
    Activated,
    /// A monitored item reported a new value
    DataChange {
        subscription_id: u32,
        client_handle: u32,
        value: DataValue,
    },
    /// A publish loop stopped on a terminal status
    SubscriptionStopped {
        subscription_id: u32,
        status: StatusCode,
    },
    /// An error outside any one pending call: reader-side protocol or
    /// decode failures, publish loop breakdowns, failed reconnect attempts
    Error { message: String },
    /// The transport dropped; in-flight requests were rejected
    ConnectionLost,
}
