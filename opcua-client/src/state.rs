//! Connection lifecycle state machine
//!
//! The handshake walks a fixed ladder of states; each inbound step is only
//! legal in the state that expects it. A protocol error in any state tears
//! the connection down to `Disconnected`.

use opcua_core::{OpcUaError, OpcUaResult};
use std::fmt;

/// Lifecycle states of one client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport; the initial and terminal state
    Disconnected,
    /// Hello sent, waiting for the server's Acknowledge
    AwaitingAcknowledge,
    /// OpenSecureChannel sent, waiting for the channel grant
    AwaitingChannel,
    /// GetEndpoints sent, waiting for the endpoint list
    AwaitingEndpoints,
    /// CreateSession sent, waiting for the session grant
    AwaitingSession,
    /// ActivateSession sent, waiting for the activation result
    AwaitingActivation,
    /// Handshake complete; requests and subscriptions may flow
    Active,
}

impl ConnectionState {
    /// The state the handshake moves to after this one succeeds
    pub fn next(&self) -> ConnectionState {
        match self {
            ConnectionState::Disconnected => ConnectionState::AwaitingAcknowledge,
            ConnectionState::AwaitingAcknowledge => ConnectionState::AwaitingChannel,
            ConnectionState::AwaitingChannel => ConnectionState::AwaitingEndpoints,
            ConnectionState::AwaitingEndpoints => ConnectionState::AwaitingSession,
            ConnectionState::AwaitingSession => ConnectionState::AwaitingActivation,
            ConnectionState::AwaitingActivation => ConnectionState::Active,
            ConnectionState::Active => ConnectionState::Active,
        }
    }

    /// Whether service requests may be issued in this state
    pub fn is_active(&self) -> bool {
        matches!(self, ConnectionState::Active)
    }

    /// Fail unless the connection has finished its handshake
    pub fn require_active(&self) -> OpcUaResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(OpcUaError::SessionNotReady)
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::AwaitingAcknowledge => "AwaitingAcknowledge",
            ConnectionState::AwaitingChannel => "AwaitingChannel",
            ConnectionState::AwaitingEndpoints => "AwaitingEndpoints",
            ConnectionState::AwaitingSession => "AwaitingSession",
            ConnectionState::AwaitingActivation => "AwaitingActivation",
            ConnectionState::Active => "Active",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_ladder_reaches_active() {
        let mut state = ConnectionState::Disconnected;
        for _ in 0..6 {
            assert!(!state.is_active());
            state = state.next();
        }
        assert_eq!(state, ConnectionState::Active);
        assert_eq!(state.next(), ConnectionState::Active);
    }

    #[test]
    fn test_requests_require_active() {
        assert!(matches!(
            ConnectionState::AwaitingSession.require_active(),
            Err(OpcUaError::SessionNotReady)
        ));
        assert!(ConnectionState::Active.require_active().is_ok());
    }
}
