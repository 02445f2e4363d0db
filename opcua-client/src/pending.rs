//! In-flight request correlation
//!
//! Every outbound request registers its request id here together with a
//! oneshot sender; the inbound frame task resolves the entry when the
//! matching response arrives. Resolving or rejecting an id with no entry
//! is a no-op, so late responses after a timeout are dropped silently.

use opcua_core::{OpcUaError, OpcUaResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Request id reserved for the connection handshake's Acknowledge
pub const CONNECT_REQUEST_ID: u32 = 0;

/// A raw correlated reply: the message bytes after the sequence header
pub type RawReply = Vec<u8>;

/// Table of in-flight requests keyed by request id
pub struct PendingRequests {
    entries: Mutex<HashMap<u32, oneshot::Sender<OpcUaResult<RawReply>>>>,
    next_id: AtomicU32,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            // id 0 is reserved for the connect outcome
            next_id: AtomicU32::new(1),
        }
    }

    /// Allocate the next request id
    pub fn next_id(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Register an id and get the receiver its reply will arrive on
    pub fn register(&self, request_id: u32) -> oneshot::Receiver<OpcUaResult<RawReply>> {
        let (sender, receiver) = oneshot::channel();
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(request_id, sender);
        }
        receiver
    }

    /// Drop a registration, e.g. after a timeout
    pub fn forget(&self, request_id: u32) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(&request_id);
        }
    }

    /// Resolve an id with its reply; unknown ids are ignored
    pub fn resolve(&self, request_id: u32, reply: OpcUaResult<RawReply>) {
        let sender = match self.entries.lock() {
            Ok(mut entries) => entries.remove(&request_id),
            Err(_) => None,
        };
        if let Some(sender) = sender {
            // the requester may have given up already
            let _ = sender.send(reply);
        }
    }

    /// Reject every in-flight request, e.g. when the connection drops
    pub fn reject_all(&self, error: &OpcUaError) {
        let drained: Vec<_> = match self.entries.lock() {
            Ok(mut entries) => entries.drain().collect(),
            Err(_) => Vec::new(),
        };
        for (request_id, sender) in drained {
            log::debug!("Rejecting in-flight request {}: {}", request_id, error);
            let _ = sender.send(Err(clone_error(error)));
        }
    }

    /// Number of requests currently awaiting replies
    pub fn in_flight(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}

impl Default for PendingRequests {
    fn default() -> Self {
        Self::new()
    }
}

// OpcUaError is not Clone because of the io::Error variant; rebuild an
// equivalent error for each rejected waiter.
fn clone_error(error: &OpcUaError) -> OpcUaError {
    match error {
        OpcUaError::Connection(e) => {
            OpcUaError::Connection(std::io::Error::new(e.kind(), e.to_string()))
        }
        OpcUaError::Timeout => OpcUaError::Timeout,
        OpcUaError::Decode(what) => OpcUaError::Decode(what.clone()),
        OpcUaError::MalformedNodeId(mask) => OpcUaError::MalformedNodeId(*mask),
        OpcUaError::Status(status) => OpcUaError::Status(*status),
        OpcUaError::SessionNotReady => OpcUaError::SessionNotReady,
        OpcUaError::EndpointSelection(what) => OpcUaError::EndpointSelection(what.clone()),
        OpcUaError::CredentialPolicyMismatch(what) => {
            OpcUaError::CredentialPolicyMismatch(what.clone())
        }
        OpcUaError::Protocol(what) => OpcUaError::Protocol(what.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_delivers_reply() {
        tokio_test::block_on(async {
            let pending = PendingRequests::new();
            let receiver = pending.register(7);
            assert_eq!(pending.in_flight(), 1);

            pending.resolve(7, Ok(vec![1, 2, 3]));
            assert_eq!(receiver.await.unwrap().unwrap(), vec![1, 2, 3]);
            assert_eq!(pending.in_flight(), 0);
        });
    }

    #[test]
    fn test_unknown_id_is_no_op() {
        let pending = PendingRequests::new();
        pending.resolve(99, Ok(Vec::new()));
        pending.forget(99);
        assert_eq!(pending.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_reject_all_fails_every_waiter() {
        let pending = PendingRequests::new();
        let first = pending.register(1);
        let second = pending.register(2);

        pending.reject_all(&OpcUaError::Timeout);
        assert!(first.await.unwrap().is_err());
        assert!(second.await.unwrap().is_err());
        assert_eq!(pending.in_flight(), 0);
    }

    #[test]
    fn test_ids_start_after_reserved_connect_id() {
        let pending = PendingRequests::new();
        assert_eq!(pending.next_id(), 1);
        assert_eq!(pending.next_id(), 2);
    }
}
