//! TCP transport implementation

use crate::stream::{Transport, TransportReader, TransportWriter};
use async_trait::async_trait;
use opcua_core::{OpcUaError, OpcUaResult};
use std::time::Duration;
use tokio::net::TcpStream;

/// TCP transport settings
#[derive(Debug, Clone)]
pub struct TcpSettings {
    /// Host and port, e.g. `"192.168.0.10:4840"`
    pub address: String,
    /// Connect timeout; `None` waits indefinitely
    pub connect_timeout: Option<Duration>,
}

impl TcpSettings {
    /// Create new TCP settings with the default 5 second connect timeout
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            connect_timeout: Some(Duration::from_secs(5)),
        }
    }

    /// Create TCP settings with an explicit connect timeout
    pub fn with_timeout(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            connect_timeout: Some(timeout),
        }
    }
}

/// TCP transport for the OPC UA binary protocol
///
/// Sets `TCP_NODELAY` on the connected socket: the protocol exchanges many
/// small request/response frames and must not have them delayed by Nagle's
/// algorithm. Keep-alive is left to OS defaults.
#[derive(Debug)]
pub struct TcpTransport {
    settings: TcpSettings,
}

impl TcpTransport {
    /// Create a new TCP transport
    pub fn new(settings: TcpSettings) -> Self {
        Self { settings }
    }

    /// Create a TCP transport from a `host:port` address string
    pub fn from_address(address: &str) -> Self {
        Self::new(TcpSettings::new(address))
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self) -> OpcUaResult<(TransportReader, TransportWriter)> {
        let connect = TcpStream::connect(self.settings.address.as_str());
        let stream = if let Some(timeout) = self.settings.connect_timeout {
            tokio::time::timeout(timeout, connect)
                .await
                .map_err(|_| OpcUaError::Timeout)?
                .map_err(OpcUaError::Connection)?
        } else {
            connect.await.map_err(OpcUaError::Connection)?
        };

        stream.set_nodelay(true).map_err(OpcUaError::Connection)?;

        let (reader, writer) = stream.into_split();
        Ok((Box::new(reader), Box::new(writer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcp_settings_default_timeout() {
        let settings = TcpSettings::new("127.0.0.1:4840");
        assert_eq!(settings.address, "127.0.0.1:4840");
        assert!(settings.connect_timeout.is_some());
    }

    #[tokio::test]
    async fn test_connect_and_split() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accept = tokio::spawn(async move { listener.accept().await.unwrap() });

        let mut transport = TcpTransport::from_address(&addr.to_string());
        let (_reader, _writer) = transport.connect().await.unwrap();
        accept.await.unwrap();
    }

    #[tokio::test]
    async fn test_connect_refused_is_connection_error() {
        // Bind then drop to get a port that refuses connections.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut transport = TcpTransport::from_address(&addr.to_string());
        match transport.connect().await {
            Err(OpcUaError::Connection(_)) | Err(OpcUaError::Timeout) => {}
            other => panic!("expected connection failure, got {:?}", other.map(|_| ())),
        }
    }
}
