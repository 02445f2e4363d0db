//! Client configuration

use opcua_application::transport::{
    DEFAULT_BUFFER_SIZE, DEFAULT_MAX_CHUNK_COUNT, DEFAULT_MAX_MESSAGE_SIZE,
};
use opcua_security::MessageSecurityMode;
use std::time::Duration;

/// User credentials the client may present during session activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// No identity; only usable against endpoints with an anonymous policy
    Anonymous,
    /// User name and password
    UserName { user_name: String, password: String },
    /// X.509 client certificate (DER bytes)
    Certificate { certificate: Vec<u8> },
}

/// Configuration for one client connection
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint URL, e.g. `opc.tcp://192.168.0.10:4840/server`
    pub endpoint_url: String,
    /// Application URI announced in the session handshake
    pub application_uri: String,
    /// Human-readable application name
    pub application_name: String,
    /// Session name shown in server diagnostics
    pub session_name: String,
    /// Security mode the selected endpoint must offer
    pub security_mode: MessageSecurityMode,
    /// Credentials to activate the session with
    pub credentials: Credentials,
    /// Requested session timeout in milliseconds
    pub session_timeout_ms: f64,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Requested secure channel token lifetime in milliseconds
    pub channel_lifetime_ms: u32,
    /// Restart from Hello automatically after a lost connection
    pub reconnect: bool,
    /// Delay before a reconnect attempt after a lost connection
    pub reconnect_delay: Duration,
    /// Receive buffer size offered in Hello
    pub receive_buffer_size: u32,
    /// Largest reassembled message the client accepts
    pub max_message_size: u32,
    /// Maximum number of chunks per message the client accepts
    pub max_chunk_count: u32,
    /// Extra wait added per consecutive congested publish response
    pub publish_backoff_step: Duration,
}

impl ClientConfig {
    /// Configuration for an unsecured anonymous connection
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            application_uri: "urn:opcua-client".to_string(),
            application_name: "opcua-client".to_string(),
            session_name: "opcua-client-session".to_string(),
            security_mode: MessageSecurityMode::None,
            credentials: Credentials::Anonymous,
            session_timeout_ms: 60_000.0,
            request_timeout: Duration::from_secs(10),
            channel_lifetime_ms: 3_600_000,
            reconnect: false,
            reconnect_delay: Duration::from_secs(5),
            receive_buffer_size: DEFAULT_BUFFER_SIZE,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_chunk_count: DEFAULT_MAX_CHUNK_COUNT,
            publish_backoff_step: Duration::from_millis(100),
        }
    }

    /// Reconnect automatically when the transport drops
    pub fn with_reconnect(mut self, delay: Duration) -> Self {
        self.reconnect = true;
        self.reconnect_delay = delay;
        self
    }

    /// Use user-name/password credentials
    pub fn with_user(mut self, user_name: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Credentials::UserName {
            user_name: user_name.into(),
            password: password.into(),
        };
        self
    }

    /// Require the given security mode when selecting an endpoint
    pub fn with_security_mode(mut self, mode: MessageSecurityMode) -> Self {
        self.security_mode = mode;
        self
    }

    /// `host:port` part of the endpoint URL, for the TCP dial
    pub fn socket_address(&self) -> &str {
        let stripped = self
            .endpoint_url
            .strip_prefix("opc.tcp://")
            .unwrap_or(&self.endpoint_url);
        match stripped.find('/') {
            Some(end) => &stripped[..end],
            None => stripped,
        }
    }
}
