//! Connection negotiation messages
//!
//! Hello, Acknowledge and the transport-level error message travel in bare
//! frames without a sequence header or a type-id prefix.

use opcua_codec::{BinaryDecoder, BinaryEncoder};
use opcua_core::{OpcUaError, OpcUaResult, StatusCode};

/// Protocol version this client speaks
pub const PROTOCOL_VERSION: u32 = 0;

/// Default buffer and message limits offered in Hello
pub const DEFAULT_BUFFER_SIZE: u32 = 65_535;
pub const DEFAULT_MAX_MESSAGE_SIZE: u32 = 16 * 1024 * 1024;
pub const DEFAULT_MAX_CHUNK_COUNT: u32 = 4_096;

/// First message on a fresh connection, proposing transport limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hello {
    pub protocol_version: u32,
    pub receive_buffer_size: u32,
    pub send_buffer_size: u32,
    pub max_message_size: u32,
    pub max_chunk_count: u32,
    pub endpoint_url: Option<String>,
}

impl Hello {
    pub fn new(endpoint_url: &str) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            receive_buffer_size: DEFAULT_BUFFER_SIZE,
            send_buffer_size: DEFAULT_BUFFER_SIZE,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_chunk_count: DEFAULT_MAX_CHUNK_COUNT,
            endpoint_url: Some(endpoint_url.to_string()),
        }
    }

    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_u32(self.protocol_version);
        encoder.encode_u32(self.receive_buffer_size);
        encoder.encode_u32(self.send_buffer_size);
        encoder.encode_u32(self.max_message_size);
        encoder.encode_u32(self.max_chunk_count);
        encoder.encode_string(self.endpoint_url.as_deref());
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            protocol_version: decoder.decode_u32()?,
            receive_buffer_size: decoder.decode_u32()?,
            send_buffer_size: decoder.decode_u32()?,
            max_message_size: decoder.decode_u32()?,
            max_chunk_count: decoder.decode_u32()?,
            endpoint_url: decoder.decode_string()?,
        })
    }
}

/// Server's answer to Hello with the limits it actually grants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acknowledge {
    pub protocol_version: u32,
    pub receive_buffer_size: u32,
    pub send_buffer_size: u32,
    pub max_message_size: u32,
    pub max_chunk_count: u32,
}

impl Acknowledge {
    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_u32(self.protocol_version);
        encoder.encode_u32(self.receive_buffer_size);
        encoder.encode_u32(self.send_buffer_size);
        encoder.encode_u32(self.max_message_size);
        encoder.encode_u32(self.max_chunk_count);
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            protocol_version: decoder.decode_u32()?,
            receive_buffer_size: decoder.decode_u32()?,
            send_buffer_size: decoder.decode_u32()?,
            max_message_size: decoder.decode_u32()?,
            max_chunk_count: decoder.decode_u32()?,
        })
    }

    /// Frame size the peer will accept from us
    pub fn negotiated_chunk_size(&self) -> usize {
        self.receive_buffer_size as usize
    }
}

/// Transport-level error, after which the server closes the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage {
    pub error: u32,
    pub reason: Option<String>,
}

impl ErrorMessage {
    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_u32(self.error);
        encoder.encode_string(self.reason.as_deref());
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            error: decoder.decode_u32()?,
            reason: decoder.decode_string()?,
        })
    }

    /// Map onto the status taxonomy, falling back to a protocol error
    pub fn to_error(&self) -> OpcUaError {
        match StatusCode::from_u32(self.error) {
            Some(status) => OpcUaError::Status(status),
            None => OpcUaError::Protocol(format!(
                "Transport error 0x{:08X}: {}",
                self.error,
                self.reason.as_deref().unwrap_or("no reason given")
            )),
        }
    }
}
