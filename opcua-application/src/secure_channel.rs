//! Secure channel establishment
//!
//! OPN frames carry an asymmetric security header between the frame header
//! and the sequence header; the service bodies themselves follow the usual
//! type-id-prefixed layout.

use crate::header::{now_timestamp, RequestHeader, ResponseHeader};
use crate::message::MessageBody;
use crate::type_ids::{
    CLOSE_SECURE_CHANNEL_REQUEST, OPEN_SECURE_CHANNEL_REQUEST, OPEN_SECURE_CHANNEL_RESPONSE,
};
use opcua_codec::{BinaryDecoder, BinaryEncoder};
use opcua_core::OpcUaResult;
use opcua_security::{MessageSecurityMode, SecurityPolicy};

/// Security header carried by OPN frames, identifying policy and certificates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AsymmetricSecurityHeader {
    pub security_policy_uri: Option<String>,
    pub sender_certificate: Option<Vec<u8>>,
    pub receiver_certificate_thumbprint: Option<Vec<u8>>,
}

impl AsymmetricSecurityHeader {
    /// Header for an unsecured channel
    pub fn unsecured() -> Self {
        Self {
            security_policy_uri: Some(SecurityPolicy::None.uri().to_string()),
            sender_certificate: None,
            receiver_certificate_thumbprint: None,
        }
    }

    /// Header for a secured channel carrying our certificate and the
    /// server certificate's thumbprint
    pub fn secured(
        policy: SecurityPolicy,
        sender_certificate: Vec<u8>,
        receiver_thumbprint: Vec<u8>,
    ) -> Self {
        Self {
            security_policy_uri: Some(policy.uri().to_string()),
            sender_certificate: Some(sender_certificate),
            receiver_certificate_thumbprint: Some(receiver_thumbprint),
        }
    }

    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_string(self.security_policy_uri.as_deref());
        encoder.encode_byte_string(self.sender_certificate.as_deref());
        encoder.encode_byte_string(self.receiver_certificate_thumbprint.as_deref());
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            security_policy_uri: decoder.decode_string()?,
            sender_certificate: decoder.decode_byte_string()?,
            receiver_certificate_thumbprint: decoder.decode_byte_string()?,
        })
    }
}

/// Whether an open request issues a fresh token or renews the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityTokenRequestType {
    Issue = 0,
    Renew = 1,
}

/// Request to open (or renew) a secure channel
#[derive(Debug, Clone, PartialEq)]
pub struct OpenSecureChannelRequest {
    pub header: RequestHeader,
    pub client_protocol_version: u32,
    pub request_type: SecurityTokenRequestType,
    pub security_mode: MessageSecurityMode,
    pub client_nonce: Option<Vec<u8>>,
    /// Requested token lifetime in milliseconds
    pub requested_lifetime: u32,
}

impl MessageBody for OpenSecureChannelRequest {
    const TYPE_ID: u16 = OPEN_SECURE_CHANNEL_REQUEST;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_u32(self.client_protocol_version);
        encoder.encode_u32(self.request_type as u32);
        encoder.encode_u32(self.security_mode.id());
        encoder.encode_byte_string(self.client_nonce.as_deref());
        encoder.encode_u32(self.requested_lifetime);
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let header = RequestHeader::decode(decoder)?;
        let client_protocol_version = decoder.decode_u32()?;
        let request_type = match decoder.decode_u32()? {
            0 => SecurityTokenRequestType::Issue,
            _ => SecurityTokenRequestType::Renew,
        };
        Ok(Self {
            header,
            client_protocol_version,
            request_type,
            security_mode: MessageSecurityMode::from_id(decoder.decode_u32()?)?,
            client_nonce: decoder.decode_byte_string()?,
            requested_lifetime: decoder.decode_u32()?,
        })
    }
}

/// Token granted by the server when a channel opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSecurityToken {
    pub channel_id: u32,
    pub token_id: u32,
    pub created_at: i64,
    pub revised_lifetime: u32,
}

impl ChannelSecurityToken {
    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_u32(self.channel_id);
        encoder.encode_u32(self.token_id);
        encoder.encode_i64(self.created_at);
        encoder.encode_u32(self.revised_lifetime);
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            channel_id: decoder.decode_u32()?,
            token_id: decoder.decode_u32()?,
            created_at: decoder.decode_i64()?,
            revised_lifetime: decoder.decode_u32()?,
        })
    }
}

/// Server's answer to an open request
#[derive(Debug, Clone, PartialEq)]
pub struct OpenSecureChannelResponse {
    pub header: ResponseHeader,
    pub server_protocol_version: u32,
    pub token: ChannelSecurityToken,
    pub server_nonce: Option<Vec<u8>>,
}

impl MessageBody for OpenSecureChannelResponse {
    const TYPE_ID: u16 = OPEN_SECURE_CHANNEL_RESPONSE;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_u32(self.server_protocol_version);
        self.token.encode(encoder);
        encoder.encode_byte_string(self.server_nonce.as_deref());
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            header: ResponseHeader::decode(decoder)?,
            server_protocol_version: decoder.decode_u32()?,
            token: ChannelSecurityToken::decode(decoder)?,
            server_nonce: decoder.decode_byte_string()?,
        })
    }
}

/// Request to close the secure channel; the server does not answer it
#[derive(Debug, Clone, PartialEq)]
pub struct CloseSecureChannelRequest {
    pub header: RequestHeader,
}

impl MessageBody for CloseSecureChannelRequest {
    const TYPE_ID: u16 = CLOSE_SECURE_CHANNEL_REQUEST;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            header: RequestHeader::decode(decoder)?,
        })
    }
}

impl OpenSecureChannelResponse {
    /// A Good response granting the given token (test and server-side use)
    pub fn granting(request_handle: u32, channel_id: u32, token_id: u32) -> Self {
        Self {
            header: ResponseHeader::good(request_handle),
            server_protocol_version: 0,
            token: ChannelSecurityToken {
                channel_id,
                token_id,
                created_at: now_timestamp(),
                revised_lifetime: 3_600_000,
            },
            server_nonce: None,
        }
    }
}
