//! Session lifecycle services

use crate::header::{RequestHeader, ResponseHeader};
use crate::message::MessageBody;
use crate::type_ids::{
    ACTIVATE_SESSION_REQUEST, ACTIVATE_SESSION_RESPONSE, CLOSE_SESSION_REQUEST,
    CLOSE_SESSION_RESPONSE, CREATE_SESSION_REQUEST, CREATE_SESSION_RESPONSE,
};
use crate::types::{
    decode_status_array, decode_string_array, encode_status_array, encode_string_array,
    ApplicationDescription, DiagnosticInfo, EndpointDescription, SignatureData,
    SignedSoftwareCertificate, UserIdentityToken,
};
use opcua_codec::{BinaryDecoder, BinaryEncoder};
use opcua_core::{NodeId, OpcUaResult, StatusCode};

/// Request a new session on the open channel
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSessionRequest {
    pub header: RequestHeader,
    pub client_description: ApplicationDescription,
    pub server_uri: Option<String>,
    pub endpoint_url: Option<String>,
    pub session_name: Option<String>,
    pub client_nonce: Option<Vec<u8>>,
    pub client_certificate: Option<Vec<u8>>,
    /// Requested session timeout in milliseconds
    pub requested_session_timeout: f64,
    pub max_response_message_size: u32,
}

impl MessageBody for CreateSessionRequest {
    const TYPE_ID: u16 = CREATE_SESSION_REQUEST;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        self.client_description.encode(encoder);
        encoder.encode_string(self.server_uri.as_deref());
        encoder.encode_string(self.endpoint_url.as_deref());
        encoder.encode_string(self.session_name.as_deref());
        encoder.encode_byte_string(self.client_nonce.as_deref());
        encoder.encode_byte_string(self.client_certificate.as_deref());
        encoder.encode_f64(self.requested_session_timeout);
        encoder.encode_u32(self.max_response_message_size);
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            header: RequestHeader::decode(decoder)?,
            client_description: ApplicationDescription::decode(decoder)?,
            server_uri: decoder.decode_string()?,
            endpoint_url: decoder.decode_string()?,
            session_name: decoder.decode_string()?,
            client_nonce: decoder.decode_byte_string()?,
            client_certificate: decoder.decode_byte_string()?,
            requested_session_timeout: decoder.decode_f64()?,
            max_response_message_size: decoder.decode_u32()?,
        })
    }
}

/// Session identifiers and the authentication token for later requests
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSessionResponse {
    pub header: ResponseHeader,
    pub session_id: NodeId,
    /// Token every authenticated request must carry
    pub authentication_token: NodeId,
    pub revised_session_timeout: f64,
    pub server_nonce: Option<Vec<u8>>,
    pub server_certificate: Option<Vec<u8>>,
    pub server_endpoints: Vec<EndpointDescription>,
    pub server_software_certificates: Vec<SignedSoftwareCertificate>,
    pub server_signature: SignatureData,
    pub max_request_message_size: u32,
}

impl MessageBody for CreateSessionResponse {
    const TYPE_ID: u16 = CREATE_SESSION_RESPONSE;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_node_id(&self.session_id);
        encoder.encode_node_id(&self.authentication_token);
        encoder.encode_f64(self.revised_session_timeout);
        encoder.encode_byte_string(self.server_nonce.as_deref());
        encoder.encode_byte_string(self.server_certificate.as_deref());
        EndpointDescription::encode_array(&self.server_endpoints, encoder);
        encoder.encode_array_len(self.server_software_certificates.len());
        for cert in &self.server_software_certificates {
            cert.encode(encoder);
        }
        self.server_signature.encode(encoder);
        encoder.encode_u32(self.max_request_message_size);
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let header = ResponseHeader::decode(decoder)?;
        let session_id = decoder.decode_node_id()?;
        let authentication_token = decoder.decode_node_id()?;
        let revised_session_timeout = decoder.decode_f64()?;
        let server_nonce = decoder.decode_byte_string()?;
        let server_certificate = decoder.decode_byte_string()?;
        let server_endpoints = EndpointDescription::decode_array(decoder)?;
        let count = decoder.decode_array_len()?;
        let mut server_software_certificates = Vec::with_capacity(count);
        for _ in 0..count {
            server_software_certificates.push(SignedSoftwareCertificate::decode(decoder)?);
        }
        Ok(Self {
            header,
            session_id,
            authentication_token,
            revised_session_timeout,
            server_nonce,
            server_certificate,
            server_endpoints,
            server_software_certificates,
            server_signature: SignatureData::decode(decoder)?,
            max_request_message_size: decoder.decode_u32()?,
        })
    }
}

/// Activate the created session with a user identity
#[derive(Debug, Clone, PartialEq)]
pub struct ActivateSessionRequest {
    pub header: RequestHeader,
    pub client_signature: SignatureData,
    pub client_software_certificates: Vec<SignedSoftwareCertificate>,
    pub locale_ids: Vec<String>,
    pub user_identity_token: UserIdentityToken,
    pub user_token_signature: SignatureData,
}

impl MessageBody for ActivateSessionRequest {
    const TYPE_ID: u16 = ACTIVATE_SESSION_REQUEST;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        self.client_signature.encode(encoder);
        encoder.encode_array_len(self.client_software_certificates.len());
        for cert in &self.client_software_certificates {
            cert.encode(encoder);
        }
        encode_string_array(encoder, &self.locale_ids);
        self.user_identity_token.encode(encoder);
        self.user_token_signature.encode(encoder);
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let header = RequestHeader::decode(decoder)?;
        let client_signature = SignatureData::decode(decoder)?;
        let count = decoder.decode_array_len()?;
        let mut client_software_certificates = Vec::with_capacity(count);
        for _ in 0..count {
            client_software_certificates.push(SignedSoftwareCertificate::decode(decoder)?);
        }
        Ok(Self {
            header,
            client_signature,
            client_software_certificates,
            locale_ids: decode_string_array(decoder)?,
            user_identity_token: UserIdentityToken::decode(decoder)?,
            user_token_signature: SignatureData::decode(decoder)?,
        })
    }
}

/// Session is live once this arrives with a Good service result
#[derive(Debug, Clone, PartialEq)]
pub struct ActivateSessionResponse {
    pub header: ResponseHeader,
    pub server_nonce: Option<Vec<u8>>,
    pub results: Vec<StatusCode>,
    pub diagnostic_infos: Vec<DiagnosticInfo>,
}

impl MessageBody for ActivateSessionResponse {
    const TYPE_ID: u16 = ACTIVATE_SESSION_RESPONSE;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_byte_string(self.server_nonce.as_deref());
        encode_status_array(encoder, &self.results);
        DiagnosticInfo::encode_array(&self.diagnostic_infos, encoder);
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            header: ResponseHeader::decode(decoder)?,
            server_nonce: decoder.decode_byte_string()?,
            results: decode_status_array(decoder)?,
            diagnostic_infos: DiagnosticInfo::decode_array(decoder)?,
        })
    }
}

/// Graceful session teardown, sent before closing the channel
#[derive(Debug, Clone, PartialEq)]
pub struct CloseSessionRequest {
    pub header: RequestHeader,
    pub delete_subscriptions: bool,
}

impl MessageBody for CloseSessionRequest {
    const TYPE_ID: u16 = CLOSE_SESSION_REQUEST;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
        encoder.encode_bool(self.delete_subscriptions);
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            header: RequestHeader::decode(decoder)?,
            delete_subscriptions: decoder.decode_bool()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CloseSessionResponse {
    pub header: ResponseHeader,
}

impl MessageBody for CloseSessionResponse {
    const TYPE_ID: u16 = CLOSE_SESSION_RESPONSE;

    fn encode_body(&self, encoder: &mut BinaryEncoder) {
        self.header.encode(encoder);
    }

    fn decode_body(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            header: ResponseHeader::decode(decoder)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: MessageBody + PartialEq + std::fmt::Debug>(value: &T) {
        let mut enc = BinaryEncoder::new();
        value.encode_body(&mut enc);
        let bytes = enc.into_bytes();
        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(&T::decode_body(&mut dec).unwrap(), value);
        assert_eq!(dec.remaining(), 0);
    }

    #[test]
    fn test_create_session_round_trip() {
        round_trip(&CreateSessionRequest {
            header: RequestHeader::new(NodeId::null(), 3),
            client_description: ApplicationDescription::client("urn:client", "client"),
            server_uri: None,
            endpoint_url: Some("opc.tcp://h:4840".into()),
            session_name: Some("session-1".into()),
            client_nonce: Some(vec![7u8; 32]),
            client_certificate: None,
            requested_session_timeout: 60_000.0,
            max_response_message_size: 0,
        });
        round_trip(&CreateSessionResponse {
            header: ResponseHeader::good(3),
            session_id: NodeId::numeric(12_345),
            authentication_token: NodeId::Opaque {
                namespace: 0,
                id: vec![1, 2, 3, 4, 5],
            },
            revised_session_timeout: 30_000.0,
            server_nonce: Some(vec![9u8; 32]),
            server_certificate: None,
            server_endpoints: Vec::new(),
            server_software_certificates: Vec::new(),
            server_signature: SignatureData::default(),
            max_request_message_size: 0,
        });
    }

    #[test]
    fn test_activate_session_round_trip() {
        round_trip(&ActivateSessionRequest {
            header: RequestHeader::new(NodeId::numeric(99), 4),
            client_signature: SignatureData::default(),
            client_software_certificates: Vec::new(),
            locale_ids: vec!["en".into()],
            user_identity_token: UserIdentityToken::UserName {
                policy_id: Some("user".into()),
                user_name: "operator".into(),
                password: b"secret".to_vec(),
                encryption_algorithm: None,
            },
            user_token_signature: SignatureData::default(),
        });
    }

    #[test]
    fn test_close_session_round_trip() {
        round_trip(&CloseSessionRequest {
            header: RequestHeader::new(NodeId::numeric(99), 5),
            delete_subscriptions: true,
        });
        round_trip(&CloseSessionResponse {
            header: ResponseHeader::good(5),
        });
    }
}
