//! Supporting wire types shared by the service messages

use crate::type_ids::{
    ANONYMOUS_IDENTITY_TOKEN, USERNAME_IDENTITY_TOKEN, X509_IDENTITY_TOKEN,
};
use opcua_codec::{BinaryDecoder, BinaryEncoder};
use opcua_core::{NodeId, OpcUaError, OpcUaResult, StatusCode};
use opcua_security::MessageSecurityMode;

/// Encode the empty additional header (null type id + no body)
pub fn encode_additional_header(encoder: &mut BinaryEncoder) {
    encoder.encode_node_id(&NodeId::null());
    encoder.encode_u8(0x00);
}

/// Decode and discard an additional header
pub fn decode_additional_header(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<()> {
    let _type_id = decoder.decode_node_id()?;
    let encoding = decoder.decode_u8()?;
    if encoding == 0x01 {
        // unexpected body, consume and discard it
        let _ = decoder.decode_byte_string()?;
    }
    Ok(())
}

/// Encode an extension object with a byte-string body
pub fn encode_extension_object(encoder: &mut BinaryEncoder, type_id: u16, body: &[u8]) {
    encoder.encode_node_id(&NodeId::numeric(type_id));
    encoder.encode_u8(0x01);
    encoder.encode_byte_string(Some(body));
}

/// Encode an absent extension object
pub fn encode_null_extension_object(encoder: &mut BinaryEncoder) {
    encoder.encode_node_id(&NodeId::null());
    encoder.encode_u8(0x00);
}

/// Decode an extension object: type id plus optional byte-string body
pub fn decode_extension_object(
    decoder: &mut BinaryDecoder<'_>,
) -> OpcUaResult<(u16, Option<Vec<u8>>)> {
    let type_id = match decoder.decode_node_id()? {
        NodeId::Numeric { namespace: 0, id } => id,
        other => {
            return Err(OpcUaError::Decode(format!(
                "Extension object type id must be standard-namespace numeric, got {}",
                other
            )))
        }
    };
    let encoding = decoder.decode_u8()?;
    let body = match encoding {
        0x00 => None,
        0x01 => decoder.decode_byte_string()?,
        other => {
            return Err(OpcUaError::Decode(format!(
                "Unsupported extension object encoding 0x{:02X}",
                other
            )))
        }
    };
    Ok((type_id, body))
}

/// Minimal diagnostic information, carried as free text
///
/// The full recursive diagnostic layout is not modeled; a single mask byte
/// says whether a text entry follows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticInfo {
    pub text: Option<String>,
}

impl DiagnosticInfo {
    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        match &self.text {
            None => encoder.encode_u8(0x00),
            Some(text) => {
                encoder.encode_u8(0x01);
                encoder.encode_string(Some(text));
            }
        }
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let mask = decoder.decode_u8()?;
        let text = if mask == 0x00 {
            None
        } else {
            decoder.decode_string()?
        };
        Ok(Self { text })
    }

    /// Decode a count-prefixed collection of diagnostic entries
    pub fn decode_array(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Vec<Self>> {
        let count = decoder.decode_array_len()?;
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push(Self::decode(decoder)?);
        }
        Ok(entries)
    }

    /// Encode a count-prefixed collection of diagnostic entries
    pub fn encode_array(entries: &[Self], encoder: &mut BinaryEncoder) {
        encoder.encode_array_len(entries.len());
        for entry in entries {
            entry.encode(encoder);
        }
    }
}

/// Localized text: optional locale plus optional text, selected by mask
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedText {
    pub locale: Option<String>,
    pub text: Option<String>,
}

impl LocalizedText {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            locale: None,
            text: Some(text.into()),
        }
    }

    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        let mut mask = 0u8;
        if self.locale.is_some() {
            mask |= 0x01;
        }
        if self.text.is_some() {
            mask |= 0x02;
        }
        encoder.encode_u8(mask);
        if let Some(locale) = &self.locale {
            encoder.encode_string(Some(locale));
        }
        if let Some(text) = &self.text {
            encoder.encode_string(Some(text));
        }
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let mask = decoder.decode_u8()?;
        let locale = if mask & 0x01 != 0 {
            decoder.decode_string()?
        } else {
            None
        };
        let text = if mask & 0x02 != 0 {
            decoder.decode_string()?
        } else {
            None
        };
        Ok(Self { locale, text })
    }
}

/// Qualified name: namespace index plus name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualifiedName {
    pub namespace: u16,
    pub name: Option<String>,
}

impl QualifiedName {
    pub fn new(namespace: u16, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: Some(name.into()),
        }
    }

    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_u16(self.namespace);
        encoder.encode_string(self.name.as_deref());
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            namespace: decoder.decode_u16()?,
            name: decoder.decode_string()?,
        })
    }
}

/// Application description advertised during discovery and session setup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationDescription {
    pub application_uri: Option<String>,
    pub product_uri: Option<String>,
    pub application_name: LocalizedText,
    /// 0 = server, 1 = client, 2 = both, 3 = discovery server
    pub application_type: u32,
    pub gateway_server_uri: Option<String>,
    pub discovery_profile_uri: Option<String>,
    pub discovery_urls: Vec<String>,
}

impl ApplicationDescription {
    /// Description for this client application
    pub fn client(application_uri: &str, application_name: &str) -> Self {
        Self {
            application_uri: Some(application_uri.to_string()),
            product_uri: None,
            application_name: LocalizedText::from_text(application_name),
            application_type: 1,
            gateway_server_uri: None,
            discovery_profile_uri: None,
            discovery_urls: Vec::new(),
        }
    }

    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_string(self.application_uri.as_deref());
        encoder.encode_string(self.product_uri.as_deref());
        self.application_name.encode(encoder);
        encoder.encode_u32(self.application_type);
        encoder.encode_string(self.gateway_server_uri.as_deref());
        encoder.encode_string(self.discovery_profile_uri.as_deref());
        encode_string_array(encoder, &self.discovery_urls);
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            application_uri: decoder.decode_string()?,
            product_uri: decoder.decode_string()?,
            application_name: LocalizedText::decode(decoder)?,
            application_type: decoder.decode_u32()?,
            gateway_server_uri: decoder.decode_string()?,
            discovery_profile_uri: decoder.decode_string()?,
            discovery_urls: decode_string_array(decoder)?,
        })
    }
}

/// User token types an endpoint's policies can demand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserTokenType {
    Anonymous = 0,
    UserName = 1,
    Certificate = 2,
    IssuedToken = 3,
}

impl UserTokenType {
    pub fn from_id(id: u32) -> OpcUaResult<Self> {
        match id {
            0 => Ok(UserTokenType::Anonymous),
            1 => Ok(UserTokenType::UserName),
            2 => Ok(UserTokenType::Certificate),
            3 => Ok(UserTokenType::IssuedToken),
            _ => Err(OpcUaError::Decode(format!("Invalid user token type: {}", id))),
        }
    }

    pub fn id(&self) -> u32 {
        *self as u32
    }
}

/// A user identity token policy advertised by an endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct UserTokenPolicy {
    pub policy_id: Option<String>,
    pub token_type: UserTokenType,
    pub issued_token_type: Option<String>,
    pub issuer_endpoint_url: Option<String>,
    pub security_policy_uri: Option<String>,
}

impl UserTokenPolicy {
    pub fn anonymous(policy_id: &str) -> Self {
        Self {
            policy_id: Some(policy_id.to_string()),
            token_type: UserTokenType::Anonymous,
            issued_token_type: None,
            issuer_endpoint_url: None,
            security_policy_uri: None,
        }
    }

    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_string(self.policy_id.as_deref());
        encoder.encode_u32(self.token_type.id());
        encoder.encode_string(self.issued_token_type.as_deref());
        encoder.encode_string(self.issuer_endpoint_url.as_deref());
        encoder.encode_string(self.security_policy_uri.as_deref());
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            policy_id: decoder.decode_string()?,
            token_type: UserTokenType::from_id(decoder.decode_u32()?)?,
            issued_token_type: decoder.decode_string()?,
            issuer_endpoint_url: decoder.decode_string()?,
            security_policy_uri: decoder.decode_string()?,
        })
    }
}

/// Endpoint advertised by the server
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDescription {
    pub endpoint_url: Option<String>,
    pub server: ApplicationDescription,
    pub server_certificate: Option<Vec<u8>>,
    pub security_mode: MessageSecurityMode,
    pub security_policy_uri: Option<String>,
    pub user_identity_tokens: Vec<UserTokenPolicy>,
    pub transport_profile_uri: Option<String>,
    pub security_level: u8,
}

impl EndpointDescription {
    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_string(self.endpoint_url.as_deref());
        self.server.encode(encoder);
        encoder.encode_byte_string(self.server_certificate.as_deref());
        encoder.encode_u32(self.security_mode.id());
        encoder.encode_string(self.security_policy_uri.as_deref());
        encoder.encode_array_len(self.user_identity_tokens.len());
        for policy in &self.user_identity_tokens {
            policy.encode(encoder);
        }
        encoder.encode_string(self.transport_profile_uri.as_deref());
        encoder.encode_u8(self.security_level);
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let endpoint_url = decoder.decode_string()?;
        let server = ApplicationDescription::decode(decoder)?;
        let server_certificate = decoder.decode_byte_string()?;
        let security_mode = MessageSecurityMode::from_id(decoder.decode_u32()?)?;
        let security_policy_uri = decoder.decode_string()?;
        let count = decoder.decode_array_len()?;
        let mut user_identity_tokens = Vec::with_capacity(count);
        for _ in 0..count {
            user_identity_tokens.push(UserTokenPolicy::decode(decoder)?);
        }
        Ok(Self {
            endpoint_url,
            server,
            server_certificate,
            security_mode,
            security_policy_uri,
            user_identity_tokens,
            transport_profile_uri: decoder.decode_string()?,
            security_level: decoder.decode_u8()?,
        })
    }

    /// Decode a count-prefixed collection of endpoints
    pub fn decode_array(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Vec<Self>> {
        let count = decoder.decode_array_len()?;
        let mut endpoints = Vec::with_capacity(count);
        for _ in 0..count {
            endpoints.push(Self::decode(decoder)?);
        }
        Ok(endpoints)
    }

    /// Encode a count-prefixed collection of endpoints
    pub fn encode_array(endpoints: &[Self], encoder: &mut BinaryEncoder) {
        encoder.encode_array_len(endpoints.len());
        for endpoint in endpoints {
            endpoint.encode(encoder);
        }
    }
}

/// User identity token sent in ActivateSession
#[derive(Debug, Clone, PartialEq)]
pub enum UserIdentityToken {
    Anonymous {
        policy_id: Option<String>,
    },
    UserName {
        policy_id: Option<String>,
        user_name: String,
        password: Vec<u8>,
        encryption_algorithm: Option<String>,
    },
    X509 {
        policy_id: Option<String>,
        certificate_data: Vec<u8>,
    },
}

impl UserIdentityToken {
    /// Token type this identity satisfies
    pub fn token_type(&self) -> UserTokenType {
        match self {
            UserIdentityToken::Anonymous { .. } => UserTokenType::Anonymous,
            UserIdentityToken::UserName { .. } => UserTokenType::UserName,
            UserIdentityToken::X509 { .. } => UserTokenType::Certificate,
        }
    }

    /// Encode as an extension object
    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        let mut body = BinaryEncoder::new();
        let type_id = match self {
            UserIdentityToken::Anonymous { policy_id } => {
                body.encode_string(policy_id.as_deref());
                ANONYMOUS_IDENTITY_TOKEN
            }
            UserIdentityToken::UserName {
                policy_id,
                user_name,
                password,
                encryption_algorithm,
            } => {
                body.encode_string(policy_id.as_deref());
                body.encode_string(Some(user_name));
                body.encode_byte_string(Some(password));
                body.encode_string(encryption_algorithm.as_deref());
                USERNAME_IDENTITY_TOKEN
            }
            UserIdentityToken::X509 {
                policy_id,
                certificate_data,
            } => {
                body.encode_string(policy_id.as_deref());
                body.encode_byte_string(Some(certificate_data));
                X509_IDENTITY_TOKEN
            }
        };
        encode_extension_object(encoder, type_id, body.as_bytes());
    }

    /// Decode from an extension object
    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let (type_id, body) = decode_extension_object(decoder)?;
        let body = body.unwrap_or_default();
        let mut body = BinaryDecoder::new(&body);
        match type_id {
            ANONYMOUS_IDENTITY_TOKEN => Ok(UserIdentityToken::Anonymous {
                policy_id: body.decode_string()?,
            }),
            USERNAME_IDENTITY_TOKEN => Ok(UserIdentityToken::UserName {
                policy_id: body.decode_string()?,
                user_name: body.decode_string()?.unwrap_or_default(),
                password: body.decode_byte_string()?.unwrap_or_default(),
                encryption_algorithm: body.decode_string()?,
            }),
            X509_IDENTITY_TOKEN => Ok(UserIdentityToken::X509 {
                policy_id: body.decode_string()?,
                certificate_data: body.decode_byte_string()?.unwrap_or_default(),
            }),
            other => Err(OpcUaError::Decode(format!(
                "Unknown user identity token type id {}",
                other
            ))),
        }
    }
}

/// Signature over a nonce/certificate, exchanged during session activation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignatureData {
    pub algorithm: Option<String>,
    pub signature: Option<Vec<u8>>,
}

impl SignatureData {
    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_string(self.algorithm.as_deref());
        encoder.encode_byte_string(self.signature.as_deref());
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            algorithm: decoder.decode_string()?,
            signature: decoder.decode_byte_string()?,
        })
    }
}

/// Software certificate entry in CreateSession responses
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignedSoftwareCertificate {
    pub certificate_data: Option<Vec<u8>>,
    pub signature: Option<Vec<u8>>,
}

impl SignedSoftwareCertificate {
    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_byte_string(self.certificate_data.as_deref());
        encoder.encode_byte_string(self.signature.as_deref());
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            certificate_data: decoder.decode_byte_string()?,
            signature: decoder.decode_byte_string()?,
        })
    }
}

/// Scalar value carried in reads, writes and data-change notifications
///
/// Only the scalar subset the client exchanges is modeled; an unknown
/// variant tag is a decode failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Boolean(bool),
    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(Option<String>),
    DateTime(i64),
    ByteString(Option<Vec<u8>>),
    NodeId(NodeId),
    StatusCode(StatusCode),
}

impl Variant {
    fn tag(&self) -> u8 {
        match self {
            Variant::Boolean(_) => 1,
            Variant::SByte(_) => 2,
            Variant::Byte(_) => 3,
            Variant::Int16(_) => 4,
            Variant::UInt16(_) => 5,
            Variant::Int32(_) => 6,
            Variant::UInt32(_) => 7,
            Variant::Int64(_) => 8,
            Variant::UInt64(_) => 9,
            Variant::Float(_) => 10,
            Variant::Double(_) => 11,
            Variant::String(_) => 12,
            Variant::DateTime(_) => 13,
            Variant::ByteString(_) => 15,
            Variant::NodeId(_) => 17,
            Variant::StatusCode(_) => 19,
        }
    }

    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_u8(self.tag());
        match self {
            Variant::Boolean(v) => encoder.encode_bool(*v),
            Variant::SByte(v) => encoder.encode_u8(*v as u8),
            Variant::Byte(v) => encoder.encode_u8(*v),
            Variant::Int16(v) => encoder.encode_i16(*v),
            Variant::UInt16(v) => encoder.encode_u16(*v),
            Variant::Int32(v) => encoder.encode_i32(*v),
            Variant::UInt32(v) => encoder.encode_u32(*v),
            Variant::Int64(v) => encoder.encode_i64(*v),
            Variant::UInt64(v) => encoder.encode_u64(*v),
            Variant::Float(v) => encoder.encode_f32(*v),
            Variant::Double(v) => encoder.encode_f64(*v),
            Variant::String(v) => encoder.encode_string(v.as_deref()),
            Variant::DateTime(v) => encoder.encode_i64(*v),
            Variant::ByteString(v) => encoder.encode_byte_string(v.as_deref()),
            Variant::NodeId(v) => encoder.encode_node_id(v),
            Variant::StatusCode(v) => encoder.encode_status(*v),
        }
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let tag = decoder.decode_u8()?;
        let value = match tag {
            1 => Variant::Boolean(decoder.decode_bool()?),
            2 => Variant::SByte(decoder.decode_u8()? as i8),
            3 => Variant::Byte(decoder.decode_u8()?),
            4 => Variant::Int16(decoder.decode_i16()?),
            5 => Variant::UInt16(decoder.decode_u16()?),
            6 => Variant::Int32(decoder.decode_i32()?),
            7 => Variant::UInt32(decoder.decode_u32()?),
            8 => Variant::Int64(decoder.decode_i64()?),
            9 => Variant::UInt64(decoder.decode_u64()?),
            10 => Variant::Float(decoder.decode_f32()?),
            11 => Variant::Double(decoder.decode_f64()?),
            12 => Variant::String(decoder.decode_string()?),
            13 => Variant::DateTime(decoder.decode_i64()?),
            15 => Variant::ByteString(decoder.decode_byte_string()?),
            17 => Variant::NodeId(decoder.decode_node_id()?),
            19 => Variant::StatusCode(decoder.decode_status()?),
            other => {
                return Err(OpcUaError::Decode(format!(
                    "Unsupported variant tag {}",
                    other
                )))
            }
        };
        Ok(value)
    }
}

/// A value with its status and timestamps, selected by an encoding mask
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataValue {
    pub value: Option<Variant>,
    pub status: Option<StatusCode>,
    pub source_timestamp: Option<i64>,
    pub server_timestamp: Option<i64>,
}

impl DataValue {
    pub fn from_value(value: Variant) -> Self {
        Self {
            value: Some(value),
            status: None,
            source_timestamp: None,
            server_timestamp: None,
        }
    }

    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        let mut mask = 0u8;
        if self.value.is_some() {
            mask |= 0x01;
        }
        if self.status.is_some() {
            mask |= 0x02;
        }
        if self.source_timestamp.is_some() {
            mask |= 0x04;
        }
        if self.server_timestamp.is_some() {
            mask |= 0x08;
        }
        encoder.encode_u8(mask);
        if let Some(value) = &self.value {
            value.encode(encoder);
        }
        if let Some(status) = self.status {
            encoder.encode_status(status);
        }
        if let Some(ts) = self.source_timestamp {
            encoder.encode_i64(ts);
        }
        if let Some(ts) = self.server_timestamp {
            encoder.encode_i64(ts);
        }
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let mask = decoder.decode_u8()?;
        let value = if mask & 0x01 != 0 {
            Some(Variant::decode(decoder)?)
        } else {
            None
        };
        let status = if mask & 0x02 != 0 {
            Some(decoder.decode_status()?)
        } else {
            None
        };
        let source_timestamp = if mask & 0x04 != 0 {
            Some(decoder.decode_i64()?)
        } else {
            None
        };
        let server_timestamp = if mask & 0x08 != 0 {
            Some(decoder.decode_i64()?)
        } else {
            None
        };
        Ok(Self {
            value,
            status,
            source_timestamp,
            server_timestamp,
        })
    }
}

/// Encode a count-prefixed collection of strings
pub fn encode_string_array(encoder: &mut BinaryEncoder, strings: &[String]) {
    encoder.encode_array_len(strings.len());
    for s in strings {
        encoder.encode_string(Some(s));
    }
}

/// Decode a count-prefixed collection of strings
pub fn decode_string_array(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Vec<String>> {
    let count = decoder.decode_array_len()?;
    let mut strings = Vec::with_capacity(count);
    for _ in 0..count {
        strings.push(decoder.decode_string()?.unwrap_or_default());
    }
    Ok(strings)
}

/// Encode a count-prefixed collection of status codes
pub fn encode_status_array(encoder: &mut BinaryEncoder, codes: &[StatusCode]) {
    encoder.encode_array_len(codes.len());
    for code in codes {
        encoder.encode_status(*code);
    }
}

/// Decode a count-prefixed collection of status codes
pub fn decode_status_array(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Vec<StatusCode>> {
    let count = decoder.decode_array_len()?;
    let mut codes = Vec::with_capacity(count);
    for _ in 0..count {
        codes.push(decoder.decode_status()?);
    }
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T, E, D>(value: &T, encode: E, decode: D) -> T
    where
        E: Fn(&T, &mut BinaryEncoder),
        D: Fn(&mut BinaryDecoder<'_>) -> OpcUaResult<T>,
    {
        let mut enc = BinaryEncoder::new();
        encode(value, &mut enc);
        let bytes = enc.into_bytes();
        let mut dec = BinaryDecoder::new(&bytes);
        let decoded = decode(&mut dec).unwrap();
        assert_eq!(dec.remaining(), 0, "decoder left trailing bytes");
        decoded
    }

    #[test]
    fn test_localized_text_round_trip() {
        for text in [
            LocalizedText::default(),
            LocalizedText::from_text("Motor"),
            LocalizedText {
                locale: Some("en".into()),
                text: Some("Motor".into()),
            },
        ] {
            let decoded = round_trip(&text, LocalizedText::encode, LocalizedText::decode);
            assert_eq!(decoded, text);
        }
    }

    #[test]
    fn test_endpoint_description_round_trip() {
        let endpoint = EndpointDescription {
            endpoint_url: Some("opc.tcp://host:4840".into()),
            server: ApplicationDescription::client("urn:server", "Server"),
            server_certificate: Some(vec![1, 2, 3]),
            security_mode: MessageSecurityMode::Sign,
            security_policy_uri: Some(
                "http://opcfoundation.org/UA/SecurityPolicy#Basic256Sha256".into(),
            ),
            user_identity_tokens: vec![
                UserTokenPolicy::anonymous("anon"),
                UserTokenPolicy {
                    policy_id: Some("user".into()),
                    token_type: UserTokenType::UserName,
                    issued_token_type: None,
                    issuer_endpoint_url: None,
                    security_policy_uri: None,
                },
            ],
            transport_profile_uri: None,
            security_level: 3,
        };
        let decoded = round_trip(
            &endpoint,
            EndpointDescription::encode,
            EndpointDescription::decode,
        );
        assert_eq!(decoded, endpoint);
    }

    #[test]
    fn test_identity_token_round_trip() {
        let tokens = vec![
            UserIdentityToken::Anonymous {
                policy_id: Some("anon".into()),
            },
            UserIdentityToken::UserName {
                policy_id: Some("user".into()),
                user_name: "operator".into(),
                password: b"secret".to_vec(),
                encryption_algorithm: None,
            },
            UserIdentityToken::X509 {
                policy_id: Some("cert".into()),
                certificate_data: vec![0x30, 0x82],
            },
        ];
        for token in tokens {
            let decoded = round_trip(&token, UserIdentityToken::encode, UserIdentityToken::decode);
            assert_eq!(decoded, token);
        }
    }

    #[test]
    fn test_variant_round_trip() {
        let variants = vec![
            Variant::Boolean(true),
            Variant::Int32(-42),
            Variant::Double(3.25),
            Variant::String(Some("hello".into())),
            Variant::String(None),
            Variant::ByteString(Some(vec![1, 2, 3])),
            Variant::NodeId(NodeId::numeric(2258)),
            Variant::StatusCode(StatusCode::BadNodeIdUnknown),
        ];
        for variant in variants {
            let decoded = round_trip(&variant, Variant::encode, Variant::decode);
            assert_eq!(decoded, variant);
        }
    }

    #[test]
    fn test_data_value_round_trip() {
        let values = vec![
            DataValue::default(),
            DataValue::from_value(Variant::UInt32(99)),
            DataValue {
                value: Some(Variant::Double(1.0)),
                status: Some(StatusCode::Good),
                source_timestamp: Some(123_456_789),
                server_timestamp: Some(123_456_790),
            },
        ];
        for value in values {
            let decoded = round_trip(&value, DataValue::encode, DataValue::decode);
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn test_unknown_variant_tag_fails() {
        let bytes = [200u8, 0, 0];
        let mut dec = BinaryDecoder::new(&bytes);
        assert!(Variant::decode(&mut dec).is_err());
    }
}
