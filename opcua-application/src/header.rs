//! Common request/response headers
//!
//! Every service request carries a `RequestHeader` and every response a
//! `ResponseHeader`. They are plain structs embedded by value in each
//! message type; the encode/decode functions take them as explicit
//! parameters rather than sharing state through a base class.

use crate::types::{decode_additional_header, encode_additional_header, DiagnosticInfo};
use opcua_codec::{BinaryDecoder, BinaryEncoder};
use opcua_core::{NodeId, OpcUaResult, StatusCode};
use std::time::{SystemTime, UNIX_EPOCH};

/// Offset between the protocol epoch (1601-01-01) and the Unix epoch,
/// in 100-nanosecond ticks
const EPOCH_OFFSET_TICKS: i64 = 116_444_736_000_000_000;

/// Current time as a protocol timestamp (100 ns ticks since 1601-01-01)
pub fn now_timestamp() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => EPOCH_OFFSET_TICKS + (elapsed.as_nanos() / 100) as i64,
        Err(_) => EPOCH_OFFSET_TICKS,
    }
}

/// Header carried by every service request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestHeader {
    /// Session authentication token; null before a session exists
    pub authentication_token: NodeId,
    pub timestamp: i64,
    pub request_handle: u32,
    pub return_diagnostics: u32,
    pub audit_entry_id: Option<String>,
    pub timeout_hint: u32,
}

impl RequestHeader {
    /// Create a header for the given handle with the current timestamp
    pub fn new(authentication_token: NodeId, request_handle: u32) -> Self {
        Self {
            authentication_token,
            timestamp: now_timestamp(),
            request_handle,
            return_diagnostics: 0,
            audit_entry_id: None,
            timeout_hint: 10_000,
        }
    }

    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_node_id(&self.authentication_token);
        encoder.encode_i64(self.timestamp);
        encoder.encode_u32(self.request_handle);
        encoder.encode_u32(self.return_diagnostics);
        encoder.encode_string(self.audit_entry_id.as_deref());
        encoder.encode_u32(self.timeout_hint);
        encode_additional_header(encoder);
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let header = Self {
            authentication_token: decoder.decode_node_id()?,
            timestamp: decoder.decode_i64()?,
            request_handle: decoder.decode_u32()?,
            return_diagnostics: decoder.decode_u32()?,
            audit_entry_id: decoder.decode_string()?,
            timeout_hint: decoder.decode_u32()?,
        };
        decode_additional_header(decoder)?;
        Ok(header)
    }
}

/// Header carried by every service response
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseHeader {
    pub timestamp: i64,
    pub request_handle: u32,
    /// Overall service outcome; per-operation results live in the body
    pub service_result: StatusCode,
    pub service_diagnostics: DiagnosticInfo,
    pub string_table: Vec<String>,
}

impl ResponseHeader {
    /// A Good header echoing the given handle (test and server-side use)
    pub fn good(request_handle: u32) -> Self {
        Self {
            timestamp: now_timestamp(),
            request_handle,
            service_result: StatusCode::Good,
            service_diagnostics: DiagnosticInfo::default(),
            string_table: Vec::new(),
        }
    }

    /// A header carrying a failure status for the given handle
    pub fn with_status(request_handle: u32, status: StatusCode) -> Self {
        Self {
            service_result: status,
            ..Self::good(request_handle)
        }
    }

    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_i64(self.timestamp);
        encoder.encode_u32(self.request_handle);
        encoder.encode_status(self.service_result);
        self.service_diagnostics.encode(encoder);
        encoder.encode_array_len(self.string_table.len());
        for entry in &self.string_table {
            encoder.encode_string(Some(entry));
        }
        encode_additional_header(encoder);
    }

    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        let timestamp = decoder.decode_i64()?;
        let request_handle = decoder.decode_u32()?;
        let service_result = decoder.decode_status()?;
        let service_diagnostics = DiagnosticInfo::decode(decoder)?;
        let count = decoder.decode_array_len()?;
        let mut string_table = Vec::with_capacity(count);
        for _ in 0..count {
            string_table.push(decoder.decode_string()?.unwrap_or_default());
        }
        decode_additional_header(decoder)?;
        Ok(Self {
            timestamp,
            request_handle,
            service_result,
            service_diagnostics,
            string_table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_header_round_trip() {
        let header = RequestHeader {
            authentication_token: NodeId::Opaque {
                namespace: 0,
                id: vec![1, 2, 3, 4],
            },
            timestamp: now_timestamp(),
            request_handle: 17,
            return_diagnostics: 0,
            audit_entry_id: None,
            timeout_hint: 5_000,
        };
        let mut enc = BinaryEncoder::new();
        header.encode(&mut enc);
        let bytes = enc.into_bytes();
        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(RequestHeader::decode(&mut dec).unwrap(), header);
        assert_eq!(dec.remaining(), 0);
    }

    #[test]
    fn test_response_header_round_trip() {
        let header = ResponseHeader::with_status(9, StatusCode::BadSessionIdInvalid);
        let mut enc = BinaryEncoder::new();
        header.encode(&mut enc);
        let bytes = enc.into_bytes();
        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(ResponseHeader::decode(&mut dec).unwrap(), header);
    }

    #[test]
    fn test_timestamp_is_past_protocol_epoch() {
        assert!(now_timestamp() > EPOCH_OFFSET_TICKS);
    }
}
