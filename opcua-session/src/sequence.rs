//! Sequence header codec
//!
//! `MSG`, `OPN` and `CLO` frames carry a 16-byte little-endian header
//! right after the frame header: secure channel id, token id, sequence
//! number and request id. The request id is the correlation key; the
//! sequence number increases monotonically per secure channel per
//! direction.

use opcua_codec::{BinaryDecoder, BinaryEncoder};
use opcua_core::OpcUaResult;

/// Length of the sequence header
pub const SEQUENCE_HEADER_LENGTH: usize = 16;

/// Sequence header present on secure-channel frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceHeader {
    pub secure_channel_id: u32,
    pub token_id: u32,
    pub sequence_number: u32,
    pub request_id: u32,
}

impl SequenceHeader {
    /// Create a new sequence header
    pub fn new(secure_channel_id: u32, token_id: u32, sequence_number: u32, request_id: u32) -> Self {
        Self {
            secure_channel_id,
            token_id,
            sequence_number,
            request_id,
        }
    }

    /// Append the header to an encoder
    pub fn encode(&self, encoder: &mut BinaryEncoder) {
        encoder.encode_u32(self.secure_channel_id);
        encoder.encode_u32(self.token_id);
        encoder.encode_u32(self.sequence_number);
        encoder.encode_u32(self.request_id);
    }

    /// Decode the header from a cursor
    pub fn decode(decoder: &mut BinaryDecoder<'_>) -> OpcUaResult<Self> {
        Ok(Self {
            secure_channel_id: decoder.decode_u32()?,
            token_id: decoder.decode_u32()?,
            sequence_number: decoder.decode_u32()?,
            request_id: decoder.decode_u32()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let header = SequenceHeader::new(7, 3, 41, 12);
        let mut enc = BinaryEncoder::new();
        header.encode(&mut enc);
        let bytes = enc.into_bytes();
        assert_eq!(bytes.len(), SEQUENCE_HEADER_LENGTH);

        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(SequenceHeader::decode(&mut dec).unwrap(), header);
    }
}
