//! OPC UA binary decoder
//!
//! Cursor-based decoder over a byte slice. Every read is bounds-checked
//! and advances the shared cursor by exactly the number of bytes the value
//! occupies on the wire, so composite decoders can chain reads without
//! re-deriving offsets.

use crate::encoder::NULL_SENTINEL;
use opcua_core::node_id::{MASK_EXPANDED, MASK_GUID, MASK_NUMERIC, MASK_OPAQUE, MASK_STRING};
use opcua_core::{NodeId, OpcUaError, OpcUaResult, StatusCode};

/// Binary decoder for OPC UA wire values
pub struct BinaryDecoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryDecoder<'a> {
    /// Create a decoder over a byte slice
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current cursor position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the cursor
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Skip `count` bytes
    pub fn skip(&mut self, count: usize) -> OpcUaResult<()> {
        self.take(count)?;
        Ok(())
    }

    fn take(&mut self, count: usize) -> OpcUaResult<&'a [u8]> {
        if self.remaining() < count {
            return Err(OpcUaError::Decode(format!(
                "Unexpected end of buffer: need {} bytes at offset {}, have {}",
                count,
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    /// Decode a u8
    pub fn decode_u8(&mut self) -> OpcUaResult<u8> {
        Ok(self.take(1)?[0])
    }

    /// Decode a u16 (little-endian)
    pub fn decode_u16(&mut self) -> OpcUaResult<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Decode a u32 (little-endian)
    pub fn decode_u32(&mut self) -> OpcUaResult<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Decode a u64 (little-endian)
    pub fn decode_u64(&mut self) -> OpcUaResult<u64> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Decode an i16 (little-endian)
    pub fn decode_i16(&mut self) -> OpcUaResult<i16> {
        Ok(self.decode_u16()? as i16)
    }

    /// Decode an i32 (little-endian)
    pub fn decode_i32(&mut self) -> OpcUaResult<i32> {
        Ok(self.decode_u32()? as i32)
    }

    /// Decode an i64 (little-endian)
    pub fn decode_i64(&mut self) -> OpcUaResult<i64> {
        Ok(self.decode_u64()? as i64)
    }

    /// Decode an f32 (IEEE 754 little-endian)
    pub fn decode_f32(&mut self) -> OpcUaResult<f32> {
        Ok(f32::from_bits(self.decode_u32()?))
    }

    /// Decode an f64 (IEEE 754 little-endian)
    pub fn decode_f64(&mut self) -> OpcUaResult<f64> {
        Ok(f64::from_bits(self.decode_u64()?))
    }

    /// Decode a bool (0x01 = true, anything else false)
    pub fn decode_bool(&mut self) -> OpcUaResult<bool> {
        Ok(self.decode_u8()? == 0x01)
    }

    /// Decode an optional UTF-8 string
    ///
    /// The null sentinel decodes to `None`; a zero length prefix decodes to
    /// `Some("")` should a server ever emit one.
    pub fn decode_string(&mut self) -> OpcUaResult<Option<String>> {
        let len = self.decode_u32()?;
        if len == NULL_SENTINEL {
            return Ok(None);
        }
        let bytes = self.take(len as usize)?;
        let s = std::str::from_utf8(bytes)
            .map_err(|e| OpcUaError::Decode(format!("Invalid UTF-8 in string: {}", e)))?;
        Ok(Some(s.to_string()))
    }

    /// Decode an optional byte string
    pub fn decode_byte_string(&mut self) -> OpcUaResult<Option<Vec<u8>>> {
        let len = self.decode_u32()?;
        if len == NULL_SENTINEL {
            return Ok(None);
        }
        Ok(Some(self.take(len as usize)?.to_vec()))
    }

    /// Decode a collection count prefix
    ///
    /// The null sentinel means an absent collection: zero elements and no
    /// further bytes belong to it.
    pub fn decode_array_len(&mut self) -> OpcUaResult<usize> {
        let len = self.decode_u32()?;
        if len == NULL_SENTINEL {
            Ok(0)
        } else {
            Ok(len as usize)
        }
    }

    /// Decode a status code; unknown raw values are a decode failure
    pub fn decode_status(&mut self) -> OpcUaResult<StatusCode> {
        let raw = self.decode_u32()?;
        StatusCode::from_u32(raw)
            .ok_or_else(|| OpcUaError::Decode(format!("Unrecognized status code 0x{:08X}", raw)))
    }

    /// Decode a node id, advancing by exactly the variant's length
    pub fn decode_node_id(&mut self) -> OpcUaResult<NodeId> {
        let mask = self.decode_u8()?;
        let node_id = match mask {
            MASK_NUMERIC => NodeId::Numeric {
                namespace: self.decode_u8()?,
                id: self.decode_u16()?,
            },
            MASK_STRING => {
                let namespace = self.decode_u16()?;
                let id = self.decode_inline_string()?;
                NodeId::String { namespace, id }
            }
            MASK_GUID => {
                let namespace = self.decode_u16()?;
                let mut id = [0u8; 16];
                id.copy_from_slice(self.take(16)?);
                NodeId::Guid { namespace, id }
            }
            MASK_OPAQUE => {
                let namespace = self.decode_u16()?;
                let len = self.decode_u32()? as usize;
                NodeId::Opaque {
                    namespace,
                    id: self.take(len)?.to_vec(),
                }
            }
            m if m == MASK_EXPANDED => NodeId::ExpandedCompact {
                id: self.decode_u8()?,
                server_index: self.decode_u32()?,
            },
            m if m == (MASK_EXPANDED | MASK_NUMERIC) => NodeId::ExpandedNumeric {
                namespace: self.decode_u8()?,
                id: self.decode_u16()?,
                server_index: self.decode_u32()?,
            },
            m if m == (MASK_EXPANDED | MASK_STRING) => {
                let namespace = self.decode_u16()?;
                let id = self.decode_inline_string()?;
                NodeId::ExpandedString {
                    namespace,
                    id,
                    server_index: self.decode_u32()?,
                }
            }
            m if m == (MASK_EXPANDED | MASK_OPAQUE) => {
                let namespace = self.decode_u16()?;
                let len = self.decode_u32()? as usize;
                let id = self.take(len)?.to_vec();
                NodeId::ExpandedOpaque {
                    namespace,
                    id,
                    server_index: self.decode_u32()?,
                }
            }
            other => return Err(OpcUaError::MalformedNodeId(other)),
        };
        Ok(node_id)
    }

    // String identifiers inside a node id are never the null sentinel.
    fn decode_inline_string(&mut self) -> OpcUaResult<String> {
        let len = self.decode_u32()? as usize;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| OpcUaError::Decode(format!("Invalid UTF-8 in node id: {}", e)))
    }

    /// Take all remaining bytes
    pub fn decode_remaining(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::BinaryEncoder;

    #[test]
    fn test_primitive_round_trip() {
        let mut enc = BinaryEncoder::new();
        enc.encode_u16(0xBEEF);
        enc.encode_i32(-7);
        enc.encode_f64(1.5);
        enc.encode_bool(true);
        let bytes = enc.into_bytes();

        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(dec.decode_u16().unwrap(), 0xBEEF);
        assert_eq!(dec.decode_i32().unwrap(), -7);
        assert_eq!(dec.decode_f64().unwrap(), 1.5);
        assert!(dec.decode_bool().unwrap());
        assert_eq!(dec.remaining(), 0);
    }

    #[test]
    fn test_null_string_decodes_to_none() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF];
        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(dec.decode_string().unwrap(), None);
    }

    #[test]
    fn test_zero_length_string_decodes_to_empty() {
        let bytes = [0x00, 0x00, 0x00, 0x00];
        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(dec.decode_string().unwrap(), Some(String::new()));
    }

    #[test]
    fn test_absent_collection_consumes_no_elements() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0xAA];
        let mut dec = BinaryDecoder::new(&bytes);
        assert_eq!(dec.decode_array_len().unwrap(), 0);
        assert_eq!(dec.remaining(), 1);
    }

    #[test]
    fn test_unknown_status_is_decode_failure() {
        let bytes = 0x1234_5678u32.to_le_bytes();
        let mut dec = BinaryDecoder::new(&bytes);
        assert!(dec.decode_status().is_err());
    }

    #[test]
    fn test_node_id_variants_round_trip_with_exact_cursor() {
        let ids = vec![
            NodeId::Numeric { namespace: 1, id: 2045 },
            NodeId::String {
                namespace: 3,
                id: "Motor.Speed".into(),
            },
            NodeId::Guid {
                namespace: 0,
                id: [0xAB; 16],
            },
            NodeId::Opaque {
                namespace: 7,
                id: vec![1, 2, 3, 4],
            },
            NodeId::ExpandedCompact {
                id: 42,
                server_index: 2,
            },
            NodeId::ExpandedNumeric {
                namespace: 1,
                id: 600,
                server_index: 9,
            },
            NodeId::ExpandedString {
                namespace: 4,
                id: "remote".into(),
                server_index: 1,
            },
            NodeId::ExpandedOpaque {
                namespace: 5,
                id: vec![9, 9],
                server_index: 3,
            },
        ];

        for id in ids {
            let mut enc = BinaryEncoder::new();
            enc.encode_node_id(&id);
            // trailing byte proves the decoder stops at the variant's length
            enc.encode_u8(0x5A);
            let bytes = enc.into_bytes();

            let mut dec = BinaryDecoder::new(&bytes);
            let decoded = dec.decode_node_id().unwrap();
            assert_eq!(decoded, id);
            assert_eq!(dec.position(), id.encoded_len());
            assert_eq!(dec.decode_u8().unwrap(), 0x5A);
        }
    }

    #[test]
    fn test_unrecognized_mask_is_malformed() {
        let bytes = [0x7F, 0x00];
        let mut dec = BinaryDecoder::new(&bytes);
        match dec.decode_node_id() {
            Err(OpcUaError::MalformedNodeId(0x7F)) => {}
            other => panic!("expected MalformedNodeId, got {:?}", other),
        }
    }
}
