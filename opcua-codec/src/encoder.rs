//! OPC UA binary encoder
//!
//! All multi-byte values are little-endian. Strings and byte strings are
//! `u32` length-prefixed; the length `0xFFFF_FFFF` is the null sentinel for
//! an absent value. An empty string is encoded with the null sentinel as
//! well, so empty and absent are indistinguishable on the wire (observed
//! server-compatible behavior, kept until proven otherwise).

use opcua_core::{NodeId, StatusCode};

/// Length value denoting an absent string/byte string/collection
pub const NULL_SENTINEL: u32 = 0xFFFF_FFFF;

/// Binary encoder for OPC UA wire values
pub struct BinaryEncoder {
    buffer: Vec<u8>,
}

impl BinaryEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Create a new encoder with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Encode a u8
    pub fn encode_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Encode a u16 (little-endian)
    pub fn encode_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Encode a u32 (little-endian)
    pub fn encode_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Encode a u64 (little-endian)
    pub fn encode_u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Encode an i16 (little-endian)
    pub fn encode_i16(&mut self, value: i16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Encode an i32 (little-endian)
    pub fn encode_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Encode an i64 (little-endian)
    pub fn encode_i64(&mut self, value: i64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Encode an f32 (IEEE 754 little-endian)
    pub fn encode_f32(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Encode an f64 (IEEE 754 little-endian)
    pub fn encode_f64(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Encode a bool as a single byte (0x01 = true)
    pub fn encode_bool(&mut self, value: bool) {
        self.buffer.push(if value { 0x01 } else { 0x00 });
    }

    /// Encode an optional UTF-8 string with u32 length prefix
    ///
    /// `None` and `Some("")` both emit the null sentinel.
    pub fn encode_string(&mut self, value: Option<&str>) {
        match value {
            Some(s) if !s.is_empty() => {
                self.encode_u32(s.len() as u32);
                self.buffer.extend_from_slice(s.as_bytes());
            }
            _ => self.encode_u32(NULL_SENTINEL),
        }
    }

    /// Encode an optional byte string with u32 length prefix
    pub fn encode_byte_string(&mut self, value: Option<&[u8]>) {
        match value {
            Some(b) if !b.is_empty() => {
                self.encode_u32(b.len() as u32);
                self.buffer.extend_from_slice(b);
            }
            _ => self.encode_u32(NULL_SENTINEL),
        }
    }

    /// Encode a collection count prefix
    ///
    /// A zero-element collection is written with the null sentinel, the
    /// same convention the decoder accepts.
    pub fn encode_array_len(&mut self, len: usize) {
        if len == 0 {
            self.encode_u32(NULL_SENTINEL);
        } else {
            self.encode_u32(len as u32);
        }
    }

    /// Encode a status code as its raw u32
    pub fn encode_status(&mut self, status: StatusCode) {
        self.encode_u32(status.as_u32());
    }

    /// Encode a node id in its exact variant layout
    pub fn encode_node_id(&mut self, node_id: &NodeId) {
        self.encode_u8(node_id.mask());
        match node_id {
            NodeId::Numeric { namespace, id } => {
                self.encode_u8(*namespace);
                self.encode_u16(*id);
            }
            NodeId::String { namespace, id } => {
                self.encode_u16(*namespace);
                self.encode_u32(id.len() as u32);
                self.buffer.extend_from_slice(id.as_bytes());
            }
            NodeId::Guid { namespace, id } => {
                self.encode_u16(*namespace);
                self.buffer.extend_from_slice(id);
            }
            NodeId::Opaque { namespace, id } => {
                self.encode_u16(*namespace);
                self.encode_u32(id.len() as u32);
                self.buffer.extend_from_slice(id);
            }
            NodeId::ExpandedCompact { id, server_index } => {
                self.encode_u8(*id);
                self.encode_u32(*server_index);
            }
            NodeId::ExpandedNumeric {
                namespace,
                id,
                server_index,
            } => {
                self.encode_u8(*namespace);
                self.encode_u16(*id);
                self.encode_u32(*server_index);
            }
            NodeId::ExpandedString {
                namespace,
                id,
                server_index,
            } => {
                self.encode_u16(*namespace);
                self.encode_u32(id.len() as u32);
                self.buffer.extend_from_slice(id.as_bytes());
                self.encode_u32(*server_index);
            }
            NodeId::ExpandedOpaque {
                namespace,
                id,
                server_index,
            } => {
                self.encode_u16(*namespace);
                self.encode_u32(id.len() as u32);
                self.buffer.extend_from_slice(id);
                self.encode_u32(*server_index);
            }
        }
    }

    /// Append raw bytes
    pub fn encode_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Current encoded length
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing has been encoded yet
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Get a reference to the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

impl Default for BinaryEncoder {
    fn default() -> Self {
        Self::new()
    }
}
