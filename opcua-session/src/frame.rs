//! Wire frame structure and encoding/decoding
//!
//! Every frame starts with an 8-byte header: a 3-byte ASCII message-type
//! code, a 1-byte ASCII chunk-type code and a little-endian `u32` total
//! size. The size counts the header itself, so `size == 8 + body.len()`
//! holds at construction, and on the wire the size field is authoritative
//! for delimiting reads.

use opcua_core::{OpcUaError, OpcUaResult};
use std::fmt;

/// Length of the fixed frame header
pub const FRAME_HEADER_LENGTH: usize = 8;

/// Message type carried in the frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Hello,
    Acknowledge,
    OpenChannel,
    CloseChannel,
    Message,
    Error,
}

impl MessageKind {
    /// Get message kind from its 3-byte ASCII code
    pub fn from_code(code: &[u8; 3]) -> OpcUaResult<Self> {
        match code {
            b"HEL" => Ok(MessageKind::Hello),
            b"ACK" => Ok(MessageKind::Acknowledge),
            b"OPN" => Ok(MessageKind::OpenChannel),
            b"CLO" => Ok(MessageKind::CloseChannel),
            b"MSG" => Ok(MessageKind::Message),
            b"ERR" => Ok(MessageKind::Error),
            other => Err(OpcUaError::Decode(format!(
                "Unknown message type code: {:?}",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    /// 3-byte ASCII code for this message kind
    pub fn code(&self) -> [u8; 3] {
        match self {
            MessageKind::Hello => *b"HEL",
            MessageKind::Acknowledge => *b"ACK",
            MessageKind::OpenChannel => *b"OPN",
            MessageKind::CloseChannel => *b"CLO",
            MessageKind::Message => *b"MSG",
            MessageKind::Error => *b"ERR",
        }
    }

    /// Whether frames of this kind carry a sequence header
    pub fn has_sequence_header(&self) -> bool {
        matches!(
            self,
            MessageKind::Message | MessageKind::OpenChannel | MessageKind::CloseChannel
        )
    }
}

/// Chunk type carried in the frame header
///
/// The standard also defines an abort chunk (`A`); it is not produced by
/// the servers this client targets and decodes as an error here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// Final chunk, terminates a logical message
    Final,
    /// Continuation chunk of a larger logical message
    Intermediate,
}

impl ChunkKind {
    /// Get chunk kind from its ASCII code byte
    pub fn from_code(code: u8) -> OpcUaResult<Self> {
        match code {
            b'F' => Ok(ChunkKind::Final),
            b'C' => Ok(ChunkKind::Intermediate),
            other => Err(OpcUaError::Decode(format!(
                "Unknown chunk type code: 0x{:02X}",
                other
            ))),
        }
    }

    /// ASCII code byte for this chunk kind
    pub fn code(&self) -> u8 {
        match self {
            ChunkKind::Final => b'F',
            ChunkKind::Intermediate => b'C',
        }
    }
}

/// Decoded 8-byte frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub message: MessageKind,
    pub chunk: ChunkKind,
    /// Total frame size including this header
    pub size: u32,
}

impl FrameHeader {
    /// Decode a header from the first 8 buffered bytes
    pub fn decode(data: &[u8]) -> OpcUaResult<Self> {
        if data.len() < FRAME_HEADER_LENGTH {
            return Err(OpcUaError::Decode(format!(
                "Frame header too short: {} bytes",
                data.len()
            )));
        }
        let message = MessageKind::from_code(&[data[0], data[1], data[2]])?;
        let chunk = ChunkKind::from_code(data[3])?;
        let size = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        if (size as usize) < FRAME_HEADER_LENGTH {
            return Err(OpcUaError::Decode(format!(
                "Frame size {} smaller than header",
                size
            )));
        }
        Ok(Self { message, chunk, size })
    }

    /// Encode the header into its 8-byte wire form
    pub fn encode(&self) -> [u8; FRAME_HEADER_LENGTH] {
        let code = self.message.code();
        let size = self.size.to_le_bytes();
        [
            code[0],
            code[1],
            code[2],
            self.chunk.code(),
            size[0],
            size[1],
            size[2],
            size[3],
        ]
    }
}

/// A logical wire frame: header plus body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    header: FrameHeader,
    body: Vec<u8>,
}

impl Frame {
    /// Create a frame; the size field is derived from the body length
    pub fn new(message: MessageKind, chunk: ChunkKind, body: Vec<u8>) -> Self {
        let size = (FRAME_HEADER_LENGTH + body.len()) as u32;
        Self {
            header: FrameHeader {
                message,
                chunk,
                size,
            },
            body,
        }
    }

    /// Decode a complete frame from exactly `size` bytes
    pub fn decode(data: &[u8]) -> OpcUaResult<Self> {
        let header = FrameHeader::decode(data)?;
        if data.len() != header.size as usize {
            return Err(OpcUaError::Decode(format!(
                "Frame size mismatch: header says {}, buffer has {}",
                header.size,
                data.len()
            )));
        }
        Ok(Self {
            header,
            body: data[FRAME_HEADER_LENGTH..].to_vec(),
        })
    }

    /// Encode the frame to its wire bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.header.size as usize);
        result.extend_from_slice(&self.header.encode());
        result.extend_from_slice(&self.body);
        result
    }

    /// Frame header
    pub fn header(&self) -> FrameHeader {
        self.header
    }

    /// Message kind
    pub fn message(&self) -> MessageKind {
        self.header.message
    }

    /// Chunk kind
    pub fn chunk(&self) -> ChunkKind {
        self.header.chunk
    }

    /// Frame body (everything after the 8-byte header)
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Consume the frame, returning its body
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame: type={:?}, chunk={:?}, size={}",
            self.header.message, self.header.chunk, self.header.size
        )
    }
}
