//! Inbound chunk assembler
//!
//! Translates the continuous receive byte stream into logical frames.
//! Bytes are pushed as they arrive; complete frames are pulled out one at
//! a time. A frame is only consumed once all `size` bytes are buffered.
//!
//! Continuation (`C`) chunks are accumulated until a final (`F`) chunk
//! terminates the sequence. The accumulator keeps the very first chunk's
//! full 8+16-byte header; every later chunk contributes its body with its
//! own 24-byte leading header stripped. When the final chunk lands, the
//! accumulated buffer's chunk-type byte and size field are rewritten so
//! the combined frame is bit-identical to the unsplit encoding.

use crate::frame::{ChunkKind, Frame, FrameHeader, FRAME_HEADER_LENGTH};
use crate::sequence::SEQUENCE_HEADER_LENGTH;
use bytes::{Buf, BytesMut};
use opcua_core::{OpcUaError, OpcUaResult};

/// Leading bytes a continuation chunk repeats: frame header + sequence header
pub const CHUNK_HEADER_LENGTH: usize = FRAME_HEADER_LENGTH + SEQUENCE_HEADER_LENGTH;

/// Assembles logical frames from buffered wire bytes
#[derive(Debug, Default)]
pub struct ChunkAssembler {
    buffer: BytesMut,
    partial: Option<Vec<u8>>,
}

impl ChunkAssembler {
    /// Create a new assembler with an empty buffer
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
            partial: None,
        }
    }

    /// Append received bytes to the buffer
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Number of buffered, not yet consumed bytes
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Pull the next complete logical frame, if one is buffered
    ///
    /// Returns `Ok(None)` when more data is needed. Drains as many whole
    /// chunks as the buffer holds in one pass, so several continuation
    /// chunks plus their final chunk arriving together still produce the
    /// combined frame immediately. On a decode failure all partial state
    /// is discarded before the error is returned.
    pub fn next_frame(&mut self) -> OpcUaResult<Option<Frame>> {
        loop {
            if self.buffer.len() < FRAME_HEADER_LENGTH {
                return Ok(None);
            }

            let header = match FrameHeader::decode(&self.buffer[..FRAME_HEADER_LENGTH]) {
                Ok(header) => header,
                Err(e) => {
                    self.reset();
                    return Err(e);
                }
            };

            let size = header.size as usize;
            if self.buffer.len() < size {
                return Ok(None);
            }

            let chunk_bytes = self.buffer.copy_to_bytes(size);

            match header.chunk {
                ChunkKind::Intermediate => {
                    match self.partial.as_mut() {
                        None => self.partial = Some(chunk_bytes.to_vec()),
                        Some(acc) => {
                            if chunk_bytes.len() < CHUNK_HEADER_LENGTH {
                                self.reset();
                                return Err(OpcUaError::Decode(format!(
                                    "Continuation chunk too short: {} bytes",
                                    chunk_bytes.len()
                                )));
                            }
                            acc.extend_from_slice(&chunk_bytes[CHUNK_HEADER_LENGTH..]);
                        }
                    }
                    // keep draining; the final chunk may already be buffered
                }
                ChunkKind::Final => {
                    let combined = match self.partial.take() {
                        None => chunk_bytes.to_vec(),
                        Some(mut acc) => {
                            if chunk_bytes.len() < CHUNK_HEADER_LENGTH {
                                self.reset();
                                return Err(OpcUaError::Decode(format!(
                                    "Final chunk too short: {} bytes",
                                    chunk_bytes.len()
                                )));
                            }
                            acc.extend_from_slice(&chunk_bytes[CHUNK_HEADER_LENGTH..]);
                            acc[3] = ChunkKind::Final.code();
                            let total = acc.len() as u32;
                            acc[4..8].copy_from_slice(&total.to_le_bytes());
                            acc
                        }
                    };

                    match Frame::decode(&combined) {
                        Ok(frame) => return Ok(Some(frame)),
                        Err(e) => {
                            self.reset();
                            return Err(e);
                        }
                    }
                }
            }
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.partial = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::chunk_message;
    use crate::frame::MessageKind;
    use crate::sequence::SequenceHeader;
    use opcua_codec::BinaryEncoder;

    fn message_body(payload_len: usize) -> Vec<u8> {
        let mut enc = BinaryEncoder::new();
        SequenceHeader::new(1, 1, 5, 9).encode(&mut enc);
        let payload: Vec<u8> = (0..payload_len).map(|i| (i % 251) as u8).collect();
        enc.encode_bytes(&payload);
        enc.into_bytes()
    }

    #[test]
    fn test_needs_more_data() {
        let frame = Frame::new(MessageKind::Acknowledge, ChunkKind::Final, vec![0; 20]);
        let encoded = frame.encode();

        let mut assembler = ChunkAssembler::new();
        assembler.extend(&encoded[..5]);
        assert!(assembler.next_frame().unwrap().is_none());
        assembler.extend(&encoded[5..10]);
        assert!(assembler.next_frame().unwrap().is_none());
        assembler.extend(&encoded[10..]);
        assert_eq!(assembler.next_frame().unwrap().unwrap(), frame);
    }

    #[test]
    fn test_two_frames_in_one_buffer() {
        let a = Frame::new(MessageKind::Message, ChunkKind::Final, message_body(4));
        let b = Frame::new(MessageKind::Error, ChunkKind::Final, vec![1, 2, 3, 4]);

        let mut assembler = ChunkAssembler::new();
        let mut bytes = a.encode();
        bytes.extend_from_slice(&b.encode());
        assembler.extend(&bytes);

        assert_eq!(assembler.next_frame().unwrap().unwrap(), a);
        assert_eq!(assembler.next_frame().unwrap().unwrap(), b);
        assert!(assembler.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_reassembly_bit_identical() {
        // N continuation chunks + 1 final chunk must rebuild the unsplit frame.
        for n in [1usize, 2, 5] {
            let body = message_body(n * 100);
            let unsplit = Frame::new(MessageKind::Message, ChunkKind::Final, body.clone());

            // pick a max frame size that forces exactly n+1 chunks
            let payload = body.len() - SEQUENCE_HEADER_LENGTH;
            let piece = payload.div_ceil(n + 1);
            let max_size = CHUNK_HEADER_LENGTH + piece;
            let chunks = chunk_message(MessageKind::Message, &body, max_size).unwrap();
            assert_eq!(chunks.len(), n + 1);
            assert!(chunks[..n]
                .iter()
                .all(|c| c.chunk() == ChunkKind::Intermediate));
            assert_eq!(chunks[n].chunk(), ChunkKind::Final);

            let mut assembler = ChunkAssembler::new();
            for chunk in &chunks {
                assembler.extend(&chunk.encode());
            }
            let combined = assembler.next_frame().unwrap().unwrap();
            assert_eq!(combined.encode(), unsplit.encode());
        }
    }

    #[test]
    fn test_unknown_type_clears_partial_state() {
        let mut assembler = ChunkAssembler::new();
        let first = Frame::new(MessageKind::Message, ChunkKind::Intermediate, message_body(8));
        assembler.extend(&first.encode());
        // drain the continuation chunk into the accumulator
        assert!(assembler.next_frame().unwrap().is_none());

        assembler.extend(b"XYZF\x0C\x00\x00\x00\xAA\xBB\xCC\xDD");
        assert!(assembler.next_frame().is_err());
        assert_eq!(assembler.buffered(), 0);
        // a fresh, valid frame decodes normally afterwards
        let next = Frame::new(MessageKind::Acknowledge, ChunkKind::Final, vec![0; 28]);
        assembler.extend(&next.encode());
        assert_eq!(assembler.next_frame().unwrap().unwrap(), next);
    }
}
