//! Frame transport codec for the OPC UA TCP binary protocol
//!
//! This crate handles the byte-stream ↔ logical-frame boundary:
//!
//! - `frame`: the 8-byte frame header and `Frame` codec
//! - `sequence`: the 16-byte sequence header on secure-channel frames
//! - `assembler`: buffered receive-side reassembly of chunked messages
//! - `chunker`: send-side splitting of oversized messages

pub mod assembler;
pub mod chunker;
pub mod frame;
pub mod sequence;

pub use assembler::{ChunkAssembler, CHUNK_HEADER_LENGTH};
pub use chunker::chunk_message;
pub use frame::{ChunkKind, Frame, FrameHeader, MessageKind, FRAME_HEADER_LENGTH};
pub use sequence::{SequenceHeader, SEQUENCE_HEADER_LENGTH};
