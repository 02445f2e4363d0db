//! Outbound chunk splitting
//!
//! A logical message whose framed size exceeds the negotiated maximum is
//! split into wire chunks. Every chunk repeats the message's 16-byte
//! sequence header after its own frame header, mirroring what the
//! assembler strips on receive; all chunks but the last go out as `C`
//! continuations with the message type forced to `MSG`, and the last goes
//! out as an `F` chunk reusing the original message type.

use crate::assembler::CHUNK_HEADER_LENGTH;
use crate::frame::{ChunkKind, Frame, MessageKind, FRAME_HEADER_LENGTH};
use crate::sequence::SEQUENCE_HEADER_LENGTH;
use opcua_core::{OpcUaError, OpcUaResult};

/// Split a logical message body into wire frames
///
/// `body` is the full message body including its leading sequence header.
/// Returns a single final frame when the message fits in `max_frame_size`
/// bytes, otherwise the ordered chunk sequence. Each resulting frame is
/// written independently, in order, through the single writer.
pub fn chunk_message(
    message: MessageKind,
    body: &[u8],
    max_frame_size: usize,
) -> OpcUaResult<Vec<Frame>> {
    if FRAME_HEADER_LENGTH + body.len() <= max_frame_size {
        return Ok(vec![Frame::new(message, ChunkKind::Final, body.to_vec())]);
    }

    if body.len() < SEQUENCE_HEADER_LENGTH {
        return Err(OpcUaError::Protocol(format!(
            "Cannot chunk a message without a sequence header ({} byte body)",
            body.len()
        )));
    }
    if max_frame_size <= CHUNK_HEADER_LENGTH {
        return Err(OpcUaError::Protocol(format!(
            "Negotiated frame size {} leaves no room for chunk payload",
            max_frame_size
        )));
    }

    let sequence_header = &body[..SEQUENCE_HEADER_LENGTH];
    let payload = &body[SEQUENCE_HEADER_LENGTH..];
    let piece_len = max_frame_size - CHUNK_HEADER_LENGTH;

    let pieces: Vec<&[u8]> = payload.chunks(piece_len).collect();
    let last = pieces.len() - 1;

    let mut frames = Vec::with_capacity(pieces.len());
    for (index, piece) in pieces.iter().enumerate() {
        let mut chunk_body = Vec::with_capacity(SEQUENCE_HEADER_LENGTH + piece.len());
        chunk_body.extend_from_slice(sequence_header);
        chunk_body.extend_from_slice(piece);

        let frame = if index == last {
            Frame::new(message, ChunkKind::Final, chunk_body)
        } else {
            Frame::new(MessageKind::Message, ChunkKind::Intermediate, chunk_body)
        };
        frames.push(frame);
    }

    Ok(frames)
}
