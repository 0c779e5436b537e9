//! Frame buffer for accumulating partial reads.
//!
//! TCP delivers a byte stream, not frames: one `read` may return half a
//! frame, or several frames glued together. The buffer accumulates whatever
//! the socket hands over and yields complete [`FRAME_SIZE`] chunks, in
//! order. Since every frame is the same fixed size there is no header to
//! parse; the extraction condition is a simple length threshold.
//!
//! Uses `bytes::BytesMut` so extraction is a zero-copy `split_to + freeze`.
//!
//! # Example
//!
//! ```
//! use flotilla_client::protocol::{FrameBuffer, FRAME_SIZE};
//!
//! let mut buffer = FrameBuffer::new();
//!
//! // Data arrives in arbitrary chunks from the socket.
//! assert!(buffer.push(&[0u8; 100]).is_empty());
//! let frames = buffer.push(&[0u8; FRAME_SIZE - 100]);
//! assert_eq!(frames.len(), 1);
//! ```

use bytes::{Bytes, BytesMut};

use super::wire::FRAME_SIZE;

/// Buffer for accumulating incoming bytes and extracting complete frames.
///
/// All data is stored in a single `BytesMut` to minimize allocations.
pub struct FrameBuffer {
    /// Accumulated bytes from socket reads.
    buffer: BytesMut,
}

impl FrameBuffer {
    /// Create a new frame buffer with room for a couple of frames.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(2 * FRAME_SIZE),
        }
    }

    /// Push data into the buffer and extract all complete frames.
    ///
    /// Returns every frame completed by this chunk, in arrival order; the
    /// vector is empty while a frame is still partial. Leftover bytes stay
    /// buffered for the next push. Each returned `Bytes` is exactly
    /// [`FRAME_SIZE`] long.
    pub fn push(&mut self, data: &[u8]) -> Vec<Bytes> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while self.buffer.len() >= FRAME_SIZE {
            frames.push(self.buffer.split_to(FRAME_SIZE).freeze());
        }
        frames
    }

    /// Number of buffered (not yet frame-complete) bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop any partial frame, e.g. when the connection is torn down.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{encode_frame, Message};

    fn frame_bytes(row: i32) -> Vec<u8> {
        encode_frame(
            &Message::PlayerMove {
                game_id: "g".into(),
                row,
                col: 0,
            },
            "",
        )
        .unwrap()
        .to_vec()
    }

    #[test]
    fn test_single_complete_frame() {
        let mut buffer = FrameBuffer::new();
        let frames = buffer.push(&frame_bytes(1));

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len(), FRAME_SIZE);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_fragmented_frame() {
        let mut buffer = FrameBuffer::new();
        let bytes = frame_bytes(7);

        assert!(buffer.push(&bytes[..2000]).is_empty());
        assert_eq!(buffer.len(), 2000);

        let frames = buffer.push(&bytes[2000..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0][..], bytes[..]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_multiple_frames_in_one_push() {
        let mut buffer = FrameBuffer::new();

        let mut combined = Vec::new();
        for row in 0..3 {
            combined.extend_from_slice(&frame_bytes(row));
        }

        let frames = buffer.push(&combined);
        assert_eq!(frames.len(), 3);
        for (row, frame) in frames.iter().enumerate() {
            assert_eq!(frame[..], frame_bytes(row as i32)[..]);
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_complete_frame_plus_partial_tail() {
        let mut buffer = FrameBuffer::new();

        let mut data = frame_bytes(1);
        let second = frame_bytes(2);
        data.extend_from_slice(&second[..300]);

        let frames = buffer.push(&data);
        assert_eq!(frames.len(), 1);
        assert_eq!(buffer.len(), 300);

        let frames = buffer.push(&second[300..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0][..], second[..]);
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut buffer = FrameBuffer::new();
        let bytes = frame_bytes(42);

        let mut all = Vec::new();
        for b in &bytes {
            all.extend(buffer.push(&[*b]));
        }

        assert_eq!(all.len(), 1);
        assert_eq!(all[0][..], bytes[..]);
    }

    #[test]
    fn test_clear_drops_partial() {
        let mut buffer = FrameBuffer::new();
        buffer.push(&[1u8; 100]);
        assert_eq!(buffer.len(), 100);

        buffer.clear();
        assert!(buffer.is_empty());

        // A fresh frame after clear comes out intact.
        let frames = buffer.push(&frame_bytes(5));
        assert_eq!(frames.len(), 1);
    }
}
