pub mod reader;
pub mod writer;

pub use reader::ReaderError;
pub use writer::WriterError;

/// Working area for a single UDP DNS message, request or reply.
///
/// 512 bytes is the classic UDP payload limit; anything larger would be
/// truncated by the server and flagged in the header.
#[derive(Clone)]
pub struct BytePacketBuffer {
    pub buf: [u8; 512],
    pub pos: usize,
}

impl Default for BytePacketBuffer {
    fn default() -> Self {
        BytePacketBuffer {
            buf: [0; 512],
            pos: 0,
        }
    }
}

impl BytePacketBuffer {
    /// Current position within the buffer
    pub fn pos(&self) -> usize {
        self.pos
    }
}

impl From<&[u8]> for BytePacketBuffer {
    /// Copies a received datagram into a fresh buffer, ready for reading.
    /// Bytes beyond the 512-byte window are dropped.
    fn from(data: &[u8]) -> Self {
        let mut buffer = Self::default();
        let len = data.len().min(buffer.buf.len());
        buffer.buf[..len].copy_from_slice(&data[..len]);
        buffer
    }
}
