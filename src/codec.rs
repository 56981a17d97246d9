use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::reply::Reply;
use crate::Error;

/// Default upper bound for a single message, matching the receive buffer clients are written
/// against.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024;

/// Messages carry no length prefix and no terminator: whatever a single read delivers is one
/// message.
pub struct MessageCodec {
    max_message_size: usize,
}

impl MessageCodec {
    pub fn new(max_message_size: usize) -> MessageCodec {
        MessageCodec { max_message_size }
    }

    /// Free buffer space each socket read needs: room for the largest allowed message plus one
    /// byte, so an oversized message shows up as such instead of being cut at the limit.
    pub fn read_capacity(&self) -> usize {
        self.max_message_size.saturating_add(1)
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_SIZE)
    }
}

impl Decoder for MessageCodec {
    type Item = Bytes;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        if src.len() > self.max_message_size {
            return Err(format!(
                "message size {} exceeds limit of {} bytes",
                src.len(),
                self.max_message_size
            )
            .into());
        }

        // Take everything that arrived with this read. `split` gives the buffer's capacity away
        // with the bytes, so reserve a full window for the next read.
        let message = src.split().freeze();
        src.reserve(self.read_capacity());

        Ok(Some(message))
    }
}

impl Encoder<Reply> for MessageCodec {
    type Error = Error;

    fn encode(&mut self, reply: Reply, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let bytes: Vec<u8> = reply.into();
        dst.reserve(bytes.len());
        dst.put_slice(&bytes);
        Ok(())
    }
}

/// Encodes binary image data as standard, padded base64 so it can travel inside a text message.
pub fn encode_image(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn decode_image(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(data.trim_end())
}
