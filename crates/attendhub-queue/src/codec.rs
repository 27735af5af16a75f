//! Length-prefixed message encoding.
//!
//! Frame layout: a big-endian `u32` type length, the UTF-8 type bytes,
//! then the body bytes to the end of the frame. The type may contain any
//! character, including ones that appear in the body.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use attendhub_core::error::{AppError, ErrorKind};
use attendhub_core::types::Message;

const LEN_PREFIX: usize = std::mem::size_of::<u32>();

/// Errors produced while encoding or decoding a frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The frame ended before the declared type length.
    #[error("frame truncated: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required to continue decoding.
        needed: usize,
        /// Bytes left in the frame.
        available: usize,
    },
    /// The type bytes are not valid UTF-8.
    #[error("message type is not valid UTF-8")]
    InvalidType,
    /// The type does not fit the length prefix.
    #[error("message type of {0} bytes exceeds the length prefix")]
    TypeTooLong(usize),
}

impl From<CodecError> for AppError {
    fn from(err: CodecError) -> Self {
        AppError::with_source(
            ErrorKind::Serialization,
            format!("Invalid queue frame: {err}"),
            err,
        )
    }
}

/// Encode a message into a single frame.
pub fn encode(message: &Message) -> Result<Bytes, CodecError> {
    let type_bytes = message.message_type.as_bytes();
    let type_len =
        u32::try_from(type_bytes.len()).map_err(|_| CodecError::TypeTooLong(type_bytes.len()))?;

    let mut buf = BytesMut::with_capacity(LEN_PREFIX + type_bytes.len() + message.body.len());
    buf.put_u32(type_len);
    buf.put_slice(type_bytes);
    buf.put_slice(&message.body);
    Ok(buf.freeze())
}

/// Decode a frame produced by [`encode`].
pub fn decode(mut frame: &[u8]) -> Result<Message, CodecError> {
    if frame.remaining() < LEN_PREFIX {
        return Err(CodecError::Truncated {
            needed: LEN_PREFIX,
            available: frame.remaining(),
        });
    }
    let type_len = frame.get_u32() as usize;
    if frame.remaining() < type_len {
        return Err(CodecError::Truncated {
            needed: type_len,
            available: frame.remaining(),
        });
    }

    let message_type = std::str::from_utf8(&frame[..type_len])
        .map_err(|_| CodecError::InvalidType)?
        .to_string();
    frame.advance(type_len);

    Ok(Message {
        message_type,
        body: frame.to_vec(),
    })
}
