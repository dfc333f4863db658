//! The 2-byte length-prefix framing DNS messages use over TCP (RFC
//! 1035 §4.2.2).
//!
//! This module only shuffles bytes: it has no notion of a socket or a
//! connection, so a caller reading from a stream is expected to keep
//! calling [`decode_tcp`] as more bytes arrive until it stops
//! returning [`Error::Incomplete`].

use std::convert::TryFrom;
use std::fmt;

/// Prefix `message` with its own length as a big-endian `u16`.
pub fn encode_tcp(message: &[u8]) -> Result<Vec<u8>, Error> {
    let len = u16::try_from(message.len()).map_err(|_| Error::MessageTooLarge { len: message.len() })?;
    let mut framed = Vec::with_capacity(message.len() + 2);
    framed.extend_from_slice(&len.to_be_bytes());
    framed.extend_from_slice(message);
    Ok(framed)
}

/// Split the first length-prefixed message off the front of `buffer`,
/// returning it along with whatever bytes came after it.
///
/// Returns [`Error::Incomplete`] if `buffer` doesn't yet hold a
/// complete frame - the caller should read more bytes and retry with
/// the same (now longer) buffer, rather than treating this as fatal.
pub fn decode_tcp(buffer: &[u8]) -> Result<(&[u8], &[u8]), Error> {
    if buffer.len() < 2 {
        return Err(Error::Incomplete);
    }
    let len = u16::from_be_bytes([buffer[0], buffer[1]]) as usize;
    if buffer.len() < 2 + len {
        return Err(Error::Incomplete);
    }
    Ok((&buffer[2..2 + len], &buffer[2 + len..]))
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// `buffer` does not yet contain a whole frame.
    Incomplete,

    /// A message is too large to fit TCP DNS framing's 16-bit length
    /// prefix.
    MessageTooLarge { len: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Incomplete => write!(f, "buffer does not contain a complete frame yet"),
            Error::MessageTooLarge { len } => {
                write!(f, "message of {len} bytes is too large for a 16-bit TCP length prefix")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_a_message() {
        let message = b"hello dns";
        let framed = encode_tcp(message).unwrap();
        let (decoded, rest) = decode_tcp(&framed).unwrap();
        assert_eq!(message, decoded);
        assert!(rest.is_empty());
    }

    #[test]
    fn reports_incomplete_frame() {
        let message = b"hello dns";
        let framed = encode_tcp(message).unwrap();
        assert_eq!(Err(Error::Incomplete), decode_tcp(&framed[..framed.len() - 1]));
        assert_eq!(Err(Error::Incomplete), decode_tcp(&framed[..1]));
    }

    #[test]
    fn splits_trailing_bytes() {
        let message = b"first";
        let mut framed = encode_tcp(message).unwrap();
        framed.extend_from_slice(b"trailing");
        let (decoded, rest) = decode_tcp(&framed).unwrap();
        assert_eq!(message, decoded);
        assert_eq!(b"trailing", rest);
    }
}
