//! Decoding of the binary `application/vnd.amazon.eventstream` framing used by
//! streamed Bedrock responses.
//!
//! Each frame is laid out as:
//!
//! ```text
//! total length (u32) | headers length (u32) | prelude CRC (u32)
//! headers            | payload              | message CRC (u32)
//! ```
//!
//! All integers are big-endian, and both checksums are CRC-32 (IEEE).

use bytes::{Buf as _, Bytes, BytesMut};
use indexmap::IndexMap;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::error::Error;

const PRELUDE_LEN: usize = 12;
const CRC_LEN: usize = 4;
const MIN_FRAME_LEN: usize = PRELUDE_LEN + CRC_LEN;
const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// A decoded event-stream frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Message {
    /// Headers with string values. Other header types are skipped.
    pub headers: IndexMap<String, String>,
    pub payload: Bytes,
}

impl Message {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Decodes event-stream frames from a byte stream.
///
/// Frames split across reads are buffered until complete.
#[derive(Debug, Default)]
pub(crate) struct EventStreamCodec;

impl Decoder for EventStreamCodec {
    type Error = Error;
    type Item = Message;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < PRELUDE_LEN {
            return Ok(None);
        }

        let total_len = read_u32(&src[0..4]) as usize;
        if !(MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&total_len) {
            return Err(Error::Stream(format!("invalid frame length {total_len}")));
        }

        if src.len() < total_len {
            src.reserve(total_len - src.len());
            return Ok(None);
        }

        let frame = src.split_to(total_len).freeze();
        decode_frame(&frame).map(Some)
    }
}

fn decode_frame(frame: &[u8]) -> Result<Message, Error> {
    let total_len = frame.len();
    let headers_len = read_u32(&frame[4..8]) as usize;

    let prelude_crc = read_u32(&frame[8..12]);
    if crc32(&frame[..8]) != prelude_crc {
        return Err(Error::Stream("prelude checksum mismatch".to_owned()));
    }

    let message_crc = read_u32(&frame[total_len - CRC_LEN..]);
    if crc32(&frame[..total_len - CRC_LEN]) != message_crc {
        return Err(Error::Stream("message checksum mismatch".to_owned()));
    }

    let payload_start = PRELUDE_LEN + headers_len;
    if payload_start > total_len - CRC_LEN {
        return Err(Error::Stream(format!(
            "headers length {headers_len} exceeds frame length {total_len}"
        )));
    }

    let headers = decode_headers(&frame[PRELUDE_LEN..payload_start])?;
    let payload = Bytes::copy_from_slice(&frame[payload_start..total_len - CRC_LEN]);

    trace!(?headers, payload_len = payload.len(), "Decoded event-stream frame.");

    Ok(Message { headers, payload })
}

fn decode_headers(mut buf: &[u8]) -> Result<IndexMap<String, String>, Error> {
    let truncated = || Error::Stream("truncated frame header".to_owned());
    let mut headers = IndexMap::new();

    while buf.has_remaining() {
        let name_len = usize::from(buf.get_u8());
        if buf.remaining() < name_len {
            return Err(truncated());
        }

        let name = String::from_utf8_lossy(&buf[..name_len]).into_owned();
        buf.advance(name_len);

        if buf.remaining() < 1 {
            return Err(truncated());
        }

        let value_type = buf.get_u8();
        let value_len = match value_type {
            // bool true, bool false
            0 | 1 => 0,
            // byte
            2 => 1,
            // short
            3 => 2,
            // int
            4 => 4,
            // long, timestamp
            5 | 8 => 8,
            // uuid
            9 => 16,
            // bytes, string
            6 | 7 if buf.remaining() >= 2 => usize::from(buf.get_u16()),
            6 | 7 => return Err(truncated()),
            other => return Err(Error::Stream(format!("unknown header type {other}"))),
        };

        if buf.remaining() < value_len {
            return Err(truncated());
        }

        if value_type == 7 {
            let value = String::from_utf8_lossy(&buf[..value_len]).into_owned();
            headers.insert(name, value);
        }

        buf.advance(value_len);
    }

    Ok(headers)
}

fn read_u32(buf: &[u8]) -> u32 {
    u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]])
}

/// CRC-32 (IEEE 802.3), bitwise.
fn crc32(data: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }

    !crc
}

/// Encode a frame with string headers.
#[cfg(test)]
pub(crate) fn encode_frame(headers: &[(&str, &str)], payload: &[u8]) -> Vec<u8> {
    let mut encoded_headers = vec![];
    for (name, value) in headers {
        encoded_headers.push(u8::try_from(name.len()).unwrap());
        encoded_headers.extend_from_slice(name.as_bytes());
        encoded_headers.push(7);
        encoded_headers.extend_from_slice(&u16::try_from(value.len()).unwrap().to_be_bytes());
        encoded_headers.extend_from_slice(value.as_bytes());
    }

    let total_len = MIN_FRAME_LEN + encoded_headers.len() + payload.len();

    let mut frame = vec![];
    frame.extend_from_slice(&u32::try_from(total_len).unwrap().to_be_bytes());
    frame.extend_from_slice(&u32::try_from(encoded_headers.len()).unwrap().to_be_bytes());
    frame.extend_from_slice(&crc32(&frame).to_be_bytes());
    frame.extend_from_slice(&encoded_headers);
    frame.extend_from_slice(payload);
    frame.extend_from_slice(&crc32(&frame).to_be_bytes());
    frame
}

#[cfg(test)]
#[path = "eventstream_tests.rs"]
mod tests;
