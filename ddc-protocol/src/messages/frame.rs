//! DDC/CI frame encoding and decoding.
//!
//! Outbound: `0x51, 0x80 | len, payload, checksum` where the checksum makes the
//! XOR of the whole frame, seeded with [`OUTBOUND_SEED`], equal zero.
//!
//! Inbound: `0x6E, 0x80 | len, payload, checksum` checked the same way with
//! [`INBOUND_SEED`].

use crate::errors::DdcError;
use bytes::{BufMut, Bytes, BytesMut};

/// Source address byte of host frames.
pub const HOST_SOURCE: u8 = 0x51;

/// Source address byte of display frames.
pub const DISPLAY_SOURCE: u8 = 0x6E;

/// Flag always set in the length byte.
pub const LENGTH_FLAG: u8 = 0x80;

/// Checksum seed for host frames (the display's write address).
pub const OUTBOUND_SEED: u8 = 0x6E;

/// Checksum seed for display frames (the virtual host address).
pub const INBOUND_SEED: u8 = 0x50;

/// Largest payload the 7-bit length field can describe.
pub const MAX_PAYLOAD_LEN: usize = 0x7F;

/// XOR of `bytes` seeded with `seed`.
#[inline]
pub fn checksum(seed: u8, bytes: &[u8]) -> u8 {
    bytes.iter().fold(seed, |acc, b| acc ^ b)
}

/// Build a host frame around `payload`.
pub fn encode(payload: &[u8]) -> Result<Bytes, DdcError> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(DdcError::io(format!(
            "Payload of {} bytes does not fit a DDC/CI frame",
            payload.len()
        )));
    }
    let mut buf = BytesMut::with_capacity(payload.len() + 3);
    buf.put_u8(HOST_SOURCE);
    buf.put_u8(LENGTH_FLAG | payload.len() as u8);
    buf.put_slice(payload);
    let sum = checksum(OUTBOUND_SEED, &buf);
    buf.put_u8(sum);
    Ok(buf.freeze())
}

/// A structurally valid display frame. The checksum has not been judged yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// Payload bytes between the length byte and the checksum.
    pub payload: Bytes,
    /// Full frame as received, trailing padding removed.
    pub frame: Bytes,
    /// XOR of the frame seeded with [`INBOUND_SEED`].
    pub residue: u8,
}

impl DecodedFrame {
    /// Whether the checksum verifies.
    #[inline]
    pub fn checksum_ok(&self) -> bool {
        self.residue == 0
    }

    /// Checksum failure for this frame.
    pub fn checksum_error(&self) -> DdcError {
        DdcError::Checksum {
            residue: self.residue,
            frame: self.frame.to_vec(),
        }
    }
}

/// Split a raw read into header, payload and checksum.
///
/// Fails with [`DdcError::Io`] on a wrong source address, a missing length
/// flag, or a length beyond `max_payload` or the bytes actually read.
pub fn decode(raw: &[u8], max_payload: usize) -> Result<DecodedFrame, DdcError> {
    let (source, length) = match raw {
        [source, length, ..] => (*source, *length),
        _ => return Err(DdcError::io(format!("Short reply of {} bytes", raw.len()))),
    };
    if source != DISPLAY_SOURCE || length & LENGTH_FLAG == 0 {
        return Err(DdcError::io(format!(
            "Invalid header in reply: {source:02X}{length:02X} (full {raw:02X?})"
        )));
    }

    let len = usize::from(length & !LENGTH_FLAG);
    if len > max_payload || len + 3 > raw.len() {
        return Err(DdcError::io(format!(
            "Invalid reply length {len} (max {max_payload}, read {})",
            raw.len()
        )));
    }

    let frame = Bytes::copy_from_slice(&raw[..len + 3]);
    Ok(DecodedFrame {
        payload: frame.slice(2..len + 2),
        residue: checksum(INBOUND_SEED, &frame),
        frame,
    })
}
