//! VCP request payloads and reply parsing.

use super::types::*;
use crate::errors::DdcError;

/// Payload of a get VCP feature request.
#[inline]
pub fn get_request(code: u8) -> [u8; 2] {
    [GET_VCP_FEATURE, code]
}

/// Payload of a set VCP feature request.
#[inline]
pub fn set_request(code: u8, value: u16) -> [u8; 4] {
    let [hi, lo] = value.to_be_bytes();
    [SET_VCP_FEATURE, code, hi, lo]
}

/// Payload of a save current settings request.
#[inline]
pub fn save_settings_request() -> [u8; 1] {
    [SAVE_CURRENT_SETTINGS]
}

/// Payload requesting one chunk of a string starting at `offset`.
#[inline]
pub fn string_chunk_request(request: VcpRequest, offset: u16) -> [u8; 3] {
    let [hi, lo] = offset.to_be_bytes();
    [request.request, hi, lo]
}

/// Decoded get VCP feature reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcpReply {
    /// Feature code echoed by the display.
    pub code: u8,
    /// VCP type byte (0 = set parameter, 1 = momentary).
    pub vcp_type: u8,
    /// Maximum value.
    pub max: u16,
    /// Current value.
    pub current: u16,
}

impl VcpReply {
    /// Parse the payload of a reply to a get request for `code`.
    ///
    /// Checks the reply opcode, then the echoed feature code, then the result
    /// code.
    pub fn parse(code: u8, payload: &[u8]) -> Result<Self, DdcError> {
        let [opcode, result, echoed, vcp_type, max_hi, max_lo, cur_hi, cur_lo] = match payload {
            [] => {
                return Err(DdcError::io(format!(
                    "Empty reply to get request for VCP feature 0x{code:02X}"
                )))
            }
            [a, b, c, d, e, f, g, h] => [*a, *b, *c, *d, *e, *f, *g, *h],
            _ => {
                return Err(DdcError::io(format!(
                    "Reply of {} bytes to get request for VCP feature 0x{code:02X} (expected {GET_REPLY_LEN})",
                    payload.len()
                )))
            }
        };

        if opcode != GET_VCP_REPLY {
            return Err(DdcError::io(format!(
                "Received unexpected response code: 0x{opcode:02X}"
            )));
        }
        if echoed != code {
            return Err(DdcError::io(format!(
                "Received reply for VCP feature 0x{echoed:02X}, expected 0x{code:02X}"
            )));
        }
        match result {
            RESULT_NO_ERROR => Ok(Self {
                code,
                vcp_type,
                max: u16::from_be_bytes([max_hi, max_lo]),
                current: u16::from_be_bytes([cur_hi, cur_lo]),
            }),
            RESULT_UNSUPPORTED => Err(DdcError::UnsupportedFeature(code)),
            result => Err(DdcError::UnknownResult { code, result }),
        }
    }
}

/// Interpret one string chunk reply requested at `offset`.
///
/// Returns `None` when the payload carries no data (end of string), or the
/// data bytes following the opcode/offset echo.
pub fn parse_string_chunk(
    request: VcpRequest,
    offset: u16,
    payload: &[u8],
) -> Result<Option<&[u8]>, DdcError> {
    if payload.len() <= STRING_CHUNK_HEADER_LEN {
        return Ok(None);
    }
    let opcode = payload[0];
    let echoed = u16::from_be_bytes([payload[1], payload[2]]);
    if opcode != request.response || echoed != offset {
        return Err(DdcError::io(format!(
            "Invalid response for {} request - code=0x{opcode:02X}, offset={echoed} != {offset}",
            request.name
        )));
    }
    Ok(Some(&payload[STRING_CHUNK_HEADER_LEN..]))
}
