//! Opcodes and fixed request descriptors shared by the DDC/CI messages.

/// Get VCP feature request.
pub const GET_VCP_FEATURE: u8 = 0x01;

/// Get VCP feature reply.
pub const GET_VCP_REPLY: u8 = 0x02;

/// Set VCP feature request. The display does not reply.
pub const SET_VCP_FEATURE: u8 = 0x03;

/// Save current settings request. The display does not reply.
pub const SAVE_CURRENT_SETTINGS: u8 = 0x0C;

/// Result code for a successful get.
pub const RESULT_NO_ERROR: u8 = 0x00;

/// Result code for a feature the display does not implement.
pub const RESULT_UNSUPPORTED: u8 = 0x01;

/// Payload length of a get reply.
pub const GET_REPLY_LEN: usize = 8;

/// Largest payload accepted for one chunk of a string read.
pub const STRING_CHUNK_MAX_LEN: usize = 64;

/// Bytes of opcode and offset echo preceding each string chunk.
pub const STRING_CHUNK_HEADER_LEN: usize = 3;

/// A chunked string request and the opcode its replies carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcpRequest {
    /// Human readable name used in logs and errors.
    pub name: &'static str,
    /// Opcode sent by the host.
    pub request: u8,
    /// Opcode echoed by the display.
    pub response: u8,
}

impl VcpRequest {
    /// Capabilities string request.
    pub const CAPABILITIES: Self = Self {
        name: "capabilities",
        request: 0xF3,
        response: 0xE3,
    };

    /// Identity string request.
    pub const IDENTITY: Self = Self {
        name: "identity",
        request: 0xF1,
        response: 0xE1,
    };
}
