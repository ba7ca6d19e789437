//! DDC/CI request/response client.
//!
//! [`DdcCiClient`] turns VCP operations into framed bus transactions:
//!
//! 1. encode the payload into a host frame and write it (paced by the transport)
//! 2. wait the response delay, then read `max_len + 3` bytes in one transaction
//! 3. validate the header, length and checksum
//! 4. validate the reply semantics (opcode, echoed code, result code)
//!
//! Checksum failures follow [`ClientOptions::ignore_checksum_errors`]: when set
//! they are logged and the payload is used anyway. A reply from the wrong
//! source address is always rejected.
//!
//! Only the chunked string read retries. Each chunk gets
//! [`ClientOptions::string_read_attempts`] attempts, and the budget is restored
//! after every chunk that succeeds.
//!
//! # Examples
//!
//! ```no_run
//! # #[cfg(target_os = "linux")]
//! # fn example() -> Result<(), ddc_protocol::DdcError> {
//! use ddc_protocol::bus::LinuxI2cBus;
//! use ddc_protocol::{ClientOptions, DdcCiClient};
//!
//! let mut client = DdcCiClient::<LinuxI2cBus>::open("/dev/i2c-4", ClientOptions::default())?;
//! let brightness = client.get_vcp_feature(0x10)?;
//! println!("brightness {}/{}", brightness.current, brightness.max);
//! client.set_vcp_feature(0x10, 40)?;
//! println!("{}", client.capabilities_string()?);
//! # Ok(())
//! # }
//! ```

use crate::bus::{BusDevice, BusHandle, EDID_ADDR};
use crate::errors::DdcError;
use crate::io::{DdcTransport, Timing};
use crate::messages::frame;
use crate::messages::types::{VcpRequest, GET_REPLY_LEN, STRING_CHUNK_MAX_LEN};
use crate::messages::vcp::{self, VcpReply};
use crate::protocol_trace;
use bytes::{Bytes, BytesMut};
use std::path::Path;

/// Bytes read from the EDID EEPROM.
pub const EDID_READ_LEN: usize = 256;

/// Default per-chunk attempt budget for string reads.
pub const DEFAULT_STRING_READ_ATTEMPTS: u32 = 3;

/// Per-client protocol behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Bus pacing.
    pub timing: Timing,
    /// Log checksum failures instead of failing the request.
    pub ignore_checksum_errors: bool,
    /// Attempts per chunk of a string read; values below 1 are treated as 1.
    pub string_read_attempts: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timing: Timing::default(),
            ignore_checksum_errors: true,
            string_read_attempts: DEFAULT_STRING_READ_ATTEMPTS,
        }
    }
}

/// DDC/CI client bound to one bus.
pub struct DdcCiClient<D> {
    transport: DdcTransport<D>,
    options: ClientOptions,
}

impl<D: BusDevice> DdcCiClient<D> {
    /// Open the bus at `path` and wrap it.
    pub fn open(path: impl AsRef<Path>, options: ClientOptions) -> Result<Self, DdcError> {
        Ok(Self::new(BusHandle::open(path)?, options))
    }

    /// Wrap an open bus handle.
    pub fn new(bus: BusHandle<D>, options: ClientOptions) -> Self {
        Self {
            transport: DdcTransport::new(bus, options.timing),
            options,
        }
    }

    /// Read the current and maximum value of a VCP feature.
    ///
    /// # Errors
    ///
    /// - [`DdcError::UnsupportedFeature`] / [`DdcError::UnknownResult`] from the result code
    /// - [`DdcError::Io`] for bus failures and replies that do not match the request
    /// - [`DdcError::Checksum`] if checksum errors are not ignored
    pub fn get_vcp_feature(&mut self, code: u8) -> Result<VcpReply, DdcError> {
        tracing::debug!("Requesting VCP feature 0x{:02X}", code);
        self.send("get_vcp_feature", &vcp::get_request(code))?;
        let payload = self.receive("get_vcp_reply", GET_REPLY_LEN)?;
        let reply = VcpReply::parse(code, &payload)?;
        tracing::debug!(
            "VCP feature 0x{:02X}: current={} max={} type={}",
            code,
            reply.current,
            reply.max,
            reply.vcp_type
        );
        Ok(reply)
    }

    /// Write a VCP feature value. The display sends no reply.
    pub fn set_vcp_feature(&mut self, code: u8, value: u16) -> Result<(), DdcError> {
        tracing::debug!("Setting VCP feature 0x{:02X} to {}", code, value);
        self.send("set_vcp_feature", &vcp::set_request(code, value))
    }

    /// Ask the display to persist its current settings.
    pub fn save_current_settings(&mut self) -> Result<(), DdcError> {
        self.send("save_current_settings", &vcp::save_settings_request())
    }

    /// The display's capabilities string.
    pub fn capabilities_string(&mut self) -> Result<String, DdcError> {
        self.read_string(VcpRequest::CAPABILITIES)
    }

    /// The display's identity string.
    pub fn identity_string(&mut self) -> Result<String, DdcError> {
        self.read_string(VcpRequest::IDENTITY)
    }

    /// Read a string through repeated chunk requests, reassembling by offset.
    ///
    /// Retryable failures repeat the same offset until the attempt budget is
    /// spent; the last error is then returned. Trailing NUL bytes are removed.
    pub fn read_string(&mut self, request: VcpRequest) -> Result<String, DdcError> {
        let max_attempts = self.options.string_read_attempts.max(1);
        let mut offset: u16 = 0;
        let mut attempts_left = max_attempts;
        let mut buf = BytesMut::new();

        loop {
            match self.read_chunk(request, offset) {
                Ok(None) => break,
                Ok(Some(chunk)) => {
                    attempts_left = max_attempts;
                    buf.extend_from_slice(&chunk);
                    offset = u16::try_from(chunk.len())
                        .ok()
                        .and_then(|len| offset.checked_add(len))
                        .ok_or_else(|| {
                            DdcError::io(format!("{} string exceeds the 16-bit offset range", request.name))
                        })?;
                    tracing::debug!(
                        "Current {} buffer={:?}",
                        request.name,
                        String::from_utf8_lossy(&buf)
                    );
                }
                Err(e) if e.is_retryable() => {
                    attempts_left -= 1;
                    if attempts_left == 0 {
                        return Err(e);
                    }
                    tracing::debug!("Retrying {} at offset {} due to {}", request.name, offset, e);
                }
                Err(e) => return Err(e),
            }
        }

        let text = String::from_utf8(buf.to_vec())
            .map_err(|e| DdcError::io(format!("{} string is not valid UTF-8: {e}", request.name)))?;
        Ok(text.trim_end_matches('\0').to_string())
    }

    /// Read the raw EDID block from slave 0x50.
    pub fn read_edid(&mut self) -> Result<Bytes, DdcError> {
        let data = self.transport.read_register(EDID_ADDR, 0x00, EDID_READ_LEN)?;
        protocol_trace::in_frame("edid", &data);
        Ok(data.freeze())
    }

    fn read_chunk(&mut self, request: VcpRequest, offset: u16) -> Result<Option<Bytes>, DdcError> {
        tracing::debug!("Requesting {} with offset={}", request.name, offset);
        self.send(request.name, &vcp::string_chunk_request(request, offset))?;
        let payload = self.receive(request.name, STRING_CHUNK_MAX_LEN)?;
        let data = vcp::parse_string_chunk(request, offset, &payload)?;
        Ok(data.map(|data| payload.slice_ref(data)))
    }

    fn send(&mut self, name: &str, payload: &[u8]) -> Result<(), DdcError> {
        let frame = frame::encode(payload)?;
        protocol_trace::out_frame(name, &frame);
        self.transport.write(&frame)
    }

    fn receive(&mut self, name: &str, max_payload: usize) -> Result<Bytes, DdcError> {
        self.transport.settle();
        let raw = self.transport.read(max_payload + 3)?;
        protocol_trace::in_frame(name, &raw);

        let decoded = frame::decode(&raw, max_payload)?;
        if !decoded.checksum_ok() {
            if !self.options.ignore_checksum_errors {
                return Err(decoded.checksum_error());
            }
            tracing::warn!(
                "Checksum does not match for {} reply on {} (residue 0x{:02X})",
                name,
                self.transport.bus().path().display(),
                decoded.residue
            );
        }
        Ok(decoded.payload)
    }
}

impl<D> DdcCiClient<D> {
    /// Device node this client talks to.
    pub fn path(&self) -> &Path {
        self.transport.bus().path()
    }

    /// Options in effect.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Close the bus. Later requests fail with [`DdcError::Io`].
    pub fn close(&mut self) {
        self.transport.close();
    }
}
