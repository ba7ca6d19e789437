//! In-memory DDC/CI display for integration tests.
//!
//! [`FakeDisplay`] answers the host frames a real display would: get and set
//! VCP feature, save settings, chunked capabilities and identity reads, and
//! EDID reads on slave 0x50. Device nodes opened through [`BusDevice::open`]
//! are configured from the file at that path:
//!
//! - `denied` fails the open with a permission error
//! - `dead` opens but fails every transfer
//! - anything else is used as the EDID model name

#![allow(dead_code)]

use ddc_client::Monitor;
use ddc_features::FeatureTable;
use ddc_protocol::messages::frame::{checksum, DISPLAY_SOURCE, HOST_SOURCE, INBOUND_SEED, LENGTH_FLAG, OUTBOUND_SEED};
use ddc_protocol::{BusDevice, BusHandle, ClientOptions, DdcCiClient, EDID_ADDR};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// Bytes of string data per chunk reply.
pub const CHUNK_LEN: usize = 32;

pub const SAMSUNG_CAPS: &str = "(prot(monitor)type(lcd)SAMSUNGcmds(01 02 03 07 0C E3 F3)vcp(02 04 05 08 10 12 14(05 08 0B 0C) 16 18 1A 52 60( 12 0F 10) AA(01 02 03 FF) AC AE B2 B6 C6 C8 C9 D6(01 04 05) DC(00 02 03 05 ) DF FD)mccs_ver(2.1)mswhql(1))";

pub const LG_CAPS: &str = "(prot(monitor)type(LCD)model(LG FULLHD)cmds(01 02 03 0C E3 F3)vcp(02 04 05 08 10 12 14(05 08 0B) 16 18 1A 52 60(01 04 11 12) B0 B6 C6 C8 C9 D6(01 04) DF)mccs_ver(2.1)mswhql(1))";

/// Observable state of a fake display.
#[derive(Debug, Clone)]
pub struct DisplayState {
    /// Code to `(current, max)`; missing codes are unsupported.
    pub values: BTreeMap<u8, (u16, u16)>,
    pub capabilities: String,
    pub identity: String,
    pub edid: Vec<u8>,
    pub responsive: bool,
    /// Number of upcoming replies sent with a broken checksum.
    pub corrupt_replies: usize,
    pub saves: usize,
    /// Payloads of every well-formed host frame received.
    pub requests: Vec<Vec<u8>>,
}

impl DisplayState {
    pub fn new(model: &str, capabilities: &str) -> Self {
        Self {
            values: BTreeMap::from([
                (0x10, (50, 100)),
                (0x12, (75, 100)),
                (0x60, (0x0F, 0x12)),
                (0xB6, (0x03, 0x08)),
                (0xD6, (0x01, 0x05)),
            ]),
            capabilities: capabilities.to_string(),
            identity: format!("{model} identity"),
            edid: edid_block(model, "H4ZN900123"),
            responsive: true,
            corrupt_replies: 0,
            saves: 0,
            requests: Vec::new(),
        }
    }

    pub fn samsung() -> Self {
        Self::new("C49RG9x", SAMSUNG_CAPS)
    }

    pub fn shared(self) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(self))
    }
}

/// A display behind an emulated I2C bus.
pub struct FakeDisplay {
    state: Arc<Mutex<DisplayState>>,
    address: u16,
    pending: Vec<u8>,
    edid_offset: usize,
}

impl FakeDisplay {
    pub fn new(state: Arc<Mutex<DisplayState>>) -> Self {
        Self {
            state,
            address: ddc_protocol::DDCCI_ADDR,
            pending: Vec::new(),
            edid_offset: 0,
        }
    }

    fn respond(&mut self, payload: &[u8]) {
        let mut frame = vec![DISPLAY_SOURCE, LENGTH_FLAG | payload.len() as u8];
        frame.extend_from_slice(payload);
        frame.push(checksum(INBOUND_SEED, &frame));

        let mut state = self.state.lock();
        if state.corrupt_replies > 0 {
            state.corrupt_replies -= 1;
            if let Some(last) = frame.last_mut() {
                *last ^= 0xFF;
            }
        }
        self.pending = frame;
    }

    fn handle(&mut self, payload: &[u8]) {
        self.state.lock().requests.push(payload.to_vec());
        match payload {
            [0x01, code] => {
                let value = self.state.lock().values.get(code).copied();
                let reply = match value {
                    Some((current, max)) => {
                        let [max_hi, max_lo] = max.to_be_bytes();
                        let [cur_hi, cur_lo] = current.to_be_bytes();
                        [0x02, 0x00, *code, 0x00, max_hi, max_lo, cur_hi, cur_lo]
                    }
                    None => [0x02, 0x01, *code, 0x00, 0x00, 0x00, 0x00, 0x00],
                };
                self.respond(&reply);
            }
            [0x03, code, hi, lo] => {
                let value = u16::from_be_bytes([*hi, *lo]);
                if let Some(entry) = self.state.lock().values.get_mut(code) {
                    entry.0 = value;
                }
            }
            [0x0C] => self.state.lock().saves += 1,
            [request @ (0xF3 | 0xF1), hi, lo] => {
                let offset = usize::from(u16::from_be_bytes([*hi, *lo]));
                let text = {
                    let state = self.state.lock();
                    if *request == 0xF3 {
                        state.capabilities.clone()
                    } else {
                        state.identity.clone()
                    }
                };
                let bytes = text.as_bytes();
                let start = offset.min(bytes.len());
                let end = (start + CHUNK_LEN).min(bytes.len());
                let mut reply = vec![*request - 0x10, *hi, *lo];
                reply.extend_from_slice(&bytes[start..end]);
                self.respond(&reply);
            }
            _ => {}
        }
    }
}

impl BusDevice for FakeDisplay {
    fn open(path: &Path, address: u16) -> io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let model = contents.trim();
        if model == "denied" {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        let mut state = DisplayState::new(model, SAMSUNG_CAPS);
        state.responsive = model != "dead";
        let mut display = Self::new(state.shared());
        display.address = address;
        Ok(display)
    }

    fn set_address(&mut self, address: u16) -> io::Result<()> {
        self.address = address;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<()> {
        if !self.state.lock().responsive {
            return Err(io::Error::from(io::ErrorKind::TimedOut));
        }
        buf.fill(0);
        let source: Vec<u8> = if self.address == EDID_ADDR {
            self.state.lock().edid.iter().skip(self.edid_offset).copied().collect()
        } else {
            std::mem::take(&mut self.pending)
        };
        let len = source.len().min(buf.len());
        buf[..len].copy_from_slice(&source[..len]);
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        if !self.state.lock().responsive {
            return Err(io::Error::from(io::ErrorKind::TimedOut));
        }
        if self.address == EDID_ADDR {
            self.edid_offset = data.first().copied().map_or(0, usize::from);
            return Ok(());
        }

        let [source, length, rest @ ..] = data else {
            return Ok(());
        };
        let len = usize::from(length & !LENGTH_FLAG);
        if *source != HOST_SOURCE || rest.len() != len + 1 || checksum(OUTBOUND_SEED, data) != 0 {
            return Ok(());
        }
        self.handle(&rest[..len]);
        Ok(())
    }
}

/// A monitor wired to `state` through an already opened bus.
pub fn attach(state: &Arc<Mutex<DisplayState>>, options: ClientOptions, table: Arc<FeatureTable>) -> Monitor<FakeDisplay> {
    let bus = BusHandle::attach("/dev/i2c-fake", FakeDisplay::new(Arc::clone(state))).unwrap();
    Monitor::from_client(0, DdcCiClient::new(bus, options), table)
}

/// EDID base block for manufacturer `SAM` with model and serial descriptors.
pub fn edid_block(model: &str, serial: &str) -> Vec<u8> {
    let mut block = vec![0u8; 256];
    block[..8].copy_from_slice(&[0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00]);
    block[8] = 0x4C;
    block[9] = 0x2D;
    block[10..12].copy_from_slice(&0x0F4Eu16.to_le_bytes());
    block[16] = 12;
    block[17] = 29;
    block[18] = 1;
    block[19] = 4;

    for (offset, tag, text) in [(72, 0xFC, model), (90, 0xFF, serial)] {
        block[offset + 3] = tag;
        let mut payload = [0x20u8; 13];
        let bytes = &text.as_bytes()[..text.len().min(13)];
        payload[..bytes.len()].copy_from_slice(bytes);
        if bytes.len() < 13 {
            payload[bytes.len()] = 0x0A;
        }
        block[offset + 5..offset + 18].copy_from_slice(&payload);
    }
    block
}
