//! EDID base block decoding.
//!
//! Only the fields needed to identify a display are decoded: manufacturer,
//! product code, serial numbers, model name, manufacture date and version.

use crate::errors::DdcError;
use std::fmt;

/// Fixed 8-byte pattern opening every EDID base block.
pub const EDID_HEADER: [u8; 8] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];

/// Size of the EDID base block.
pub const EDID_BLOCK_LEN: usize = 128;

const DESCRIPTOR_OFFSETS: [usize; 4] = [54, 72, 90, 108];
const DESCRIPTOR_LEN: usize = 18;
const TAG_SERIAL: u8 = 0xFF;
const TAG_TEXT: u8 = 0xFE;
const TAG_MODEL: u8 = 0xFC;

/// Identification data decoded from an EDID block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edid {
    /// Three-letter PNP manufacturer ID.
    pub manufacturer: String,
    /// Manufacturer product code.
    pub product_code: u16,
    /// 32-bit serial number field; 0 when unused.
    pub binary_serial_number: u32,
    /// Week of manufacture (0xFF marks a model year).
    pub manufacture_week: u8,
    /// Year of manufacture, or model year.
    pub year: u16,
    /// EDID version and revision, e.g. `1.4`.
    pub version: (u8, u8),
    /// Monitor name descriptor.
    pub model: Option<String>,
    /// Serial number descriptor.
    pub serial_number: Option<String>,
    /// Unspecified text descriptor.
    pub text: Option<String>,
}

impl Edid {
    /// Locate the EDID header in `data` and decode the block that follows.
    pub fn parse(data: &[u8]) -> Result<Self, DdcError> {
        let start = data
            .windows(EDID_HEADER.len())
            .position(|w| w == EDID_HEADER)
            .ok_or_else(|| DdcError::io("Invalid EDID data was read"))?;
        let block = data
            .get(start..start + EDID_BLOCK_LEN)
            .ok_or_else(|| DdcError::io(format!("Truncated EDID block at offset {start}")))?;

        let mut edid = Self {
            manufacturer: manufacturer_id(block[8], block[9]),
            product_code: u16::from_le_bytes([block[10], block[11]]),
            binary_serial_number: u32::from_le_bytes([block[12], block[13], block[14], block[15]]),
            manufacture_week: block[16],
            year: u16::from(block[17]) + 1990,
            version: (block[18], block[19]),
            model: None,
            serial_number: None,
            text: None,
        };

        for offset in DESCRIPTOR_OFFSETS {
            let desc = &block[offset..offset + DESCRIPTOR_LEN];
            if desc[..3] != [0, 0, 0] || desc[4] != 0 {
                continue;
            }
            let slot = match desc[3] {
                TAG_MODEL => &mut edid.model,
                TAG_SERIAL => &mut edid.serial_number,
                TAG_TEXT => &mut edid.text,
                tag => {
                    tracing::trace!("Skipping EDID descriptor with tag 0x{:02X}", tag);
                    continue;
                }
            };
            *slot = Some(descriptor_text(&desc[5..]));
        }
        Ok(edid)
    }

    /// Whether [`year`](Self::year) is a model year rather than a manufacture date.
    pub fn is_model_year(&self) -> bool {
        self.manufacture_week == 0xFF
    }

    /// Product code as four upper-case hex digits.
    pub fn product_code_hex(&self) -> String {
        format!("{:04X}", self.product_code)
    }

    /// Best available serial number: descriptor, binary field, or `UNKNOWN`.
    pub fn serial_repr(&self) -> String {
        match (&self.serial_number, self.binary_serial_number) {
            (Some(text), 0) => text.clone(),
            (Some(text), binary) => format!("{text} / {binary}"),
            (None, 0) => "UNKNOWN".to_string(),
            (None, binary) => binary.to_string(),
        }
    }
}

impl fmt::Display for Edid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} / {} # {}",
            self.manufacturer,
            self.product_code_hex(),
            self.model.as_deref().unwrap_or("Unknown"),
            self.serial_repr()
        )
    }
}

fn manufacturer_id(a: u8, b: u8) -> String {
    [(a >> 2) & 0x1F, ((a & 0x03) << 3) | (b >> 5), b & 0x1F]
        .iter()
        .map(|&c| char::from(c + 64))
        .collect()
}

fn descriptor_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end().to_string()
}
