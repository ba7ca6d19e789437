//! DDC/CI message framing and VCP payloads.
//!
//! - **Frames** ([`frame`]) - Host/display frame layout and checksums
//! - **VCP payloads** ([`vcp`]) - Get/set/save requests, get replies, string chunks
//! - **Constants** ([`types`]) - Opcodes and chunked request descriptors
//!
//! # Wire Format Rules
//!
//! 1. **Big-endian byte order** - Values and offsets are sent high byte first
//! 2. **Length flag** - The length byte always carries `0x80`
//! 3. **Address check first** - A reply not sourced from `0x6E` is rejected
//!    before its checksum is looked at
//!
//! # Examples
//!
//! ```
//! use ddc_protocol::messages::{frame, vcp};
//!
//! let request = frame::encode(&vcp::get_request(0x10)).unwrap();
//! assert_eq!(&request[..], &[0x51, 0x82, 0x01, 0x10, 0xAC]);
//! ```

pub mod frame;
pub mod types;
pub mod vcp;

#[cfg(test)]
mod proptest_framing;

pub use frame::{DecodedFrame, DISPLAY_SOURCE, HOST_SOURCE, INBOUND_SEED, OUTBOUND_SEED};
pub use types::VcpRequest;
pub use vcp::VcpReply;
