//! DDC/CI (Display Data Channel Command Interface) over Linux I2C.
//!
//! This crate provides the bus and protocol layers for talking to monitors:
//! opening `/dev/i2c-*` nodes, pacing traffic the way displays require,
//! framing VCP requests and validating replies.
//!
//! # Modules
//!
//! - [`bus`] - Bus device trait, Linux `i2c-dev` backend and the owning handle
//! - [`io`] - Timed raw transport (write spacing and reply settle time)
//! - [`messages`] - Frame layout, checksums and VCP payloads
//! - [`ddcci`] - Request/response client with chunked string reads
//! - [`edid`] - EDID identification block decoding
//! - [`protocol_trace`] - Opt-in frame hexdumps (`DDC_TRACE=1`)
//!
//! # Examples
//!
//! ```no_run
//! # #[cfg(target_os = "linux")]
//! # fn example() -> Result<(), ddc_protocol::DdcError> {
//! use ddc_protocol::bus::LinuxI2cBus;
//! use ddc_protocol::{ClientOptions, DdcCiClient, Edid};
//!
//! let mut client = DdcCiClient::<LinuxI2cBus>::open("/dev/i2c-4", ClientOptions::default())?;
//! let edid = Edid::parse(&client.read_edid()?)?;
//! let input = client.get_vcp_feature(0x60)?;
//! println!("{edid}: input source {}", input.current);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod bus;
pub mod ddcci;
pub mod edid;
pub mod errors;
pub mod io;
pub mod messages;
pub mod protocol_trace;

// Re-export commonly used types
pub use bus::{BusDevice, BusHandle, DDCCI_ADDR, EDID_ADDR};
pub use ddcci::{ClientOptions, DdcCiClient};
pub use edid::Edid;
pub use errors::{AccessContext, DdcError};
pub use io::{DdcTransport, Timing};
pub use messages::{VcpReply, VcpRequest};

#[cfg(target_os = "linux")]
pub use bus::LinuxI2cBus;
