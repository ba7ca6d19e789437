//! Monitor control over DDC/CI.
//!
//! This crate ties the `ddc-protocol` wire layer to the `ddc-features`
//! registry: discover the displays attached to the local I2C busses, read and
//! write VCP features by code or by name, and report what each display
//! supports.
//!
//! # Quick Start
//!
//! ```no_run
//! # #[cfg(target_os = "linux")]
//! # fn example() -> anyhow::Result<()> {
//! use ddc_client::{discover, select_monitors, Config, Vcp};
//!
//! let config = Config::default();
//! let monitors = discover(&config)?;
//!
//! for monitor in select_monitors(&monitors, &["ALL"])? {
//!     let mut monitor = monitor.lock();
//!     println!("{}", monitor.description()?);
//!
//!     let (current, max) = monitor.get_feature_value("brightness")?;
//!     println!("brightness {current}/{max}");
//!
//!     monitor.set_feature_value_named("input", "HDMI-1")?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Threading
//!
//! Everything is synchronous. A discovered monitor is shared as a
//! [`SharedMonitor`], whose mutex serializes access to its bus handle;
//! different monitors can be driven from different threads.
//!
//! # Error Handling
//!
//! [`MonitorError`] wraps protocol and registry errors. Only IO and checksum
//! failures are retryable, and only the chunked string read retries on its
//! own.
//!
//! # Safety
//!
//! This crate is `#![forbid(unsafe_code)]` and uses only safe Rust.

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::all)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod config;
pub mod discovery;
pub mod errors;
pub mod monitor;

// Re-exports
pub use config::Config;
pub use discovery::{enumerate_nodes, probe, select_monitors};
pub use errors::MonitorError;
pub use monitor::{FeatureId, FeatureReport, FeatureValue, Monitor, Vcp};

#[cfg(target_os = "linux")]
pub use discovery::{discover, reset_discovery_cache};

use std::sync::Arc;

/// Type alias for a thread-safe handle to a monitor.
///
/// Discovery hands out clones of the same handle, so every user of one
/// display goes through the same bus handle and memoized state.
pub type SharedMonitor<D> = Arc<parking_lot::Mutex<Monitor<D>>>;
