//! VCP feature registry for DDC/CI monitors.
//!
//! Gives meaning to the numeric VCP codes exchanged with a display: feature
//! names, value names, per-model quirks and the capabilities string grammar.
//!
//! # Modules
//!
//! - [`table`] - [`FeatureTable`] lookups by code, name or hex text
//! - [`capabilities`] - Capabilities string parsing and supported value sets
//! - [`errors`] - [`FeatureError`]
//!
//! # Examples
//!
//! ```
//! use ddc_features::{Capabilities, FeatureTable};
//!
//! let table = FeatureTable::shared();
//! let caps = Capabilities::parse("(prot(monitor)type(lcd)vcp(02 04 60(01 02)) mccs_ver(2.1))");
//! let supported = caps.supported_values(&table, None);
//! assert_eq!(supported[&0x60].values.len(), 2);
//!
//! let input = table.lookup("input", None).unwrap();
//! assert_eq!(input.normalize_value("VGA-1").unwrap(), 0x01);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod builtin;
pub mod capabilities;
pub mod errors;
pub mod table;

pub use capabilities::{Capabilities, SupportedFeature};
pub use errors::FeatureError;
pub use table::{parse_code, parse_hex_u16, Feature, FeatureEntry, FeatureTable, ModelOverride, ValueNames};
