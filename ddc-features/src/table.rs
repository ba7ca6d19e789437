//! The feature table: VCP codes, names and value names.
//!
//! A [`FeatureTable`] is plain data built once and then shared read-only.
//! Each code has a default [`FeatureEntry`] and optionally per-model value
//! maps that replace the defaults for displays reporting that model.
//!
//! # Examples
//!
//! ```
//! use ddc_features::FeatureTable;
//!
//! let table = FeatureTable::builtin();
//! let input = table.lookup("input", None).unwrap();
//! assert_eq!(input.code, 0x60);
//! assert_eq!(input.name_for(0x11), Some("HDMI-1"));
//!
//! let samsung = table.for_code(0x60, Some("CRG9_C49RG9xSS (DP)"));
//! assert_eq!(samsung.name_for(0x06), Some("HDMI-1"));
//! ```

use crate::builtin;
use crate::errors::FeatureError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Value code to display name.
pub type ValueNames = BTreeMap<u16, String>;

/// A resolved feature: one code, its name, and the value names that apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// VCP code.
    pub code: u8,
    /// Unique feature name.
    pub name: String,
    /// Model whose override produced this feature, if any.
    pub model: Option<String>,
    /// Known values and their names.
    pub value_names: ValueNames,
    /// Report only the current value instead of the declared set.
    pub hide_extras: bool,
}

impl Feature {
    /// Placeholder for a code the table does not know.
    pub fn unknown(code: u8) -> Self {
        Self {
            code,
            name: format!("unknown feature 0x{code:02X}"),
            model: None,
            value_names: ValueNames::new(),
            hide_extras: false,
        }
    }

    /// Name of `value`, if registered.
    pub fn name_for(&self, value: u16) -> Option<&str> {
        self.value_names.get(&value).map(String::as_str)
    }

    /// Value registered under `name`.
    pub fn code_for(&self, name: &str) -> Option<u16> {
        self.value_names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(value, _)| *value)
    }

    /// Interpret user input as a value of this feature.
    ///
    /// Hex is tried first (optional `0x` prefix), then the value names.
    pub fn normalize_value(&self, input: &str) -> Result<u16, FeatureError> {
        parse_hex_u16(input)
            .or_else(|| self.code_for(input))
            .ok_or_else(|| FeatureError::InvalidValue {
                feature: self.name.clone(),
                input: input.to_string(),
            })
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.model {
            Some(model) => write!(f, "0x{:02X} / {} for {}", self.code, self.name, model),
            None => write!(f, "0x{:02X} / {}", self.code, self.name),
        }
    }
}

/// Table entry for one code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureEntry {
    /// Unique feature name.
    pub name: String,
    /// Default value names.
    pub values: ValueNames,
    /// Report only the current value.
    pub hide_extras: bool,
    /// Model name to the value names used for that model.
    pub overrides: BTreeMap<String, ValueNames>,
}

impl FeatureEntry {
    /// Entry with the given name and value names.
    pub fn new<'a>(name: &str, values: impl IntoIterator<Item = (u16, &'a str)>) -> Self {
        Self {
            name: name.to_string(),
            values: values
                .into_iter()
                .map(|(value, name)| (value, name.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    /// Mark the entry as reporting only its current value.
    #[must_use]
    pub fn hide_extras(mut self) -> Self {
        self.hide_extras = true;
        self
    }
}

/// Per-model value names as written in a configuration file.
///
/// `code` may be a feature name or a hex code; `values` keys are hex.
///
/// ```toml
/// [[features.overrides]]
/// model = "LG FULLHD(HDMI)"
/// code = "0x60"
/// values = { "0x01" = "VGA-1", "0x04" = "HDMI-1" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOverride {
    /// Model name as reported by the display.
    pub model: String,
    /// Feature name or hex code.
    pub code: String,
    /// Hex value to value name.
    pub values: BTreeMap<String, String>,
}

static SHARED: Lazy<Arc<FeatureTable>> = Lazy::new(|| Arc::new(FeatureTable::builtin()));

/// All known features, indexed by code and by name.
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    entries: BTreeMap<u8, FeatureEntry>,
    by_name: HashMap<String, u8>,
}

impl FeatureTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The builtin MCCS features and model overrides.
    pub fn builtin() -> Self {
        builtin::table()
    }

    /// A process-wide builtin table.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    /// Add or replace the entry for `code`.
    pub fn insert(&mut self, code: u8, entry: FeatureEntry) -> Result<(), FeatureError> {
        if let Some(&owner) = self.by_name.get(&entry.name) {
            if owner != code {
                return Err(FeatureError::DuplicateName {
                    name: entry.name,
                    code: owner,
                });
            }
        }
        if let Some(old) = self.entries.get(&code) {
            self.by_name.remove(&old.name);
        }
        self.by_name.insert(entry.name.clone(), code);
        self.entries.insert(code, entry);
        Ok(())
    }

    /// Register value names used by `model` for `code`.
    pub fn add_override(&mut self, model: &str, code: u8, values: ValueNames) -> Result<(), FeatureError> {
        let entry = self
            .entries
            .get_mut(&code)
            .ok_or_else(|| FeatureError::NotFound(format!("0x{code:02X}")))?;
        entry.overrides.insert(model.to_string(), values);
        Ok(())
    }

    /// Apply a configured override, resolving its code and value texts.
    pub fn apply(&mut self, config: &ModelOverride) -> Result<(), FeatureError> {
        let code = self.lookup(&config.code, None)?.code;
        let values = config
            .values
            .iter()
            .map(|(value, name)| {
                parse_hex_u16(value)
                    .map(|value| (value, name.clone()))
                    .ok_or_else(|| FeatureError::InvalidValue {
                        feature: config.code.clone(),
                        input: value.clone(),
                    })
            })
            .collect::<Result<ValueNames, _>>()?;
        tracing::debug!(
            "Override for 0x{:02X} on model {:?}: {} values",
            code,
            config.model,
            values.len()
        );
        self.add_override(&config.model, code, values)
    }

    /// Resolve `code`, preferring an override for `model`.
    ///
    /// Unknown codes yield [`Feature::unknown`].
    pub fn for_code(&self, code: u8, model: Option<&str>) -> Feature {
        let Some(entry) = self.entries.get(&code) else {
            return Feature::unknown(code);
        };
        let (model, value_names) = match model.and_then(|m| entry.overrides.get_key_value(m)) {
            Some((model, values)) => (Some(model.clone()), values.clone()),
            None => (None, entry.values.clone()),
        };
        Feature {
            code,
            name: entry.name.clone(),
            model,
            value_names,
            hide_extras: entry.hide_extras,
        }
    }

    /// Resolve a feature by exact name.
    pub fn for_name(&self, name: &str, model: Option<&str>) -> Result<Feature, FeatureError> {
        self.by_name
            .get(name)
            .map(|&code| self.for_code(code, model))
            .ok_or_else(|| FeatureError::NotFound(name.to_string()))
    }

    /// Resolve by name first, then by hex code.
    pub fn lookup(&self, text: &str, model: Option<&str>) -> Result<Feature, FeatureError> {
        self.for_name(text, model).or_else(|err| match parse_code(text) {
            Ok(code) => Ok(self.for_code(code, model)),
            Err(_) => Err(err),
        })
    }

    /// Registered codes in ascending order.
    pub fn codes(&self) -> impl Iterator<Item = u8> + '_ {
        self.entries.keys().copied()
    }

    /// Entry for `code`.
    pub fn entry(&self, code: u8) -> Option<&FeatureEntry> {
        self.entries.get(&code)
    }

    /// Number of registered codes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a one-byte hex feature code with optional `0x` prefix.
pub fn parse_code(text: &str) -> Result<u8, FeatureError> {
    let digits = strip_hex_prefix(text.trim());
    if digits.is_empty() || digits.len() > 2 {
        return Err(FeatureError::InvalidCode(text.to_string()));
    }
    u8::from_str_radix(digits, 16).map_err(|_| FeatureError::InvalidCode(text.to_string()))
}

/// Parse a hex value with optional `0x` prefix.
pub fn parse_hex_u16(text: &str) -> Option<u16> {
    let digits = strip_hex_prefix(text.trim());
    if digits.is_empty() {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}

fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}
