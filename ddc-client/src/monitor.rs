//! Monitor facade over one DDC/CI bus.
//!
//! A [`Monitor`] owns its bus handle (opened on first use unless discovery
//! already opened it) and memoizes what never changes while the display stays
//! connected: capabilities, supported values and EDID.
//!
//! Features can be named by code, by registry name, or by a resolved
//! [`Feature`]. Plain reads and writes only need the code; resolving a full
//! [`Feature`] also consults the display's model so model overrides apply.

use crate::errors::MonitorError;
use ddc_features::{Capabilities, Feature, FeatureError, FeatureTable, SupportedFeature};
use ddc_protocol::{BusDevice, ClientOptions, DdcCiClient, DdcError, Edid};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A way of naming a VCP feature.
#[derive(Debug, Clone, Copy)]
pub enum FeatureId<'a> {
    /// Raw VCP code.
    Code(u8),
    /// Registry name or hex code text.
    Name(&'a str),
    /// Already resolved feature.
    Feature(&'a Feature),
}

impl FeatureId<'_> {
    /// The VCP code, resolved against `table` without model overrides.
    pub fn code(&self, table: &FeatureTable) -> Result<u8, FeatureError> {
        match self {
            Self::Code(code) => Ok(*code),
            Self::Name(name) => Ok(table.lookup(name, None)?.code),
            Self::Feature(feature) => Ok(feature.code),
        }
    }
}

impl From<u8> for FeatureId<'_> {
    fn from(code: u8) -> Self {
        Self::Code(code)
    }
}

impl<'a> From<&'a str> for FeatureId<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for FeatureId<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a Feature> for FeatureId<'a> {
    fn from(feature: &'a Feature) -> Self {
        Self::Feature(feature)
    }
}

/// A feature value with its registered names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureValue {
    /// Resolved feature.
    pub feature: Feature,
    /// Current value.
    pub current: u16,
    /// Name of the current value.
    pub current_name: Option<String>,
    /// Maximum value.
    pub max: u16,
    /// Name of the maximum value.
    pub max_name: Option<String>,
}

/// One line of a feature report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureReport {
    /// Resolved feature.
    pub feature: Feature,
    /// Current value.
    pub current: u16,
    /// Maximum value.
    pub max: u16,
    /// Values to show, including the current one.
    pub values: BTreeSet<u16>,
}

impl FeatureReport {
    /// Values with their names, `UNKNOWN` when unnamed.
    pub fn named_values(&self) -> Vec<(u16, &str)> {
        self.values
            .iter()
            .map(|&value| (value, self.feature.name_for(value).unwrap_or("UNKNOWN")))
            .collect()
    }
}

/// Operations shared by every monitor backend.
pub trait Vcp {
    /// Resolve a feature, applying model overrides for this display.
    fn feature<'a>(&mut self, feature: impl Into<FeatureId<'a>>) -> Result<Feature, MonitorError>;

    /// Current and maximum value of a feature.
    fn get_feature_value<'a>(&mut self, feature: impl Into<FeatureId<'a>>) -> Result<(u16, u16), MonitorError>;

    /// Write a feature value.
    fn set_feature_value<'a>(&mut self, feature: impl Into<FeatureId<'a>>, value: u16) -> Result<(), MonitorError>;

    /// Parsed capabilities string.
    fn capabilities(&mut self) -> Result<&Capabilities, MonitorError>;

    /// Current and maximum value of a feature together with their names.
    fn get_feature_value_with_names<'a>(
        &mut self,
        feature: impl Into<FeatureId<'a>>,
    ) -> Result<FeatureValue, MonitorError> {
        let feature = self.feature(feature)?;
        let (current, max) = self.get_feature_value(&feature)?;
        Ok(FeatureValue {
            current_name: feature.name_for(current).map(str::to_string),
            max_name: feature.name_for(max).map(str::to_string),
            current,
            max,
            feature,
        })
    }
}

/// A display reachable over one I2C bus.
pub struct Monitor<D> {
    index: usize,
    path: PathBuf,
    options: ClientOptions,
    table: Arc<FeatureTable>,
    client: Option<DdcCiClient<D>>,
    closed: bool,
    capabilities: Option<Capabilities>,
    supported: Option<BTreeMap<u8, SupportedFeature>>,
    edid: Option<Edid>,
    model: Option<Option<String>>,
}

impl<D> Monitor<D> {
    /// A monitor whose bus is opened on first use.
    pub fn new(index: usize, path: impl Into<PathBuf>, options: ClientOptions, table: Arc<FeatureTable>) -> Self {
        Self {
            index,
            path: path.into(),
            options,
            table,
            client: None,
            closed: false,
            capabilities: None,
            supported: None,
            edid: None,
            model: None,
        }
    }

    /// A monitor around an already opened client.
    pub fn from_client(index: usize, client: DdcCiClient<D>, table: Arc<FeatureTable>) -> Self {
        let mut monitor = Self::new(index, client.path(), *client.options(), table);
        monitor.client = Some(client);
        monitor
    }

    /// Position in the discovery order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Device node path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Feature table used to resolve names.
    pub fn table(&self) -> &Arc<FeatureTable> {
        &self.table
    }

    /// Whether the bus handle is currently open.
    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    /// Release the bus handle. Later bus operations fail. Idempotent.
    pub fn close(&mut self) {
        if let Some(mut client) = self.client.take() {
            tracing::debug!("Closing monitor {} ({})", self.index, self.path.display());
            client.close();
        }
        self.closed = true;
    }
}

impl<D> fmt::Debug for Monitor<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("index", &self.index)
            .field("path", &self.path)
            .field("open", &self.is_open())
            .field("model", &self.model)
            .finish()
    }
}

impl<D: BusDevice> Monitor<D> {
    fn client(&mut self) -> Result<&mut DdcCiClient<D>, MonitorError> {
        if self.closed {
            return Err(DdcError::io(format!("Monitor {} ({}) is closed", self.index, self.path.display())).into());
        }
        let client = match self.client.take() {
            Some(client) => client,
            None => DdcCiClient::open(&self.path, self.options)?,
        };
        Ok(self.client.insert(client))
    }

    /// Decoded EDID block.
    pub fn edid(&mut self) -> Result<&Edid, MonitorError> {
        let edid = match self.edid.take() {
            Some(edid) => edid,
            None => Edid::parse(&self.client()?.read_edid()?)?,
        };
        Ok(self.edid.insert(edid))
    }

    /// Model name used as the key for registry overrides.
    ///
    /// Taken from the EDID model descriptor, else from the capabilities
    /// `model` token. A found model is kept for the life of the monitor. A
    /// miss is only kept once both reads succeeded; after a read error the
    /// next call asks the display again.
    pub fn model(&mut self) -> Option<String> {
        if let Some(model) = &self.model {
            return model.clone();
        }

        let (from_edid, edid_read) = match self.edid() {
            Ok(edid) => (edid.model.clone(), true),
            Err(e) => {
                tracing::debug!("No EDID model for monitor {}: {}", self.index, e);
                (None, false)
            }
        };
        if let Some(model) = from_edid {
            tracing::debug!("Monitor {} model: {}", self.index, model);
            self.model = Some(Some(model.clone()));
            return Some(model);
        }

        match self.capabilities() {
            Ok(capabilities) => {
                let model = capabilities.model().map(str::to_string);
                tracing::debug!("Monitor {} model: {:?}", self.index, model);
                if model.is_some() || edid_read {
                    self.model = Some(model.clone());
                }
                model
            }
            Err(e) => {
                tracing::debug!("No capabilities model for monitor {}: {}", self.index, e);
                None
            }
        }
    }

    /// `"{edid} @ {path}"`.
    pub fn description(&mut self) -> Result<String, MonitorError> {
        let edid = self.edid()?.to_string();
        Ok(format!("{} @ {}", edid, self.path.display()))
    }

    /// The display's identity string.
    pub fn identity(&mut self) -> Result<String, MonitorError> {
        Ok(self.client()?.identity_string()?)
    }

    /// Ask the display to persist its current settings.
    pub fn save_settings(&mut self) -> Result<(), MonitorError> {
        Ok(self.client()?.save_current_settings()?)
    }

    /// Write a value given as hex text or a value name, e.g. `"HDMI-1"`.
    pub fn set_feature_value_named<'a>(
        &mut self,
        feature: impl Into<FeatureId<'a>>,
        value: &str,
    ) -> Result<(), MonitorError> {
        let feature = self.feature(feature)?;
        let value = feature.normalize_value(value)?;
        self.set_feature_value(&feature, value)
    }

    /// Supported features and their values, keyed by code.
    pub fn supported_features(&mut self) -> Result<&BTreeMap<u8, SupportedFeature>, MonitorError> {
        let supported = match self.supported.take() {
            // Rebuilt while the model is unresolved so overrides apply once it is.
            Some(supported) if self.model.is_some() => supported,
            _ => {
                let model = self.model();
                let table = Arc::clone(&self.table);
                self.capabilities()?.supported_values(&table, model.as_deref())
            }
        };
        Ok(self.supported.insert(supported))
    }

    /// Supported values of one feature as `0xNN` to name. Empty when the
    /// display does not declare the feature.
    pub fn get_supported_values<'a>(
        &mut self,
        feature: impl Into<FeatureId<'a>>,
    ) -> Result<BTreeMap<String, String>, MonitorError> {
        let id: FeatureId<'a> = feature.into();
        let code = id.code(&self.table)?;
        Ok(self
            .supported_features()?
            .get(&code)
            .map(SupportedFeature::named_values)
            .unwrap_or_default())
    }

    /// Current value and value set of each supported feature.
    ///
    /// With an empty `only`, every supported feature is reported. Features
    /// that fail to read are skipped.
    pub fn feature_report(&mut self, only: &[FeatureId<'_>]) -> Result<Vec<FeatureReport>, MonitorError> {
        let allowed = only
            .iter()
            .map(|id| id.code(&self.table))
            .collect::<Result<BTreeSet<u8>, _>>()?;
        let supported: Vec<SupportedFeature> = self
            .supported_features()?
            .values()
            .filter(|s| allowed.is_empty() || allowed.contains(&s.feature.code))
            .cloned()
            .collect();

        let mut report = Vec::with_capacity(supported.len());
        for s in supported {
            match self.client()?.get_vcp_feature(s.feature.code) {
                Ok(reply) => report.push(FeatureReport {
                    values: s.with_current(reply.current),
                    current: reply.current,
                    max: reply.max,
                    feature: s.feature,
                }),
                Err(e) => tracing::debug!("Skipping {} in report: {}", s.feature, e),
            }
        }
        Ok(report)
    }
}

impl<D: BusDevice> Vcp for Monitor<D> {
    fn feature<'a>(&mut self, feature: impl Into<FeatureId<'a>>) -> Result<Feature, MonitorError> {
        let id: FeatureId<'a> = feature.into();
        match id {
            FeatureId::Feature(feature) => Ok(feature.clone()),
            FeatureId::Code(code) => {
                let model = self.model();
                Ok(self.table.for_code(code, model.as_deref()))
            }
            FeatureId::Name(name) => {
                let model = self.model();
                Ok(self.table.lookup(name, model.as_deref())?)
            }
        }
    }

    fn get_feature_value<'a>(&mut self, feature: impl Into<FeatureId<'a>>) -> Result<(u16, u16), MonitorError> {
        let id: FeatureId<'a> = feature.into();
        let code = id.code(&self.table)?;
        let reply = self.client()?.get_vcp_feature(code)?;
        Ok((reply.current, reply.max))
    }

    fn set_feature_value<'a>(&mut self, feature: impl Into<FeatureId<'a>>, value: u16) -> Result<(), MonitorError> {
        let id: FeatureId<'a> = feature.into();
        let code = id.code(&self.table)?;
        Ok(self.client()?.set_vcp_feature(code, value)?)
    }

    fn capabilities(&mut self) -> Result<&Capabilities, MonitorError> {
        let capabilities = match self.capabilities.take() {
            Some(capabilities) => capabilities,
            None => {
                let raw = self.client()?.capabilities_string()?;
                tracing::debug!("Monitor {} capabilities: {}", self.index, raw);
                Capabilities::parse(&raw)
            }
        };
        Ok(self.capabilities.insert(capabilities))
    }
}
