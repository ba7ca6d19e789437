//! Monitor discovery and selection.
//!
//! Discovery walks the I2C device nodes in numeric order and keeps every node
//! that opens and answers the confirmatory read. Nodes that fail are logged at
//! debug level and skipped; they are usually busses with nothing attached.

use crate::config::Config;
use crate::errors::MonitorError;
use crate::monitor::Monitor;
use crate::SharedMonitor;
use ddc_features::FeatureTable;
use ddc_protocol::{BusDevice, BusHandle, DdcCiClient, DdcError};
use glob::Pattern;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Device nodes named `{prefix}{number}` in `dir`, sorted by number.
pub fn enumerate_nodes(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>, MonitorError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| DdcError::io_with(format!("Unable to list {}", dir.display()), e))?;

    let mut nodes: Vec<(u32, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name();
            let number = name.to_str()?.strip_prefix(prefix)?.parse::<u32>().ok()?;
            Some((number, entry.path()))
        })
        .collect();
    nodes.sort_by_key(|(number, _)| *number);
    Ok(nodes.into_iter().map(|(_, path)| path).collect())
}

/// Open every device node and keep those that respond.
///
/// Monitors are numbered by their position in the result.
pub fn probe<D: BusDevice>(config: &Config, table: &Arc<FeatureTable>) -> Result<Vec<Monitor<D>>, MonitorError> {
    let options = config.client_options();
    let mut monitors = Vec::new();

    for path in enumerate_nodes(&config.bus.device_dir, &config.bus.device_prefix)? {
        match BusHandle::<D>::open(&path) {
            Ok(bus) => {
                tracing::debug!("Found DDC/CI bus {}", path.display());
                let client = DdcCiClient::new(bus, options);
                monitors.push(Monitor::from_client(monitors.len(), client, Arc::clone(table)));
            }
            Err(e) => tracing::debug!("Skipping {}: {}", path.display(), e),
        }
    }
    Ok(monitors)
}

#[cfg(target_os = "linux")]
mod cache {
    use super::*;
    use ddc_protocol::LinuxI2cBus;
    use once_cell::sync::Lazy;
    use parking_lot::Mutex;

    static DISCOVERED: Lazy<Mutex<Option<Vec<SharedMonitor<LinuxI2cBus>>>>> = Lazy::new(|| Mutex::new(None));

    /// Discover monitors on the local I2C busses.
    ///
    /// The result is cached for the life of the process; `config` only takes
    /// effect on the first call after start-up or [`reset_discovery_cache`].
    pub fn discover(config: &Config) -> Result<Vec<SharedMonitor<LinuxI2cBus>>, MonitorError> {
        let mut cached = DISCOVERED.lock();
        if let Some(monitors) = cached.as_ref() {
            return Ok(monitors.clone());
        }

        let table = config.feature_table()?;
        let monitors: Vec<_> = probe::<LinuxI2cBus>(config, &table)?
            .into_iter()
            .map(|monitor| Arc::new(Mutex::new(monitor)))
            .collect();
        tracing::info!("Discovered {} monitor(s)", monitors.len());
        *cached = Some(monitors.clone());
        Ok(monitors)
    }

    /// Drop the cached discovery result. Handles close once the last
    /// reference to each monitor goes away.
    pub fn reset_discovery_cache() {
        if DISCOVERED.lock().take().is_some() {
            tracing::debug!("Discovery cache cleared");
        }
    }
}

#[cfg(target_os = "linux")]
pub use cache::{discover, reset_discovery_cache};

/// Pick monitors by position, by description, or all of them with `*` or
/// `ALL` (or no patterns).
///
/// Text patterns are shell globs matched against the whole description
/// (`"{edid} @ {path}"`). When no glob matches any monitor, they are retried
/// as plain substrings. Results keep discovery order and contain no
/// duplicates.
///
/// Descriptions are read with `try_lock`, so a monitor whose lock is held
/// elsewhere (including by the caller) can still be selected by position but
/// is skipped for text patterns.
///
/// # Errors
///
/// Returns [`MonitorError::NoSuchMonitor`] if nothing matches.
pub fn select_monitors<D, S>(monitors: &[SharedMonitor<D>], patterns: &[S]) -> Result<Vec<SharedMonitor<D>>, MonitorError>
where
    D: BusDevice,
    S: AsRef<str>,
{
    let patterns: Vec<&str> = patterns.iter().map(|p| p.as_ref()).collect();
    if patterns.is_empty() || patterns.iter().any(|p| *p == "*" || *p == "ALL") {
        return Ok(monitors.to_vec());
    }

    let (numbers, texts): (Vec<&str>, Vec<&str>) = patterns
        .iter()
        .copied()
        .partition(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
    let positions: Vec<usize> = numbers.iter().filter_map(|n| n.parse().ok()).collect();

    let mut chosen: Vec<bool> = (0..monitors.len()).map(|position| positions.contains(&position)).collect();
    if !texts.is_empty() {
        let descriptions: Vec<Option<String>> = monitors
            .iter()
            .enumerate()
            .map(|(position, monitor)| describe(position, monitor))
            .collect();
        let globs: Vec<Pattern> = texts.iter().filter_map(|text| Pattern::new(text).ok()).collect();

        let mut matched = false;
        for (flag, description) in chosen.iter_mut().zip(&descriptions) {
            if let Some(description) = description {
                if globs.iter().any(|glob| glob.matches(description)) {
                    *flag = true;
                    matched = true;
                }
            }
        }
        if !matched {
            for (flag, description) in chosen.iter_mut().zip(&descriptions) {
                if let Some(description) = description {
                    if texts.iter().any(|text| description.contains(*text)) {
                        *flag = true;
                    }
                }
            }
        }
    }

    let selected: Vec<SharedMonitor<D>> = monitors
        .iter()
        .zip(chosen)
        .filter(|(_, chosen)| *chosen)
        .map(|(monitor, _)| Arc::clone(monitor))
        .collect();

    if selected.is_empty() {
        return Err(MonitorError::NoSuchMonitor(patterns.join(", ")));
    }
    Ok(selected)
}

fn describe<D: BusDevice>(position: usize, monitor: &SharedMonitor<D>) -> Option<String> {
    let Some(mut monitor) = monitor.try_lock() else {
        tracing::debug!("Monitor {} is busy; not matching its description", position);
        return None;
    };
    match monitor.description() {
        Ok(description) => Some(description),
        Err(e) => {
            tracing::debug!("Monitor {} has no description: {}", position, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_enumerate_nodes_numeric_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["i2c-10", "i2c-2", "i2c-1", "i2c-x", "tty0", "i2c-"] {
            fs::write(dir.path().join(name), "").unwrap();
        }

        let nodes = enumerate_nodes(dir.path(), "i2c-").unwrap();
        let names: Vec<String> = nodes
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["i2c-1", "i2c-2", "i2c-10"]);
    }

    #[test]
    fn test_enumerate_nodes_missing_dir() {
        let err = enumerate_nodes(Path::new("/nonexistent/dev"), "i2c-").unwrap_err();
        assert!(matches!(err, MonitorError::Ddc(DdcError::Io { .. })));
    }
}
