//! I2C bus device abstractions.
//!
//! A [`BusHandle`] owns one open `/dev/i2c-*` node bound to the DDC/CI slave
//! address. Device access goes through the [`BusDevice`] trait so the framing
//! layers can run against the Linux `i2c-dev` driver ([`LinuxI2cBus`]) or an
//! in-memory device in tests.
//!
//! # Examples
//!
//! ```no_run
//! # #[cfg(target_os = "linux")]
//! # fn example() -> Result<(), ddc_protocol::DdcError> {
//! use ddc_protocol::bus::{BusHandle, LinuxI2cBus};
//!
//! let mut bus = BusHandle::<LinuxI2cBus>::open("/dev/i2c-4")?;
//! assert!(bus.is_open());
//! bus.close();
//! bus.close(); // idempotent
//! # Ok(())
//! # }
//! ```

use crate::errors::{AccessContext, DdcError};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// DDC/CI command slave address on the display's I2C bus.
pub const DDCCI_ADDR: u16 = 0x37;

/// EDID EEPROM slave address.
pub const EDID_ADDR: u16 = 0x50;

/// Raw access to one I2C bus node.
///
/// Every read and write is a single bus transaction addressed to the slave
/// selected by [`open`](Self::open) or [`set_address`](Self::set_address).
pub trait BusDevice: Send {
    /// Open the node at `path` and select `address` as the slave.
    fn open(path: &Path, address: u16) -> io::Result<Self>
    where
        Self: Sized;

    /// Select a different slave address for subsequent transactions.
    fn set_address(&mut self, address: u16) -> io::Result<()>;

    /// Fill `buf` from the bus.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Write `data` to the bus.
    fn write(&mut self, data: &[u8]) -> io::Result<()>;
}

/// `i2c-dev` backed bus device.
#[cfg(target_os = "linux")]
pub struct LinuxI2cBus {
    device: i2cdev::linux::LinuxI2CDevice,
}

#[cfg(target_os = "linux")]
impl BusDevice for LinuxI2cBus {
    fn open(path: &Path, address: u16) -> io::Result<Self> {
        let device = i2cdev::linux::LinuxI2CDevice::new(path, address).map_err(io::Error::from)?;
        Ok(Self { device })
    }

    fn set_address(&mut self, address: u16) -> io::Result<()> {
        self.device
            .set_slave_address(address)
            .map_err(io::Error::from)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<()> {
        use i2cdev::core::I2CDevice;
        self.device.read(buf).map_err(io::Error::from)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        use i2cdev::core::I2CDevice;
        self.device.write(data).map_err(io::Error::from)
    }
}

/// Exclusive owner of an open bus node.
///
/// The handle records when the last write completed so the transport can
/// honour the inter-message delay. Once [`close`](Self::close) has run, every
/// attempt to reach the device fails with [`DdcError::Io`].
pub struct BusHandle<D> {
    path: PathBuf,
    device: Option<D>,
    last_write: Option<Instant>,
}

impl<D: BusDevice> BusHandle<D> {
    /// Open `path`, bind the DDC/CI address and confirm the bus responds.
    ///
    /// # Errors
    ///
    /// - [`DdcError::Permission`] if the node is not accessible, with owner details
    /// - [`DdcError::Io`] if the node cannot be opened or the confirmatory read fails
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DdcError> {
        let path = path.as_ref();
        let device = D::open(path, DDCCI_ADDR).map_err(|e| open_error(path, e))?;
        Self::attach(path, device)
    }

    /// Wrap an already opened device, performing the confirmatory 1-byte read.
    ///
    /// # Errors
    ///
    /// Returns [`DdcError::Io`] if the read fails.
    pub fn attach(path: impl Into<PathBuf>, mut device: D) -> Result<Self, DdcError> {
        let path = path.into();
        let mut probe = [0u8; 1];
        device.read(&mut probe).map_err(|e| {
            DdcError::io_with(format!("Unable to read from I2C bus {}", path.display()), e)
        })?;
        tracing::debug!("Opened {} (probe byte 0x{:02X})", path.display(), probe[0]);

        Ok(Self {
            path,
            device: Some(device),
            last_write: None,
        })
    }

    /// Access the device, failing if the handle has been closed.
    pub fn device_mut(&mut self) -> Result<&mut D, DdcError> {
        let path = &self.path;
        self.device
            .as_mut()
            .ok_or_else(|| DdcError::io(format!("Bus handle for {} is closed", path.display())))
    }
}

impl<D> BusHandle<D> {
    /// Path of the device node.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true until the handle is closed.
    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    /// Completion time of the most recent write, if any.
    pub fn last_write(&self) -> Option<Instant> {
        self.last_write
    }

    pub(crate) fn record_write(&mut self, at: Instant) {
        self.last_write = Some(at);
    }

    /// Close the device. Safe to call any number of times.
    pub fn close(&mut self) {
        if self.device.take().is_some() {
            tracing::debug!("Closed {}", self.path.display());
        }
    }
}

impl<D> Drop for BusHandle<D> {
    fn drop(&mut self) {
        self.close();
    }
}

fn open_error(path: &Path, err: io::Error) -> DdcError {
    if err.kind() == io::ErrorKind::PermissionDenied {
        DdcError::Permission {
            path: path.to_path_buf(),
            access: access_context(path),
        }
    } else {
        DdcError::io_with(format!("Unable to open VCP at {}", path.display()), err)
    }
}

/// Collect ownership details for a device node that refused to open.
#[must_use]
pub fn access_context(path: &Path) -> AccessContext {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .ok()
        .filter(|u| !u.is_empty());

    let gid = node_gid(path);
    let (group, user_in_group) = match (gid, std::fs::read_to_string("/etc/group")) {
        (Some(gid), Ok(contents)) => lookup_group(&contents, gid, user.as_deref()),
        _ => (None, None),
    };

    AccessContext {
        user,
        group,
        gid,
        user_in_group,
    }
}

#[cfg(unix)]
fn node_gid(path: &Path) -> Option<u32> {
    use std::os::unix::fs::MetadataExt;
    std::fs::metadata(path).ok().map(|m| m.gid())
}

#[cfg(not(unix))]
fn node_gid(_path: &Path) -> Option<u32> {
    None
}

/// Resolve `gid` in `/etc/group` syntax and check whether `user` is a listed member.
fn lookup_group(contents: &str, gid: u32, user: Option<&str>) -> (Option<String>, Option<bool>) {
    for line in contents.lines() {
        let mut fields = line.split(':');
        let (Some(name), Some(_), Some(id), members) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        if id.trim().parse::<u32>().ok() != Some(gid) {
            continue;
        }
        let is_member = user.map(|user| {
            members
                .unwrap_or("")
                .split(',')
                .any(|member| member.trim() == user)
        });
        return (Some(name.to_string()), is_member);
    }
    (None, None)
}
