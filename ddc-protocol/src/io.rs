//! Timed raw transport over a [`BusHandle`].
//!
//! DDC/CI displays need breathing room between messages: at least
//! [`WRITE_DELAY`] from the end of one write to the start of the next, and
//! [`RESPONSE_DELAY`] between a request and reading its reply. The transport
//! enforces both by sleeping for whatever part of the interval has not yet
//! elapsed. Bus errors are surfaced immediately and never retried here.
//!
//! # Examples
//!
//! ```no_run
//! # #[cfg(target_os = "linux")]
//! # fn example() -> Result<(), ddc_protocol::DdcError> {
//! use ddc_protocol::bus::{BusHandle, LinuxI2cBus};
//! use ddc_protocol::io::{DdcTransport, Timing};
//!
//! let bus = BusHandle::<LinuxI2cBus>::open("/dev/i2c-4")?;
//! let mut transport = DdcTransport::new(bus, Timing::default());
//! transport.write(&[0x51, 0x82, 0x01, 0x10, 0xAC])?;
//! transport.settle();
//! let reply = transport.read(11)?;
//! # let _ = reply;
//! # Ok(())
//! # }
//! ```

use crate::bus::{BusDevice, BusHandle, DDCCI_ADDR};
use crate::errors::DdcError;
use bytes::BytesMut;
use std::time::{Duration, Instant};

/// Minimum gap between the end of a write and the start of the next one.
pub const WRITE_DELAY: Duration = Duration::from_millis(50);

/// Minimum settle time between a request and reading its reply.
pub const RESPONSE_DELAY: Duration = Duration::from_millis(40);

/// Bus pacing applied by [`DdcTransport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Gap enforced between consecutive writes.
    pub write_delay: Duration,
    /// Wait between a write and the read of its reply.
    pub response_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            write_delay: WRITE_DELAY,
            response_delay: RESPONSE_DELAY,
        }
    }
}

impl Timing {
    /// Raise both delays to at least the protocol minimums.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            write_delay: self.write_delay.max(WRITE_DELAY),
            response_delay: self.response_delay.max(RESPONSE_DELAY),
        }
    }
}

/// Paced reads and writes on one bus handle.
pub struct DdcTransport<D> {
    bus: BusHandle<D>,
    timing: Timing,
}

impl<D: BusDevice> DdcTransport<D> {
    /// Wrap `bus`; delays shorter than the protocol minimums are raised.
    pub fn new(bus: BusHandle<D>, timing: Timing) -> Self {
        Self {
            bus,
            timing: timing.clamped(),
        }
    }

    /// Write `data` as one bus transaction, first waiting out the write delay.
    ///
    /// The completion time is recorded even when the write fails, so the next
    /// attempt is spaced from this one.
    pub fn write(&mut self, data: &[u8]) -> Result<(), DdcError> {
        self.wait_for_write_slot();
        let path = self.bus.path().to_path_buf();
        let result = self.bus.device_mut()?.write(data);
        self.bus.record_write(Instant::now());
        result.map_err(|e| DdcError::io_with(format!("Write to {} failed", path.display()), e))
    }

    /// Read exactly `len` bytes as one bus transaction.
    pub fn read(&mut self, len: usize) -> Result<BytesMut, DdcError> {
        let path = self.bus.path().to_path_buf();
        let mut buf = BytesMut::zeroed(len);
        self.bus
            .device_mut()?
            .read(&mut buf)
            .map_err(|e| DdcError::io_with(format!("Read from {} failed", path.display()), e))?;
        Ok(buf)
    }

    /// Sleep until the response delay since the last write has elapsed.
    pub fn settle(&self) {
        if let Some(last) = self.bus.last_write() {
            sleep_until(last + self.timing.response_delay);
        }
    }

    /// Write `offset` to the slave at `address` and read `len` bytes back,
    /// restoring the DDC/CI address afterwards.
    pub fn read_register(&mut self, address: u16, offset: u8, len: usize) -> Result<BytesMut, DdcError> {
        self.set_address(address)?;
        let result = self.write(&[offset]).and_then(|()| self.read(len));
        let restored = self.set_address(DDCCI_ADDR);
        let data = result?;
        restored?;
        Ok(data)
    }

    fn set_address(&mut self, address: u16) -> Result<(), DdcError> {
        let path = self.bus.path().to_path_buf();
        self.bus.device_mut()?.set_address(address).map_err(|e| {
            DdcError::io_with(
                format!("Unable to select slave 0x{:02X} on {}", address, path.display()),
                e,
            )
        })
    }

    fn wait_for_write_slot(&self) {
        if let Some(last) = self.bus.last_write() {
            sleep_until(last + self.timing.write_delay);
        }
    }
}

impl<D> DdcTransport<D> {
    /// Active pacing.
    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// The underlying bus handle.
    pub fn bus(&self) -> &BusHandle<D> {
        &self.bus
    }

    /// Close the underlying bus handle. Idempotent.
    pub fn close(&mut self) {
        self.bus.close();
    }
}

fn sleep_until(deadline: Instant) {
    let now = Instant::now();
    if deadline > now {
        let wait = deadline - now;
        tracing::trace!("Sleeping {:?} for bus timing", wait);
        std::thread::sleep(wait);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::EDID_ADDR;
    use std::io;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct Log(Arc<Mutex<Vec<(Instant, String)>>>);

    impl Log {
        fn push(&self, event: String) {
            self.0.lock().unwrap().push((Instant::now(), event));
        }

        fn events(&self) -> Vec<(Instant, String)> {
            self.0.lock().unwrap().clone()
        }
    }

    struct RecordingDevice {
        log: Log,
        fail_writes: bool,
    }

    impl BusDevice for RecordingDevice {
        fn open(_path: &Path, _address: u16) -> io::Result<Self> {
            Err(io::Error::from(io::ErrorKind::Unsupported))
        }

        fn set_address(&mut self, address: u16) -> io::Result<()> {
            self.log.push(format!("addr {address:02X}"));
            Ok(())
        }

        fn read(&mut self, buf: &mut [u8]) -> io::Result<()> {
            self.log.push(format!("read {}", buf.len()));
            buf.iter_mut().enumerate().for_each(|(i, b)| *b = i as u8);
            Ok(())
        }

        fn write(&mut self, data: &[u8]) -> io::Result<()> {
            self.log.push(format!("write {data:02X?}"));
            if self.fail_writes {
                return Err(io::Error::from(io::ErrorKind::BrokenPipe));
            }
            Ok(())
        }
    }

    fn transport(fail_writes: bool) -> (DdcTransport<RecordingDevice>, Log) {
        let log = Log::default();
        let device = RecordingDevice {
            log: log.clone(),
            fail_writes,
        };
        let bus = BusHandle::attach("/dev/i2c-test", device).unwrap();
        (DdcTransport::new(bus, Timing::default()), log)
    }

    #[test]
    fn test_consecutive_writes_are_spaced() {
        let (mut transport, log) = transport(false);
        transport.write(&[0x01]).unwrap();
        transport.write(&[0x02]).unwrap();

        let writes: Vec<Instant> = log
            .events()
            .into_iter()
            .filter(|(_, e)| e.starts_with("write"))
            .map(|(t, _)| t)
            .collect();
        assert_eq!(writes.len(), 2);
        assert!(writes[1] - writes[0] >= WRITE_DELAY);
    }

    #[test]
    fn test_settle_waits_response_delay() {
        let (mut transport, _) = transport(false);
        transport.write(&[0x01]).unwrap();
        let written = transport.bus().last_write().unwrap();
        transport.settle();
        assert!(written.elapsed() >= RESPONSE_DELAY);
    }

    #[test]
    fn test_timing_is_clamped_to_minimums() {
        let timing = Timing {
            write_delay: Duration::from_millis(5),
            response_delay: Duration::from_millis(100),
        }
        .clamped();
        assert_eq!(timing.write_delay, WRITE_DELAY);
        assert_eq!(timing.response_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_write_failure_is_io_and_still_spaces_next_write() {
        let (mut transport, _) = transport(true);
        let err = transport.write(&[0x01]).unwrap_err();
        assert!(matches!(err, DdcError::Io { .. }));
        assert!(transport.bus().last_write().is_some());
    }

    #[test]
    fn test_read_register_restores_ddcci_address() {
        let (mut transport, log) = transport(false);
        let data = transport.read_register(EDID_ADDR, 0x00, 4).unwrap();
        assert_eq!(&data[..], &[0, 1, 2, 3]);

        let events: Vec<String> = log.events().into_iter().map(|(_, e)| e).collect();
        assert_eq!(
            events,
            vec![
                "read 1".to_string(),
                "addr 50".to_string(),
                "write [00]".to_string(),
                "read 4".to_string(),
                "addr 37".to_string(),
            ]
        );
    }

    #[test]
    fn test_closed_transport_refuses_io() {
        let (mut transport, _) = transport(false);
        transport.close();
        assert!(transport.write(&[0x01]).is_err());
        assert!(transport.read(1).is_err());
    }
}
