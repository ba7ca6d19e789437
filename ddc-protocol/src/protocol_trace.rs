//! Opt-in hexdump of every DDC/CI frame.
//!
//! Enabled with `DDC_TRACE=1` (or at runtime with [`set_enabled`]). Output goes
//! to the `protocol_trace` tracing target at info level.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};

static TRACE_ENABLED: Lazy<AtomicBool> = Lazy::new(|| {
    let on = std::env::var("DDC_TRACE")
        .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE"))
        .unwrap_or(false);
    AtomicBool::new(on)
});

/// Whether frame tracing is active.
#[inline]
pub fn enabled() -> bool {
    TRACE_ENABLED.load(Ordering::Relaxed)
}

/// Turn frame tracing on or off for the whole process.
#[inline]
pub fn set_enabled(on: bool) {
    TRACE_ENABLED.store(on, Ordering::Relaxed)
}

/// Log an outbound frame.
#[inline]
pub fn out_frame(name: &str, frame: &[u8]) {
    if enabled() {
        tracing::info!(target: "protocol_trace", "OUT {} ({} bytes)", name, frame.len());
        hexdump("  >", frame, 64);
    }
}

/// Log an inbound frame.
#[inline]
pub fn in_frame(name: &str, frame: &[u8]) {
    if enabled() {
        tracing::info!(target: "protocol_trace", "IN  {} ({} bytes)", name, frame.len());
        hexdump("  <", frame, 64);
    }
}

/// Dump up to `max` bytes of `data`, sixteen per line.
pub fn hexdump(prefix: &str, data: &[u8], max: usize) {
    if !enabled() || data.is_empty() {
        return;
    }
    let max = max.min(data.len());
    for chunk in data[..max].chunks(16) {
        tracing::info!(target: "protocol_trace", "{}{}", prefix, format_hex(chunk));
    }
}

fn format_hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut line = String::with_capacity(bytes.len() * 3);
    for b in bytes {
        let _ = write!(line, " {:02X}", b);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0x51, 0x82, 0x01, 0x10]), " 51 82 01 10");
        assert_eq!(format_hex(&[]), "");
    }
}
