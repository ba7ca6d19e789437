//! Error types for DDC/CI bus and protocol operations.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the bus, transport and framing layers.
#[derive(Debug, Error)]
pub enum DdcError {
    /// The device node exists but the current user may not open it.
    #[error("Permission denied for {}: {access}", path.display())]
    Permission {
        /// Device node that could not be opened.
        path: PathBuf,
        /// Ownership details for self-diagnosis.
        access: AccessContext,
    },

    /// Open, read or write failure, or a reply that does not belong to the request.
    #[error("I/O error: {context}")]
    Io {
        /// What was being attempted.
        context: String,
        /// Underlying OS error, when there is one.
        #[source]
        source: Option<io::Error>,
    },

    /// Reply frame failed checksum verification.
    #[error("Checksum mismatch in reply (residue 0x{residue:02X}, frame {frame:02X?})")]
    Checksum {
        /// XOR residue of the whole frame; zero for a valid frame.
        residue: u8,
        /// Raw frame bytes as received.
        frame: Vec<u8>,
    },

    /// The display reported that it does not implement the feature.
    #[error("Unsupported VCP feature 0x{0:02X}")]
    UnsupportedFeature(u8),

    /// The display returned a result code this client does not know.
    #[error("Unknown result code {result} for VCP feature 0x{code:02X}")]
    UnknownResult {
        /// Feature code of the request.
        code: u8,
        /// Result code byte from the reply.
        result: u8,
    },
}

impl DdcError {
    /// Builds an IO error without an OS source.
    pub fn io(context: impl Into<String>) -> Self {
        Self::Io {
            context: context.into(),
            source: None,
        }
    }

    /// Builds an IO error wrapping an OS error.
    pub fn io_with(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source: Some(source),
        }
    }

    /// Returns true for transient failures worth retrying (IO and checksum).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Checksum { .. })
    }

    /// Returns true if retrying cannot help.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !self.is_retryable()
    }
}

/// Who owns a device node and who tried to open it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessContext {
    /// Login name of the current user, if known.
    pub user: Option<String>,
    /// Group name owning the node, if it could be resolved.
    pub group: Option<String>,
    /// Numeric group id owning the node.
    pub gid: Option<u32>,
    /// Whether the current user is listed as a member of the group.
    pub user_in_group: Option<bool>,
}

impl AccessContext {
    /// A remediation hint suitable for showing to the user.
    #[must_use]
    pub fn hint(&self) -> String {
        let user = self.user.as_deref().unwrap_or("<current user>");
        match (&self.group, self.user_in_group) {
            (Some(group), Some(true)) => format!(
                "user '{user}' is already in group '{group}'; log out and back in for the membership to apply"
            ),
            (Some(group), _) => format!(
                "add user '{user}' to group '{group}' (sudo usermod -aG {group} {user}), then log in again"
            ),
            (None, _) => match self.gid {
                Some(gid) => format!("grant user '{user}' access to gid {gid} or install a udev rule for i2c-dev"),
                None => format!("grant user '{user}' read/write access to the device node"),
            },
        }
    }
}

impl fmt::Display for AccessContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.group, self.gid) {
            (Some(group), Some(gid)) => write!(f, "owned by group '{group}' (gid {gid})")?,
            (None, Some(gid)) => write!(f, "owned by gid {gid}")?,
            _ => write!(f, "owner unknown")?,
        }
        write!(f, "; {}", self.hint())
    }
}
