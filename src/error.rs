use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::host::transfer::TransferKind;
use crate::model::platform::Platform;

/// Exit code used when the failure carries no status of its own.
pub const GENERIC_FAILURE: u8 = 1;
/// Shell convention for "found but could not be executed".
pub const CANNOT_EXECUTE: u8 = 126;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("unsupported platform {os}/{arch}; only {}/{} is supported", Platform::SUPPORTED.0, Platform::SUPPORTED.1)]
    UnsupportedPlatform { os: String, arch: String },

    #[error("could not read host platform: {0}")]
    PlatformQuery(#[source] io::Error),

    #[error("no download tool found; install one of: {}", tried.iter().map(|t| t.program()).collect::<Vec<_>>().join(", "))]
    NoTransferTool { tried: Vec<TransferKind> },

    #[error("cannot prepare staging path {}: {source}", path.display())]
    Staging { path: PathBuf, source: io::Error },

    #[error("download with {tool} failed ({status})")]
    Transfer { tool: TransferKind, status: ExitStatus },

    #[error("cannot make {} executable: {source}", path.display())]
    Permission { path: PathBuf, source: io::Error },

    #[error("cannot run {}: {source}", program.display())]
    Launch { program: PathBuf, source: io::Error },

    #[error("installer failed ({status})")]
    Installer { status: ExitStatus },
}

impl BootstrapError {
    /// Process exit code for this failure. Child statuses pass through.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Transfer { status, .. } | Self::Installer { status } => status_code(status),
            Self::Launch { .. } => CANNOT_EXECUTE,
            _ => GENERIC_FAILURE,
        }
    }
}

/// Map a child's exit status to our own, `128 + signal` when it was killed.
pub fn status_code(status: &ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return u8::try_from(code)
            .ok()
            .filter(|code| *code != 0)
            .unwrap_or(GENERIC_FAILURE);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return u8::try_from(128 + signal).unwrap_or(GENERIC_FAILURE);
        }
    }

    GENERIC_FAILURE
}
