//! Access to the machine we are running on.
//!
//! The bootstrap only talks to the host through [`PlatformProvider`], so runs
//! can be driven against a fake platform and fake tools in tests.

pub mod process;
pub mod transfer;

use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::BootstrapError;
use crate::model::platform::Platform;
use transfer::{ToolHandle, TransferKind};

pub trait PlatformProvider {
    /// Host OS name and machine architecture.
    fn current_platform(&self) -> Result<Platform, BootstrapError>;

    /// First available transfer tool in priority order.
    fn find_transfer_tool(&self) -> Option<ToolHandle>;

    /// Tools tried by [`find_transfer_tool`](Self::find_transfer_tool), for error reporting.
    fn transfer_preference(&self) -> &[TransferKind];
}

/// The real host: `uname(2)` and a `PATH` lookup.
#[derive(Debug, Clone)]
pub struct HostPlatform {
    preference: Vec<TransferKind>,
    search_path: Option<OsString>,
}

impl HostPlatform {
    pub fn new(preference: Vec<TransferKind>) -> Self {
        Self {
            preference,
            search_path: None,
        }
    }

    /// Look tools up in `paths` (a `PATH`-style list) instead of the process `PATH`.
    #[cfg(test)]
    pub fn with_search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().ok()?;
                which::which_in(program, Some(paths), cwd)
            }
            None => which::which(program),
        };

        match found {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::debug!(program, "not found: {err}");
                None
            }
        }
    }
}

impl PlatformProvider for HostPlatform {
    fn current_platform(&self) -> Result<Platform, BootstrapError> {
        #[cfg(unix)]
        {
            let uts = nix::sys::utsname::uname()
                .map_err(|errno| BootstrapError::PlatformQuery(errno.into()))?;
            Ok(Platform::new(
                uts.sysname().to_string_lossy(),
                uts.machine().to_string_lossy(),
            ))
        }

        #[cfg(not(unix))]
        {
            Ok(Platform::new(std::env::consts::OS, std::env::consts::ARCH))
        }
    }

    fn find_transfer_tool(&self) -> Option<ToolHandle> {
        self.preference.iter().find_map(|kind| {
            self.locate(kind.program())
                .map(|path| ToolHandle::new(*kind, path))
        })
    }

    fn transfer_preference(&self) -> &[TransferKind] {
        &self.preference
    }
}
