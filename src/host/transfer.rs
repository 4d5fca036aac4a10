use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::error::BootstrapError;
use crate::host::process;

/// HTTP clients the bootstrap knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    Curl,
    Wget,
}

impl TransferKind {
    pub fn program(&self) -> &'static str {
        match self {
            TransferKind::Curl => "curl",
            TransferKind::Wget => "wget",
        }
    }

    /// Arguments for a single GET of `url` into `dest`. Both fail with a
    /// non-zero status on HTTP errors and follow redirects.
    fn download_args<'a>(&self, url: &'a str, dest: &'a Path) -> Vec<&'a OsStr> {
        match self {
            TransferKind::Curl => vec![
                OsStr::new("--fail"),
                OsStr::new("--location"),
                OsStr::new("--show-error"),
                OsStr::new("--progress-bar"),
                OsStr::new("--output"),
                dest.as_os_str(),
                OsStr::new(url),
            ],
            TransferKind::Wget => vec![
                OsStr::new("--quiet"),
                OsStr::new("--output-document"),
                dest.as_os_str(),
                OsStr::new(url),
            ],
        }
    }
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// A transfer tool resolved to an executable on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolHandle {
    pub kind: TransferKind,
    pub path: PathBuf,
}

impl ToolHandle {
    pub fn new(kind: TransferKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    pub fn download_command(&self, url: &str, dest: &Path) -> Command {
        let mut command = Command::new(&self.path);
        command.args(self.kind.download_args(url, dest));
        command
    }

    /// Run one download. No retry: the tool's failure is the result.
    pub fn fetch(&self, url: &str, dest: &Path) -> Result<(), BootstrapError> {
        tracing::info!(tool = %self.kind, path = %self.path.display(), url, dest = %dest.display(), "starting download");

        let mut command = self.download_command(url, dest);
        let status = process::run_foreground(&mut command).map_err(|source| {
            BootstrapError::Launch {
                program: self.path.clone(),
                source,
            }
        })?;

        if !status.success() {
            tracing::warn!(tool = %self.kind, %status, "download failed");
            return Err(BootstrapError::Transfer {
                tool: self.kind,
                status,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_args(command: &Command) -> Vec<String> {
        command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn curl_writes_to_destination_and_fails_on_http_errors() {
        let handle = ToolHandle::new(TransferKind::Curl, "/usr/bin/curl");
        let command = handle.download_command("https://example.test/a", Path::new("/tmp/a"));

        assert_eq!(command.get_program(), OsStr::new("/usr/bin/curl"));
        assert_eq!(
            rendered_args(&command),
            [
                "--fail",
                "--location",
                "--show-error",
                "--progress-bar",
                "--output",
                "/tmp/a",
                "https://example.test/a",
            ]
        );
    }

    #[test]
    fn wget_writes_to_destination() {
        let handle = ToolHandle::new(TransferKind::Wget, "/bin/wget");
        let command = handle.download_command("https://example.test/a", Path::new("/tmp/a"));

        assert_eq!(
            rendered_args(&command),
            [
                "--quiet",
                "--output-document",
                "/tmp/a",
                "https://example.test/a"
            ]
        );
    }

    #[test]
    fn kinds_deserialize_from_lowercase_names() {
        #[derive(Deserialize)]
        struct Tools {
            tools: Vec<TransferKind>,
        }

        let parsed: Tools = toml::from_str("tools = [\"wget\", \"curl\"]").unwrap();
        assert_eq!(parsed.tools, vec![TransferKind::Wget, TransferKind::Curl]);
    }
}
