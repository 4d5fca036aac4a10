use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::BootstrapError;

/// Ownership of the staging path for one run.
///
/// Registered before anything is written, so the file is removed on every
/// path out of the run that unwinds, success or failure.
#[derive(Debug)]
pub struct StagedArtifact {
    path: PathBuf,
}

impl StagedArtifact {
    /// Claim `path` and make sure its directory exists.
    pub fn register(path: impl Into<PathBuf>) -> Result<Self, BootstrapError> {
        let path = path.into();
        let staged = Self { path };

        if let Some(parent) = staged.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| BootstrapError::Staging {
                path: staged.path.clone(),
                source,
            })?;
        }

        tracing::debug!(path = %staged.path.display(), "staging path registered");
        Ok(staged)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn make_executable(&self) -> Result<(), BootstrapError> {
        set_executable(&self.path).map_err(|source| BootstrapError::Permission {
            path: self.path.clone(),
            source,
        })
    }
}

impl Drop for StagedArtifact {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "staged artifact removed"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(path = %self.path.display(), "failed to remove staged artifact: {err}");
            }
        }
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn set_executable(path: &Path) -> io::Result<()> {
    fs::metadata(path).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geode-installer");

        let staged = StagedArtifact::register(&path).unwrap();
        fs::write(staged.path(), b"payload").unwrap();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn missing_file_is_tolerated_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedArtifact::register(dir.path().join("never-written")).unwrap();
        drop(staged);
    }

    #[test]
    fn registration_creates_staging_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/stage/geode-installer");

        let staged = StagedArtifact::register(&path).unwrap();
        assert!(path.parent().unwrap().is_dir());
        assert!(!staged.path().exists());
    }

    #[test]
    fn registration_fails_when_dir_cannot_be_created() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"").unwrap();

        let err = StagedArtifact::register(blocker.join("geode-installer")).unwrap_err();
        assert!(matches!(err, BootstrapError::Staging { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn make_executable_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let staged = StagedArtifact::register(dir.path().join("geode-installer")).unwrap();
        fs::write(staged.path(), b"#!/bin/sh\n").unwrap();

        staged.make_executable().unwrap();
        let mode = fs::metadata(staged.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn make_executable_on_missing_file_is_a_permission_error() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedArtifact::register(dir.path().join("geode-installer")).unwrap();

        let err = staged.make_executable().unwrap_err();
        assert!(matches!(err, BootstrapError::Permission { .. }));
    }
}
