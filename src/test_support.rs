//! Helpers shared by unit tests that execute generated scripts.

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Stdio};

/// Write an executable script without ever holding a write descriptor to it
/// in this process.
///
/// Test threads fork concurrently. A descriptor opened here can leak into a
/// sibling's child between fork and exec, and exec'ing the script while that
/// copy is open fails with ETXTBSY. A short-lived `cat` owns the only writer.
pub fn write_executable(path: &Path, contents: &str) {
    let mut writer = Command::new("/bin/sh")
        .args(["-c", "cat > \"$1\"", "sh"])
        .arg(path)
        .stdin(Stdio::piped())
        .spawn()
        .unwrap();

    writer
        .stdin
        .take()
        .unwrap()
        .write_all(contents.as_bytes())
        .unwrap();
    assert!(writer.wait().unwrap().success(), "writing {}", path.display());

    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn written_script_runs() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("hello");
    write_executable(&script, "#!/bin/sh\nexit 4\n");

    let status = Command::new(&script).status().unwrap();
    assert_eq!(status.code(), Some(4));
}
