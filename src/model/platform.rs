use std::fmt;

/// Host operating system and machine architecture, as `uname -s` / `uname -m`
/// report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    /// The only pair the installer is published for.
    pub const SUPPORTED: (&'static str, &'static str) = ("Linux", "x86_64");

    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Exact, case-sensitive match against [`Platform::SUPPORTED`].
    pub fn is_supported(&self) -> bool {
        let (os, arch) = Self::SUPPORTED;
        self.os == os && self.arch == arch
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}
