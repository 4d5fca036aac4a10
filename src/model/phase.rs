/// Steps of a bootstrap run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Compatibility gate on the host OS/architecture.
    CheckPlatform,
    /// Pick the first available transfer tool.
    SelectTool,
    /// Fetch the installer into the staging path.
    Download,
    /// Mark the staged file executable.
    GrantExecute,
    /// Run the installer in the foreground.
    Execute,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::CheckPlatform => "Checking platform",
            Phase::SelectTool => "Looking for a download tool",
            Phase::Download => "Downloading installer",
            Phase::GrantExecute => "Making installer executable",
            Phase::Execute => "Running installer",
        }
    }
}
