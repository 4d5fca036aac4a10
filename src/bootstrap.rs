use std::path::PathBuf;
use std::process::Command;

use crate::error::BootstrapError;
use crate::host::PlatformProvider;
use crate::host::process;
use crate::host::transfer::ToolHandle;
use crate::model::config::AppConfig;
use crate::model::phase::Phase;
use crate::model::release::ReleaseSource;
use crate::report::Reporter;
use crate::staging::StagedArtifact;

/// Fetch the installer, run it, remove it.
pub struct Bootstrap<P: PlatformProvider> {
    provider: P,
    release: ReleaseSource,
    staging_path: PathBuf,
}

impl<P: PlatformProvider> Bootstrap<P> {
    pub fn new(provider: P, release: ReleaseSource, staging_path: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            release,
            staging_path: staging_path.into(),
        }
    }

    pub fn from_config(provider: P, config: &AppConfig) -> Self {
        Self::new(provider, config.release.clone(), config.staging_path())
    }

    /// Run every phase, stopping at the first failure. The outcome is also
    /// handed to `reporter`.
    pub fn run(&self, reporter: &mut dyn Reporter) -> Result<(), BootstrapError> {
        let result = self.run_phases(reporter);
        match &result {
            Ok(()) => reporter.finished(),
            Err(err) => {
                tracing::error!("bootstrap failed: {err}");
                reporter.failed(err);
            }
        }
        result
    }

    fn run_phases(&self, reporter: &mut dyn Reporter) -> Result<(), BootstrapError> {
        reporter.phase(Phase::CheckPlatform, "");
        self.check_platform()?;

        reporter.phase(Phase::SelectTool, "");
        let tool = self.select_tool()?;

        // Claimed before the write so every later failure removes it.
        let staged = StagedArtifact::register(&self.staging_path)?;
        let url = self.release.download_url();

        reporter.phase(Phase::Download, &url);
        tool.fetch(&url, staged.path())?;

        reporter.phase(Phase::GrantExecute, "");
        staged.make_executable()?;

        reporter.phase(Phase::Execute, &staged.path().display().to_string());
        self.execute(&staged)?;

        Ok(())
    }

    fn check_platform(&self) -> Result<(), BootstrapError> {
        let platform = self.provider.current_platform()?;
        tracing::info!(%platform, "detected platform");

        if !platform.is_supported() {
            return Err(BootstrapError::UnsupportedPlatform {
                os: platform.os,
                arch: platform.arch,
            });
        }
        Ok(())
    }

    fn select_tool(&self) -> Result<ToolHandle, BootstrapError> {
        let tool = self
            .provider
            .find_transfer_tool()
            .ok_or_else(|| BootstrapError::NoTransferTool {
                tried: self.provider.transfer_preference().to_vec(),
            })?;
        tracing::info!(tool = %tool.kind, path = %tool.path.display(), "selected transfer tool");
        Ok(tool)
    }

    fn execute(&self, staged: &StagedArtifact) -> Result<(), BootstrapError> {
        let status = process::run_foreground(&mut Command::new(staged.path())).map_err(
            |source| BootstrapError::Launch {
                program: staged.path().to_path_buf(),
                source,
            },
        )?;
        tracing::info!(%status, "installer exited");

        if !status.success() {
            return Err(BootstrapError::Installer { status });
        }
        Ok(())
    }
}
