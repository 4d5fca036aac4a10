mod bootstrap;
mod error;
mod host;
mod model;
mod report;
mod staging;
#[cfg(all(test, unix))]
mod test_support;

use std::process::ExitCode;

use anyhow::Result;
use crossterm::style::Stylize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use bootstrap::Bootstrap;
use error::GENERIC_FAILURE;
use host::HostPlatform;
use model::config::AppConfig;
use report::ConsoleReporter;

fn main() -> ExitCode {
    // Log to file only: stdout belongs to status lines and the installer.
    let _guard = match init_logging() {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("geode-bootstrap: file logging disabled: {err:#}");
            None
        }
    };

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "geode-bootstrap starting");
    if std::env::args_os().len() > 1 {
        tracing::warn!("command-line arguments are ignored");
    }

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("config error: {err:#}");
            eprintln!("{} {err:#}", "error:".red().bold());
            return ExitCode::from(GENERIC_FAILURE);
        }
    };

    let provider = HostPlatform::new(config.transfer.tools.clone());
    let bootstrap = Bootstrap::from_config(provider, &config);
    let mut reporter = ConsoleReporter::stdio();

    match bootstrap.run(&mut reporter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => ExitCode::from(err.exit_code()),
    }
}

fn init_logging() -> Result<WorkerGuard> {
    let log_dir = directories::ProjectDirs::from("", "", "geode-bootstrap")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("geode-bootstrap"));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "geode-bootstrap.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("geode_bootstrap=info"));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))?;

    Ok(guard)
}
