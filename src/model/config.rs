use anyhow::{Context, Result, anyhow, ensure};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::host::transfer::TransferKind;
use crate::model::release::ReleaseSource;

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub release: ReleaseSource,
    pub staging: StagingConfig,
    pub transfer: TransferConfig,
}

#[derive(Debug, Deserialize)]
pub struct StagingConfig {
    pub dir: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferConfig {
    /// Lookup order; earlier entries win.
    pub tools: Vec<TransferKind>,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        let user = match user_config_path() {
            Some(path) if path.exists() => Some(
                fs::read_to_string(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
            ),
            _ => None,
        };

        Self::from_layers(DEFAULTS, user.as_deref())
    }

    /// Merge `user` over `defaults` key by key, then validate.
    pub fn from_layers(defaults: &str, user: Option<&str>) -> Result<Self> {
        let mut table: toml::Table = toml::from_str(defaults).context("parsing default config")?;
        if let Some(user) = user {
            let overlay: toml::Table = toml::from_str(user).context("parsing user config")?;
            merge_tables(&mut table, overlay);
        }

        let mut config: AppConfig = toml::Value::Table(table).try_into()?;

        // Expand ~ in staging dir
        if config.staging.dir.starts_with('~') {
            let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
            config.staging.dir = config
                .staging
                .dir
                .replacen('~', &home.to_string_lossy(), 1);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn staging_path(&self) -> PathBuf {
        PathBuf::from(&self.staging.dir).join(&self.release.binary)
    }

    fn validate(&self) -> Result<()> {
        let binary = &self.release.binary;
        ensure!(!binary.is_empty(), "release.binary must not be empty");
        ensure!(
            !binary.contains('/') && binary != "." && binary != "..",
            "release.binary must be a plain file name, got {binary:?}"
        );
        ensure!(!self.staging.dir.is_empty(), "staging.dir must not be empty");
        ensure!(
            !self.transfer.tools.is_empty(),
            "transfer.tools must name at least one tool"
        );
        Ok(())
    }
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => {
                merge_tables(existing, nested);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "geode-bootstrap")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_published_release() {
        let config = AppConfig::from_layers(DEFAULTS, None).unwrap();

        assert_eq!(
            config.release.download_url(),
            "https://github.com/geode-linux/geode-installer/releases/latest/download/geode-installer"
        );
        assert_eq!(config.staging_path(), PathBuf::from("/tmp/geode-installer"));
        assert_eq!(
            config.transfer.tools,
            vec![TransferKind::Curl, TransferKind::Wget]
        );
    }

    #[test]
    fn user_file_overrides_single_keys() {
        let user = r#"
            [release]
            tag = "v2.0.0"

            [staging]
            dir = "/var/tmp"
        "#;
        let config = AppConfig::from_layers(DEFAULTS, Some(user)).unwrap();

        assert_eq!(config.release.owner, "geode-linux");
        assert_eq!(config.release.tag.as_deref(), Some("v2.0.0"));
        assert!(config.release.download_url().contains("/releases/download/v2.0.0/"));
        assert_eq!(config.staging_path(), PathBuf::from("/var/tmp/geode-installer"));
    }

    #[test]
    fn user_file_can_reorder_tools() {
        let config =
            AppConfig::from_layers(DEFAULTS, Some("[transfer]\ntools = [\"wget\"]\n")).unwrap();
        assert_eq!(config.transfer.tools, vec![TransferKind::Wget]);
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let err = AppConfig::from_layers(DEFAULTS, Some("[transfer]\ntools = [\"aria2c\"]\n"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("aria2c"));
    }

    #[test]
    fn empty_tool_list_is_rejected() {
        let err = AppConfig::from_layers(DEFAULTS, Some("[transfer]\ntools = []\n")).unwrap_err();
        assert!(err.to_string().contains("transfer.tools must name at least one tool"));
    }

    #[test]
    fn binary_name_cannot_escape_staging_dir() {
        let err =
            AppConfig::from_layers(DEFAULTS, Some("[release]\nbinary = \"../etc/passwd\"\n"))
                .unwrap_err();
        assert!(err.to_string().contains("plain file name"));
    }

    #[test]
    fn malformed_user_file_is_reported() {
        let err = AppConfig::from_layers(DEFAULTS, Some("[release\n")).unwrap_err();
        assert!(format!("{err:#}").contains("parsing user config"));
    }
}
