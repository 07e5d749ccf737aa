use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::ensure_trailing_slash;

pub const DEFAULT_SFTP_PORT: u16 = 22;
pub const DEFAULT_BATCH_SIZE: usize = 250;

/// Persisted application configuration, stored as JSON under the app dir.
/// Zero/empty values mean "unset"; defaulting happens in
/// [`DeploySettings::from_config`].
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
pub struct Config {
    pub sftp_host: String,
    pub sftp_user: String,
    pub sftp_pass: String,
    #[serde(default)]
    pub sftp_port: u16,
    #[serde(default)]
    pub sftp_folder: String,
    #[serde(default)]
    pub site_root: PathBuf,
    pub catalog_db_path: PathBuf,
    #[serde(default)]
    pub batch_size: usize,
    #[serde(default)]
    pub throttle: Option<bool>,
    pub version: Option<u32>,
}

/// `~/.sitepush`, created on demand.
pub fn app_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("cannot find the user's home directory")?;
    let dir = home.join(".sitepush");
    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create app directory {}", dir.display()))?;
    }
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(app_dir()?.join("config.json"))
}

pub fn log_dir() -> Result<PathBuf> {
    Ok(app_dir()?.join("logs"))
}

impl Config {
    /// Load the configuration, writing a fresh default file on first run.
    pub fn init() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            let config = Config {
                catalog_db_path: app_dir()?.join("catalog.db"),
                version: Some(1),
                ..Config::default()
            };
            config.save_to(&path)?;
            return Ok(config);
        }
        Config::read_from(&path)
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("cannot parse config file {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("cannot write config file {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }
}

/// Remote target and tunables for one deploy task, validated once at task
/// construction so the engine never re-checks configuration mid-run.
#[derive(Debug, Clone)]
pub struct DeploySettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Empty, or normalized to exactly one trailing slash.
    pub folder: String,
    pub site_root: PathBuf,
    pub batch_size: usize,
    pub throttle: bool,
}

impl DeploySettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let host = config
            .sftp_host
            .strip_prefix("sftp://")
            .unwrap_or(&config.sftp_host)
            .trim()
            .to_string();
        if host.is_empty() {
            anyhow::bail!("SFTP host is not configured; run `spush set --host <host>`");
        }
        if config.sftp_user.is_empty() {
            anyhow::bail!("SFTP user is not configured; run `spush set --user <user>`");
        }
        if config.site_root.as_os_str().is_empty() {
            anyhow::bail!("site root is not configured; run `spush set --site-root <dir>`");
        }
        let port = if config.sftp_port == 0 { DEFAULT_SFTP_PORT } else { config.sftp_port };
        let batch_size =
            if config.batch_size == 0 { DEFAULT_BATCH_SIZE } else { config.batch_size };
        Ok(DeploySettings {
            host,
            port,
            user: config.sftp_user.clone(),
            password: config.sftp_pass.clone(),
            folder: ensure_trailing_slash(&config.sftp_folder),
            site_root: config.site_root.clone(),
            batch_size,
            throttle: config.throttle.unwrap_or(true),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            sftp_host: "example.org".to_string(),
            sftp_user: "deploy".to_string(),
            sftp_pass: "secret".to_string(),
            site_root: PathBuf::from("/tmp/site"),
            catalog_db_path: PathBuf::from("/tmp/catalog.db"),
            ..Config::default()
        }
    }

    #[test]
    fn defaults_applied() {
        let settings = DeploySettings::from_config(&base_config()).unwrap();
        assert_eq!(settings.port, 22);
        assert_eq!(settings.batch_size, 250);
        assert!(settings.throttle);
        assert_eq!(settings.folder, "");
    }

    #[test]
    fn scheme_prefix_stripped() {
        let mut config = base_config();
        config.sftp_host = "sftp://files.example.org".to_string();
        let settings = DeploySettings::from_config(&config).unwrap();
        assert_eq!(settings.host, "files.example.org");
        assert_eq!(settings.addr(), "files.example.org:22");
    }

    #[test]
    fn folder_gets_trailing_slash() {
        let mut config = base_config();
        config.sftp_folder = "public_html".to_string();
        let settings = DeploySettings::from_config(&config).unwrap();
        assert_eq!(settings.folder, "public_html/");
    }

    #[test]
    fn explicit_values_kept() {
        let mut config = base_config();
        config.sftp_port = 2222;
        config.batch_size = 10;
        config.throttle = Some(false);
        let settings = DeploySettings::from_config(&config).unwrap();
        assert_eq!(settings.port, 2222);
        assert_eq!(settings.batch_size, 10);
        assert!(!settings.throttle);
    }

    #[test]
    fn missing_host_rejected() {
        let mut config = base_config();
        config.sftp_host = String::new();
        assert!(DeploySettings::from_config(&config).is_err());
        // a bare scheme prefix is as good as no host
        config.sftp_host = "sftp://".to_string();
        assert!(DeploySettings::from_config(&config).is_err());
    }

    #[test]
    fn missing_site_root_rejected() {
        let mut config = base_config();
        config.site_root = PathBuf::new();
        assert!(DeploySettings::from_config(&config).is_err());
    }
}
