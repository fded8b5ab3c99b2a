//! Environment-sourced application configuration.
//!
//! Settings come from the process environment (optionally seeded from a
//! `.env` file by the binary): `ORGANIZATION_URL`, `PAT`, `DOWNLOAD_PATH`
//! and `HTTP_TIMEOUT_SECS`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{MirrorError, Result};

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for one mirroring run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the organization, e.g. `https://dev.azure.com/acme`.
    pub organization_url: String,
    /// Personal access token used for the REST API and for git over HTTPS.
    pub pat: String,
    /// Root directory under which `repos/` and `archive/` live.
    pub download_path: PathBuf,
    /// Timeout applied to every inventory HTTP request.
    pub http_timeout: Duration,
}

impl AppConfig {
    /// Build the configuration from the environment.
    ///
    /// Fails fast when a required variable is missing or when the download
    /// path does not exist.
    pub fn from_env() -> Result<Self> {
        let organization_url = required("ORGANIZATION_URL")?;
        let pat = required("PAT")?;

        let download_path = PathBuf::from(
            env::var("DOWNLOAD_PATH").unwrap_or_else(|_| ".".to_string()),
        );
        if !download_path.exists() {
            return Err(MirrorError::Config(format!(
                "DOWNLOAD_PATH does not exist: {}",
                download_path.display()
            )));
        }

        let http_timeout = match env::var("HTTP_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    MirrorError::Config(format!("HTTP_TIMEOUT_SECS is not a number: {raw}"))
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        Ok(Self {
            organization_url,
            pat,
            download_path,
            http_timeout,
        })
    }

    /// Directory holding the active checkouts.
    pub fn repos_root(&self) -> PathBuf {
        self.download_path.join("repos")
    }

    /// Directory orphaned checkouts are moved into.
    pub fn archive_root(&self) -> PathBuf {
        self.download_path.join("archive")
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name)
        .map_err(|_| MirrorError::Config(format!("Missing required environment variable {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_roots_hang_off_download_path() {
        let config = AppConfig {
            organization_url: "https://dev.azure.com/acme".to_string(),
            pat: "secret".to_string(),
            download_path: PathBuf::from("/data/mirror"),
            http_timeout: Duration::from_secs(30),
        };
        assert_eq!(config.repos_root(), PathBuf::from("/data/mirror/repos"));
        assert_eq!(config.archive_root(), PathBuf::from("/data/mirror/archive"));
    }
}
