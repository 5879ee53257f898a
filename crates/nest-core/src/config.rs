//! `~/.nest_exporter.toml` configuration parser.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::device::TemperatureScale;

/// Polling interval used when `refresh_interval` is absent or zero.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(120);

/// Vendor endpoint returning the device collection.
pub const DEFAULT_API_URL: &str = "https://developer-api.nest.com/devices.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config file does not declare an access token")]
    MissingToken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    #[serde(alias = "Token", default)]
    pub token: String,
    /// Seconds between polls. Zero means "use the default".
    #[serde(default)]
    pub refresh_interval: u64,
    /// Legacy OAuth client credentials. Only carried; the token is acquired out of band.
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_url: Option<String>,
    #[serde(default)]
    pub temperature_scale: TemperatureScale,
}

impl ExporterConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ExporterConfig = toml::from_str(content)?;
        if config.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(config)
    }

    /// Effective polling interval, falling back to two minutes.
    pub fn refresh_interval(&self) -> Duration {
        match self.refresh_interval {
            0 => DEFAULT_REFRESH_INTERVAL,
            secs => Duration::from_secs(secs),
        }
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }
}

/// Resolve a leading `~` against the current user's home directory.
///
/// Paths without a tilde prefix, or hosts without a resolvable home
/// directory, are returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    let Some(s) = path.to_str() else {
        return path.to_path_buf();
    };
    let rest = match s {
        "~" => "",
        _ => match s.strip_prefix("~/") {
            Some(rest) => rest,
            None => return path.to_path_buf(),
        },
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_minimal() {
        let config = ExporterConfig::from_toml(r#"token = "c.abc123""#).unwrap();
        assert_eq!(config.token, "c.abc123");
        assert_eq!(config.refresh_interval(), DEFAULT_REFRESH_INTERVAL);
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.temperature_scale, TemperatureScale::Fahrenheit);
    }

    #[test]
    fn parse_capitalized_token_key() {
        let config = ExporterConfig::from_toml(r#"Token = "c.legacy""#).unwrap();
        assert_eq!(config.token, "c.legacy");
    }

    #[test]
    fn parse_full() {
        let toml_str = r#"
token = "c.abc123"
refresh_interval = 30
client_id = "client"
client_secret = "secret"
api_url = "http://localhost:8080/devices.json"
temperature_scale = "C"
"#;
        let config = ExporterConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.client_id.as_deref(), Some("client"));
        assert_eq!(config.client_secret.as_deref(), Some("secret"));
        assert_eq!(config.api_url(), "http://localhost:8080/devices.json");
        assert_eq!(config.temperature_scale, TemperatureScale::Celsius);
    }

    #[test]
    fn zero_interval_uses_default() {
        let config = ExporterConfig::from_toml("token = \"t\"\nrefresh_interval = 0").unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_secs(120));
    }

    #[test]
    fn missing_token_rejected() {
        let err = ExporterConfig::from_toml("refresh_interval = 60").unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken));
    }

    #[test]
    fn malformed_toml_rejected() {
        let err = ExporterConfig::from_toml("token = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "token = \"from-file\"\nrefresh_interval = 5").unwrap();

        let config = ExporterConfig::from_file(file.path()).unwrap();
        assert_eq!(config.token, "from-file");
        assert_eq!(config.refresh_interval(), Duration::from_secs(5));
    }

    #[test]
    fn from_file_missing_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ExporterConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn expand_home_leaves_plain_paths() {
        assert_eq!(
            expand_home(Path::new("/etc/nest.toml")),
            PathBuf::from("/etc/nest.toml")
        );
        assert_eq!(
            expand_home(Path::new("~other/nest.toml")),
            PathBuf::from("~other/nest.toml")
        );
    }

    #[test]
    fn expand_home_resolves_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home(Path::new("~/.nest_exporter.toml")),
                home.join(".nest_exporter.toml")
            );
        }
    }
}
