use anyhow::Context;
use astro_common::SatelliteId;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One entry of the tracked-satellite allow-list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedSatellite {
    /// Display name used when N2YO does not report one
    pub name: String,
    pub id: SatelliteId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// File holding the N2YO API key, read once at startup
    #[serde(default = "default_api_key_path")]
    pub api_key_path: String,

    #[serde(default = "default_n2yo_base_url")]
    pub n2yo_base_url: String,

    #[serde(default = "default_open_notify_url")]
    pub open_notify_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Tracked satellites, in display order
    #[serde(default = "default_satellites")]
    pub satellites: Vec<TrackedSatellite>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_api_key_path() -> String {
    "/var/www/api_keys/space.key".to_string()
}

fn default_n2yo_base_url() -> String {
    "https://api.n2yo.com/rest/v1/satellite/".to_string()
}

fn default_open_notify_url() -> String {
    "http://api.open-notify.org/astros.json".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_satellites() -> Vec<TrackedSatellite> {
    [("ISS", 25544), ("CSS", 54216), ("Hubble", 20580)]
        .into_iter()
        .filter_map(|(name, id)| {
            SatelliteId::new(id).map(|id| TrackedSatellite {
                name: name.to_string(),
                id,
            })
        })
        .collect()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            api_key_path: default_api_key_path(),
            n2yo_base_url: default_n2yo_base_url(),
            open_notify_url: default_open_notify_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            satellites: default_satellites(),
        }
    }
}

impl BackendConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config: BackendConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise use the built-in defaults.
    ///
    /// Returns whether the file was found so the caller can log it once
    /// logging is up.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<(Self, bool)> {
        let path = path.as_ref();
        if path.exists() {
            Ok((Self::from_file(path)?, true))
        } else {
            Ok((Self::default(), false))
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_tracked(&self, id: SatelliteId) -> bool {
        self.satellites.iter().any(|sat| sat.id == id)
    }

    pub fn satellite_name(&self, id: SatelliteId) -> Option<&str> {
        self.satellites
            .iter()
            .find(|sat| sat.id == id)
            .map(|sat| sat.name.as_str())
    }
}

/// Read and trim the N2YO key. A missing, unreadable or blank file yields `None`.
pub fn read_api_key(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let key = content.trim();
            if key.is_empty() {
                tracing::error!("N2YO API key file is empty: {}", path.display());
                None
            } else {
                Some(key.to_string())
            }
        }
        Err(e) => {
            tracing::error!("N2YO API key file not readable at {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_satellites_keep_order() {
        let config = BackendConfig::default();
        let ids: Vec<u32> = config.satellites.iter().map(|s| s.id.get()).collect();
        assert_eq!(ids, vec![25544, 54216, 20580]);
        assert_eq!(config.satellite_name(SatelliteId::new(20580).unwrap()), Some("Hubble"));
        assert!(!config.is_tracked(SatelliteId::new(12345).unwrap()));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: BackendConfig = toml::from_str(
            r#"
            port = 9000

            [[satellites]]
            name = "ISS"
            id = 25544
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.satellites.len(), 1);
        assert_eq!(config.server_address(), "0.0.0.0:9000");
    }

    #[test]
    fn test_load_or_default_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let (config, found) = BackendConfig::load_or_default(temp_dir.path().join("missing.toml")).unwrap();
        assert!(!found);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_read_api_key_trims_and_rejects_blank() {
        let temp_dir = TempDir::new().unwrap();

        let key_path = temp_dir.path().join("space.key");
        std::fs::write(&key_path, "  ABCD-1234\n").unwrap();
        assert_eq!(read_api_key(&key_path).as_deref(), Some("ABCD-1234"));

        let blank_path = temp_dir.path().join("blank.key");
        std::fs::write(&blank_path, " \n").unwrap();
        assert_eq!(read_api_key(&blank_path), None);

        assert_eq!(read_api_key(temp_dir.path().join("absent.key")), None);
    }
}
