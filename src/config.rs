//! Relay credentials and defaults, read from a JSON file under the user's config dir.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.emailjs.com";
const APP_DIR: &str = "contact-relay";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize config for {}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write config {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("`{0}` is not configured (set it in the config file or pass --{1})")]
    Missing(&'static str, &'static str),
    #[error("could not determine the user config directory")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Base URL of the EmailJS-compatible API.
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Address offered to the user when delivery fails.
    pub fallback_contact: String,
    /// Upper bound for one relay call; `None` waits forever.
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            service_id: String::new(),
            template_id: String::new(),
            public_key: String::new(),
            access_token: None,
            fallback_contact: "contact@example.com".into(),
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl RelayConfig {
    /// Credentials must be present before a relay client is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_id.trim().is_empty() {
            return Err(ConfigError::Missing("service_id", "service-id"));
        }
        if self.template_id.trim().is_empty() {
            return Err(ConfigError::Missing("template_id", "template-id"));
        }
        if self.public_key.trim().is_empty() {
            return Err(ConfigError::Missing("public_key", "public-key"));
        }
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Missing("endpoint", "endpoint"));
        }
        Ok(())
    }
}

pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

/// Load the config. An explicit path must exist; a missing default file
/// yields the defaults.
pub fn load(explicit: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let (path, required) = match explicit {
        Some(p) => (p.to_path_buf(), true),
        None => match default_path() {
            Some(p) => (p, false),
            None => {
                log::debug!("no config directory; using built-in relay defaults");
                return Ok(RelayConfig::default());
            }
        },
    };

    if !required && !path.exists() {
        log::debug!("config {} not found; using defaults", path.display());
        return Ok(RelayConfig::default());
    }

    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let cfg = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    log::debug!("loaded config from {}", path.display());
    Ok(cfg)
}

/// Write the config as pretty JSON, creating parent directories as needed.
pub fn save(path: Option<&Path>, cfg: &RelayConfig) -> Result<PathBuf, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_path().ok_or(ConfigError::NoConfigDir)?,
    };
    let write_err = |source| ConfigError::Write {
        path: path.clone(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    let json = serde_json::to_string_pretty(cfg).map_err(|source| ConfigError::Serialize {
        path: path.clone(),
        source,
    })?;
    std::fs::write(&path, json).map_err(write_err)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("contact-relay-test-{}", std::process::id()))
            .join(name)
    }

    fn configured() -> RelayConfig {
        RelayConfig {
            service_id: "service_abc".into(),
            template_id: "template_xyz".into(),
            public_key: "pk".into(),
            ..RelayConfig::default()
        }
    }

    #[test]
    fn default_config_needs_credentials() {
        let err = RelayConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("service_id", _)));
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let path = scratch("roundtrip/config.json");
        let mut cfg = configured();
        cfg.timeout = Some(Duration::from_secs(12));
        cfg.access_token = Some("secret".into());

        let written = save(Some(&path), &cfg).unwrap();
        assert_eq!(written, path);
        let loaded = load(Some(&path)).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let path = scratch("partial.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{ "service_id": "s", "timeout": "5s" }"#).unwrap();

        let cfg = load(Some(&path)).unwrap();
        assert_eq!(cfg.service_id, "s");
        assert_eq!(cfg.timeout, Some(Duration::from_secs(5)));
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load(Some(&scratch("does-not-exist.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let path = scratch("broken.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load(Some(&path)), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn serialize_failure_is_not_reported_as_parse() {
        let source = serde_json::from_str::<u8>("x").unwrap_err();
        let err = ConfigError::Serialize {
            path: PathBuf::from("/tmp/config.json"),
            source,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("failed to serialize config"), "{msg}");
        assert!(!msg.contains("parse"));
    }
}
