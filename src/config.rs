use crate::notification::DEFAULT_ICON;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub plex: PlexConfig,
    #[serde(default)]
    pub hass: HassConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlexConfig {
    pub host: String,
    pub token: String,
    /// Pause between notification socket reconnects.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
}

fn default_reconnect_delay_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HassConfig {
    pub host: String,
    pub token: String,
    /// The streaming device's own media player.
    #[serde(default = "default_device_entity")]
    pub device_entity: String,
    /// The Plex client as mirrored by the Plex integration.
    #[serde(default = "default_mirror_entity")]
    pub mirror_entity: String,
}

fn default_device_entity() -> String {
    "media_player.living_room_2".to_string()
}

fn default_mirror_entity() -> String {
    "media_player.plex_plex_for_apple_tv_living_room".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl Default for PlexConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:32400".to_string(),
            token: String::new(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
        }
    }
}

impl Default for HassConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:8123".to_string(),
            token: String::new(),
            device_entity: default_device_entity(),
            mirror_entity: default_mirror_entity(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            icon: DEFAULT_ICON.to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 5,
        }
    }
}

impl Config {
    /// Return the path to the configuration file.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "nowplaying", "nowplaying")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Load from `path` (or the default location), then apply environment
    /// overrides. A missing file means defaults; a corrupt one is reported
    /// and ignored.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_path);
        let mut config = Self::read_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        match toml::from_str::<Config>(&data) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    "failed to parse config, using defaults: {e}"
                );
                Ok(Config::default())
            }
        }
    }

    /// Environment variables win over the file.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("PLEX_HOST") {
            self.plex.host = host;
        }
        if let Some(token) = lookup("PLEX_TOKEN") {
            self.plex.token = token;
        }
        if let Some(host) = lookup("HA_HOST") {
            self.hass.host = host;
        }
        if let Some(token) = lookup("HA_TOKEN") {
            self.hass.token = token;
        }
        if let Some(port) = lookup("PORT").filter(|value| !value.is_empty()) {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %port, "ignoring invalid PORT"),
            }
        }
    }

    /// Save config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = toml::to_string_pretty(self)?;
        fs::write(path, data)
            .with_context(|| format!("Failed to write config at {}", path.display()))?;

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_secs.max(1))
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.plex.reconnect_delay_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::read_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.display.icon, "i24240");
        assert_eq!(config.hass.device_entity, "media_player.living_room_2");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[plex]
host = "http://plex.lan:32400"
token = "abc"

[hass]
host = "http://hass.lan:8123"
token = "xyz"
mirror_entity = "media_player.plex_bedroom"
"#,
        )
        .unwrap();

        let config = Config::read_file(&path).unwrap();
        assert_eq!(config.plex.host, "http://plex.lan:32400");
        assert_eq!(config.plex.reconnect_delay_secs, 5);
        assert_eq!(config.hass.mirror_entity, "media_player.plex_bedroom");
        assert_eq!(config.hass.device_entity, "media_player.living_room_2");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_corrupt_file_falls_back_without_overwriting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is [not toml").unwrap();

        let config = Config::read_file(&path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(fs::read_to_string(&path).unwrap(), "this is [not toml");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.server.port = 9090;
        config.display.icon = "a1234".to_string();
        config.save(&path).unwrap();

        let loaded = Config::read_file(&path).unwrap();
        assert_eq!(loaded.server.port, 9090);
        assert_eq!(loaded.display.icon, "a1234");
    }

    #[test]
    fn test_environment_overrides() {
        let env: HashMap<&str, &str> = [
            ("PLEX_HOST", "http://plex:32400"),
            ("PLEX_TOKEN", "p"),
            ("HA_HOST", "http://hass:8123"),
            ("HA_TOKEN", "h"),
            ("PORT", "3000"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|value| value.to_string()));
        assert_eq!(config.plex.host, "http://plex:32400");
        assert_eq!(config.plex.token, "p");
        assert_eq!(config.hass.host, "http://hass:8123");
        assert_eq!(config.hass.token, "h");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_invalid_port_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "PORT").then(|| "eighty".to_string()));
        assert_eq!(config.server.port, 8080);
    }
}
