use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use crate::client::{CooldownPolicy, CooldownScope};

pub const DEFAULT_API_HOST: &str = "devapi.qweather.com";
pub const DEFAULT_GEO_HOST: &str = "geoapi.qweather.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// One configured location; each gets its own client and cooldown state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub api_key: String,
    pub longitude: f64,
    pub latitude: f64,

    /// City id from the setup lookup; required by the air-quality endpoint.
    #[serde(default)]
    pub location_id: Option<String>,

    #[serde(default = "default_grid_weather")]
    pub grid_weather: bool,
}

fn default_grid_weather() -> bool {
    true
}

impl LocationConfig {
    pub fn new(api_key: String, longitude: f64, latitude: f64) -> Self {
        Self { api_key, longitude, latitude, location_id: None, grid_weather: true }
    }

    /// `location` query parameter: `longitude,latitude` to two decimals.
    pub fn coordinates(&self) -> String {
        format!("{:.2},{:.2}", self.longitude, self.latitude)
    }

    /// Stable id derived from the rounded coordinates, e.g. `121_47_31_23`.
    pub fn unique_id(&self) -> String {
        format!("{:.2}_{:.2}", self.longitude, self.latitude).replace('.', "_")
    }
}

/// Transport and cooldown settings shared by every location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub api_host: String,

    /// Defaults to `api_host`.
    pub air_host: Option<String>,

    pub geo_host: String,
    pub timeout_secs: u64,
    pub cooldown_scope: CooldownScope,
    pub transient_cooldown_secs: u64,
    pub unknown_cooldown_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        let policy = CooldownPolicy::default();
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            air_host: None,
            geo_host: DEFAULT_GEO_HOST.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cooldown_scope: CooldownScope::default(),
            transient_cooldown_secs: policy.transient.as_secs(),
            unknown_cooldown_secs: policy.unknown.as_secs(),
        }
    }
}

impl ClientSettings {
    pub fn api_base_url(&self) -> String {
        base_url(&self.api_host)
    }

    pub fn air_base_url(&self) -> String {
        base_url(self.air_host.as_deref().unwrap_or(&self.api_host))
    }

    pub fn geo_base_url(&self) -> String {
        base_url(&self.geo_host)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Transport shared by the fetchers and the setup probe.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder().timeout(self.timeout()).build()
    }

    pub fn cooldown_policy(&self) -> CooldownPolicy {
        CooldownPolicy {
            transient: Duration::from_secs(self.transient_cooldown_secs),
            unknown: Duration::from_secs(self.unknown_cooldown_secs),
        }
    }
}

/// Hosts are bare names (`devapi.qweather.com`) served over https, or full origins
/// with an explicit scheme.
fn base_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") { host.to_string() } else { format!("https://{host}") }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Location used when none is given on the command line.
    pub default_location: Option<String>,

    #[serde(default)]
    pub client: ClientSettings,

    /// Example TOML:
    /// [locations.home]
    /// api_key = "..."
    /// longitude = 121.47
    /// latitude = 31.23
    #[serde(default)]
    pub locations: HashMap<String, LocationConfig>,
}

impl Config {
    /// Name of the default location.
    pub fn default_location(&self) -> Result<&str> {
        self.default_location.as_deref().ok_or_else(|| {
            anyhow!(
                "No default location configured.\n\
                 Hint: run `qweather configure <name>` (e.g. `qweather configure home`) first."
            )
        })
    }

    /// Look up a location by name, falling back to the default location.
    pub fn location(&self, name: Option<&str>) -> Result<(&str, &LocationConfig)> {
        let name = match name {
            Some(name) => name,
            None => self.default_location()?,
        };

        self.locations.get_key_value(name).map(|(k, v)| (k.as_str(), v)).ok_or_else(|| {
            anyhow!(
                "Unknown location '{name}'.\n\
                 Hint: run `qweather configure {name}` to add it."
            )
        })
    }

    pub fn set_default_location(&mut self, name: &str) -> Result<()> {
        if !self.locations.contains_key(name) {
            return Err(anyhow!("Cannot make '{name}' the default: no such location."));
        }
        self.default_location = Some(name.to_string());
        Ok(())
    }

    /// Add or replace a location; the first one added becomes the default.
    pub fn upsert_location(&mut self, name: &str, location: LocationConfig) {
        self.locations.insert(name.to_string(), location);

        if self.default_location.is_none() {
            self.default_location = Some(name.to_string());
        }
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "qweather", "qweather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> LocationConfig {
        LocationConfig::new("KEY".into(), 121.4737, 31.2304)
    }

    #[test]
    fn default_location_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.default_location().unwrap_err();

        assert!(err.to_string().contains("No default location configured"));
        assert!(err.to_string().contains("Hint: run `qweather configure"));
    }

    #[test]
    fn first_upsert_becomes_default() {
        let mut cfg = Config::default();
        cfg.upsert_location("home", home());
        cfg.upsert_location("office", LocationConfig::new("KEY2".into(), 116.4, 39.9));

        assert_eq!(cfg.default_location().unwrap(), "home");
        let (name, loc) = cfg.location(None).unwrap();
        assert_eq!(name, "home");
        assert_eq!(loc.api_key, "KEY");
    }

    #[test]
    fn set_default_location_overrides_default() {
        let mut cfg = Config::default();
        cfg.upsert_location("home", home());
        cfg.upsert_location("office", LocationConfig::new("KEY2".into(), 116.4, 39.9));

        cfg.set_default_location("office").unwrap();
        assert_eq!(cfg.location(None).unwrap().0, "office");

        assert!(cfg.set_default_location("moon").is_err());
    }

    #[test]
    fn unknown_location_has_hint() {
        let cfg = Config::default();
        let err = cfg.location(Some("cabin")).unwrap_err();
        assert!(err.to_string().contains("Unknown location 'cabin'"));
    }

    #[test]
    fn coordinates_round_to_two_decimals() {
        let loc = home();
        assert_eq!(loc.coordinates(), "121.47,31.23");
        assert_eq!(loc.unique_id(), "121_47_31_23");
    }

    #[test]
    fn hosts_default_to_https() {
        let settings = ClientSettings::default();
        assert_eq!(settings.api_base_url(), "https://devapi.qweather.com");
        assert_eq!(settings.air_base_url(), "https://devapi.qweather.com");
        assert_eq!(settings.geo_base_url(), "https://geoapi.qweather.com");

        let local = ClientSettings {
            api_host: "http://127.0.0.1:8080/".into(),
            air_host: Some("abc.re.qweatherapi.com".into()),
            ..ClientSettings::default()
        };
        assert_eq!(local.api_base_url(), "http://127.0.0.1:8080");
        assert_eq!(local.air_base_url(), "https://abc.re.qweatherapi.com");
    }

    #[test]
    fn minimal_toml_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            default_location = "home"

            [locations.home]
            api_key = "KEY"
            longitude = 121.47
            latitude = 31.23
            "#,
        )
        .unwrap();

        let loc = &cfg.locations["home"];
        assert!(loc.grid_weather);
        assert_eq!(loc.location_id, None);
        assert_eq!(cfg.client, ClientSettings::default());
        assert_eq!(cfg.client.timeout(), Duration::from_secs(20));
        assert_eq!(cfg.client.cooldown_policy(), CooldownPolicy::default());
    }

    #[test]
    fn client_section_overrides() {
        let cfg: Config = toml::from_str(
            r#"
            [client]
            cooldown_scope = "endpoint"
            transient_cooldown_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(cfg.client.cooldown_scope, CooldownScope::Endpoint);
        assert_eq!(cfg.client.cooldown_policy().transient, Duration::from_secs(30));
        assert_eq!(cfg.client.unknown_cooldown_secs, 600);
    }

    #[test]
    fn save_and_load_through_a_file() {
        let dir = std::env::temp_dir().join(format!("qweather-config-test-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut cfg = Config::default();
        let mut loc = home();
        loc.location_id = Some("101020100".into());
        cfg.upsert_location("home", loc.clone());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.default_location.as_deref(), Some("home"));
        assert_eq!(loaded.locations["home"], loc);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_loads_empty_config() {
        let path = std::env::temp_dir().join("qweather-definitely-missing").join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(cfg.locations.is_empty());
    }
}
