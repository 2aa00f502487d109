use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("{0} is required")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_dir: String,
    /// Base of the ocean portal API, always ending in `/`.
    pub ocean_api_base: String,
    pub ocean_population_interval_secs: u64,
    pub cloud_api_base: String,
    /// `dashboard_configs` key under which the cloud bearer token is cached.
    pub cloud_token_key: String,
    pub cloud_accept_invalid_certs: bool,
    pub dataset_health_url: String,
    pub wms_timeout_secs: u64,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
pub(crate) struct PartialMonitorConfig {
    database_url: Option<String>,
    db_max_connections: Option<u32>,
    log_dir: Option<String>,
    ocean_api_base: Option<String>,
    ocean_population_interval_secs: Option<u64>,
    cloud_api_base: Option<String>,
    cloud_token_key: Option<String>,
    cloud_accept_invalid_certs: Option<bool>,
    dataset_health_url: Option<String>,
    wms_timeout_secs: Option<u64>,
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_ocean_api_base() -> String {
    "https://ocean-middleware.spc.int/middleware/api/".to_string()
}

fn default_ocean_population_interval_secs() -> u64 {
    3600
}

fn default_cloud_api_base() -> String {
    "https://cloud-monitoring.corp.spc.int".to_string()
}

fn default_cloud_token_key() -> String {
    "cloud-monitoring.corp.spc.int".to_string()
}

fn default_true() -> bool {
    true
}

fn default_wms_timeout_secs() -> u64 {
    20
}

impl MonitorConfig {
    /// Defaults for everything except the database.
    pub fn new(database_url: impl Into<String>) -> Self {
        let ocean_api_base = default_ocean_api_base();
        Self {
            database_url: database_url.into(),
            db_max_connections: default_db_max_connections(),
            log_dir: default_log_dir(),
            dataset_health_url: format!("{ocean_api_base}task_download/"),
            ocean_api_base,
            ocean_population_interval_secs: default_ocean_population_interval_secs(),
            cloud_api_base: default_cloud_api_base(),
            cloud_token_key: default_cloud_token_key(),
            cloud_accept_invalid_certs: default_true(),
            wms_timeout_secs: default_wms_timeout_secs(),
        }
    }

    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config: PartialMonitorConfig = match config_path {
            Some(path_str) if Path::new(path_str).exists() => {
                let contents = fs::read_to_string(path_str).map_err(|source| ConfigError::Read {
                    path: path_str.to_string(),
                    source,
                })?;
                toml::from_str(&contents)?
            }
            _ => PartialMonitorConfig::default(),
        };

        // 2. Load from environment variables
        let env_config: PartialMonitorConfig = envy::from_env::<PartialMonitorConfig>()?;

        // 3. Merge: environment overrides file
        Self::merge(env_config, file_config)
    }

    pub(crate) fn merge(
        env_config: PartialMonitorConfig,
        file_config: PartialMonitorConfig,
    ) -> Result<Self, ConfigError> {
        let database_url = env_config
            .database_url
            .or(file_config.database_url)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let mut config = Self::new(database_url);
        if let Some(v) = env_config.db_max_connections.or(file_config.db_max_connections) {
            config.db_max_connections = v.max(1);
        }
        if let Some(v) = env_config.log_dir.or(file_config.log_dir) {
            config.log_dir = v;
        }
        if let Some(v) = env_config.ocean_api_base.or(file_config.ocean_api_base) {
            config.ocean_api_base = if v.ends_with('/') { v } else { format!("{v}/") };
        }
        if let Some(v) = env_config
            .ocean_population_interval_secs
            .or(file_config.ocean_population_interval_secs)
        {
            config.ocean_population_interval_secs = v;
        }
        if let Some(v) = env_config.cloud_api_base.or(file_config.cloud_api_base) {
            config.cloud_api_base = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = env_config.cloud_token_key.or(file_config.cloud_token_key) {
            config.cloud_token_key = v;
        }
        if let Some(v) = env_config
            .cloud_accept_invalid_certs
            .or(file_config.cloud_accept_invalid_certs)
        {
            config.cloud_accept_invalid_certs = v;
        }
        config.dataset_health_url = env_config
            .dataset_health_url
            .or(file_config.dataset_health_url)
            .unwrap_or_else(|| format!("{}task_download/", config.ocean_api_base));
        if let Some(v) = env_config.wms_timeout_secs.or(file_config.wms_timeout_secs) {
            config.wms_timeout_secs = v;
        }
        Ok(config)
    }

    pub fn ocean_dataset_url(&self) -> String {
        format!("{}dataset/", self.ocean_api_base)
    }

    pub fn ocean_task_url(&self) -> String {
        format!("{}task_download/", self.ocean_api_base)
    }

    /// Host and path of the ocean API, as stored in the address of ocean task services.
    pub fn ocean_address_marker(&self) -> &str {
        let base = self.ocean_api_base.as_str();
        base.strip_prefix("https://")
            .or_else(|| base.strip_prefix("http://"))
            .unwrap_or(base)
    }

    pub fn ocean_population_interval(&self) -> Duration {
        Duration::from_secs(self.ocean_population_interval_secs)
    }

    pub fn wms_timeout(&self) -> Duration {
        Duration::from_secs(self.wms_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_database_url_is_rejected() {
        let result = MonitorConfig::merge(PartialMonitorConfig::default(), PartialMonitorConfig::default());
        assert!(matches!(result, Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn test_environment_overrides_file() {
        let file: PartialMonitorConfig = toml::from_str(
            r#"
            database_url = "postgres://file/db"
            db_max_connections = 8
            log_dir = "/var/log/monitor"
            "#,
        )
        .unwrap();
        let env = PartialMonitorConfig {
            database_url: Some("postgres://env/db".to_string()),
            ..Default::default()
        };

        let config = MonitorConfig::merge(env, file).unwrap();
        assert_eq!(config.database_url, "postgres://env/db");
        assert_eq!(config.db_max_connections, 8);
        assert_eq!(config.log_dir, "/var/log/monitor");
        assert_eq!(config.wms_timeout_secs, 20);
    }

    #[test]
    fn test_ocean_urls_follow_the_base() {
        let env = PartialMonitorConfig {
            database_url: Some("postgres://env/db".to_string()),
            ocean_api_base: Some("http://localhost:9000/middleware/api".to_string()),
            ..Default::default()
        };
        let config = MonitorConfig::merge(env, PartialMonitorConfig::default()).unwrap();

        assert_eq!(config.ocean_dataset_url(), "http://localhost:9000/middleware/api/dataset/");
        assert_eq!(config.dataset_health_url, "http://localhost:9000/middleware/api/task_download/");
        assert_eq!(config.ocean_address_marker(), "localhost:9000/middleware/api/");
    }

    #[test]
    fn test_default_marker_matches_ocean_service_addresses() {
        let config = MonitorConfig::new("postgres://localhost/monitoring_db");
        assert_eq!(config.ocean_address_marker(), "ocean-middleware.spc.int/middleware/api/");
        assert_eq!(config.db_max_connections, 5);
    }
}
