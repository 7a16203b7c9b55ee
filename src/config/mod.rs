use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_INTERPRETER_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";
pub const DEFAULT_STATUS_ENDPOINT: &str = "https://overpass-api.de/api/status";
pub const DEFAULT_GEOCODER_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

/// Endpoints and retry policy for the submission client and the geocoder.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub interpreter_endpoint: String,
    pub status_endpoint: String,
    pub geocoder_endpoint: String,
    /// Probe rounds before giving up; 0 behaves like 1.
    pub max_attempts: u32,
    pub retry_interval_secs: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            interpreter_endpoint: DEFAULT_INTERPRETER_ENDPOINT.to_string(),
            status_endpoint: DEFAULT_STATUS_ENDPOINT.to_string(),
            geocoder_endpoint: DEFAULT_GEOCODER_ENDPOINT.to_string(),
            max_attempts: 1,
            retry_interval_secs: 5,
            user_agent: concat!("osmquery/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_point_at_public_instance() {
        let config = ClientConfig::default();
        assert_eq!(config.interpreter_endpoint, DEFAULT_INTERPRETER_ENDPOINT);
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.retry_interval(), Duration::from_secs(5));
    }

    #[test]
    fn load_fills_missing_fields_with_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "max_attempts: 4").unwrap();
        writeln!(file, "status_endpoint: http://localhost:12345/api/status").unwrap();

        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.status_endpoint, "http://localhost:12345/api/status");
        assert_eq!(config.interpreter_endpoint, DEFAULT_INTERPRETER_ENDPOINT);
        assert_eq!(config.retry_interval_secs, 5);
    }
}
