use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use sluglime_shared::{ClientError, ClientResult};

const ENV_PREFIX: &str = "SLUGLIME";

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Base URL of the Sluglime backend.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Upper bound on a single request, connect through body.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Where the last-used ticket and access code are cached.
    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

fn default_api_url() -> String { "http://localhost:5000".into() }
fn default_request_timeout_secs() -> u64 { 30 }

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            session_file: None,
        }
    }
}

impl ClientConfig {
    /// Load from `SLUGLIME_*` environment variables, reading `.env` first if
    /// one exists.
    pub fn load() -> ClientResult<Self> {
        let _ = dotenvy::dotenv();
        Self::load_with_prefix(ENV_PREFIX)
    }

    pub fn load_with_prefix(prefix: &str) -> ClientResult<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix(prefix).try_parsing(true))
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        tracing::debug!(api_url = %loaded.api_url, timeout_secs = loaded.request_timeout_secs, "configuration loaded");
        Ok(loaded)
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Configured session file, else `$HOME/.sluglime/session.json`, else a
    /// file in the working directory.
    pub fn session_path(&self) -> PathBuf {
        if let Some(path) = &self.session_file {
            return path.clone();
        }
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".sluglime").join("session.json"),
            None => PathBuf::from(".sluglime-session.json"),
        }
    }

    /// Whether the backend looks like a local development server.
    pub fn is_dev(&self) -> bool {
        self.api_url.contains("localhost")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = ClientConfig::load_with_prefix("SLUGLIME_TEST_UNSET").unwrap();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.is_dev());
        assert!(config.session_file.is_none());
    }

    #[test]
    fn reads_prefixed_environment() {
        std::env::set_var("SLUGCFGTEST_API_URL", "https://api.sluglime.org");
        std::env::set_var("SLUGCFGTEST_REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("SLUGCFGTEST_SESSION_FILE", "/tmp/sluglime-test/session.json");

        let config = ClientConfig::load_with_prefix("SLUGCFGTEST").unwrap();
        assert_eq!(config.api_url, "https://api.sluglime.org");
        assert_eq!(config.request_timeout_secs, 5);
        assert!(!config.is_dev());
        assert_eq!(config.session_path(), PathBuf::from("/tmp/sluglime-test/session.json"));
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let config = ClientConfig {
            request_timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }
}
