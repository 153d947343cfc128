use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] envy::Error),
    #[error("Invalid configuration: {0}")]
    Validation(String),
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Endpoint constants and transport settings for the remote filter service.
///
/// Loaded from `FACEAPP_`-prefixed environment variables; anything unset
/// falls back to the service's well-known values.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_api_user_agent")]
    pub api_user_agent: String,

    #[serde(default = "default_test_image_url")]
    pub test_image_url: String,

    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_user_agent: default_api_user_agent(),
            test_image_url: default_test_image_url(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_env_no_dotenv()
    }

    fn from_env_no_dotenv() -> Result<Self, ConfigError> {
        let config: Config = envy::prefixed("FACEAPP_").from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, url) in [
            ("API base URL", &self.api_base_url),
            ("Test image URL", &self.test_image_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Validation(format!(
                    "{name} must start with http:// or https://: {url}"
                )));
            }
        }

        if self.api_user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "API user agent must not be empty".into(),
            ));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "Request timeout must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// `POST` target for photo uploads.
    pub fn photos_url(&self) -> String {
        format!("{}/api/v2.11/photos", self.api_base_url.trim_end_matches('/'))
    }

    /// `GET` target for a rendered filter. `code` and `filter_id` are
    /// percent-encoded as single path segments.
    pub fn filter_image_url(
        &self,
        code: &str,
        filter_id: &str,
        cropped: bool,
    ) -> Result<Url, ConfigError> {
        let mut url = Url::parse(&self.photos_url()).map_err(|e| {
            ConfigError::Validation(format!("Invalid API base URL {}: {e}", self.api_base_url))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                ConfigError::Validation(format!(
                    "API base URL cannot carry a path: {}",
                    self.api_base_url
                ))
            })?
            .pop_if_empty()
            .extend([code, "filters", filter_id]);
        url.query_pairs_mut()
            .append_pair("cropped", if cropped { "1" } else { "0" });

        Ok(url)
    }
}

fn default_api_base_url() -> String {
    "https://node-03.faceapp.io".to_string()
}

fn default_api_user_agent() -> String {
    "FaceApp/2.0.957 (Linux; Android 4.4)".to_string()
}

fn default_test_image_url() -> String {
    "https://i.imgur.com/nVsxMNp.jpg".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    30
}
