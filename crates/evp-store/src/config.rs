//! Pinning service configuration.
//!
//! Defaults point at the public Pinata API and gateway. Override via
//! environment variables or explicit construction for tests.

use url::Url;

const DEFAULT_API_URL: &str = "https://api.pinata.cloud";
const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for [`PinataStore`](crate::PinataStore).
///
/// `Debug` redacts both credentials.
#[derive(Clone)]
pub struct PinataConfig {
    /// Base URL of the pinning API.
    pub api_url: Url,
    /// Base URL of the IPFS gateway used for reads.
    pub gateway_url: Url,
    pub api_key: String,
    pub api_secret: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for PinataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinataConfig")
            .field("api_url", &self.api_url)
            .field("gateway_url", &self.gateway_url)
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl PinataConfig {
    /// Load configuration from environment variables.
    ///
    /// - `EVP_PINATA_API_KEY` (required)
    /// - `EVP_PINATA_SECRET_API_KEY` (required)
    /// - `EVP_PINATA_API_URL` (default: `https://api.pinata.cloud`)
    /// - `EVP_PINATA_GATEWAY_URL` (default: `https://gateway.pinata.cloud`)
    /// - `EVP_PINATA_TIMEOUT_SECS` (default: 60)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("EVP_PINATA_API_KEY")
            .map_err(|_| ConfigError::MissingVar("EVP_PINATA_API_KEY"))?;
        let api_secret = std::env::var("EVP_PINATA_SECRET_API_KEY")
            .map_err(|_| ConfigError::MissingVar("EVP_PINATA_SECRET_API_KEY"))?;
        Ok(Self {
            api_url: env_url("EVP_PINATA_API_URL", DEFAULT_API_URL)?,
            gateway_url: env_url("EVP_PINATA_GATEWAY_URL", DEFAULT_GATEWAY_URL)?,
            api_key,
            api_secret,
            timeout_secs: std::env::var("EVP_PINATA_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Point both the API and the gateway at one local mock server.
    pub fn local_mock(base: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(base)
            .map_err(|e| ConfigError::InvalidUrl(base.to_string(), e.to_string()))?;
        Ok(Self {
            api_url: url.clone(),
            gateway_url: url,
            api_key: "test-key".to_string(),
            api_secret: "test-secret".to_string(),
            timeout_secs: 5,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingVar(&'static str),
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_mock_uses_same_base_for_api_and_gateway() {
        let cfg = PinataConfig::local_mock("http://127.0.0.1:9100").unwrap();
        assert_eq!(cfg.api_url, cfg.gateway_url);
        assert_eq!(cfg.timeout_secs, 5);
    }

    #[test]
    fn debug_redacts_credentials() {
        let cfg = PinataConfig::local_mock("http://127.0.0.1:9100").unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("test-key"));
        assert!(!dbg.contains("test-secret"));
        assert!(dbg.contains("[REDACTED]"));
    }

    #[test]
    fn env_url_uses_default_when_var_absent() {
        let url = env_url("EVP_NONEXISTENT_VAR_4821", DEFAULT_GATEWAY_URL).unwrap();
        assert_eq!(url.as_str(), "https://gateway.pinata.cloud/");
    }

    #[test]
    fn env_url_rejects_invalid_url() {
        std::env::set_var("EVP_TEST_BAD_URL_STORE", "not a url");
        let result = env_url("EVP_TEST_BAD_URL_STORE", DEFAULT_API_URL);
        std::env::remove_var("EVP_TEST_BAD_URL_STORE");
        assert!(result.is_err());
    }

    #[test]
    fn local_mock_rejects_garbage() {
        assert!(matches!(
            PinataConfig::local_mock("::::"),
            Err(ConfigError::InvalidUrl(..))
        ));
    }
}
