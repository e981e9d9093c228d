//! # IPFS Pinning Client
//!
//! Stores blobs through the Pinata pinning API and reads them back through
//! an IPFS gateway.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST | `{api_url}/pinning/pinFileToIPFS` | pin a blob, returns `IpfsHash` |
//! | GET | `{gateway_url}/ipfs/{cid}` | fetch pinned bytes |
//!
//! Pins are requested as CIDv0 so identifiers are the familiar `Qm...`
//! base58 form. A gateway read does not verify that the bytes hash to the
//! CID; the payload codec's authentication tag is the integrity gate.

use std::time::Duration;

use evp_core::ContentId;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::{ConfigError, PinataConfig};
use crate::error::StoreError;
use crate::store::{ContentMetadata, ContentStore};

const PIN_FILE_PATH: &str = "pinning/pinFileToIPFS";
const BACKEND: &str = "pinata";

/// Longest error body excerpt carried in an error.
const BODY_EXCERPT: usize = 256;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PinFileResponse {
    ipfs_hash: String,
    #[serde(default)]
    pin_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PinataErrorBody {
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Content store backed by an IPFS pinning service.
#[derive(Debug, Clone)]
pub struct PinataStore {
    http: reqwest::Client,
    api_url: url::Url,
    gateway_url: url::Url,
}

impl PinataStore {
    pub fn new(config: PinataConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "pinata_api_key",
            HeaderValue::from_str(&config.api_key)
                .map_err(|_| ConfigError::InvalidHeader("pinata_api_key"))?,
        );
        headers.insert(
            "pinata_secret_api_key",
            HeaderValue::from_str(&config.api_secret)
                .map_err(|_| ConfigError::InvalidHeader("pinata_secret_api_key"))?,
        );
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Unavailable {
                backend: BACKEND,
                reason: format!("client init: {e}"),
            })?;
        Ok(Self {
            http,
            api_url: config.api_url,
            gateway_url: config.gateway_url,
        })
    }

    fn endpoint(base: &url::Url, path: &str) -> String {
        format!("{}/{}", base.as_str().trim_end_matches('/'), path)
    }

    fn transport_error(endpoint: &str, err: reqwest::Error) -> StoreError {
        let reason = if err.is_timeout() {
            format!("{endpoint} timed out")
        } else {
            format!("{endpoint}: {err}")
        };
        StoreError::Unavailable {
            backend: BACKEND,
            reason,
        }
    }

    async fn status_error(endpoint: &str, resp: reqwest::Response) -> StoreError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<PinataErrorBody>(&body)
            .ok()
            .and_then(|b| {
                b.message.or_else(|| {
                    b.error.map(|e| match e {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    })
                })
            })
            .unwrap_or_else(|| body.chars().take(BODY_EXCERPT).collect());

        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            StoreError::Unavailable {
                backend: BACKEND,
                reason: format!("{endpoint} returned {}: {message}", status.as_u16()),
            }
        } else {
            StoreError::Rejected {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message,
            }
        }
    }
}

impl ContentStore for PinataStore {
    /// Calls `POST {api_url}/pinning/pinFileToIPFS` with a multipart body of
    /// `file`, `pinataMetadata` and `pinataOptions`.
    async fn put(
        &self,
        blob: &[u8],
        metadata: &ContentMetadata,
    ) -> Result<ContentId, StoreError> {
        let endpoint = "POST /pinning/pinFileToIPFS";
        let url = Self::endpoint(&self.api_url, PIN_FILE_PATH);

        let file = Part::bytes(blob.to_vec())
            .file_name(metadata.name.clone())
            .mime_str("application/octet-stream")
            .map_err(|e| StoreError::InvalidResponse {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;
        let pinata_metadata = serde_json::to_string(metadata).map_err(|e| {
            StoreError::InvalidResponse {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
        })?;
        let form = Form::new()
            .part("file", file)
            .text("pinataMetadata", pinata_metadata)
            .text("pinataOptions", r#"{"cidVersion":0}"#);

        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Self::transport_error(endpoint, e))?;

        if !resp.status().is_success() {
            return Err(Self::status_error(endpoint, resp).await);
        }

        let body: PinFileResponse =
            resp.json().await.map_err(|e| StoreError::InvalidResponse {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;
        let id = ContentId::new(body.ipfs_hash).map_err(|e| StoreError::InvalidResponse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        tracing::info!(
            content_id = %id,
            bytes = blob.len(),
            pin_size = body.pin_size,
            "pinned blob"
        );
        Ok(id)
    }

    /// Calls `GET {gateway_url}/ipfs/{cid}`.
    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, StoreError> {
        let endpoint = format!("GET /ipfs/{id}");
        let url = Self::endpoint(&self.gateway_url, &format!("ipfs/{id}"));

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error(&endpoint, e))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.clone()));
        }
        if !resp.status().is_success() {
            return Err(Self::status_error(&endpoint, resp).await);
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Self::transport_error(&endpoint, e))?;
        tracing::debug!(content_id = %id, bytes = bytes.len(), "fetched blob from gateway");
        Ok(bytes.to_vec())
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let base = url::Url::parse("https://api.pinata.cloud/").unwrap();
        assert_eq!(
            PinataStore::endpoint(&base, PIN_FILE_PATH),
            "https://api.pinata.cloud/pinning/pinFileToIPFS"
        );
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let base = url::Url::parse("http://127.0.0.1:8080/proxy").unwrap();
        assert_eq!(
            PinataStore::endpoint(&base, "ipfs/QmA"),
            "http://127.0.0.1:8080/proxy/ipfs/QmA"
        );
    }

    #[test]
    fn rejects_header_unsafe_credentials() {
        let mut cfg = PinataConfig::local_mock("http://127.0.0.1:9").unwrap();
        cfg.api_key = "bad\nkey".to_string();
        assert!(matches!(
            PinataStore::new(cfg),
            Err(StoreError::Config(ConfigError::InvalidHeader("pinata_api_key")))
        ));
    }

    #[test]
    fn pin_response_parses_pascal_case() {
        let body: PinFileResponse = serde_json::from_str(
            r#"{"IpfsHash":"QmT5NvUtoM5nWFfrQdVrFtvGfKFmG7AHE8P34isapyhCxX","PinSize":42,"Timestamp":"2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(body.pin_size, Some(42));
        assert!(body.ipfs_hash.starts_with("Qm"));
    }
}
