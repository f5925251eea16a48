//! HTTP client for the FHE key-generation service
//!
//! The service mints an FHE key pair for an identifier. Key material is
//! passed through as returned; nothing here interprets it.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Keys returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FheKeys {
    #[serde(rename = "fhe_public_key")]
    pub public_key: String,
    pub client_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateKeysRequest<'a> {
    public_key: &'a str,
    server_key: &'a str,
}

/// Client for `POST <base>/generate_keys`
pub struct KeyGenClient {
    base_url: String,
    client: reqwest::Client,
}

impl KeyGenClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request a fresh key pair for `id`
    pub async fn generate_keys(&self, id: &str) -> Result<FheKeys> {
        let resp = self
            .client
            .post(format!("{}/generate_keys", self.base_url))
            .json(&GenerateKeysRequest {
                public_key: id,
                server_key: "",
            })
            .send()
            .await
            .context("Failed to connect to key-generation service")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Key generation failed ({}): {}", status, body);
        }

        let keys: FheKeys = resp
            .json()
            .await
            .context("Failed to parse key-generation response")?;

        tracing::debug!(id, public_key_len = keys.public_key.len(), "fhe keys generated");
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> KeyGenClient {
        KeyGenClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_generate_keys() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_keys"))
            .and(body_json(json!({ "public_key": "user-7", "server_key": "" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "fhe_public_key": "pk-bytes",
                "client_key": "ck-bytes",
                "server_key": "ignored"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let keys = client(&server).generate_keys("user-7").await.unwrap();

        assert_eq!(keys.public_key, "pk-bytes");
        assert_eq!(keys.client_key, "ck-bytes");
    }

    #[tokio::test]
    async fn test_service_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_keys"))
            .respond_with(ResponseTemplate::new(500).set_body_string("keygen offline"))
            .mount(&server)
            .await;

        let err = client(&server).generate_keys("user-7").await.unwrap_err();

        assert!(err.to_string().contains("keygen offline"));
    }

    #[tokio::test]
    async fn test_missing_fields_fail_to_parse() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate_keys"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "client_key": "ck" })))
            .mount(&server)
            .await;

        let err = client(&server).generate_keys("user-7").await.unwrap_err();

        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = KeyGenClient::new("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }
}
