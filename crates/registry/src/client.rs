//! HTTP client for the national provider registry's read endpoint.

use async_trait::async_trait;
use reqwest::Client;

use crate::name::NameQuery;
use crate::npi::{NpiResponse, REGISTRY_FETCH_LIMIT};
use crate::{RegistryError, RegistryResult};

pub const DEFAULT_REGISTRY_URL: &str = "https://npiregistry.cms.hhs.gov/api/";

/// API version requested from the registry.
pub const REGISTRY_API_VERSION: &str = "2.1";

/// Source of raw registry records.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    async fn fetch(&self, query: &NameQuery) -> RegistryResult<NpiResponse>;
}

#[derive(Debug, Clone)]
pub struct NpiRegistryClient {
    client: Client,
    base_url: String,
}

impl NpiRegistryClient {
    pub fn new(base_url: impl Into<String>) -> RegistryResult<Self> {
        let base_url = base_url.into().trim().to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(RegistryError::InvalidUrl(base_url));
        }
        Ok(Self {
            client: Client::builder().build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Resolve the registry URL from an optional environment value.
pub fn registry_url_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string())
}

#[async_trait]
impl RegistrySource for NpiRegistryClient {
    async fn fetch(&self, query: &NameQuery) -> RegistryResult<NpiResponse> {
        let limit = REGISTRY_FETCH_LIMIT.to_string();
        let mut params: Vec<(&str, &str)> = vec![("version", REGISTRY_API_VERSION)];
        params.extend(query.params());
        params.push(("limit", limit.as_str()));

        tracing::debug!(last_name = %query.last_name, "querying provider registry");

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(RegistryError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_value_overrides_default_url() {
        assert_eq!(registry_url_from_env_value(None), DEFAULT_REGISTRY_URL);
        assert_eq!(registry_url_from_env_value(Some("  ".into())), DEFAULT_REGISTRY_URL);
        assert_eq!(
            registry_url_from_env_value(Some("http://localhost:9000/api/".into())),
            "http://localhost:9000/api/"
        );
    }

    #[test]
    fn rejects_non_http_url() {
        let err = NpiRegistryClient::new("npiregistry").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn unreachable_registry_is_an_error() {
        let client = NpiRegistryClient::new("http://127.0.0.1:1/api/").unwrap();
        let query = NameQuery::from_name("Sarah Smith").unwrap();
        let err = client.fetch(&query).await.unwrap_err();
        assert!(matches!(err, RegistryError::Http(_)));
    }
}
