//! Client for the directory's own search-provider endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::candidate::RegistryCandidate;
use crate::lookup::{CandidateSource, PROVIDER_KIND};
use crate::{RegistryError, RegistryResult};

/// Path of the lookup endpoint relative to the server root.
pub const SEARCH_PROVIDER_PATH: &str = "/api/search-provider";

/// Server root used when `DIRECTORY_PROXY_URL` is not set.
pub const DEFAULT_PROXY_URL: &str = "http://localhost:3000";

#[derive(Serialize)]
struct SearchBody<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

/// Looks up candidates through a running directory server instead of the registry itself.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    endpoint: String,
}

impl ProxyClient {
    /// Creates a client for the server at `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Server root, e.g. `http://localhost:3000`. A trailing slash is ignored.
    ///
    /// # Returns
    /// A client posting to `{base_url}/api/search-provider`.
    ///
    /// # Errors
    /// Returns `InvalidUrl` if `base_url` is not an http(s) URL, or `Http` if the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str) -> RegistryResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(RegistryError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            client: Client::builder().build()?,
            endpoint: format!("{base_url}{SEARCH_PROVIDER_PATH}"),
        })
    }

    /// Full URL of the lookup endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CandidateSource for ProxyClient {
    async fn candidates(&self, name: &str) -> RegistryResult<Vec<RegistryCandidate>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SearchBody {
                name,
                kind: PROVIDER_KIND,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        Ok(response.json().await?)
    }
}
