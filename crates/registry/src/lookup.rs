//! Provider lookups: the logic behind the search-provider proxy endpoint.

use async_trait::async_trait;
use std::sync::Arc;

use crate::candidate::RegistryCandidate;
use crate::client::RegistrySource;
use crate::name::{is_too_short, NameQuery};
use crate::npi::reshape;
use crate::RegistryResult;

/// Lookup type discriminator that enables a registry query.
pub const PROVIDER_KIND: &str = "provider";

/// Anything that can turn a typed name into candidates.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn candidates(&self, name: &str) -> RegistryResult<Vec<RegistryCandidate>>;
}

#[derive(Clone)]
pub struct ProviderLookup {
    source: Arc<dyn RegistrySource>,
}

impl ProviderLookup {
    pub fn new(source: Arc<dyn RegistrySource>) -> Self {
        Self { source }
    }

    /// Look up candidates for `name` when `kind` is [`PROVIDER_KIND`].
    ///
    /// An absent or too-short name, another kind, or a name that is empty after stripping the
    /// honorific all return an empty list without contacting the registry. Registry failures
    /// are returned as errors; there is no retry.
    pub async fn search(
        &self,
        name: Option<&str>,
        kind: Option<&str>,
    ) -> RegistryResult<Vec<RegistryCandidate>> {
        let Some(name) = name.filter(|name| !is_too_short(name)) else {
            return Ok(Vec::new());
        };
        if kind != Some(PROVIDER_KIND) {
            return Ok(Vec::new());
        }
        let Some(query) = NameQuery::from_name(name) else {
            return Ok(Vec::new());
        };

        let response = self.source.fetch(&query).await?;
        let candidates = reshape(&response);
        tracing::info!(count = candidates.len(), "provider registry lookup complete");
        Ok(candidates)
    }
}

#[async_trait]
impl CandidateSource for ProviderLookup {
    async fn candidates(&self, name: &str) -> RegistryResult<Vec<RegistryCandidate>> {
        self.search(Some(name), Some(PROVIDER_KIND)).await
    }
}
