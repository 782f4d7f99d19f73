//! Persistence capability used by the directory store.
//!
//! The store talks to exactly one [`DirectoryBackend`]; whether that is the remote datastore or
//! the in-memory fallback is decided once, at startup, by [`backend_from_config`].

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::CoreConfig;
use crate::local::LocalBackend;
use crate::remote::RemoteBackend;
use crate::{
    DirectoryResult, Organization, OrganizationDraft, Provider, ProviderDraft, RecordId,
};

/// Everything the directory needs to render: organizations with nested providers, independent
/// providers, and the separately maintained insurance names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    pub organizations: Vec<Organization>,
    pub independent_providers: Vec<Provider>,
    pub insurance_names: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendMode {
    Remote,
    Local,
}

impl std::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendMode::Remote => f.write_str("remote"),
            BackendMode::Local => f.write_str("local"),
        }
    }
}

/// Reads and writes directory records.
///
/// Inserts return the stored record so the caller picks up whatever identifier the backend
/// assigned. Every write either succeeds completely or returns an error; callers must not touch
/// their own state on error.
#[async_trait]
pub trait DirectoryBackend: Send + Sync {
    fn mode(&self) -> BackendMode;

    async fn load(&self) -> DirectoryResult<DirectorySnapshot>;

    async fn insert_organization(&self, draft: &OrganizationDraft)
        -> DirectoryResult<Organization>;

    async fn insert_provider(
        &self,
        draft: &ProviderDraft,
        organization_id: Option<&RecordId>,
    ) -> DirectoryResult<Provider>;

    async fn update_organization(
        &self,
        id: &RecordId,
        draft: &OrganizationDraft,
    ) -> DirectoryResult<()>;

    async fn update_provider(&self, id: &RecordId, draft: &ProviderDraft) -> DirectoryResult<()>;

    async fn delete_organization(&self, id: &RecordId) -> DirectoryResult<()>;

    async fn delete_provider(&self, id: &RecordId) -> DirectoryResult<()>;
}

/// Pick the backend for `cfg`: remote when a datastore is configured, local otherwise.
pub fn backend_from_config(cfg: &CoreConfig) -> DirectoryResult<Arc<dyn DirectoryBackend>> {
    match cfg.datastore() {
        Some(datastore) => Ok(Arc::new(RemoteBackend::new(datastore.clone())?)),
        None => Ok(Arc::new(LocalBackend::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatastoreConfig;

    #[test]
    fn config_without_datastore_selects_local_backend() {
        let backend = backend_from_config(&CoreConfig::local_only()).unwrap();
        assert_eq!(backend.mode(), BackendMode::Local);
    }

    #[test]
    fn config_with_datastore_selects_remote_backend() {
        let datastore = DatastoreConfig::new("https://example.test", "key").unwrap();
        let backend = backend_from_config(&CoreConfig::new(Some(datastore))).unwrap();
        assert_eq!(backend.mode(), BackendMode::Remote);
    }
}
