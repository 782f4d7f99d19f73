//! In-memory backend for local-only demo mode.
//!
//! Writes always succeed and nothing is persisted; the store's own state is the only copy.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;

use crate::backend::{BackendMode, DirectoryBackend, DirectorySnapshot};
use crate::{
    demo, DirectoryResult, Organization, OrganizationDraft, Provider, ProviderDraft, RecordId,
};

/// Generates millisecond-timestamp identifiers that are strictly increasing within a process,
/// so two records created in the same millisecond still get distinct ids.
#[derive(Debug, Default)]
pub struct TimestampIdGenerator {
    last: Mutex<i64>,
}

impl TimestampIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current time in milliseconds, or one more than the last id handed out if
    /// the clock has not moved past it.
    pub fn next_id(&self) -> RecordId {
        let now = Utc::now().timestamp_millis();
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let next = if now > *last { now } else { *last + 1 };
        *last = next;
        RecordId::new(next.to_string())
    }
}

/// Backend used when no datastore is configured.
///
/// `load` always returns the demo dataset and every write succeeds, with creates assigned a
/// [`TimestampIdGenerator`] id.
#[derive(Debug, Default)]
pub struct LocalBackend {
    ids: TimestampIdGenerator,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DirectoryBackend for LocalBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::Local
    }

    async fn load(&self) -> DirectoryResult<DirectorySnapshot> {
        Ok(demo::snapshot())
    }

    async fn insert_organization(
        &self,
        draft: &OrganizationDraft,
    ) -> DirectoryResult<Organization> {
        Ok(Organization::from_draft(self.ids.next_id(), draft))
    }

    async fn insert_provider(
        &self,
        draft: &ProviderDraft,
        organization_id: Option<&RecordId>,
    ) -> DirectoryResult<Provider> {
        Ok(Provider::from_draft(
            self.ids.next_id(),
            draft,
            organization_id.cloned(),
        ))
    }

    async fn update_organization(
        &self,
        _id: &RecordId,
        _draft: &OrganizationDraft,
    ) -> DirectoryResult<()> {
        Ok(())
    }

    async fn update_provider(&self, _id: &RecordId, _draft: &ProviderDraft) -> DirectoryResult<()> {
        Ok(())
    }

    async fn delete_organization(&self, _id: &RecordId) -> DirectoryResult<()> {
        Ok(())
    }

    async fn delete_provider(&self, _id: &RecordId) -> DirectoryResult<()> {
        Ok(())
    }
}
