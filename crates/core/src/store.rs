//! Directory store: mediates between mutation requests, the backend, and local state.
//!
//! Every mutation follows the same order: validate against the current state, perform the
//! backend write, then reduce the committed [`Action`] into the state. If the backend write fails
//! the error is returned and the state is left exactly as it was.

use std::sync::Arc;

use crate::backend::{BackendMode, DirectoryBackend};
use crate::demo;
use crate::search::SearchResults;
use crate::state::{Action, DirectoryState};
use crate::{
    DirectoryError, DirectoryResult, InsuranceSet, NonEmptyText, Organization, OrganizationDraft,
    Provider, ProviderDraft, RecordId,
};

/// Where the initial state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Backend,
    DemoFallback,
}

/// A requested change, before the backend has accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateOrganization(OrganizationDraft),
    CreateProvider {
        organization_id: Option<RecordId>,
        draft: ProviderDraft,
    },
    UpdateOrganization {
        id: RecordId,
        draft: OrganizationDraft,
    },
    UpdateProvider {
        id: RecordId,
        draft: ProviderDraft,
    },
    DeleteOrganization(RecordId),
    DeleteProvider(RecordId),
}

impl Mutation {
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::CreateOrganization(_) => "create organization",
            Mutation::CreateProvider { .. } => "create provider",
            Mutation::UpdateOrganization { .. } => "update organization",
            Mutation::UpdateProvider { .. } => "update provider",
            Mutation::DeleteOrganization(_) => "delete organization",
            Mutation::DeleteProvider(_) => "delete provider",
        }
    }

    /// Reject mutations that cannot apply to `state` before anything is sent to the backend,
    /// and normalise draft names so the backend and the local state receive the same value.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank name and `NotFound` for an unknown record or owner.
    fn prepare(&mut self, state: &DirectoryState) -> DirectoryResult<()> {
        match self {
            Mutation::CreateOrganization(draft) => {
                draft.name = draft.validate()?.into_string();
                Ok(())
            }
            Mutation::CreateProvider {
                organization_id,
                draft,
            } => {
                draft.name = draft.validate()?.into_string();
                match organization_id {
                    Some(id) if state.organization(id).is_none() => {
                        Err(DirectoryError::NotFound(id.clone()))
                    }
                    _ => Ok(()),
                }
            }
            Mutation::UpdateOrganization { id, draft } => {
                draft.name = draft.validate()?.into_string();
                state
                    .organization(id)
                    .map(|_| ())
                    .ok_or_else(|| DirectoryError::NotFound(id.clone()))
            }
            Mutation::UpdateProvider { id, draft } => {
                draft.name = draft.validate()?.into_string();
                state
                    .provider(id)
                    .map(|_| ())
                    .ok_or_else(|| DirectoryError::NotFound(id.clone()))
            }
            Mutation::DeleteOrganization(id) => state
                .organization(id)
                .map(|_| ())
                .ok_or_else(|| DirectoryError::NotFound(id.clone())),
            Mutation::DeleteProvider(id) => state
                .provider(id)
                .map(|_| ())
                .ok_or_else(|| DirectoryError::NotFound(id.clone())),
        }
    }

    /// Perform the backend write and describe the accepted change.
    async fn commit(self, backend: &dyn DirectoryBackend) -> DirectoryResult<Action> {
        match self {
            Mutation::CreateOrganization(draft) => backend
                .insert_organization(&draft)
                .await
                .map(Action::OrganizationCreated),
            Mutation::CreateProvider {
                organization_id,
                draft,
            } => backend
                .insert_provider(&draft, organization_id.as_ref())
                .await
                .map(Action::ProviderCreated),
            Mutation::UpdateOrganization { id, draft } => {
                backend.update_organization(&id, &draft).await?;
                Ok(Action::OrganizationUpdated { id, draft })
            }
            Mutation::UpdateProvider { id, draft } => {
                backend.update_provider(&id, &draft).await?;
                Ok(Action::ProviderUpdated { id, draft })
            }
            Mutation::DeleteOrganization(id) => {
                backend.delete_organization(&id).await?;
                Ok(Action::OrganizationDeleted(id))
            }
            Mutation::DeleteProvider(id) => {
                backend.delete_provider(&id).await?;
                Ok(Action::ProviderDeleted(id))
            }
        }
    }
}

pub struct DirectoryStore {
    backend: Arc<dyn DirectoryBackend>,
    state: DirectoryState,
    source: SnapshotSource,
}

impl DirectoryStore {
    /// Load the directory from `backend`, falling back to the demo dataset on any failure.
    ///
    /// The returned store is always fully populated; a partial load is discarded.
    pub async fn initialise(backend: Arc<dyn DirectoryBackend>) -> Self {
        let (state, source) = match backend.load().await {
            Ok(snapshot) => (DirectoryState::from_snapshot(snapshot), SnapshotSource::Backend),
            Err(e) => {
                tracing::warn!(error = %e, mode = %backend.mode(), "loading directory failed, using demo data");
                (
                    DirectoryState::from_snapshot(demo::snapshot()),
                    SnapshotSource::DemoFallback,
                )
            }
        };

        Self {
            backend,
            state,
            source,
        }
    }

    pub fn state(&self) -> &DirectoryState {
        &self.state
    }

    pub fn source(&self) -> SnapshotSource {
        self.source
    }

    pub fn mode(&self) -> BackendMode {
        self.backend.mode()
    }

    pub fn search(&self, query: &str) -> SearchResults {
        self.state.search(query)
    }

    pub fn available_insurances(&self) -> Vec<String> {
        self.state.available_insurances()
    }

    /// Validate, write through the backend, then update local state.
    ///
    /// # Arguments
    ///
    /// * `mutation` - The requested change. Draft names are trimmed before the backend sees them.
    ///
    /// # Returns
    ///
    /// The committed [`Action`], already reduced into [`DirectoryStore::state`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a draft name is blank, or the target record or owning organization does not exist
    ///   (nothing is sent to the backend), or
    /// - the backend write fails (local state is left unchanged).
    pub async fn apply(&mut self, mut mutation: Mutation) -> DirectoryResult<Action> {
        mutation.prepare(&self.state)?;

        let label = mutation.label();
        let action = match mutation.commit(self.backend.as_ref()).await {
            Ok(action) => action,
            Err(e) => {
                tracing::error!(error = %e, operation = label, "directory write failed");
                return Err(e);
            }
        };

        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(action.clone());
        tracing::debug!(operation = label, "directory write applied");
        Ok(action)
    }

    pub async fn create_organization(
        &mut self,
        draft: OrganizationDraft,
    ) -> DirectoryResult<Organization> {
        match self.apply(Mutation::CreateOrganization(draft)).await? {
            Action::OrganizationCreated(organization) => Ok(organization),
            other => unreachable_action(other),
        }
    }

    /// Create a provider, attached to `organization_id` when given, otherwise independent.
    pub async fn create_provider(
        &mut self,
        organization_id: Option<RecordId>,
        draft: ProviderDraft,
    ) -> DirectoryResult<Provider> {
        match self
            .apply(Mutation::CreateProvider {
                organization_id,
                draft,
            })
            .await?
        {
            Action::ProviderCreated(provider) => Ok(provider),
            other => unreachable_action(other),
        }
    }

    pub async fn update_organization(
        &mut self,
        id: RecordId,
        draft: OrganizationDraft,
    ) -> DirectoryResult<()> {
        self.apply(Mutation::UpdateOrganization { id, draft })
            .await
            .map(|_| ())
    }

    pub async fn update_provider(&mut self, id: RecordId, draft: ProviderDraft) -> DirectoryResult<()> {
        self.apply(Mutation::UpdateProvider { id, draft })
            .await
            .map(|_| ())
    }

    pub async fn delete_organization(&mut self, id: RecordId) -> DirectoryResult<()> {
        self.apply(Mutation::DeleteOrganization(id)).await.map(|_| ())
    }

    pub async fn delete_provider(&mut self, id: RecordId) -> DirectoryResult<()> {
        self.apply(Mutation::DeleteProvider(id)).await.map(|_| ())
    }

    /// Add a user-typed insurance name to `selection`.
    ///
    /// The name is trimmed and ignored when blank. It joins the known-names catalog if no record
    /// or catalog entry already carries it. Nothing is written to the backend.
    pub fn add_custom_insurance(&mut self, selection: &mut InsuranceSet, raw: &str) -> bool {
        let Ok(name) = NonEmptyText::new(raw) else {
            return false;
        };

        if !self
            .state
            .available_insurances()
            .iter()
            .any(|known| known == name.as_str())
        {
            let state = std::mem::take(&mut self.state);
            self.state = state.reduce(Action::InsuranceCataloged(name.as_str().to_owned()));
        }

        selection.insert(name.into_string())
    }
}

fn unreachable_action<T>(action: Action) -> DirectoryResult<T> {
    Err(DirectoryError::InvalidInput(format!(
        "unexpected committed action: {action:?}"
    )))
}
