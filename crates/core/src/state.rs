//! In-memory directory state and its transition function.
//!
//! [`DirectoryState::reduce`] is pure: it takes the current state and a committed [`Action`] and
//! returns the next state. Remote writes happen before an action is produced, so a rejected
//! write never reaches this module.

use crate::backend::DirectorySnapshot;
use crate::search::{search, SearchResults};
use crate::{
    InsuranceCatalog, Organization, OrganizationDraft, Provider, ProviderDraft, RecordId,
};

/// Organizations (each with its providers), independent providers, and the insurance catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryState {
    organizations: Vec<Organization>,
    independent_providers: Vec<Provider>,
    catalog: InsuranceCatalog,
}

/// A change that has already been accepted by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Loaded(DirectorySnapshot),
    OrganizationCreated(Organization),
    ProviderCreated(Provider),
    OrganizationUpdated {
        id: RecordId,
        draft: OrganizationDraft,
    },
    ProviderUpdated {
        id: RecordId,
        draft: ProviderDraft,
    },
    OrganizationDeleted(RecordId),
    ProviderDeleted(RecordId),
    /// Local-only growth of the known insurance names.
    InsuranceCataloged(String),
}

impl DirectoryState {
    pub fn from_snapshot(snapshot: DirectorySnapshot) -> Self {
        Self {
            organizations: snapshot.organizations,
            independent_providers: snapshot.independent_providers,
            catalog: InsuranceCatalog::new(snapshot.insurance_names),
        }
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    pub fn independent_providers(&self) -> &[Provider] {
        &self.independent_providers
    }

    pub fn catalog(&self) -> &InsuranceCatalog {
        &self.catalog
    }

    pub fn organization(&self, id: &RecordId) -> Option<&Organization> {
        self.organizations.iter().find(|org| &org.id == id)
    }

    /// Find a provider by id, whether independent or owned by an organization.
    pub fn provider(&self, id: &RecordId) -> Option<&Provider> {
        self.organizations
            .iter()
            .flat_map(|org| org.providers.iter())
            .chain(self.independent_providers.iter())
            .find(|provider| &provider.id == id)
    }

    /// Sorted, de-duplicated insurance names from the catalog and every record.
    pub fn available_insurances(&self) -> Vec<String> {
        self.catalog
            .available(&self.organizations, &self.independent_providers)
    }

    pub fn search(&self, query: &str) -> SearchResults {
        search(query, &self.organizations, &self.independent_providers)
    }

    /// Applies a committed change and returns the next state.
    ///
    /// # Arguments
    /// * `action` - A change the backend has already accepted.
    ///
    /// # Returns
    /// The next state. Actions naming a record that is not present leave the state as it was;
    /// a created provider whose owner is unknown is dropped.
    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::Loaded(snapshot) => return Self::from_snapshot(snapshot),
            Action::OrganizationCreated(organization) => self.organizations.push(organization),
            Action::ProviderCreated(provider) => match provider.organization_id.clone() {
                Some(owner) => {
                    match self.organizations.iter_mut().find(|org| org.id == owner) {
                        Some(org) => org.providers.push(provider),
                        None => tracing::debug!(%owner, "dropping provider for unknown organization"),
                    }
                }
                None => self.independent_providers.push(provider),
            },
            Action::OrganizationUpdated { id, draft } => {
                if let Some(org) = self.organizations.iter_mut().find(|org| org.id == id) {
                    org.apply_draft(&draft);
                }
            }
            Action::ProviderUpdated { id, draft } => {
                if let Some(provider) = self.provider_mut(&id) {
                    provider.apply_draft(&draft);
                }
            }
            Action::OrganizationDeleted(id) => self.organizations.retain(|org| org.id != id),
            Action::ProviderDeleted(id) => {
                for org in &mut self.organizations {
                    org.providers.retain(|provider| provider.id != id);
                }
                self.independent_providers
                    .retain(|provider| provider.id != id);
            }
            Action::InsuranceCataloged(name) => {
                self.catalog.add(name);
            }
        }
        self
    }

    fn provider_mut(&mut self, id: &RecordId) -> Option<&mut Provider> {
        self.organizations
            .iter_mut()
            .flat_map(|org| org.providers.iter_mut())
            .chain(self.independent_providers.iter_mut())
            .find(|provider| &provider.id == id)
    }
}
