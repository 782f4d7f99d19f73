//! Reshaped registry records offered to the user when adding a provider.

use chrono::Utc;
use directory_core::{OrganizationDraft, ProviderDraft};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const REGISTRY_SOURCE: &str = "NPI Registry";
pub const NO_RECORDS_SOURCE: &str = "No NPI Records";
pub const LOOKUP_ERROR_SOURCE: &str = "Backend Error";

/// One candidate record. Never persisted; only used to pre-fill a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegistryCandidate {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub specialty: String,
    pub npi: String,
    pub source: String,
    #[serde(default)]
    pub credentials: String,
    #[serde(default)]
    pub gender: String,
}

impl RegistryCandidate {
    /// Synthetic entry shown when a lookup found nothing.
    pub fn no_results(name: &str) -> Self {
        Self {
            id: format!("no_results_{}", Utc::now().timestamp_millis()),
            name: format!("No NPI records found for \"{name}\""),
            address: "Try different name or spelling".into(),
            phone: "Manual entry required".into(),
            specialty: "Please specify manually".into(),
            npi: String::new(),
            source: NO_RECORDS_SOURCE.into(),
            credentials: String::new(),
            gender: String::new(),
        }
    }

    /// Synthetic entry shown when a lookup failed.
    pub fn lookup_failed(name: &str, message: &str) -> Self {
        Self {
            id: format!("error_{}", Utc::now().timestamp_millis()),
            name: format!("Backend Error for \"{name}\""),
            address: format!("Error: {message}"),
            phone: "Manual entry required".into(),
            specialty: "Please specify manually".into(),
            npi: String::new(),
            source: LOOKUP_ERROR_SOURCE.into(),
            credentials: String::new(),
            gender: String::new(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.source != REGISTRY_SOURCE
    }

    /// Pre-fill a provider draft. Specialty and NPI are only copied when non-empty.
    pub fn apply_to(&self, draft: &mut ProviderDraft) {
        draft.name = self.name.clone();
        draft.phone = self.phone.clone();
        draft.address = self.address.clone();
        if !self.specialty.is_empty() {
            draft.specialty = self.specialty.clone();
        }
        if !self.npi.is_empty() {
            draft.npi = Some(self.npi.clone());
        }
    }

    /// Pre-fill an organization draft. NPI is only copied when non-empty.
    pub fn apply_to_organization(&self, draft: &mut OrganizationDraft) {
        draft.name = self.name.clone();
        draft.phone = self.phone.clone();
        draft.address = self.address.clone();
        if !self.npi.is_empty() {
            draft.npi = Some(self.npi.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> RegistryCandidate {
        RegistryCandidate {
            id: "1234567891".into(),
            name: "Dr. Sarah Smith".into(),
            address: "123 Main St, Springfield, IL, 62701".into(),
            phone: "(555) 123-4567".into(),
            specialty: "Dermatology".into(),
            npi: "1234567891".into(),
            source: REGISTRY_SOURCE.into(),
            credentials: "MD".into(),
            gender: "F".into(),
        }
    }

    #[test]
    fn apply_to_fills_provider_draft() {
        let mut draft = ProviderDraft::new("sarah smi");
        draft.insurances.insert("Medicare");
        candidate().apply_to(&mut draft);

        assert_eq!(draft.name, "Dr. Sarah Smith");
        assert_eq!(draft.specialty, "Dermatology");
        assert_eq!(draft.npi.as_deref(), Some("1234567891"));
        assert_eq!(draft.insurances.as_slice(), ["Medicare"]);
    }

    #[test]
    fn apply_to_keeps_existing_specialty_and_npi_when_candidate_is_blank() {
        let mut draft = ProviderDraft::new("x");
        draft.specialty = "Pediatrics".into();
        draft.npi = Some("999".into());

        let mut blank = candidate();
        blank.specialty.clear();
        blank.npi.clear();
        blank.apply_to(&mut draft);

        assert_eq!(draft.specialty, "Pediatrics");
        assert_eq!(draft.npi.as_deref(), Some("999"));
    }

    #[test]
    fn placeholders_are_marked() {
        let none = RegistryCandidate::no_results("Sarah Smith");
        assert!(none.is_placeholder());
        assert_eq!(none.name, "No NPI records found for \"Sarah Smith\"");
        assert!(none.id.starts_with("no_results_"));

        let failed = RegistryCandidate::lookup_failed("Sarah Smith", "timeout");
        assert!(failed.is_placeholder());
        assert_eq!(failed.address, "Error: timeout");
        assert!(failed.id.starts_with("error_"));

        assert!(!candidate().is_placeholder());
    }
}
