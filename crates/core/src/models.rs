//! Directory records and the drafts used to create or edit them.
//!
//! Rows coming back from the datastore may carry `null` for text and list columns; those are
//! read as empty values. Identifiers may be numeric or textual depending on the datastore schema
//! and are kept as opaque strings.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::{DirectoryError, DirectoryResult, InsuranceSet, NonEmptyText};

/// Opaque, stable record identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => RecordId(s),
            Raw::Unsigned(n) => RecordId(n.to_string()),
            Raw::Signed(n) => RecordId(n.to_string()),
        })
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An independent or organization-owned provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: RecordId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub specialty: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(default)]
    pub npi: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub insurances: InsuranceSet,
    /// Owning organization; `None` for an independent provider.
    #[serde(default)]
    pub organization_id: Option<RecordId>,
}

impl Provider {
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            specialty: String::new(),
            phone: String::new(),
            address: String::new(),
            npi: None,
            insurances: InsuranceSet::new(),
            organization_id: None,
        }
    }

    /// Build a provider from a draft and an assigned identifier.
    pub fn from_draft(
        id: RecordId,
        draft: &ProviderDraft,
        organization_id: Option<RecordId>,
    ) -> Self {
        let mut provider = Self::new(id, String::new());
        provider.organization_id = organization_id;
        provider.apply_draft(draft);
        provider
    }

    /// Overwrite the editable fields in place. Identifier and owner are untouched.
    pub fn apply_draft(&mut self, draft: &ProviderDraft) {
        self.name = draft.name.trim().to_owned();
        self.specialty = draft.specialty.clone();
        self.phone = draft.phone.clone();
        self.address = draft.address.clone();
        self.npi = draft.npi.clone();
        self.insurances = draft.insurances.clone();
    }

    pub fn is_independent(&self) -> bool {
        self.organization_id.is_none()
    }
}

/// An organization together with the providers it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: RecordId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(default)]
    pub npi: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub insurances: InsuranceSet,
    #[serde(default, deserialize_with = "null_as_default")]
    pub providers: Vec<Provider>,
}

impl Organization {
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: String::new(),
            address: String::new(),
            npi: None,
            insurances: InsuranceSet::new(),
            providers: Vec::new(),
        }
    }

    /// Build an organization with no providers from a draft and an assigned identifier.
    pub fn from_draft(id: RecordId, draft: &OrganizationDraft) -> Self {
        let mut organization = Self::new(id, String::new());
        organization.apply_draft(draft);
        organization
    }

    /// Overwrite the editable fields in place. Identifier and providers are untouched.
    pub fn apply_draft(&mut self, draft: &OrganizationDraft) {
        self.name = draft.name.trim().to_owned();
        self.phone = draft.phone.clone();
        self.address = draft.address.clone();
        self.npi = draft.npi.clone();
        self.insurances = draft.insurances.clone();
    }
}

/// Editable fields of an organization, as written to the datastore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationDraft {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub npi: Option<String>,
    pub insurances: InsuranceSet,
}

impl OrganizationDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Start an edit from the current values of `organization`.
    pub fn from_record(organization: &Organization) -> Self {
        Self {
            name: organization.name.clone(),
            phone: organization.phone.clone(),
            address: organization.address.clone(),
            npi: organization.npi.clone(),
            insurances: organization.insurances.clone(),
        }
    }

    pub fn validate(&self) -> DirectoryResult<NonEmptyText> {
        validated_name(&self.name)
    }
}

/// Editable fields of a provider, as written to the datastore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDraft {
    pub name: String,
    pub specialty: String,
    pub phone: String,
    pub address: String,
    pub npi: Option<String>,
    pub insurances: InsuranceSet,
}

impl ProviderDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Start an edit from the current values of `provider`.
    pub fn from_record(provider: &Provider) -> Self {
        Self {
            name: provider.name.clone(),
            specialty: provider.specialty.clone(),
            phone: provider.phone.clone(),
            address: provider.address.clone(),
            npi: provider.npi.clone(),
            insurances: provider.insurances.clone(),
        }
    }

    pub fn validate(&self) -> DirectoryResult<NonEmptyText> {
        validated_name(&self.name)
    }
}

fn validated_name(name: &str) -> DirectoryResult<NonEmptyText> {
    NonEmptyText::new(name).map_err(|_| DirectoryError::InvalidInput("name is required".into()))
}
