//! Wire types for the national provider registry and their reshaping into candidates.
//!
//! Only the fields the directory uses are modelled; everything else in the response is ignored.

use serde::Deserialize;
use serde_json::Value;

use crate::candidate::{RegistryCandidate, REGISTRY_SOURCE};
use crate::format::{format_address, format_phone};

/// Records requested from the registry per lookup.
pub const REGISTRY_FETCH_LIMIT: usize = 10;

/// Candidates returned to the caller per lookup.
pub const MAX_CANDIDATES: usize = 5;

/// Enumeration type of individual (non-organizational) providers.
pub const INDIVIDUAL_ENUMERATION: &str = "NPI-1";

pub const ACTIVE_STATUS: &str = "A";

pub const LOCATION_PURPOSE: &str = "LOCATION";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NpiResponse {
    #[serde(default)]
    pub results: Option<Vec<NpiResult>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NpiResult {
    /// The NPI; the registry may send it as a number or a string.
    #[serde(default)]
    pub number: Value,
    #[serde(default)]
    pub enumeration_type: Option<String>,
    #[serde(default)]
    pub basic: NpiBasic,
    #[serde(default)]
    pub addresses: Vec<NpiAddress>,
    #[serde(default)]
    pub taxonomies: Vec<NpiTaxonomy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NpiBasic {
    pub status: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub credential: Option<String>,
    pub gender: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NpiAddress {
    pub address_purpose: Option<String>,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub telephone_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NpiTaxonomy {
    #[serde(default)]
    pub primary: bool,
    pub desc: Option<String>,
}

impl NpiResult {
    pub fn npi(&self) -> String {
        match &self.number {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    pub fn is_active_individual(&self) -> bool {
        self.enumeration_type.as_deref() == Some(INDIVIDUAL_ENUMERATION)
            && self.basic.status.as_deref() == Some(ACTIVE_STATUS)
    }

    /// The practice location address, else the first address listed.
    pub fn location(&self) -> Option<&NpiAddress> {
        self.addresses
            .iter()
            .find(|address| address.address_purpose.as_deref() == Some(LOCATION_PURPOSE))
            .or_else(|| self.addresses.first())
    }

    /// The primary taxonomy, else the first listed.
    pub fn taxonomy(&self) -> Option<&NpiTaxonomy> {
        self.taxonomies
            .iter()
            .find(|taxonomy| taxonomy.primary)
            .or_else(|| self.taxonomies.first())
    }

    pub fn to_candidate(&self) -> RegistryCandidate {
        let location = self.location();
        let npi = self.npi();

        let address = match location {
            Some(address) => format_address([
                address.address_1.as_deref(),
                address.address_2.as_deref(),
                address.city.as_deref(),
                address.state.as_deref(),
                address.postal_code.as_deref(),
            ]),
            None => "Address not available".to_string(),
        };

        let phone = match location
            .and_then(|address| address.telephone_number.as_deref())
            .filter(|phone| !phone.is_empty())
        {
            Some(phone) => format_phone(phone),
            None => "Phone not available".to_string(),
        };

        let specialty = self
            .taxonomy()
            .and_then(|taxonomy| taxonomy.desc.clone())
            .filter(|desc| !desc.is_empty())
            .unwrap_or_else(|| "Not specified".to_string());

        RegistryCandidate {
            id: npi.clone(),
            name: format!(
                "Dr. {} {}",
                self.basic.first_name.as_deref().unwrap_or_default(),
                self.basic.last_name.as_deref().unwrap_or_default()
            ),
            address,
            phone,
            specialty,
            npi,
            source: REGISTRY_SOURCE.to_string(),
            credentials: self.basic.credential.clone().unwrap_or_default(),
            gender: self.basic.gender.clone().unwrap_or_default(),
        }
    }
}

/// Keep active individual providers, reshape them, and cap the list, preserving registry order.
pub fn reshape(response: &NpiResponse) -> Vec<RegistryCandidate> {
    response
        .results
        .iter()
        .flatten()
        .filter(|result| result.is_active_individual())
        .map(NpiResult::to_candidate)
        .take(MAX_CANDIDATES)
        .collect()
}
