//! Insurance names accepted by organizations and providers.
//!
//! Names are plain strings compared exactly; "Blue Cross" and "Blue Cross Blue Shield" are two
//! different entries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{Organization, Provider};

/// Ordered set of insurance names. Insertion order is kept and duplicates are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InsuranceSet(Vec<String>);

impl InsuranceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name` unless it is already present. Returns whether the set changed.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.0.push(name);
        true
    }

    /// Remove `name` if present. Returns whether the set changed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|existing| existing != name);
        self.0.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|existing| existing == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for InsuranceSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = InsuranceSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

/// Known insurance names maintained separately from the records.
///
/// Growth is local to the session: names added here are never written back to the datastore.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsuranceCatalog {
    known: Vec<String>,
}

impl InsuranceCatalog {
    pub fn new(known: Vec<String>) -> Self {
        Self { known }
    }

    pub fn known(&self) -> &[String] {
        &self.known
    }

    /// Append `name` to the known list. Returns whether it was new to the list.
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.known.contains(&name) {
            return false;
        }
        self.known.push(name);
        true
    }

    /// Sorted, de-duplicated union of the known list and every name on any organization or
    /// provider (including providers owned by organizations).
    pub fn available(
        &self,
        organizations: &[Organization],
        independent_providers: &[Provider],
    ) -> Vec<String> {
        let mut names: BTreeSet<&str> = self.known.iter().map(String::as_str).collect();

        for organization in organizations {
            names.extend(organization.insurances.iter());
            for provider in &organization.providers {
                names.extend(provider.insurances.iter());
            }
        }
        for provider in independent_providers {
            names.extend(provider.insurances.iter());
        }

        names.into_iter().map(str::to_owned).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insurance_set_ignores_duplicates_and_keeps_order() {
        let mut set = InsuranceSet::new();
        assert!(set.insert("Medicare"));
        assert!(set.insert("Aetna"));
        assert!(!set.insert("Medicare"));
        assert_eq!(set.as_slice(), ["Medicare", "Aetna"]);

        assert!(set.remove("Medicare"));
        assert!(!set.remove("Medicare"));
        assert_eq!(set.as_slice(), ["Aetna"]);
    }

    #[test]
    fn exact_match_keeps_similar_names_distinct() {
        let set: InsuranceSet = ["Blue Cross", "Blue Cross Blue Shield"].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(!set.contains("blue cross"));
    }

    #[test]
    fn available_is_sorted_union_of_catalog_and_records() {
        let catalog = InsuranceCatalog::new(vec!["Humana".into(), "Aetna".into()]);

        let mut organization = Organization::new("1", "Central Medical Group");
        organization.insurances = ["Medicare", "Aetna"].into_iter().collect();
        let mut owned = Provider::new("10", "Dr. Owned");
        owned.insurances = ["Cigna"].into_iter().collect();
        organization.providers.push(owned);

        let mut independent = Provider::new("20", "Dr. Solo");
        independent.insurances = ["Molina Medicaid"].into_iter().collect();

        let available = catalog.available(&[organization], &[independent]);
        assert_eq!(
            available,
            vec!["Aetna", "Cigna", "Humana", "Medicare", "Molina Medicaid"]
        );
    }

    #[test]
    fn catalog_add_reports_novelty() {
        let mut catalog = InsuranceCatalog::default();
        assert!(catalog.add("Tricare"));
        assert!(!catalog.add("Tricare"));
        assert_eq!(catalog.known(), ["Tricare"]);
    }
}
