//! Multi-token filter over the directory.
//!
//! A query is lower-cased and split on whitespace. A record matches when every token is a
//! substring of its lower-cased searchable text. There is no ranking or edit distance.
//!
//! Organizations are kept when their own text matches (with their full roster) or when at least
//! one of their providers matches (with only the matching providers attached).

use serde::Serialize;

use crate::{Organization, Provider};

/// An organization included in a search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrganizationHit {
    #[serde(flatten)]
    pub organization: Organization,
    /// True when the organization's own fields matched the query.
    pub highlighted: bool,
}

/// Filtered view of the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub organizations: Vec<OrganizationHit>,
    pub independent_providers: Vec<Provider>,
}

impl SearchResults {
    /// Number of result rows: organizations plus independent providers.
    pub fn total(&self) -> usize {
        self.organizations.len() + self.independent_providers.len()
    }
}

/// Lower-cased, whitespace-separated query tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    tokens: Vec<String>,
}

impl Query {
    pub fn parse(input: &str) -> Self {
        Self {
            tokens: input
                .to_lowercase()
                .split_whitespace()
                .map(str::to_owned)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// True when every token occurs in the lower-cased concatenation of `fields`.
    pub fn matches<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        let text = fields.into_iter().collect::<Vec<_>>().join(" ").to_lowercase();
        self.tokens.iter().all(|token| text.contains(token.as_str()))
    }

    fn matches_provider(&self, provider: &Provider, organization_name: Option<&str>) -> bool {
        let fields = [provider.name.as_str(), provider.specialty.as_str()]
            .into_iter()
            .chain(organization_name)
            .chain(provider.insurances.iter());
        self.matches(fields)
    }

    fn matches_organization(&self, organization: &Organization) -> bool {
        let fields = std::iter::once(organization.name.as_str()).chain(organization.insurances.iter());
        self.matches(fields)
    }
}

/// Filter `organizations` and `independent_providers` by `query`.
///
/// An empty or whitespace-only query returns every record unchanged.
pub fn search(
    query: &str,
    organizations: &[Organization],
    independent_providers: &[Provider],
) -> SearchResults {
    let query = Query::parse(query);

    if query.is_empty() {
        return SearchResults {
            organizations: organizations
                .iter()
                .cloned()
                .map(|organization| OrganizationHit {
                    organization,
                    highlighted: false,
                })
                .collect(),
            independent_providers: independent_providers.to_vec(),
        };
    }

    let mut hits = Vec::new();
    for organization in organizations {
        let organization_matches = query.matches_organization(organization);

        let providers: Vec<Provider> = if organization_matches {
            organization.providers.clone()
        } else {
            organization
                .providers
                .iter()
                .filter(|provider| query.matches_provider(provider, Some(&organization.name)))
                .cloned()
                .collect()
        };

        if organization_matches || !providers.is_empty() {
            hits.push(OrganizationHit {
                organization: Organization {
                    providers,
                    ..organization.clone()
                },
                highlighted: organization_matches,
            });
        }
    }

    let independent_providers = independent_providers
        .iter()
        .filter(|provider| query.matches_provider(provider, None))
        .cloned()
        .collect();

    SearchResults {
        organizations: hits,
        independent_providers,
    }
}
