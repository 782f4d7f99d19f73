//! # Directory Registry
//!
//! Provider lookups against the public NPI registry.
//!
//! - [`client`]: the registry HTTP client and the [`RegistrySource`] seam used in tests
//! - [`lookup`]: name validation and result reshaping behind the search-provider endpoint
//! - [`proxy`]: a client for a running search-provider endpoint
//! - [`debounce`]: quiet-period, sequence-tagged lookups for interactive name entry
//!
//! Candidates are always [`RegistryCandidate`] values, which can prefill a
//! [`directory_core::ProviderDraft`].

pub mod candidate;
pub mod client;
pub mod debounce;
pub mod error;
pub mod format;
pub mod lookup;
pub mod name;
pub mod npi;
pub mod proxy;

pub use candidate::RegistryCandidate;
pub use client::{registry_url_from_env_value, NpiRegistryClient, RegistrySource};
pub use debounce::{DebouncedLookup, LookupUpdate, DEBOUNCE_DELAY};
pub use error::{RegistryError, RegistryResult};
pub use lookup::{CandidateSource, ProviderLookup, PROVIDER_KIND};
pub use proxy::ProxyClient;
