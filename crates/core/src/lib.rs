//! # Directory Core
//!
//! Core logic for the healthcare provider directory.
//!
//! This crate contains the data model and the operations on it:
//! - Organizations, providers and accepted-insurance sets
//! - The multi-token search filter
//! - The directory store: a pure state reducer plus a persistence backend, remote or in-memory
//! - The embedded demo dataset used when no datastore is reachable
//!
//! **No API concerns**: HTTP servers and registry lookups belong in `api-rest` and
//! `directory-registry`.

pub mod backend;
pub mod config;
pub mod constants;
pub mod demo;
pub mod error;
pub mod insurance;
pub mod local;
pub mod models;
pub mod remote;
pub mod search;
pub mod state;
pub mod store;
pub mod text;

pub use backend::{backend_from_config, BackendMode, DirectoryBackend, DirectorySnapshot};
pub use config::{core_config_from_env_values, CoreConfig, DatastoreConfig};
pub use error::{DirectoryError, DirectoryResult};
pub use insurance::{InsuranceCatalog, InsuranceSet};
pub use models::{Organization, OrganizationDraft, Provider, ProviderDraft, RecordId};
pub use search::{search, OrganizationHit, Query, SearchResults};
pub use state::{Action, DirectoryState};
pub use store::{DirectoryStore, Mutation, SnapshotSource};
pub use text::{NonEmptyText, TextError};
