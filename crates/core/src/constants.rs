//! Constants used throughout the directory core crate.
//!
//! Table names and request fragments for the remote datastore live here so the
//! remote backend and its tests agree on them.

/// Remote table holding organizations.
pub const ORGANIZATIONS_TABLE: &str = "organizations";

/// Remote table holding providers (organization reference is nullable).
pub const PROVIDERS_TABLE: &str = "providers";

/// Remote table holding insurance names added outside any record.
pub const CUSTOM_INSURANCES_TABLE: &str = "custom_insurances";

/// Path segment under the datastore URL where tables are exposed.
pub const REST_PATH: &str = "rest/v1";

/// Select expression that embeds each organization's providers.
pub const ORGANIZATIONS_WITH_PROVIDERS: &str = "*,providers(*)";

/// Header carrying the datastore access key.
pub const API_KEY_HEADER: &str = "apikey";

/// Preference asking the datastore to echo inserted rows.
pub const RETURN_REPRESENTATION: &str = "return=representation";
