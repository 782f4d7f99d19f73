//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup from raw environment values and then passed
//! into constructors. Nothing in this crate reads process-wide environment variables itself.

use crate::{DirectoryError, DirectoryResult};

/// Connection details for the remote datastore.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatastoreConfig {
    url: String,
    access_key: String,
}

impl DatastoreConfig {
    /// Create a datastore configuration. Both values must be non-blank and the URL must be
    /// `http(s)`.
    pub fn new(url: impl Into<String>, access_key: impl Into<String>) -> DirectoryResult<Self> {
        let url = url.into().trim().trim_end_matches('/').to_string();
        let access_key = access_key.into().trim().to_string();

        if url.is_empty() || access_key.is_empty() {
            return Err(DirectoryError::InvalidInput(
                "datastore url and access key cannot be empty".into(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(DirectoryError::InvalidUrl(url));
        }

        Ok(Self { url, access_key })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoreConfig {
    datastore: Option<DatastoreConfig>,
}

impl CoreConfig {
    pub fn new(datastore: Option<DatastoreConfig>) -> Self {
        Self { datastore }
    }

    /// Configuration for local-only demo mode.
    pub fn local_only() -> Self {
        Self { datastore: None }
    }

    pub fn datastore(&self) -> Option<&DatastoreConfig> {
        self.datastore.as_ref()
    }
}

/// Build a [`CoreConfig`] from optional environment values.
///
/// A missing or blank URL or key yields local-only mode rather than an error, so a
/// half-configured deployment still starts. A present but malformed URL also falls back, with a
/// warning.
pub fn core_config_from_env_values(url: Option<String>, access_key: Option<String>) -> CoreConfig {
    let url = url.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let access_key = access_key
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match (url, access_key) {
        (Some(url), Some(access_key)) => match DatastoreConfig::new(url, access_key) {
            Ok(datastore) => CoreConfig::new(Some(datastore)),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring datastore configuration");
                CoreConfig::local_only()
            }
        },
        _ => CoreConfig::local_only(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_values_present_enables_remote_mode() {
        let cfg = core_config_from_env_values(
            Some("https://example.test/".into()),
            Some(" key ".into()),
        );
        let datastore = cfg.datastore().expect("datastore should be configured");
        assert_eq!(datastore.url(), "https://example.test");
        assert_eq!(datastore.access_key(), "key");
    }

    #[test]
    fn missing_or_blank_values_fall_back_to_local_only() {
        assert_eq!(
            core_config_from_env_values(None, Some("key".into())),
            CoreConfig::local_only()
        );
        assert_eq!(
            core_config_from_env_values(Some("https://example.test".into()), Some("  ".into())),
            CoreConfig::local_only()
        );
        assert_eq!(core_config_from_env_values(None, None), CoreConfig::local_only());
    }

    #[test]
    fn malformed_url_falls_back_to_local_only() {
        let cfg = core_config_from_env_values(Some("example.test".into()), Some("key".into()));
        assert!(cfg.datastore().is_none());
    }

    #[test]
    fn datastore_config_rejects_empty_key() {
        let err = DatastoreConfig::new("https://example.test", "").expect_err("should fail");
        assert!(matches!(err, DirectoryError::InvalidInput(_)));
    }
}
