//! Turning a typed provider name into registry name parameters.

use lazy_static::lazy_static;
use regex::Regex;

/// Names shorter than this (in characters) are not looked up at all.
pub const MIN_NAME_CHARS: usize = 3;

lazy_static! {
    static ref HONORIFIC: Regex = Regex::new(r"(?i)^dr\b\.?\s*").expect("honorific pattern is valid");
}

/// True when `name` is too short to be worth a registry query.
pub fn is_too_short(name: &str) -> bool {
    name.chars().count() < MIN_NAME_CHARS
}

/// Remove a leading "Dr"/"Dr." (any case) and surrounding whitespace.
///
/// Names that merely begin with the letters "dr" ("Drake") are left alone.
pub fn strip_honorific(name: &str) -> String {
    HONORIFIC.replace(name.trim_start(), "").trim().to_string()
}

/// Registry name parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameQuery {
    pub first_name: Option<String>,
    pub last_name: String,
}

impl NameQuery {
    /// Build the query for `name`, or `None` when nothing is left after stripping.
    ///
    /// With two or more tokens the first is the given name and the last is the family name;
    /// middle tokens are dropped. A single token is used as the family name.
    pub fn from_name(name: &str) -> Option<Self> {
        let cleaned = strip_honorific(name);
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();

        match tokens.as_slice() {
            [] => None,
            [only] => Some(Self {
                first_name: None,
                last_name: (*only).to_string(),
            }),
            [first, .., last] => Some(Self {
                first_name: Some((*first).to_string()),
                last_name: (*last).to_string(),
            }),
        }
    }

    /// Query parameters for the registry read endpoint, excluding version and limit.
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        let mut params = Vec::with_capacity(2);
        if let Some(first) = &self.first_name {
            params.push(("first_name", first.as_str()));
        }
        params.push(("last_name", self.last_name.as_str()));
        params
    }
}
