//! Client configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::endpoint::{default_endpoints, DEFAULT_LANGUAGE};

/// Issue categories left out of reports unless the caller says otherwise.
pub const DEFAULT_IGNORED_CATEGORIES: [&str; 10] = [
    "bias language",
    "cliches",
    "complex expression",
    "diacritical marks",
    "double negatives",
    "hidden verbs",
    "jargon language",
    "passive voice",
    "phrases to avoid",
    "redundant expression",
];

pub fn default_ignored_categories() -> Vec<String> {
    DEFAULT_IGNORED_CATEGORIES.iter().map(|s| s.to_string()).collect()
}

/// Settings a `Client` is built from. Missing fields take their defaults
/// when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub language: String,
    pub ignored_categories: Vec<String>,
    pub endpoints: BTreeMap<String, String>,
    /// Whole-request timeout for the default transport. `None` waits forever.
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            ignored_categories: default_ignored_categories(),
            endpoints: default_endpoints(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `ATD_LANGUAGE`, `ATD_IGNORED` (comma separated),
    /// `ATD_ENDPOINT` (base URL for the configured language) and
    /// `ATD_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(language) = lookup("ATD_LANGUAGE").filter(|v| !v.trim().is_empty()) {
            config.language = language.trim().to_string();
        }
        if let Some(ignored) = lookup("ATD_IGNORED") {
            config.ignored_categories = ignored
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(endpoint) = lookup("ATD_ENDPOINT").filter(|v| !v.trim().is_empty()) {
            config.endpoints.insert(
                config.language.clone(),
                endpoint.trim().trim_end_matches('/').to_string(),
            );
        }
        config.timeout_secs = lookup("ATD_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok());

        config
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
