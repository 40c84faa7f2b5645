//! Language code to AtD service endpoint table.

use std::collections::BTreeMap;

/// Language used when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Base URLs of the public AtD instances, one per supported language.
pub const ENDPOINTS: [(&str, &str); 5] = [
    ("en", "http://service.afterthedeadline.com"),
    ("fr", "http://fr.service.afterthedeadline.com"),
    ("de", "http://de.service.afterthedeadline.com"),
    ("pt", "http://pt.service.afterthedeadline.com"),
    ("es", "http://es.service.afterthedeadline.com"),
];

/// The endpoint table as an owned map.
pub fn default_endpoints() -> BTreeMap<String, String> {
    ENDPOINTS
        .iter()
        .map(|(code, url)| (code.to_string(), url.to_string()))
        .collect()
}
