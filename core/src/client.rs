//! Request builder, transport call and response parser for AtD.
//!
//! # Design
//! `Client` holds read-only configuration plus two injected collaborators: a
//! [`HostSource`] for the identifier and a [`Transport`] for the round-trip.
//! `check` is split into `build_check` (produces the request descriptor) and
//! `parse_check` (consumes the response) so each half can be exercised on its
//! own. A call either returns the parsed tree or one `CheckError`, never both.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};

use crate::config::ClientConfig;
use crate::endpoint::DEFAULT_LANGUAGE;
use crate::error::CheckError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::identity::{derive_identifier, HostSource, SystemHost};
use crate::transport::{Transport, UreqTransport};
use crate::types::Response;
use crate::xml::{self, XmlNode};

/// Spelling, grammar and style check.
pub const CHECK_DOCUMENT: &str = "checkDocument";
/// Grammar and style check without spelling.
pub const CHECK_GRAMMAR: &str = "checkGrammar";
/// Readability statistics.
pub const STATS: &str = "stats";

/// Client for one AtD language instance.
#[derive(Clone)]
pub struct Client {
    language: String,
    ignored: Vec<String>,
    endpoints: BTreeMap<String, String>,
    host: Arc<dyn HostSource>,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// `language` defaults to `en`, `ignored` to the ten style categories in
    /// [`DEFAULT_IGNORED_CATEGORIES`](crate::config::DEFAULT_IGNORED_CATEGORIES).
    /// The language code is not validated here.
    pub fn new(language: Option<&str>, ignored: Option<Vec<String>>) -> Self {
        let mut config = ClientConfig::default();
        if let Some(language) = language {
            config.language = language.to_string();
        }
        if let Some(ignored) = ignored {
            config.ignored_categories = ignored;
        }
        Self::from_config(config)
    }

    pub fn from_config(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout());
        Self {
            language: config.language,
            ignored: config.ignored_categories,
            endpoints: config.endpoints,
            host: Arc::new(SystemHost),
            transport: Arc::new(transport),
        }
    }

    pub fn with_host_source(mut self, host: impl HostSource + 'static) -> Self {
        self.host = Arc::new(host);
        self
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn ignored_categories(&self) -> &[String] {
        &self.ignored
    }

    /// The full language code to base URL table.
    pub fn endpoints(&self) -> &BTreeMap<String, String> {
        &self.endpoints
    }

    pub fn resolve_url(&self, code: &str) -> Option<&str> {
        self.endpoints.get(code).map(String::as_str)
    }

    /// Hex SHA-1 of the current host name. Not cached.
    pub fn derive_identifier(&self) -> String {
        derive_identifier(&self.host.host_name())
    }

    /// Build the POST for `action` carrying `text`.
    ///
    /// Fails with `UnknownLanguage` when the configured language has no
    /// endpoint, instead of producing a request with a malformed URL.
    pub fn build_check(&self, text: &str, action: &str) -> Result<HttpRequest, CheckError> {
        let base = self
            .resolve_url(&self.language)
            .ok_or_else(|| CheckError::UnknownLanguage(self.language.clone()))?;

        Ok(HttpRequest {
            method: HttpMethod::Post,
            url: format!("{}/{action}", base.trim_end_matches('/')),
            form: vec![
                ("data".to_string(), text.to_string()),
                ("key".to_string(), self.derive_identifier()),
            ],
        })
    }

    /// Turn a response into its element tree. Non-2xx statuses are errors.
    pub fn parse_check(&self, response: HttpResponse) -> Result<XmlNode, CheckError> {
        check_status(&response)?;
        Ok(xml::parse_bytes(&response.body)?)
    }

    /// Send `text` to the `action` endpoint and parse the answer.
    ///
    /// The transport is called once. When it fails the body is never parsed.
    pub fn check(&self, text: &str, action: &str) -> Result<XmlNode, CheckError> {
        let request = self.build_check(text, action)?;
        debug!(
            "{} {} ({} bytes of text)",
            request.method.as_str(),
            request.url,
            text.len()
        );

        let response = self.transport.execute(&request).map_err(|e| {
            warn!("transport failed for {}: {e}", request.url);
            CheckError::from(e)
        })?;
        debug!("{} answered {}", request.url, response.status);

        self.parse_check(response).inspect_err(|e| {
            warn!("{} returned an unusable response: {e}", request.url);
        })
    }

    pub fn check_document(&self, text: &str) -> Result<Response, CheckError> {
        self.check_typed(text, CHECK_DOCUMENT, "results")
    }

    pub fn check_grammar(&self, text: &str) -> Result<Response, CheckError> {
        self.check_typed(text, CHECK_GRAMMAR, "results")
    }

    pub fn stats(&self, text: &str) -> Result<Response, CheckError> {
        self.check_typed(text, STATS, "scores")
    }

    fn check_typed(&self, text: &str, action: &str, expected: &'static str) -> Result<Response, CheckError> {
        let node = self.check(text, action)?;
        if node.name != expected {
            return Err(CheckError::Unexpected {
                expected,
                found: node.name,
            });
        }
        Ok(Response::from(&node))
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("language", &self.language)
            .field("ignored", &self.ignored)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

fn check_status(response: &HttpResponse) -> Result<(), CheckError> {
    if response.is_success() {
        return Ok(());
    }
    Err(CheckError::Status {
        status: response.status,
        body: response.body_lossy(),
    })
}
