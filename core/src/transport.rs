//! Executes request descriptors over the network.
//!
//! # Design
//! `Client` never talks to the network itself; it hands each `HttpRequest` to
//! a `Transport` and gets back an `HttpResponse` or a `TransportError`. The
//! default implementation uses a ureq agent. Closures implement the trait too,
//! which is how tests stub the service.

use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Sends one request and returns exactly one outcome.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// Blocking HTTP transport backed by `ureq`.
///
/// Status codes are returned as data rather than errors so the client decides
/// what a non-2xx answer means. The body is handed over as raw bytes without
/// ureq's default read limit, so only connection-level failures surface as
/// `TransportError`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let failed = |e: ureq::Error| TransportError::Request {
            url: request.url.clone(),
            message: e.to_string(),
        };

        let form = request.form.iter().map(|(k, v)| (k.as_str(), v.as_str()));
        let mut response = match request.method {
            HttpMethod::Post => self.agent.post(&request.url).send_form(form),
        }
        .map_err(failed)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // Raw bytes with no size cap: decoding and size are the parser's concern.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(failed)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
