//! Error types for the AtD client.
//!
//! # Design
//! Every failure of a single `check` call lands in one `CheckError`. Transport
//! and parse failures wrap the collaborator's error unchanged so callers can
//! inspect the original cause. Nothing here is retried.

use thiserror::Error;

/// Failure reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the response could not be read
    /// (DNS, connection refused, timeout, ...).
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
}

/// Failure while turning a response body into an element tree.
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("malformed XML: {0}")]
    Syntax(String),

    #[error("response body is not UTF-8: {0}")]
    Encoding(String),

    #[error("response body contains no root element")]
    Empty,

    #[error("unexpected closing tag </{found}>")]
    UnbalancedClose { found: String },

    #[error("document ended inside <{open}>")]
    Unclosed { open: String },
}

/// Errors returned by `Client::check` and its typed conveniences.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The configured language has no endpoint.
    #[error("no endpoint for language {0:?}")]
    UnknownLanguage(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Parse(#[from] XmlError),

    /// The body parsed but its root element does not match the action.
    #[error("expected <{expected}> response, found <{found}>")]
    Unexpected { expected: &'static str, found: String },
}
