//! Client for the After the Deadline (AtD) grammar and style checking service.
//!
//! # Overview
//! Sends a text to an AtD language instance as a form post signed with a
//! host-derived key, and parses the XML answer into an element tree or a
//! typed [`Response`].
//!
//! # Design
//! - `Client` is read-only after construction and cheap to clone.
//! - Request building (`build_check`) and response parsing (`parse_check`)
//!   are pure; the network round-trip goes through a [`Transport`].
//! - The host name behind the key comes from a [`HostSource`] so tests do not
//!   depend on the machine they run on.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod identity;
pub mod transport;
pub mod types;
pub mod xml;

pub use client::{Client, CHECK_DOCUMENT, CHECK_GRAMMAR, STATS};
pub use config::{ClientConfig, DEFAULT_IGNORED_CATEGORIES};
pub use error::{CheckError, TransportError, XmlError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use identity::{derive_identifier, FixedHost, HostSource, SystemHost};
pub use transport::{Transport, UreqTransport};
pub use types::{Issue, Metric, Response};
pub use xml::XmlNode;
