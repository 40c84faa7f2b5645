//! Typed view of AtD responses.
//!
//! # Design
//! The service answers with one of a handful of document shapes. `Response`
//! names the ones we know and keeps the raw tree for anything else, so a new
//! server-side field never turns into a client error.

use serde::{Deserialize, Serialize};

use crate::xml::XmlNode;

/// One problem reported by `checkDocument` or `checkGrammar`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// The flagged phrase as it appears in the text.
    pub string: String,
    /// Human readable category, e.g. `Spelling` or `Passive voice`.
    pub description: String,
    /// The word preceding the phrase, used to locate repeated phrases.
    pub precontext: String,
    pub suggestions: Vec<String>,
    /// `spelling`, `grammar` or `suggestion`.
    pub kind: String,
    pub url: Option<String>,
}

impl Issue {
    fn from_node(node: &XmlNode) -> Self {
        let text = |name: &str| node.child_text(name).unwrap_or_default().to_string();
        Self {
            string: text("string"),
            description: text("description"),
            precontext: text("precontext"),
            suggestions: node
                .child("suggestions")
                .map(|s| s.children_named("option").map(|o| o.text.clone()).collect())
                .unwrap_or_default(),
            kind: text("type"),
            url: node.child_text("url").map(str::to_string),
        }
    }

    /// True when the description matches one of `labels`, ignoring case.
    pub fn is_ignored<S: AsRef<str>>(&self, labels: &[S]) -> bool {
        labels
            .iter()
            .any(|l| l.as_ref().eq_ignore_ascii_case(&self.description))
    }
}

/// One entry of a `stats` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub kind: String,
    pub key: String,
    pub value: String,
}

impl Metric {
    fn from_node(node: &XmlNode) -> Self {
        let text = |name: &str| node.child_text(name).unwrap_or_default().to_string();
        Self {
            kind: text("type"),
            key: text("key"),
            value: text("value"),
        }
    }

    pub fn count(&self) -> Option<u64> {
        self.value.trim().parse().ok()
    }
}

/// A parsed AtD response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    Results(Vec<Issue>),
    Scores(Vec<Metric>),
    /// Service-side failure reported inside a `<results>` document.
    Message(String),
    Other(XmlNode),
}

impl Response {
    /// Element name the response came from.
    pub fn root_name(&self) -> &str {
        match self {
            Response::Results(_) | Response::Message(_) => "results",
            Response::Scores(_) => "scores",
            Response::Other(node) => &node.name,
        }
    }

    /// Drop issues whose description matches an ignored label.
    pub fn without_ignored<S: AsRef<str>>(self, labels: &[S]) -> Self {
        match self {
            Response::Results(issues) => Response::Results(
                issues.into_iter().filter(|i| !i.is_ignored(labels)).collect(),
            ),
            other => other,
        }
    }
}

impl From<&XmlNode> for Response {
    fn from(node: &XmlNode) -> Self {
        match node.name.as_str() {
            "results" => match node.child_text("message") {
                Some(message) => Response::Message(message.to_string()),
                None => Response::Results(node.children_named("error").map(Issue::from_node).collect()),
            },
            "scores" => Response::Scores(node.children_named("metric").map(Metric::from_node).collect()),
            _ => Response::Other(node.clone()),
        }
    }
}
