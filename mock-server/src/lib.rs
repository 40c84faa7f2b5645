//! Local stand-in for an After the Deadline instance.
//!
//! Serves `checkDocument`, `checkGrammar` and `stats` with the same form
//! fields and XML shapes as the real service. Detection is a toy: a short
//! misspelling table, repeated words and `be` + participle passive voice.
//! Every accepted request is appended to a shared journal so tests can see
//! what the client sent.

use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Form, Router,
};
use log::debug;
use serde::Deserialize;
use tokio::{net::TcpListener, sync::RwLock};

const MISSPELLINGS: [(&str, &str); 6] = [
    ("teh", "the"),
    ("recieve", "receive"),
    ("definately", "definitely"),
    ("seperate", "separate"),
    ("wierd", "weird"),
    ("occured", "occurred"),
];

const BE_FORMS: [&str; 6] = ["is", "are", "was", "were", "be", "been"];

#[derive(Debug, Default, Deserialize)]
pub struct CheckForm {
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub key: String,
}

/// A request as received by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Received {
    pub action: String,
    pub data: String,
    pub key: String,
}

pub type Journal = Arc<RwLock<Vec<Received>>>;

/// One problem found in the submitted text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Finding {
    pub string: String,
    pub description: String,
    pub precontext: String,
    pub suggestions: Vec<String>,
    pub kind: &'static str,
}

pub fn app() -> Router {
    app_with_journal(Journal::default())
}

pub fn app_with_journal(journal: Journal) -> Router {
    Router::new()
        .route("/checkDocument", post(check_document))
        .route("/checkGrammar", post(check_grammar))
        .route("/stats", post(stats))
        .with_state(journal)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_journal(listener: TcpListener, journal: Journal) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_journal(journal)).await
}

async fn check_document(State(journal): State<Journal>, Form(form): Form<CheckForm>) -> Response {
    if let Some(rejection) = accept(&journal, "checkDocument", &form).await {
        return rejection;
    }
    let mut findings = spelling(&form.data);
    findings.extend(repeated_words(&form.data));
    findings.extend(passive_voice(&form.data));
    xml(render_results(&findings))
}

async fn check_grammar(State(journal): State<Journal>, Form(form): Form<CheckForm>) -> Response {
    if let Some(rejection) = accept(&journal, "checkGrammar", &form).await {
        return rejection;
    }
    let mut findings = repeated_words(&form.data);
    findings.extend(passive_voice(&form.data));
    xml(render_results(&findings))
}

async fn stats(State(journal): State<Journal>, Form(form): Form<CheckForm>) -> Response {
    if let Some(rejection) = accept(&journal, "stats", &form).await {
        return rejection;
    }
    xml(render_scores(&[
        ("words", words(&form.data).count()),
        ("sentences", sentence_count(&form.data)),
    ]))
}

/// Journal the request and reject it when the key is not a hex SHA-1.
async fn accept(journal: &Journal, action: &str, form: &CheckForm) -> Option<Response> {
    debug!("{action}: {} bytes, key {:?}", form.data.len(), form.key);
    journal.write().await.push(Received {
        action: action.to_string(),
        data: form.data.clone(),
        key: form.key.clone(),
    });

    if is_valid_key(&form.key) {
        None
    } else {
        Some(xml(render_message("This service requires an API key")))
    }
}

pub fn is_valid_key(key: &str) -> bool {
    key.len() == 40 && key.chars().all(|c| c.is_ascii_hexdigit())
}

fn xml(body: String) -> Response {
    ([(header::CONTENT_TYPE, "text/xml; charset=UTF-8")], body).into_response()
}

/// Words with surrounding punctuation removed.
fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .filter(|w| !w.is_empty())
}

pub fn spelling(text: &str) -> Vec<Finding> {
    let words: Vec<&str> = words(text).collect();
    let mut findings = Vec::new();
    for (i, word) in words.iter().enumerate() {
        let lower = word.to_lowercase();
        if let Some((_, fix)) = MISSPELLINGS.iter().find(|(bad, _)| *bad == lower) {
            findings.push(Finding {
                string: word.to_string(),
                description: "Spelling".to_string(),
                precontext: precontext(&words, i),
                suggestions: vec![fix.to_string()],
                kind: "spelling",
            });
        }
    }
    findings
}

pub fn repeated_words(text: &str) -> Vec<Finding> {
    let words: Vec<&str> = words(text).collect();
    let mut findings = Vec::new();
    for i in 1..words.len() {
        if words[i].eq_ignore_ascii_case(words[i - 1]) {
            findings.push(Finding {
                string: format!("{} {}", words[i - 1], words[i]),
                description: "Repeated Word".to_string(),
                precontext: precontext(&words, i - 1),
                suggestions: vec![words[i - 1].to_string()],
                kind: "grammar",
            });
        }
    }
    findings
}

pub fn passive_voice(text: &str) -> Vec<Finding> {
    let words: Vec<&str> = words(text).collect();
    let mut findings = Vec::new();
    for i in 1..words.len() {
        let aux = words[i - 1].to_lowercase();
        if BE_FORMS.contains(&aux.as_str()) && words[i].len() > 3 && words[i].ends_with("ed") {
            findings.push(Finding {
                string: format!("{} {}", words[i - 1], words[i]),
                description: "Passive voice".to_string(),
                precontext: precontext(&words, i - 1),
                suggestions: Vec::new(),
                kind: "suggestion",
            });
        }
    }
    findings
}

fn precontext(words: &[&str], index: usize) -> String {
    index
        .checked_sub(1)
        .map(|p| words[p].to_string())
        .unwrap_or_default()
}

fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_results(findings: &[Finding]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<results>\n");
    for f in findings {
        out.push_str("  <error>\n");
        out.push_str(&format!("    <string>{}</string>\n", escape(&f.string)));
        out.push_str(&format!("    <description>{}</description>\n", escape(&f.description)));
        out.push_str(&format!("    <precontext>{}</precontext>\n", escape(&f.precontext)));
        if !f.suggestions.is_empty() {
            out.push_str("    <suggestions>\n");
            for s in &f.suggestions {
                out.push_str(&format!("      <option>{}</option>\n", escape(s)));
            }
            out.push_str("    </suggestions>\n");
        }
        out.push_str(&format!("    <type>{}</type>\n", f.kind));
        out.push_str("  </error>\n");
    }
    out.push_str("</results>\n");
    out
}

pub fn render_scores(metrics: &[(&str, usize)]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<scores>\n");
    for (key, value) in metrics {
        out.push_str(&format!(
            "  <metric>\n    <type>stats</type>\n    <key>{key}</key>\n    <value>{value}</value>\n  </metric>\n"
        ));
    }
    out.push_str("</scores>\n");
    out
}

pub fn render_message(message: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n<results>\n  <message>{}</message>\n</results>\n",
        escape(message)
    )
}
