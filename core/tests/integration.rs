//! End-to-end checks against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, points the `en` endpoint at it and
//! exercises every client operation over real HTTP through the default ureq
//! transport. The server's journal shows what actually went over the wire.

use std::net::SocketAddr;

use atd_core::{
    derive_identifier, CheckError, Client, ClientConfig, FixedHost, Response, CHECK_DOCUMENT,
};
use mock_server::Journal;

fn start_server() -> (SocketAddr, Journal) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let journal = Journal::default();
    let server_journal = journal.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with_journal(listener, server_journal).await
        })
        .unwrap();
    });

    (addr, journal)
}

fn client_for(addr: SocketAddr) -> Client {
    let mut config = ClientConfig::default();
    config.endpoints.insert("en".to_string(), format!("http://{addr}"));
    config.timeout_secs = Some(10);
    Client::from_config(config).with_host_source(FixedHost("integration-host".to_string()))
}

#[test]
fn check_document_round_trip() {
    let (addr, journal) = start_server();
    let client = client_for(addr);

    let response = client.check_document("The cat sat on teh mat.").unwrap();
    let Response::Results(issues) = response else {
        panic!("expected results");
    };
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].string, "teh");
    assert_eq!(issues[0].precontext, "on");
    assert_eq!(issues[0].suggestions, vec!["the".to_string()]);

    let received = journal.blocking_read();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].action, "checkDocument");
    assert_eq!(received[0].data, "The cat sat on teh mat.");
    assert_eq!(received[0].key, derive_identifier("integration-host"));
}

#[test]
fn generic_check_returns_tree() {
    let (addr, _journal) = start_server();
    let client = client_for(addr);

    let tree = client.check("I saw the the dog.", CHECK_DOCUMENT).unwrap();
    assert_eq!(tree.name, "results");
    let error = tree.child("error").unwrap();
    assert_eq!(error.child_text("description"), Some("Repeated Word"));
    assert_eq!(tree.to_value()["results"]["error"][0]["string"][0], "the the");
}

#[test]
fn ignored_categories_filter_style_issues() {
    let (addr, _journal) = start_server();
    let client = client_for(addr);

    let response = client.check_grammar("The ball was kicked by Sam.").unwrap();
    let issues = response_issues(&response);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].description, "Passive voice");
    assert!(issues[0].is_ignored(client.ignored_categories()));

    let filtered = response.without_ignored(client.ignored_categories());
    assert_eq!(filtered, Response::Results(Vec::new()));
}

fn response_issues(response: &Response) -> Vec<atd_core::Issue> {
    match response {
        Response::Results(issues) => issues.clone(),
        other => panic!("expected results, got {other:?}"),
    }
}

#[test]
fn stats_round_trip() {
    let (addr, _journal) = start_server();
    let client = client_for(addr);

    let Response::Scores(metrics) = client.stats("One two. Three.").unwrap() else {
        panic!("expected scores");
    };
    let words = metrics.iter().find(|m| m.key == "words").unwrap();
    assert_eq!(words.count(), Some(3));
}

#[test]
fn system_host_key_reaches_server() {
    let (addr, journal) = start_server();
    let mut config = ClientConfig::default();
    config.endpoints.insert("en".to_string(), format!("http://{addr}"));
    let client = Client::from_config(config);

    client.check_document("hello").unwrap();
    assert_eq!(journal.blocking_read()[0].key, client.derive_identifier());
}

#[test]
fn unknown_action_is_status_error() {
    let (addr, _journal) = start_server();
    let client = client_for(addr);

    let err = client.check("text", "spellcheck").unwrap_err();
    assert!(matches!(err, CheckError::Status { status: 404, .. }), "{err:?}");
}

#[test]
fn closed_port_is_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = client_for(addr);

    let err = client.check_document("text").unwrap_err();
    assert!(matches!(err, CheckError::Transport(_)), "{err:?}");
}
