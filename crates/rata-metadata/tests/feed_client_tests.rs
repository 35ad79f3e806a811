//! Feed client tests against a mock feed
//!
//! Covers the request contract (basic auth, gzip accept header, resource
//! selection) and each failure class the client can report.

mod common;

use common::*;
use rata_metadata::{FeedClient, FeedConfig, FeedResource, FeedSource, RataError, Stage};
use wiremock::MockServer;

#[tokio::test]
async fn test_fetch_berth_steps_in_feed_order() {
    init_tracing();
    let server = MockServer::start().await;
    let document = smart_document(vec![
        smart_entry("AW", "0256", "0258", "0"),
        smart_entry("AW", "0258", "0260", "87701"),
        smart_entry("VC", "A123", "A125", "87219"),
    ]);
    mount_payload(&server, "SMART", gzip_json(&document)).await;

    let client = FeedClient::new(feed_config(&server)).unwrap();
    let entries = client.fetch(FeedResource::BerthSteps).await.unwrap();

    assert_eq!(entries.len(), 3);
    let berths: Vec<_> = entries
        .iter()
        .map(|e| e["FROMBERTH"].as_str().unwrap())
        .collect();
    assert_eq!(berths, ["0256", "0258", "A123"]);
}

#[tokio::test]
async fn test_fetch_selects_resource_by_type() {
    let server = MockServer::start().await;
    let smart = smart_document(vec![smart_entry("AW", "0256", "0258", "0")]);
    let corpus = corpus_document(vec![
        corpus_entry("CLPHMJN", "559800", "87219"),
        corpus_entry("WATRLMN", "559800", "87001"),
    ]);
    mount_payload(&server, "SMART", gzip_json(&smart)).await;
    mount_payload(&server, "CORPUS", gzip_json(&corpus)).await;

    let client = FeedClient::new(feed_config(&server)).unwrap();

    let locations = client.fetch(FeedResource::Locations).await.unwrap();
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[1]["TIPLOC"], "WATRLMN");

    let berth_steps = client.fetch(FeedResource::BerthSteps).await.unwrap();
    assert_eq!(berth_steps.len(), 1);
}

#[tokio::test]
async fn test_wrong_credentials_are_not_served() {
    let server = MockServer::start().await;
    mount_payload(&server, "SMART", gzip_json(&smart_document(vec![]))).await;

    let config = FeedConfig::new(FEED_USERNAME, "wrong-password")
        .with_base_url(format!("{}/ntrod", server.uri()));
    let client = FeedClient::new(config).unwrap();

    let err = client.fetch(FeedResource::BerthSteps).await.unwrap_err();
    assert_eq!(err.stage(), Stage::Transport);
    assert!(matches!(err, RataError::HttpStatus { .. }));
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;
    mount_status(&server, "CORPUS", 401).await;

    let client = FeedClient::new(feed_config(&server)).unwrap();
    let err = client.fetch(FeedResource::Locations).await.unwrap_err();

    match err {
        RataError::HttpStatus { resource, status } => {
            assert_eq!(resource, FeedResource::Locations);
            assert_eq!(status.as_u16(), 401);
        },
        other => panic!("expected HttpStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connection_failure_is_transport_error() {
    // Nothing listens on the discard port
    let config = FeedConfig::new(FEED_USERNAME, FEED_PASSWORD)
        .with_base_url("http://127.0.0.1:9/ntrod")
        .with_timeout_secs(Some(5));
    let client = FeedClient::new(config).unwrap();

    let err = client.fetch(FeedResource::BerthSteps).await.unwrap_err();
    assert!(matches!(err, RataError::Transport { .. }));
    assert_eq!(err.stage(), Stage::Transport);
}

#[tokio::test]
async fn test_uncompressed_body_is_decompression_error() {
    let server = MockServer::start().await;
    let plain = smart_document(vec![smart_entry("AW", "0256", "0258", "0")]).to_string();
    mount_payload(&server, "SMART", plain.into_bytes()).await;

    let client = FeedClient::new(feed_config(&server)).unwrap();
    let err = client.fetch(FeedResource::BerthSteps).await.unwrap_err();

    assert_eq!(err.stage(), Stage::Decompression);
}

#[tokio::test]
async fn test_malformed_json_is_format_error() {
    let server = MockServer::start().await;
    mount_payload(&server, "CORPUS", gzip(b"{\"TIPLOCDATA\": [{\"TIPLOC\": ")).await;

    let client = FeedClient::new(feed_config(&server)).unwrap();
    let err = client.fetch(FeedResource::Locations).await.unwrap_err();

    assert_eq!(err.stage(), Stage::Format);
    assert!(matches!(err, RataError::Format { .. }));
}

#[tokio::test]
async fn test_missing_top_level_key_is_format_error() {
    let server = MockServer::start().await;
    // A CORPUS document served for the SMART request
    let corpus = corpus_document(vec![corpus_entry("CLPHMJN", "559800", "87219")]);
    mount_payload(&server, "SMART", gzip_json(&corpus)).await;

    let client = FeedClient::new(feed_config(&server)).unwrap();
    let err = client.fetch(FeedResource::BerthSteps).await.unwrap_err();

    assert!(matches!(err, RataError::MissingKey { key: "BERTHDATA", .. }));
}
