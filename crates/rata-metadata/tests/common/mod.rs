//! Shared helpers for rata-metadata integration tests
//!
//! - PostgreSQL test container with the reference schema applied
//! - Gzip-compressed feed fixtures
//! - Wiremock feed endpoints that enforce auth and headers

#![allow(dead_code)]

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use rata_metadata::FeedConfig;
use serde_json::{json, Value};
use sqlx::postgres::PgConnectOptions;
use sqlx::{ConnectOptions, PgConnection};
use std::io::Write;
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use wiremock::matchers::{basic_auth, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const FEED_USERNAME: &str = "feeds@example.com";
pub const FEED_PASSWORD: &str = "correct-horse";
pub const FEED_PATH: &str = "/ntrod/SupportingFileAuthenticate";

/// Initialize tracing for tests
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,rata_metadata=debug")),
        )
        .with_test_writer()
        .try_init();
}

// ============================================================================
// PostgreSQL Test Container
// ============================================================================

/// PostgreSQL container with the reference tables created
pub struct TestPostgres {
    _container: ContainerAsync<Postgres>,
    options: PgConnectOptions,
}

impl TestPostgres {
    pub async fn start() -> Result<Self> {
        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(5432.tcp()).await?;

        let options = PgConnectOptions::new()
            .host(&host.to_string())
            .port(port)
            .username("postgres")
            .password("postgres")
            .database("postgres");

        let mut conn = options
            .connect()
            .await
            .context("Failed to connect to PostgreSQL")?;
        sqlx::migrate!("../../migrations")
            .run(&mut conn)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            _container: container,
            options,
        })
    }

    /// Open a fresh connection to the test database
    pub async fn connect(&self) -> Result<PgConnection> {
        Ok(self.options.connect().await?)
    }
}

// ============================================================================
// Feed Fixtures
// ============================================================================

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("gzip write");
    encoder.finish().expect("gzip finish")
}

pub fn gzip_json(document: &Value) -> Vec<u8> {
    gzip(document.to_string().as_bytes())
}

/// A complete SMART entry
pub fn smart_entry(td: &str, from_berth: &str, to_berth: &str, stanox: &str) -> Value {
    json!({
        "TD": td,
        "FROMBERTH": from_berth,
        "TOBERTH": to_berth,
        "FROMLINE": "",
        "TOLINE": "F",
        "BERTHOFFSET": "+12",
        "PLATFORM": "1",
        "EVENT": "A",
        "ROUTE": " ",
        "STANOX": stanox,
        "STANME": "CLPHMJN",
        "STEPTYPE": "B",
        "COMMENT": "Test step"
    })
}

/// A complete CORPUS entry
pub fn corpus_entry(tiploc: &str, nlc: &str, stanox: &str) -> Value {
    json!({
        "STANOX": stanox,
        "UIC": "70123",
        "3ALPHA": "CLJ",
        "TIPLOC": tiploc,
        "NLC": nlc,
        "NLCDESC": "CLAPHAM JUNCTION",
        "NLCDESC16": " "
    })
}

pub fn smart_document(entries: Vec<Value>) -> Value {
    json!({ "BERTHDATA": entries })
}

pub fn corpus_document(entries: Vec<Value>) -> Value {
    json!({ "TIPLOCDATA": entries })
}

// ============================================================================
// Mock Feed
// ============================================================================

pub fn feed_config(server: &MockServer) -> FeedConfig {
    FeedConfig::new(FEED_USERNAME, FEED_PASSWORD).with_base_url(format!("{}/ntrod", server.uri()))
}

/// Serve `body` for `type=<resource_type>` to correctly authenticated gzip requests
pub async fn mount_payload(server: &MockServer, resource_type: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .and(query_param("type", resource_type))
        .and(header("accept-encoding", "gzip"))
        .and(basic_auth(FEED_USERNAME, FEED_PASSWORD))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/x-gzip")
                .set_body_bytes(body),
        )
        .mount(server)
        .await;
}

/// Serve an HTTP error status for `type=<resource_type>`
pub async fn mount_status(server: &MockServer, resource_type: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .and(query_param("type", resource_type))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Mock feed serving both documents
pub async fn start_feed(smart: &Value, corpus: &Value) -> MockServer {
    let server = MockServer::start().await;
    mount_payload(&server, "SMART", gzip_json(smart)).await;
    mount_payload(&server, "CORPUS", gzip_json(corpus)).await;
    server
}
