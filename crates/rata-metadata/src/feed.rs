//! Reference data feed client
//!
//! Both datasets are served from the same authenticated endpoint, selected
//! by a `type` query parameter. Payloads are gzip-compressed JSON documents
//! holding one entry list under a resource-specific top-level key.

use crate::config::FeedConfig;
use crate::decompression::decompress_gzip;
use crate::error::{RataError, Result};
use crate::records::RawEntry;
use async_trait::async_trait;
use reqwest::header::ACCEPT_ENCODING;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Path of the authenticated supporting-file download
const SUPPORTING_FILE_PATH: &str = "SupportingFileAuthenticate";

/// The two datasets the feed provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedResource {
    /// SMART berth stepping data
    BerthSteps,
    /// CORPUS location reference data
    Locations,
}

impl FeedResource {
    /// Value of the `type` query parameter
    pub fn type_param(self) -> &'static str {
        match self {
            FeedResource::BerthSteps => "SMART",
            FeedResource::Locations => "CORPUS",
        }
    }

    /// Top-level key holding the entry list
    pub fn entries_key(self) -> &'static str {
        match self {
            FeedResource::BerthSteps => "BERTHDATA",
            FeedResource::Locations => "TIPLOCDATA",
        }
    }
}

impl std::fmt::Display for FeedResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedResource::BerthSteps => write!(f, "SMART berth data"),
            FeedResource::Locations => write!(f, "CORPUS location data"),
        }
    }
}

/// Anything that can produce the raw entries of a resource
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch every entry of `resource` in feed order
    async fn fetch(&self, resource: FeedResource) -> Result<Vec<RawEntry>>;
}

/// HTTP client for the authenticated feed
pub struct FeedClient {
    client: Client,
    config: FeedConfig,
}

impl FeedClient {
    pub fn new(config: FeedConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let client = builder
            .build()
            .map_err(|e| RataError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn resource_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            SUPPORTING_FILE_PATH
        )
    }

    /// Download the compressed payload of `resource`
    async fn download(&self, resource: FeedResource) -> Result<Vec<u8>> {
        let transport = |source| RataError::Transport { resource, source };

        let response = self
            .client
            .get(self.resource_url())
            .query(&[("type", resource.type_param())])
            .header(ACCEPT_ENCODING, "gzip")
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RataError::HttpStatus { resource, status });
        }

        let body = response.bytes().await.map_err(transport)?;
        debug!(bytes = body.len(), "Downloaded payload");
        Ok(body.to_vec())
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    #[instrument(skip(self), fields(resource = %resource))]
    async fn fetch(&self, resource: FeedResource) -> Result<Vec<RawEntry>> {
        let compressed = self.download(resource).await?;

        let json = decompress_gzip(&compressed)
            .map_err(|source| RataError::Decompression { resource, source })?;

        let entries = parse_entries(resource, &json)?;
        info!(entries = entries.len(), "Fetched {}", resource);
        Ok(entries)
    }
}

/// Extract the entry list of `resource` from a decompressed JSON document
pub fn parse_entries(resource: FeedResource, json: &[u8]) -> Result<Vec<RawEntry>> {
    let mut document: serde_json::Map<String, Value> = serde_json::from_slice(json)
        .map_err(|e| RataError::format(resource, format!("invalid JSON document: {}", e)))?;

    let key = resource.entries_key();
    let entries = match document.remove(key) {
        Some(Value::Array(entries)) => entries,
        Some(_) => {
            return Err(RataError::format(resource, format!("'{}' is not a list", key)));
        },
        None => return Err(RataError::MissingKey { resource, key }),
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Object(fields) => Ok(fields),
            _ => Err(RataError::format(
                resource,
                format!("'{}' entry {} is not an object", key, index),
            )),
        })
        .collect()
}
