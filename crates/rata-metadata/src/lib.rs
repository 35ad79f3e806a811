//! Rata Metadata Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Reloads the Network Rail reference datasets into PostgreSQL.
//!
//! # Supported Datasets
//!
//! - **SMART**: train describer berth stepping data (`nrod.reference_smart`)
//! - **CORPUS**: location reference data (`nrod.reference_corpus`)
//!
//! Each run downloads both datasets, normalizes every entry and replaces the
//! contents of both tables inside a single transaction.
//!
//! # Example
//!
//! ```no_run
//! use rata_metadata::{DatabaseConfig, FeedClient, FeedConfig, ReloadCoordinator, ReloadOptions};
//! use sqlx::{Connection, PgConnection};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = DatabaseConfig::new("rata", "postgres");
//!     let mut conn = PgConnection::connect_with(&db.connect_options()).await?;
//!     let feed = FeedClient::new(FeedConfig::from_env()?)?;
//!
//!     let summary = ReloadCoordinator::new(&mut conn, &feed)
//!         .run(ReloadOptions::default())
//!         .await?;
//!     println!("{} berth steps, {} locations", summary.berth_steps, summary.locations);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decompression;
pub mod error;
pub mod feed;
pub mod normalize;
pub mod records;
pub mod reload;
pub mod store;

pub use config::{DatabaseConfig, FeedConfig};
pub use error::{RataError, Result, Stage};
pub use feed::{FeedClient, FeedResource, FeedSource};
pub use records::{BerthStepRecord, LocationRecord, RawEntry};
pub use reload::{ReloadCoordinator, ReloadOptions, ReloadOutcome, ReloadStrategy, ReloadSummary};
