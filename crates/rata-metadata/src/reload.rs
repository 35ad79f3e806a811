//! Reload transaction coordinator
//!
//! A reload replaces the full contents of both reference tables inside one
//! transaction: truncate both, insert every record from both feeds, then
//! commit. A dry run or any failure rolls the transaction back, so readers
//! only ever see the previous snapshot or the new one.

use crate::error::{RataError, Result};
use crate::feed::{FeedResource, FeedSource};
use crate::records::{map_entries, BerthStepRecord, LocationRecord};
use crate::store;
use sqlx::{Connection, PgConnection, Postgres, Transaction};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// When the feeds are fetched relative to the transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadStrategy {
    /// Truncate first, then fetch and insert each resource in turn
    #[default]
    Streaming,
    /// Fetch and map both resources before the transaction is opened
    Prefetch,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReloadOptions {
    /// Roll back instead of committing
    pub dry_run: bool,
    pub strategy: ReloadStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    Committed,
    /// Dry run; the tables were left untouched
    RolledBack,
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadSummary {
    pub berth_steps: usize,
    pub locations: usize,
    pub outcome: ReloadOutcome,
}

/// Normalized records of both resources, ready to insert
struct StagedRecords {
    berth_steps: Vec<BerthStepRecord>,
    locations: Vec<LocationRecord>,
}

/// Drives one reload over an exclusively borrowed connection
pub struct ReloadCoordinator<'a, F: FeedSource + ?Sized> {
    conn: &'a mut PgConnection,
    feed: &'a F,
}

impl<'a, F: FeedSource + ?Sized> ReloadCoordinator<'a, F> {
    pub fn new(conn: &'a mut PgConnection, feed: &'a F) -> Self {
        Self { conn, feed }
    }

    #[instrument(skip(self), fields(dry_run = options.dry_run, strategy = ?options.strategy))]
    pub async fn run(self, options: ReloadOptions) -> Result<ReloadSummary> {
        let started = Instant::now();

        let staged = match options.strategy {
            ReloadStrategy::Prefetch => Some(fetch_all(self.feed).await?),
            ReloadStrategy::Streaming => None,
        };

        let mut tx = self
            .conn
            .begin()
            .await
            .map_err(RataError::persistence("beginning transaction"))?;

        let (berth_steps, locations) = match load(&mut tx, self.feed, staged).await {
            Ok(counts) => counts,
            Err(e) => {
                warn!(stage = %e.stage(), "Reload failed, rolling back");
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed; transaction is discarded when the connection closes");
                }
                return Err(e);
            },
        };

        let outcome = finalize(tx, options.dry_run).await?;

        info!(
            berth_steps,
            locations,
            outcome = ?outcome,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Reload finished"
        );

        Ok(ReloadSummary {
            berth_steps,
            locations,
            outcome,
        })
    }
}

/// Clear both tables, then insert every record. Runs inside the transaction.
async fn load<F: FeedSource + ?Sized>(
    tx: &mut Transaction<'_, Postgres>,
    feed: &F,
    staged: Option<StagedRecords>,
) -> Result<(usize, usize)> {
    store::truncate_reference_tables(tx).await?;

    let (berth_steps, locations) = match staged {
        Some(staged) => {
            let berth_steps = store::insert_berth_steps(tx, &staged.berth_steps).await?;
            let locations = store::insert_locations(tx, &staged.locations).await?;
            (berth_steps, locations)
        },
        None => {
            let records = fetch_berth_steps(feed).await?;
            let berth_steps = store::insert_berth_steps(tx, &records).await?;
            drop(records);

            let records = fetch_locations(feed).await?;
            let locations = store::insert_locations(tx, &records).await?;
            (berth_steps, locations)
        },
    };

    info!(berth_steps, locations, "Inserted reference records");
    Ok((berth_steps, locations))
}

async fn finalize(tx: Transaction<'_, Postgres>, dry_run: bool) -> Result<ReloadOutcome> {
    if dry_run {
        tx.rollback()
            .await
            .map_err(RataError::persistence("rolling back dry run"))?;
        info!("Dry run: transaction rolled back");
        Ok(ReloadOutcome::RolledBack)
    } else {
        tx.commit()
            .await
            .map_err(RataError::persistence("committing reload"))?;
        Ok(ReloadOutcome::Committed)
    }
}

/// Fetch and map both resources concurrently
async fn fetch_all<F: FeedSource + ?Sized>(feed: &F) -> Result<StagedRecords> {
    let (berth_steps, locations) =
        tokio::try_join!(fetch_berth_steps(feed), fetch_locations(feed))?;
    Ok(StagedRecords {
        berth_steps,
        locations,
    })
}

async fn fetch_berth_steps<F: FeedSource + ?Sized>(feed: &F) -> Result<Vec<BerthStepRecord>> {
    let entries = feed.fetch(FeedResource::BerthSteps).await?;
    map_entries(&entries, BerthStepRecord::from_entry)
}

async fn fetch_locations<F: FeedSource + ?Sized>(feed: &F) -> Result<Vec<LocationRecord>> {
    let entries = feed.fetch(FeedResource::Locations).await?;
    map_entries(&entries, LocationRecord::from_entry)
}
