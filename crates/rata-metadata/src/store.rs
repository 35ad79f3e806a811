//! Reference table writes
//!
//! Every statement binds named columns, so the table's physical column order
//! does not matter. All functions run on a caller-owned connection or
//! transaction; none of them commit.

use crate::error::{RataError, Result};
use crate::records::{BerthStepRecord, LocationRecord};
use sqlx::PgConnection;
use tracing::debug;

/// SMART berth stepping table
pub const BERTH_STEP_TABLE: &str = "nrod.reference_smart";

/// CORPUS location table
pub const LOCATION_TABLE: &str = "nrod.reference_corpus";

const TRUNCATE_SQL: &str =
    "TRUNCATE TABLE nrod.reference_smart, nrod.reference_corpus RESTART IDENTITY";

const INSERT_BERTH_STEP_SQL: &str = r#"
    INSERT INTO nrod.reference_smart (
        track_circuit_id, from_berth, to_berth, from_line, to_line,
        berth_offset, platform, event_type, route, location_code,
        location_name, step_type, comment
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
"#;

const INSERT_LOCATION_SQL: &str = r#"
    INSERT INTO nrod.reference_corpus (
        location_code, uic_code, short_code, timing_point_code,
        national_location_code, national_location_description, description
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

/// Remove every row from both reference tables in one statement
pub async fn truncate_reference_tables(conn: &mut PgConnection) -> Result<()> {
    sqlx::query(TRUNCATE_SQL)
        .execute(&mut *conn)
        .await
        .map_err(RataError::persistence("truncating reference tables"))?;
    debug!("Truncated {} and {}", BERTH_STEP_TABLE, LOCATION_TABLE);
    Ok(())
}

pub async fn insert_berth_step(conn: &mut PgConnection, record: &BerthStepRecord) -> Result<()> {
    sqlx::query(INSERT_BERTH_STEP_SQL)
        .bind(&record.track_circuit_id)
        .bind(&record.from_berth)
        .bind(&record.to_berth)
        .bind(&record.from_line)
        .bind(&record.to_line)
        .bind(record.berth_offset)
        .bind(&record.platform)
        .bind(&record.event_type)
        .bind(&record.route)
        .bind(record.location_code)
        .bind(&record.location_name)
        .bind(&record.step_type)
        .bind(&record.comment)
        .execute(&mut *conn)
        .await
        .map_err(RataError::persistence("inserting berth step record"))?;
    Ok(())
}

pub async fn insert_location(conn: &mut PgConnection, record: &LocationRecord) -> Result<()> {
    sqlx::query(INSERT_LOCATION_SQL)
        .bind(record.location_code)
        .bind(&record.uic_code)
        .bind(&record.short_code)
        .bind(&record.timing_point_code)
        .bind(record.national_location_code)
        .bind(&record.national_location_description)
        .bind(&record.description)
        .execute(&mut *conn)
        .await
        .map_err(RataError::persistence("inserting location record"))?;
    Ok(())
}

/// Insert berth step records in order, returning how many were written
pub async fn insert_berth_steps(
    conn: &mut PgConnection,
    records: &[BerthStepRecord],
) -> Result<usize> {
    for record in records {
        insert_berth_step(conn, record).await?;
    }
    Ok(records.len())
}

/// Insert location records in order, returning how many were written
pub async fn insert_locations(conn: &mut PgConnection, records: &[LocationRecord]) -> Result<usize> {
    for record in records {
        insert_location(conn, record).await?;
    }
    Ok(records.len())
}

/// Current contents of the berth step table, in insertion order
pub async fn load_berth_steps(conn: &mut PgConnection) -> Result<Vec<BerthStepRecord>> {
    sqlx::query_as::<_, BerthStepRecord>(
        r#"
        SELECT track_circuit_id, from_berth, to_berth, from_line, to_line,
               berth_offset, platform, event_type, route, location_code,
               location_name, step_type, comment
        FROM nrod.reference_smart
        ORDER BY ctid
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(RataError::persistence("reading berth step records"))
}

/// Current contents of the location table, in insertion order
pub async fn load_locations(conn: &mut PgConnection) -> Result<Vec<LocationRecord>> {
    sqlx::query_as::<_, LocationRecord>(
        r#"
        SELECT location_code, uic_code, short_code, timing_point_code,
               national_location_code, national_location_description, description
        FROM nrod.reference_corpus
        ORDER BY ctid
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(RataError::persistence("reading location records"))
}
