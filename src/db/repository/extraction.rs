use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, ErrorCode};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{ExtractionRecord, ExtractionStatus, NewExtraction};

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, filename, storage_path, status, created_at, updated_at FROM extractions";

/// Raw column values, converted by `extraction_from_row`.
struct ExtractionRow {
    id: String,
    user_id: String,
    filename: String,
    storage_path: String,
    status: String,
    created_at: String,
    updated_at: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExtractionRow> {
    Ok(ExtractionRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        filename: row.get(2)?,
        storage_path: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn extraction_from_row(row: ExtractionRow) -> Result<ExtractionRecord, DatabaseError> {
    Ok(ExtractionRecord {
        id: Uuid::parse_str(&row.id).map_err(|_| DatabaseError::ConstraintViolation(format!(
            "extractions.id is not a UUID: {}",
            row.id
        )))?,
        user_id: row.user_id,
        filename: row.filename,
        storage_path: row.storage_path,
        status: ExtractionStatus::from_str(&row.status)?,
        created_at: parse_timestamp("created_at", &row.created_at)?,
        updated_at: parse_timestamp("updated_at", &row.updated_at)?,
    })
}

fn parse_timestamp(column: &'static str, value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DatabaseError::InvalidTimestamp {
            column,
            value: value.to_string(),
        })
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Insert a new extraction and return it with its assigned id and timestamps.
///
/// A duplicate `storage_path` is reported as `ConstraintViolation`.
pub fn insert_extraction(
    conn: &Connection,
    new: &NewExtraction,
) -> Result<ExtractionRecord, DatabaseError> {
    let now = Utc::now().trunc_subsecs(3);
    let record = ExtractionRecord {
        id: Uuid::new_v4(),
        user_id: new.user_id.clone(),
        filename: new.filename.clone(),
        storage_path: new.storage_path.clone(),
        status: new.status,
        created_at: now,
        updated_at: now,
    };

    let result = conn.execute(
        "INSERT INTO extractions (id, user_id, filename, storage_path, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.id.to_string(),
            record.user_id,
            record.filename,
            record.storage_path,
            record.status.as_str(),
            format_timestamp(&record.created_at),
            format_timestamp(&record.updated_at),
        ],
    );

    match result {
        Ok(_) => Ok(record),
        Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
            Err(DatabaseError::ConstraintViolation(format!(
                "storage path already recorded: {}",
                record.storage_path
            )))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn get_extraction(conn: &Connection, id: &Uuid) -> Result<Option<ExtractionRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;

    match stmt.query_row(params![id.to_string()], read_row) {
        Ok(row) => Ok(Some(extraction_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All extractions owned by `user_id`, newest first.
pub fn get_extractions_by_user(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<ExtractionRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE user_id = ?1 ORDER BY created_at DESC, id"
    ))?;

    let rows = stmt.query_map(params![user_id], read_row)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(extraction_from_row(row?)?);
    }
    Ok(records)
}

/// Move an extraction to `status`, enforcing the lifecycle order.
pub fn update_extraction_status(
    conn: &Connection,
    id: &Uuid,
    status: ExtractionStatus,
) -> Result<ExtractionRecord, DatabaseError> {
    let current = get_extraction(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "Extraction".into(),
        id: id.to_string(),
    })?;

    if !current.status.can_transition_to(status) {
        return Err(DatabaseError::InvalidTransition {
            from: current.status,
            to: status,
        });
    }

    let updated_at = Utc::now().trunc_subsecs(3);
    // Guard on the old status so a concurrent writer cannot be overwritten.
    let rows = conn.execute(
        "UPDATE extractions SET status = ?2, updated_at = ?3 WHERE id = ?1 AND status = ?4",
        params![
            id.to_string(),
            status.as_str(),
            format_timestamp(&updated_at),
            current.status.as_str(),
        ],
    )?;
    if rows == 0 {
        return Err(DatabaseError::ConstraintViolation(format!(
            "extraction {id} changed status concurrently"
        )));
    }

    Ok(ExtractionRecord {
        status,
        updated_at,
        ..current
    })
}
