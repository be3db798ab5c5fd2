//! Schema versioning for the local key-value store.

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema::{CREATE_METADATA_TABLE, MIGRATIONS};

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// The schema version a fully migrated database reports.
#[must_use]
pub fn current_version() -> i32 {
    MIGRATIONS.last().map_or(0, |(version, _)| *version)
}

/// Bring the database schema up to [`current_version`].
///
/// Each pending migration runs in its own transaction together with the
/// version bump, so a failed step leaves the previous version intact.
///
/// # Errors
///
/// Returns an error if a migration fails or the stored version is newer
/// than this build understands.
pub fn initialize_schema(conn: &mut Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;

    let from = schema_version(conn)?;
    let target = current_version();
    if from > target {
        return Err(Error::DatabaseMigration {
            message: format!("database schema v{from} is newer than supported v{target}"),
        });
    }

    for (version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > from) {
        debug!(version, "Applying migration");
        let tx = conn.transaction()?;
        tx.execute_batch(sql).map_err(|e| Error::DatabaseMigration {
            message: format!("migration v{version} failed: {e}"),
        })?;
        set_schema_version(&tx, *version)?;
        tx.commit()?;
    }

    if from < target {
        info!(from, to = target, "Database schema migrated");
    }
    Ok(())
}

/// Stored schema version, or 0 for a fresh database.
fn schema_version(conn: &Connection) -> Result<i32> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        None => Ok(0),
        Some(v) => v.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {v}"),
        }),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}
