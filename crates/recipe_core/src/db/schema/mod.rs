//! Recipe schema registry and executor.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Enable referential-integrity enforcement on the connection.
//! - Own the explicit, separately invoked data-clearing operation.
//!
//! # Invariants
//! - `ensure_schema` is idempotent and never deletes data.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - Pending migrations are applied in a single transaction.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::{Connection, Transaction};
use std::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_recipes.sql"),
}];

/// Tables owned by the recipe schema, parent first.
pub const RECIPE_TABLES: [&str; 2] = ["RECIPES", "INGREDIENTS"];

/// Row counts removed by [`clear_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearedRows {
    pub recipes: usize,
    pub ingredients: usize,
}

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Enables foreign keys and creates both recipe tables when absent.
///
/// Safe to call on every startup. Must run before any row access.
///
/// # Errors
/// - `ForeignKeysUnavailable` when the engine does not keep enforcement on.
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
/// - `Sqlite` for any DDL failure.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let started_at = Instant::now();
    let result = enable_foreign_keys(conn).and_then(|()| apply_migrations(conn));

    match &result {
        Ok(version) => info!(
            "event=schema_ensure module=db status=ok version={} duration_ms={}",
            version,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=schema_ensure module=db status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }

    result.map(|_| ())
}

/// Deletes every ingredient row and then every recipe row inside `tx`.
///
/// Never invoked implicitly by bootstrap; callers opt in explicitly and own
/// the commit decision.
pub fn clear_all(tx: &Transaction<'_>) -> DbResult<ClearedRows> {
    let ingredients = tx.execute("DELETE FROM INGREDIENTS;", [])?;
    let recipes = tx.execute("DELETE FROM RECIPES;", [])?;
    Ok(ClearedRows {
        recipes,
        ingredients,
    })
}

/// Reads back `PRAGMA foreign_keys` for the connection.
pub fn foreign_keys_enabled(conn: &Connection) -> DbResult<bool> {
    let enabled: i64 = conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))?;
    Ok(enabled == 1)
}

fn enable_foreign_keys(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    if !foreign_keys_enabled(conn)? {
        return Err(DbError::ForeignKeysUnavailable);
    }
    Ok(())
}

fn apply_migrations(conn: &mut Connection) -> DbResult<u32> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(current_version);
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(latest)
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{ensure_schema, foreign_keys_enabled, latest_version};
    use rusqlite::Connection;

    #[test]
    fn ensure_schema_turns_foreign_keys_back_on() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();
        assert!(!foreign_keys_enabled(&conn).unwrap());

        ensure_schema(&mut conn).unwrap();
        assert!(foreign_keys_enabled(&conn).unwrap());
    }

    #[test]
    fn ensure_schema_twice_keeps_version() {
        let mut conn = Connection::open_in_memory().unwrap();
        ensure_schema(&mut conn).unwrap();
        ensure_schema(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, latest_version());
    }
}
