//! Recipe storage port and SQLite implementation.
//!
//! # Responsibility
//! - Define the `RecipeRepository` port consumed by services and callers.
//! - Wire validation, the unit of work and the aggregate mapper together.
//! - Classify engine failures into the recipe error taxonomy.
//!
//! # Invariants
//! - Write paths call `Recipe::validate()` before opening a unit of work.
//! - A save either persists the parent row and every child row, or nothing.
//! - A missing recipe is `Ok(None)`, never an error.

use crate::db::schema::{clear_all, foreign_keys_enabled, ClearedRows, RECIPE_TABLES};
use crate::db::DbError;
use crate::model::recipe::{Recipe, RecipeId, RecipeValidationError};
use crate::repo::mapper::{load_aggregate, save_aggregate};
use crate::repo::rows::delete_recipe_row;
use crate::repo::unit_of_work::{run_in_unit_of_work, UnitOfWorkState};
use log::{error, info};
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error taxonomy for recipe persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Schema/bootstrap failure; fatal for the store.
    Schema(DbError),
    Validation(RecipeValidationError),
    /// A write broke a NOT NULL or foreign-key rule.
    ConstraintViolation(rusqlite::Error),
    /// Disk, permission, lock or file-level failure.
    StorageUnavailable(rusqlite::Error),
    /// Any other engine failure.
    Storage(rusqlite::Error),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    InvalidUnitOfWorkState {
        expected: UnitOfWorkState,
        actual: UnitOfWorkState,
    },
}

impl RepoError {
    /// Stable short code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Schema(_) => "schema_error",
            Self::Validation(_) => "validation_failed",
            Self::ConstraintViolation(_) => "constraint_violation",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::Storage(_) => "storage_error",
            Self::InvalidData(_) => "invalid_data",
            Self::MissingRequiredTable(_) => "missing_table",
            Self::InvalidUnitOfWorkState { .. } => "invalid_unit_of_work_state",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema(err) => write!(f, "schema error: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::ConstraintViolation(err) => write!(f, "constraint violation: {err}"),
            Self::StorageUnavailable(err) => write!(f, "storage unavailable: {err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted recipe data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::InvalidUnitOfWorkState { expected, actual } => write!(
                f,
                "unit of work is {actual}, expected {expected}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Schema(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::ConstraintViolation(err) | Self::StorageUnavailable(err) | Self::Storage(err) => {
                Some(err)
            }
            Self::InvalidData(_)
            | Self::MissingRequiredTable(_)
            | Self::InvalidUnitOfWorkState { .. } => None,
        }
    }
}

impl From<RecipeValidationError> for RepoError {
    fn from(value: RecipeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Schema(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        let code = match &value {
            rusqlite::Error::SqliteFailure(err, _) => Some(err.code),
            _ => None,
        };

        match code {
            Some(ErrorCode::ConstraintViolation) => Self::ConstraintViolation(value),
            Some(
                ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::CannotOpen
                | ErrorCode::SystemIoFailure
                | ErrorCode::DiskFull
                | ErrorCode::PermissionDenied
                | ErrorCode::ReadOnly
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::FileLockingProtocolFailed,
            ) => Self::StorageUnavailable(value),
            _ => Self::Storage(value),
        }
    }
}

/// Storage port for recipe aggregates.
///
/// Entity types stay storage-agnostic; only implementations of this trait
/// know about tables and transactions.
pub trait RecipeRepository {
    /// Persists the aggregate atomically and returns its new identity.
    fn save_recipe(&mut self, recipe: &Recipe) -> RepoResult<RecipeId>;
    /// Rebuilds the aggregate stored under `id`, or `None` when absent.
    fn load_recipe(&self, id: RecipeId) -> RepoResult<Option<Recipe>>;
    /// Deletes the parent row; ingredient rows cascade. Returns whether a row matched.
    fn delete_recipe(&mut self, id: RecipeId) -> RepoResult<bool>;
    /// Removes every recipe and ingredient row.
    fn clear_recipes(&mut self) -> RepoResult<ClearedRows>;
}

/// SQLite-backed recipe repository over one exclusively borrowed connection.
pub struct SqliteRecipeRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteRecipeRepository<'conn> {
    /// Constructs a repository from a bootstrapped connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when `ensure_schema` has not run.
    /// - `Schema(ForeignKeysUnavailable)` when enforcement is off.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_recipe_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RecipeRepository for SqliteRecipeRepository<'_> {
    fn save_recipe(&mut self, recipe: &Recipe) -> RepoResult<RecipeId> {
        let started_at = Instant::now();
        recipe.validate()?;

        match run_in_unit_of_work(self.conn, |tx| save_aggregate(tx, recipe)) {
            Ok(id) => {
                info!(
                    "event=recipe_save module=repo status=ok recipe_id={} ingredients={} duration_ms={}",
                    id,
                    recipe.ingredients.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(id)
            }
            Err(err) => {
                error!(
                    "event=recipe_save module=repo status=error ingredients={} duration_ms={} error_code={} error={}",
                    recipe.ingredients.len(),
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn load_recipe(&self, id: RecipeId) -> RepoResult<Option<Recipe>> {
        let started_at = Instant::now();
        let result = load_aggregate(self.conn, id);

        match &result {
            Ok(Some(recipe)) => info!(
                "event=recipe_load module=repo status=ok recipe_id={} ingredients={} duration_ms={}",
                id,
                recipe.ingredients.len(),
                started_at.elapsed().as_millis()
            ),
            Ok(None) => info!(
                "event=recipe_load module=repo status=not_found recipe_id={} duration_ms={}",
                id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=recipe_load module=repo status=error recipe_id={} error_code={} error={}",
                id,
                err.code(),
                err
            ),
        }

        result
    }

    fn delete_recipe(&mut self, id: RecipeId) -> RepoResult<bool> {
        match run_in_unit_of_work(self.conn, |tx| delete_recipe_row(tx, id)) {
            Ok(deleted) => {
                info!(
                    "event=recipe_delete module=repo status=ok recipe_id={} deleted={}",
                    id, deleted
                );
                Ok(deleted)
            }
            Err(err) => {
                error!(
                    "event=recipe_delete module=repo status=error recipe_id={} error_code={} error={}",
                    id,
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    fn clear_recipes(&mut self) -> RepoResult<ClearedRows> {
        match run_in_unit_of_work(self.conn, |tx| Ok(clear_all(tx)?)) {
            Ok(cleared) => {
                info!(
                    "event=recipes_clear module=repo status=ok recipes={} ingredients={}",
                    cleared.recipes, cleared.ingredients
                );
                Ok(cleared)
            }
            Err(err) => {
                error!(
                    "event=recipes_clear module=repo status=error error_code={} error={}",
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn ensure_recipe_connection_ready(conn: &Connection) -> RepoResult<()> {
    for table in RECIPE_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    if !foreign_keys_enabled(conn)? {
        return Err(RepoError::Schema(DbError::ForeignKeysUnavailable));
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
