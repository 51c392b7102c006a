//! Core persistence for the recipe manager.
//! Stores a recipe and its ingredients atomically across two SQLite tables and
//! rebuilds the aggregate by id.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig};
pub use db::schema::{ensure_schema, ClearedRows};
pub use db::{open_db, open_db_in_memory, open_db_with_config, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::recipe::{Ingredient, Recipe, RecipeId, RecipeValidationError};
pub use repo::recipe_repo::{RecipeRepository, RepoError, RepoResult, SqliteRecipeRepository};
pub use repo::unit_of_work::{run_in_unit_of_work, UnitOfWork, UnitOfWorkState};
pub use service::recipe_service::RecipeService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
