//! Repository layer: storage port, row access, mapping and transactions.
//!
//! # Responsibility
//! - Define the `RecipeRepository` storage port.
//! - Isolate SQLite statements from services and entity types.
//!
//! # Invariants
//! - `rows` never manages transaction boundaries.
//! - `mapper` never commits; `unit_of_work` is the single commit/rollback
//!   decision point.
//! - Errors propagate upward unchanged until the unit of work decides.

pub mod mapper;
pub mod recipe_repo;
pub mod rows;
pub mod unit_of_work;
