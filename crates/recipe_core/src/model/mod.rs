//! Domain model for the recipe aggregate.
//!
//! # Responsibility
//! - Define the in-memory `Recipe`/`Ingredient` shapes used by callers.
//! - Stay free of storage dependencies; persistence lives in `repo`.
//!
//! # Invariants
//! - Recipes are identified only after a successful save (`RecipeId`).
//! - Every load produces a fresh object; there is no identity map.

pub mod recipe;
