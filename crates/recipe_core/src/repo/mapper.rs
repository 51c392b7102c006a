//! Aggregate mapper between `Recipe` and its two tables.
//!
//! # Responsibility
//! - Translate one `Recipe` into a parent row plus one child row per ingredient.
//! - Rebuild a fresh `Recipe` from the parent row and its child rows.
//!
//! # Invariants
//! - Save uses only the caller's transaction; it never commits or rolls back.
//! - Child rows are written in ingredient-list order, after the parent row.
//! - Any row failure is returned unchanged so the coordinator can roll back.
//! - A parent with zero child rows loads as a recipe with no ingredients.

use crate::model::recipe::{Ingredient, Recipe, RecipeId};
use crate::repo::recipe_repo::RepoResult;
use crate::repo::rows::{
    fetch_ingredient_rows, fetch_recipe_row, insert_ingredient_row, insert_recipe_row,
};
use log::debug;
use rusqlite::{Connection, Transaction};

/// Writes the whole aggregate inside `tx` and returns the parent identity.
pub fn save_aggregate(tx: &Transaction<'_>, recipe: &Recipe) -> RepoResult<RecipeId> {
    let recipe_id = insert_recipe_row(tx, &recipe.name, recipe.preparation_minutes)?;
    debug!(
        "event=recipe_rows module=mapper status=parent_written recipe_id={}",
        recipe_id
    );

    for ingredient in &recipe.ingredients {
        insert_ingredient_row(
            tx,
            &ingredient.name,
            ingredient.quantity,
            &ingredient.unit,
            recipe_id,
        )?;
    }

    debug!(
        "event=recipe_rows module=mapper status=children_written recipe_id={} count={}",
        recipe_id,
        recipe.ingredients.len()
    );
    Ok(recipe_id)
}

/// Reconstructs the aggregate stored under `id`.
///
/// Runs as plain reads; a `&Transaction` also derefs to `&Connection` when a
/// caller wants the load inside an open unit of work.
pub fn load_aggregate(conn: &Connection, id: RecipeId) -> RepoResult<Option<Recipe>> {
    let Some(parent) = fetch_recipe_row(conn, id)? else {
        return Ok(None);
    };

    let mut recipe = Recipe::new(parent.name, parent.preparation_minutes);
    for row in fetch_ingredient_rows(conn, parent.id)? {
        recipe.add_ingredient(Ingredient::new(row.name, row.quantity, row.unit));
    }

    Ok(Some(recipe))
}
