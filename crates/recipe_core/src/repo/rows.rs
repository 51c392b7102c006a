//! Single-table row access for `RECIPES` and `INGREDIENTS`.
//!
//! # Responsibility
//! - Execute parameterized insert/select/delete statements.
//! - Convert raw columns into typed rows, rejecting malformed values.
//!
//! # Invariants
//! - Write primitives take an explicit `Transaction` handle and never commit.
//! - No business rules live here; callers own validation and boundaries.
//! - Ingredient rows are returned in storage row order (`id ASC`).

use crate::model::recipe::RecipeId;
use crate::repo::recipe_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

/// Parent row as stored in `RECIPES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRow {
    pub id: RecipeId,
    pub name: String,
    pub preparation_minutes: u32,
}

/// Child row as stored in `INGREDIENTS`, without its own id.
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientRow {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

/// Inserts one `RECIPES` row and returns the engine-assigned id.
pub fn insert_recipe_row(
    tx: &Transaction<'_>,
    name: &str,
    preparation_minutes: u32,
) -> RepoResult<RecipeId> {
    tx.execute(
        "INSERT INTO RECIPES (name, preparation_minutes) VALUES (?1, ?2);",
        params![name, preparation_minutes],
    )?;
    Ok(RecipeId::new(tx.last_insert_rowid()))
}

/// Inserts one `INGREDIENTS` row bound to `recipe_id`.
///
/// A `recipe_id` with no parent row fails with `ConstraintViolation`.
pub fn insert_ingredient_row(
    tx: &Transaction<'_>,
    name: &str,
    quantity: f64,
    unit: &str,
    recipe_id: RecipeId,
) -> RepoResult<()> {
    tx.execute(
        "INSERT INTO INGREDIENTS (name, quantity, unit, recipe_id) VALUES (?1, ?2, ?3, ?4);",
        params![name, quantity, unit, recipe_id.get()],
    )?;
    Ok(())
}

/// Fetches one `RECIPES` row by id.
pub fn fetch_recipe_row(conn: &Connection, id: RecipeId) -> RepoResult<Option<RecipeRow>> {
    let raw = conn
        .query_row(
            "SELECT id, name, preparation_minutes FROM RECIPES WHERE id = ?1;",
            [id.get()],
            |row| {
                Ok((
                    row.get::<_, i64>("id")?,
                    row.get::<_, String>("name")?,
                    row.get::<_, Option<i64>>("preparation_minutes")?,
                ))
            },
        )
        .optional()?;

    let Some((row_id, name, minutes)) = raw else {
        return Ok(None);
    };

    let preparation_minutes = minutes
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid preparation_minutes `{minutes:?}` in RECIPES.id={row_id}"
            ))
        })?;

    Ok(Some(RecipeRow {
        id: RecipeId::new(row_id),
        name,
        preparation_minutes,
    }))
}

/// Fetches every `INGREDIENTS` row owned by `recipe_id`.
pub fn fetch_ingredient_rows(
    conn: &Connection,
    recipe_id: RecipeId,
) -> RepoResult<Vec<IngredientRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, quantity, unit
         FROM INGREDIENTS
         WHERE recipe_id = ?1
         ORDER BY id ASC;",
    )?;

    let mut rows = stmt.query([recipe_id.get()])?;
    let mut ingredients = Vec::new();
    while let Some(row) = rows.next()? {
        ingredients.push(parse_ingredient_row(row)?);
    }

    Ok(ingredients)
}

/// Deletes one `RECIPES` row; its ingredients are removed by `ON DELETE CASCADE`.
pub fn delete_recipe_row(tx: &Transaction<'_>, id: RecipeId) -> RepoResult<bool> {
    let changed = tx.execute("DELETE FROM RECIPES WHERE id = ?1;", [id.get()])?;
    Ok(changed > 0)
}

fn parse_ingredient_row(row: &Row<'_>) -> RepoResult<IngredientRow> {
    let id: i64 = row.get("id")?;

    let quantity = row.get::<_, Option<f64>>("quantity")?.ok_or_else(|| {
        RepoError::InvalidData(format!("null quantity in INGREDIENTS.id={id}"))
    })?;
    let unit = row
        .get::<_, Option<String>>("unit")?
        .ok_or_else(|| RepoError::InvalidData(format!("null unit in INGREDIENTS.id={id}")))?;

    Ok(IngredientRow {
        name: row.get("name")?,
        quantity,
        unit,
    })
}
