#![allow(dead_code)]

use recipe_core::{Ingredient, Recipe};
use rusqlite::Connection;

pub fn chickpea_curry() -> Recipe {
    Recipe::new("Chickpea Curry", 35)
        .with_ingredient(Ingredient::new("Chickpeas", 400.0, "grams"))
        .with_ingredient(Ingredient::new("Coconut Milk", 200.0, "ml"))
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

/// Makes any ingredient insert named `Poison` fail inside the engine.
pub fn install_poison_trigger(conn: &Connection) {
    conn.execute_batch(
        "CREATE TRIGGER reject_poison
         BEFORE INSERT ON INGREDIENTS
         WHEN NEW.name = 'Poison'
         BEGIN
             SELECT RAISE(ABORT, 'forced ingredient failure');
         END;",
    )
    .unwrap();
}

/// Sorted `(name, quantity, unit)` triples for order-insensitive comparison.
pub fn ingredient_triples(recipe: &Recipe) -> Vec<(String, f64, String)> {
    let mut triples: Vec<_> = recipe
        .ingredients
        .iter()
        .map(|i| (i.name.clone(), i.quantity, i.unit.clone()))
        .collect();
    triples.sort_by(|a, b| a.0.cmp(&b.0).then(a.2.cmp(&b.2)));
    triples
}
