//! Recipe use-case service.
//!
//! # Responsibility
//! - Provide stable save/load/delete entry points for core callers.
//! - Delegate persistence to any `RecipeRepository` implementation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or atomicity.
//! - Service layer remains storage-agnostic.

use crate::db::schema::ClearedRows;
use crate::model::recipe::{Recipe, RecipeId};
use crate::repo::recipe_repo::{RecipeRepository, RepoResult};

/// Use-case service wrapper for recipe persistence.
pub struct RecipeService<R: RecipeRepository> {
    repo: R,
}

impl<R: RecipeRepository> RecipeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Saves the aggregate atomically and returns its storage id.
    ///
    /// # Contract
    /// - On error nothing from this recipe is visible to later reads.
    pub fn save_recipe(&mut self, recipe: &Recipe) -> RepoResult<RecipeId> {
        self.repo.save_recipe(recipe)
    }

    /// Loads a fresh copy of the recipe, `Ok(None)` when the id is unknown.
    pub fn load_recipe(&self, id: RecipeId) -> RepoResult<Option<Recipe>> {
        self.repo.load_recipe(id)
    }

    /// Deletes a recipe and, through cascade, its ingredients.
    pub fn delete_recipe(&mut self, id: RecipeId) -> RepoResult<bool> {
        self.repo.delete_recipe(id)
    }

    /// Explicitly wipes all stored recipes.
    pub fn clear_recipes(&mut self) -> RepoResult<ClearedRows> {
        self.repo.clear_recipes()
    }
}

#[cfg(test)]
mod tests {
    use super::RecipeService;
    use crate::db::schema::ClearedRows;
    use crate::model::recipe::{Ingredient, Recipe, RecipeId};
    use crate::repo::recipe_repo::{RecipeRepository, RepoResult};
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct MemoryRepo {
        next_id: i64,
        recipes: BTreeMap<RecipeId, Recipe>,
    }

    impl RecipeRepository for MemoryRepo {
        fn save_recipe(&mut self, recipe: &Recipe) -> RepoResult<RecipeId> {
            recipe.validate()?;
            self.next_id += 1;
            let id = RecipeId::new(self.next_id);
            self.recipes.insert(id, recipe.clone());
            Ok(id)
        }

        fn load_recipe(&self, id: RecipeId) -> RepoResult<Option<Recipe>> {
            Ok(self.recipes.get(&id).cloned())
        }

        fn delete_recipe(&mut self, id: RecipeId) -> RepoResult<bool> {
            Ok(self.recipes.remove(&id).is_some())
        }

        fn clear_recipes(&mut self) -> RepoResult<ClearedRows> {
            let recipes = self.recipes.len();
            let ingredients = self.recipes.values().map(|r| r.ingredients.len()).sum();
            self.recipes.clear();
            Ok(ClearedRows {
                recipes,
                ingredients,
            })
        }
    }

    #[test]
    fn service_works_against_any_repository_port() {
        let mut service = RecipeService::new(MemoryRepo::default());
        let recipe =
            Recipe::new("Hummus", 10).with_ingredient(Ingredient::new("Tahini", 30.0, "grams"));

        let id = service.save_recipe(&recipe).unwrap();
        assert_eq!(service.load_recipe(id).unwrap(), Some(recipe));
        assert!(service.delete_recipe(id).unwrap());
        assert_eq!(service.load_recipe(id).unwrap(), None);
    }
}
