//! Recipe aggregate model.
//!
//! # Responsibility
//! - Define the in-memory `Recipe` aggregate root and its `Ingredient` values.
//! - Validate data-model rules before any persistence path runs.
//!
//! # Invariants
//! - A `Recipe` carries no storage identity; ids are assigned on first save.
//! - `Ingredient` exists only inside its owning recipe's ingredient list.
//! - Ingredient order is preserved for display but carries no persistence
//!   meaning.
//!
//! # See also
//! - crate::repo::mapper

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned identity of a persisted recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(i64);

impl RecipeId {
    /// Wraps a raw `RECIPES.id` value.
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw row id.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for RecipeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation failures for recipe aggregates.
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeValidationError {
    EmptyRecipeName,
    EmptyIngredientName { index: usize },
    InvalidQuantity { index: usize, quantity: f64 },
}

impl Display for RecipeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRecipeName => write!(f, "recipe name cannot be empty"),
            Self::EmptyIngredientName { index } => {
                write!(f, "ingredient #{index} has an empty name")
            }
            Self::InvalidQuantity { index, quantity } => write!(
                f,
                "ingredient #{index} quantity must be finite and non-negative, got {quantity}"
            ),
        }
    }
}

impl Error for RecipeValidationError {}

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    /// Amount expressed in `unit`.
    pub quantity: f64,
    /// Free-form unit label, e.g. `grams` or `ml`.
    pub unit: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
        }
    }
}

impl Display for Ingredient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} of {}", self.quantity, self.unit, self.name)
    }
}

/// Aggregate root: a recipe and the ingredients it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub preparation_minutes: u32,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// Creates a recipe with an empty ingredient list.
    pub fn new(name: impl Into<String>, preparation_minutes: u32) -> Self {
        Self {
            name: name.into(),
            preparation_minutes,
            ingredients: Vec::new(),
        }
    }

    /// Appends one ingredient, keeping insertion order.
    pub fn add_ingredient(&mut self, ingredient: Ingredient) {
        self.ingredients.push(ingredient);
    }

    /// Builder-style variant of [`Recipe::add_ingredient`].
    pub fn with_ingredient(mut self, ingredient: Ingredient) -> Self {
        self.add_ingredient(ingredient);
        self
    }

    /// Checks data-model rules.
    ///
    /// # Errors
    /// - `EmptyRecipeName` when `name` is blank.
    /// - `EmptyIngredientName` when any ingredient name is blank.
    /// - `InvalidQuantity` when any quantity is negative, NaN or infinite.
    pub fn validate(&self) -> Result<(), RecipeValidationError> {
        if self.name.trim().is_empty() {
            return Err(RecipeValidationError::EmptyRecipeName);
        }

        for (index, ingredient) in self.ingredients.iter().enumerate() {
            if ingredient.name.trim().is_empty() {
                return Err(RecipeValidationError::EmptyIngredientName { index });
            }
            if !ingredient.quantity.is_finite() || ingredient.quantity < 0.0 {
                return Err(RecipeValidationError::InvalidQuantity {
                    index,
                    quantity: ingredient.quantity,
                });
            }
        }

        Ok(())
    }
}
