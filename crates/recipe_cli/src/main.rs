//! Recipe store command-line entry point.
//!
//! # Responsibility
//! - Open the configured database once and release it on every exit path.
//! - Drive save/load/delete/clear through `RecipeService`.

use clap::{Parser, Subcommand};
use recipe_core::{
    default_log_level, init_logging, open_db_with_config, Ingredient, Recipe, RecipeId,
    RecipeService, SqliteRecipeRepository, StoreConfig,
};
use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(name = "recipes")]
#[command(about = "Store and reload recipes with their ingredients", long_about = None)]
struct Cli {
    /// Database file; overrides RECIPE_DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files; logging stays off when unset.
    #[arg(long, env = "RECIPE_LOG_DIR", global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Save the Chickpea Curry example and load it back
    Demo {
        /// Clear every stored recipe first
        #[arg(long)]
        reset: bool,
    },
    /// Save a new recipe
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        minutes: u32,
        /// Repeatable, formatted as `name:quantity:unit`
        #[arg(long = "ingredient")]
        ingredients: Vec<IngredientArg>,
    },
    /// Print one recipe
    Show { id: i64 },
    /// Delete one recipe and its ingredients
    Delete { id: i64 },
    /// Delete every recipe
    Clear,
}

#[derive(Debug, Clone)]
struct IngredientArg(Ingredient);

impl FromStr for IngredientArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.splitn(3, ':');
        let (Some(name), Some(quantity), Some(unit)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("expected `name:quantity:unit`, got `{value}`"));
        };
        let quantity = quantity
            .trim()
            .parse::<f64>()
            .map_err(|err| format!("invalid quantity `{quantity}`: {err}"))?;
        Ok(Self(Ingredient::new(name.trim(), quantity, unit.trim())))
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)?;
    }

    let mut config = StoreConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let mut conn = open_db_with_config(&config)?;
    let mut service = RecipeService::new(SqliteRecipeRepository::try_new(&mut conn)?);

    match cli.command {
        Commands::Demo { reset } => {
            if reset {
                let cleared = service.clear_recipes()?;
                println!("Cleared {} recipe(s).", cleared.recipes);
            }
            let recipe = Recipe::new("Chickpea and Spinach Curry", 35)
                .with_ingredient(Ingredient::new("Cooked Chickpeas", 400.0, "grams"))
                .with_ingredient(Ingredient::new("Coconut Milk", 200.0, "ml"))
                .with_ingredient(Ingredient::new("Spinach", 100.0, "grams"));
            let id = service.save_recipe(&recipe)?;
            println!("Saved '{}' with id {}.", recipe.name, id);
            show(&service, id)?;
        }
        Commands::Add {
            name,
            minutes,
            ingredients,
        } => {
            let mut recipe = Recipe::new(name, minutes);
            for IngredientArg(ingredient) in ingredients {
                recipe.add_ingredient(ingredient);
            }
            let id = service.save_recipe(&recipe)?;
            println!("Saved '{}' with id {}.", recipe.name, id);
        }
        Commands::Show { id } => show(&service, RecipeId::new(id))?,
        Commands::Delete { id } => {
            if service.delete_recipe(RecipeId::new(id))? {
                println!("Deleted recipe {id}.");
            } else {
                println!("No recipe with id {id}.");
            }
        }
        Commands::Clear => {
            let cleared = service.clear_recipes()?;
            println!(
                "Cleared {} recipe(s) and {} ingredient(s).",
                cleared.recipes, cleared.ingredients
            );
        }
    }

    Ok(())
}

fn show(
    service: &RecipeService<SqliteRecipeRepository<'_>>,
    id: RecipeId,
) -> Result<(), Box<dyn Error>> {
    match service.load_recipe(id)? {
        Some(recipe) => {
            println!("{} (id {})", recipe.name, id);
            println!("Preparation time: {} minutes", recipe.preparation_minutes);
            println!("Ingredients:");
            for ingredient in &recipe.ingredients {
                println!(" - {ingredient}");
            }
        }
        None => println!("No recipe with id {id}."),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::IngredientArg;

    #[test]
    fn ingredient_arg_parses_name_quantity_unit() {
        let IngredientArg(ingredient) = "Coconut Milk: 200 :ml".parse().unwrap();
        assert_eq!(ingredient.name, "Coconut Milk");
        assert_eq!(ingredient.quantity, 200.0);
        assert_eq!(ingredient.unit, "ml");
    }

    #[test]
    fn ingredient_arg_rejects_missing_parts() {
        assert!("Salt:1".parse::<IngredientArg>().is_err());
        assert!("Salt:lots:g".parse::<IngredientArg>().is_err());
    }
}
