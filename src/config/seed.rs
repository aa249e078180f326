use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::db::models::{NewIngredient, NewRecipe};
use crate::db::{categories, ingredients, recipes, steps, DbPool};
use crate::error::{Error, Result};

/// Declarative recipe set loaded from a YAML file and synced into the
/// database at startup or via the `seed` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedFile {
    pub version: u32,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub recipes: Vec<SeedRecipe>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRecipe {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub ingredients: Vec<SeedIngredient>,
    #[serde(default)]
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedIngredient {
    pub name: String,
    #[serde(default)]
    pub quantity: String,
}

const MAX_NAME_LENGTH: usize = 255;

fn read_seed(path: &Path) -> anyhow::Result<SeedFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let seed: SeedFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse seed file {}", path.display()))?;
    Ok(seed)
}

impl SeedFile {
    /// Load and validate a seed file from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let seed = read_seed(path.as_ref()).map_err(|e| Error::Config(format!("{e:#}")))?;
        seed.validate()?;
        Ok(seed)
    }

    /// Validate the entire seed file
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(Error::Config(format!(
                "Unsupported seed version: {}. Expected version 1",
                self.version
            )));
        }

        for name in &self.categories {
            validate_name(name, "Category name")?;
        }

        // Duplicate recipe check, keyed by name within category
        let mut seen = HashSet::new();
        for recipe in &self.recipes {
            if !seen.insert((recipe.name.trim(), recipe.category.trim())) {
                return Err(Error::Config(format!(
                    "Duplicate recipe '{}' in category '{}'",
                    recipe.name.trim(),
                    recipe.category.trim()
                )));
            }
        }

        for (index, recipe) in self.recipes.iter().enumerate() {
            validate_seed_recipe(recipe).map_err(|e| {
                Error::Config(format!("Recipe #{} ({}): {}", index + 1, recipe.name, e))
            })?;
        }

        Ok(())
    }
}

fn validate_name(name: &str, what: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Config(format!("{what} cannot be empty")));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::Config(format!(
            "{what} cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

fn validate_seed_recipe(recipe: &SeedRecipe) -> Result<()> {
    validate_name(&recipe.name, "Recipe name")?;
    validate_name(&recipe.category, "Category name")?;

    for ingredient in &recipe.ingredients {
        validate_name(&ingredient.name, "Ingredient name")?;
        if ingredient.quantity.chars().count() > MAX_NAME_LENGTH {
            return Err(Error::Config(format!(
                "Ingredient quantity cannot exceed {MAX_NAME_LENGTH} characters"
            )));
        }
    }

    for step in &recipe.steps {
        if step.trim().is_empty() {
            return Err(Error::Config("Step instructions cannot be empty".to_string()));
        }
    }

    Ok(())
}

/// Outcome counters from one seed sync run
#[derive(Debug, Default)]
pub struct SeedReport {
    pub categories_added: usize,
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub errors: Vec<String>,
}

impl SeedReport {
    pub fn log_summary(&self) {
        info!(
            "Seed sync completed: {} categories added, {} added, {} updated, {} unchanged, {} errors",
            self.categories_added,
            self.added,
            self.updated,
            self.unchanged,
            self.errors.len()
        );

        if !self.errors.is_empty() {
            warn!("Seed errors:");
            for error in &self.errors {
                warn!("  - {}", error);
            }
        }
    }
}

enum SyncOutcome {
    Added,
    Updated,
    Unchanged,
}

/// Sync a validated seed file into the database.
///
/// Idempotent: recipes are keyed by name within their category. Existing
/// recipes whose ingredients and steps already match are left untouched.
/// A failure on one recipe is recorded and does not abort the rest.
pub async fn sync_seed(pool: &DbPool, seed: &SeedFile) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    info!(
        "Starting seed sync: {} categories, {} recipes",
        seed.categories.len(),
        seed.recipes.len()
    );

    for name in &seed.categories {
        let (_, created) = categories::get_or_create_category(pool, name).await?;
        if created {
            report.categories_added += 1;
        }
    }

    for entry in &seed.recipes {
        match sync_recipe(pool, entry).await {
            Ok((outcome, category_created)) => {
                if category_created {
                    report.categories_added += 1;
                }
                match outcome {
                    SyncOutcome::Added => report.added += 1,
                    SyncOutcome::Updated => report.updated += 1,
                    SyncOutcome::Unchanged => report.unchanged += 1,
                }
            }
            Err(e) => {
                let error_msg = format!("Failed to sync recipe '{}': {}", entry.name, e.log_safe());
                warn!("{}", error_msg);
                report.errors.push(error_msg);
            }
        }
    }

    report.log_summary();
    Ok(report)
}

async fn sync_recipe(pool: &DbPool, entry: &SeedRecipe) -> Result<(SyncOutcome, bool)> {
    let (category, category_created) =
        categories::get_or_create_category(pool, &entry.category).await?;

    let desired_ingredients: Vec<NewIngredient> = entry
        .ingredients
        .iter()
        .map(|i| NewIngredient {
            name: i.name.trim().to_string(),
            quantity: i.quantity.trim().to_string(),
        })
        .collect();
    let desired_steps: Vec<String> = entry.steps.iter().map(|s| s.trim().to_string()).collect();

    let existing = recipes::find_recipe_in_category(pool, entry.name.trim(), category.id).await?;

    let outcome = match existing {
        Some(recipe) => {
            if recipe_matches(pool, recipe.id, &desired_ingredients, &desired_steps).await? {
                SyncOutcome::Unchanged
            } else {
                ingredients::set_recipe_ingredients(pool, recipe.id, &desired_ingredients).await?;
                steps::set_recipe_steps(pool, recipe.id, &desired_steps).await?;
                recipes::touch_recipe(pool, recipe.id).await?;
                SyncOutcome::Updated
            }
        }
        None => {
            let recipe = recipes::create_recipe(
                pool,
                &NewRecipe {
                    name: entry.name.trim().to_string(),
                    category_id: category.id,
                },
            )
            .await?;
            ingredients::set_recipe_ingredients(pool, recipe.id, &desired_ingredients).await?;
            steps::set_recipe_steps(pool, recipe.id, &desired_steps).await?;
            SyncOutcome::Added
        }
    };

    Ok((outcome, category_created))
}

async fn recipe_matches(
    pool: &DbPool,
    recipe_id: i64,
    desired_ingredients: &[NewIngredient],
    desired_steps: &[String],
) -> Result<bool> {
    let current_ingredients: Vec<(String, String)> = ingredients::list_for_recipe(pool, recipe_id)
        .await?
        .into_iter()
        .map(|i| (i.name, i.quantity))
        .collect();
    let wanted_ingredients: Vec<(String, String)> = desired_ingredients
        .iter()
        .map(|i| (i.name.clone(), i.quantity.clone()))
        .collect();

    if current_ingredients != wanted_ingredients {
        return Ok(false);
    }

    let current_steps: Vec<String> = steps::list_for_recipe(pool, recipe_id)
        .await?
        .into_iter()
        .map(|s| s.instructions)
        .collect();

    Ok(current_steps == desired_steps)
}
