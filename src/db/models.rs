use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryWithCount {
    pub id: i64,
    pub name: String,
    pub recipe_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub votes_liked: i64,
    pub votes_total: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRecipe {
    pub name: String,
    pub category_id: i64,
}

/// Recipe row joined with its category name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecipeWithCategory {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub category_name: String,
    pub votes_liked: i64,
    pub votes_total: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeWithDetails {
    #[serde(flatten)]
    pub recipe: RecipeWithCategory,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: i64,
    pub recipe_id: i64,
    pub name: String,
    pub quantity: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIngredient {
    pub name: String,
    pub quantity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Step {
    pub id: i64,
    pub recipe_id: i64,
    pub position: i64,
    pub instructions: String,
    pub created_at: DateTime<Utc>,
}

/// Vote counters returned by the vote endpoint
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VoteTally {
    pub liked: i64,
    pub total: i64,
}
