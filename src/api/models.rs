use serde::{Deserialize, Serialize};

use crate::db::models::RecipeWithDetails;

/// Search request parameters
#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String, // Free-text query string
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    20
}

/// Search response
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<RecipeCard>,
    pub pagination: Pagination,
}

/// Recipe card for search and list results
#[derive(Debug, Clone, Serialize)]
pub struct RecipeCard {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub ingredients: Vec<String>,
    pub votes_liked: i64,
    pub votes_total: i64,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Recipe list query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Recipe list response
#[derive(Debug, Clone, Serialize)]
pub struct RecipesResponse {
    pub recipes: Vec<RecipeCard>,
    pub pagination: Pagination,
}

/// Create/update request body for a recipe
#[derive(Debug, Clone, Deserialize)]
pub struct RecipePayload {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientPayload>,
    #[serde(default)]
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientPayload {
    pub name: String,
    #[serde(default)]
    pub quantity: String,
}

/// Full recipe details
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub votes_liked: i64,
    pub votes_total: i64,
    pub ingredients: Vec<IngredientDetail>,
    pub steps: Vec<StepDetail>,
    pub created_at: String,
    pub updated_at: String,
}

/// Ingredient with free-form quantity
#[derive(Debug, Clone, Serialize)]
pub struct IngredientDetail {
    pub name: String,
    pub quantity: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepDetail {
    pub position: i64,
    pub instructions: String,
}

impl From<RecipeWithDetails> for RecipeDetail {
    fn from(details: RecipeWithDetails) -> Self {
        RecipeDetail {
            id: details.recipe.id,
            name: details.recipe.name,
            category: details.recipe.category_name,
            votes_liked: details.recipe.votes_liked,
            votes_total: details.recipe.votes_total,
            ingredients: details
                .ingredients
                .into_iter()
                .map(|i| IngredientDetail {
                    name: i.name,
                    quantity: i.quantity,
                })
                .collect(),
            steps: details
                .steps
                .into_iter()
                .map(|s| StepDetail {
                    position: s.position,
                    instructions: s.instructions,
                })
                .collect(),
            created_at: details.recipe.created_at.to_rfc3339(),
            updated_at: details.recipe.updated_at.to_rfc3339(),
        }
    }
}

/// Vote response. The `total votes` key is part of the public contract
/// consumed by the voting widget.
#[derive(Debug, Clone, Serialize)]
pub struct VoteResponse {
    pub status: String,
    pub rating: VoteRating,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoteRating {
    pub liked: i64,
    #[serde(rename = "total votes")]
    pub total_votes: i64,
}

/// Category list response
#[derive(Debug, Clone, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCard {
    pub id: i64,
    pub name: String,
    pub recipe_count: i64,
}

/// System statistics
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub total_recipes: i64,
    pub total_categories: i64,
    pub total_ingredients: i64,
    pub total_votes: i64,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub database: String,
}
