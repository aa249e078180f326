use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use crate::db::models::{NewIngredient, NewRecipe, RecipeWithCategory};
use crate::db::DbPool;
use crate::utils::validation;
use crate::{api::models::*, db, search, Error, Result};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub settings: crate::config::Settings,
}

/// GET /api/search - Search recipes
pub async fn search_recipes(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    debug!("Search request: {:?}", params);

    let mut ids = search::run_search(&state.pool, &params.q, state.settings.search.rank_policy)
        .await?;
    ids.truncate(state.settings.pagination.max_search_results);

    let limit = params.limit.clamp(1, state.settings.pagination.api_max_limit);
    let offset = params.page.saturating_sub(1) * limit;
    let total = ids.len();

    let page_ids: Vec<i64> = ids.into_iter().skip(offset).take(limit).collect();
    let results = recipe_cards(&state.pool, &page_ids).await?;

    let total_pages = total
        .div_ceil(limit)
        .min(state.settings.pagination.max_pages);

    Ok(Json(SearchResponse {
        results,
        pagination: Pagination {
            page: params.page,
            limit,
            total,
            total_pages,
        },
    }))
}

/// GET /api/recipes - List recipes, newest first
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<RecipesResponse>> {
    debug!("List recipes request: {:?}", params);

    let category_id = match &params.category {
        Some(name) => {
            let category = db::categories::get_category_by_name(&state.pool, name)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Category '{name}' not found")))?;
            Some(category.id)
        }
        None => None,
    };

    let limit = params.limit.clamp(1, state.settings.pagination.api_max_limit);
    let offset = params.page.saturating_sub(1) * limit;

    let recipes =
        db::recipes::list_recipes(&state.pool, category_id, limit as i64, offset as i64).await?;
    let total = db::recipes::count_recipes(&state.pool, category_id).await?;

    let ids: Vec<i64> = recipes.iter().map(|r| r.id).collect();
    let ingredients_map = db::ingredients::ingredients_for_recipes(&state.pool, &ids).await?;
    let recipe_cards = recipes
        .into_iter()
        .map(|r| {
            let ingredients = ingredients_map.get(&r.id).cloned().unwrap_or_default();
            to_card(r, ingredients)
        })
        .collect();

    let total_pages = (total as usize)
        .div_ceil(limit)
        .min(state.settings.pagination.max_pages);

    Ok(Json(RecipesResponse {
        recipes: recipe_cards,
        pagination: Pagination {
            page: params.page,
            limit,
            total: total as usize,
            total_pages,
        },
    }))
}

/// GET /api/recipes/:id - Get recipe details
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecipeDetail>> {
    debug!("Get recipe request: {}", id);

    let details = db::recipes::get_recipe_with_details(&state.pool, id).await?;
    Ok(Json(details.into()))
}

/// POST /api/recipes - Create a recipe
pub async fn create_recipe(
    State(state): State<AppState>,
    Json(payload): Json<RecipePayload>,
) -> Result<(StatusCode, Json<RecipeDetail>)> {
    debug!("Create recipe request: {}", payload.name);

    validate_payload(&payload)?;

    let (category, _) =
        db::categories::get_or_create_category(&state.pool, &payload.category).await?;
    let recipe = db::recipes::create_recipe(
        &state.pool,
        &NewRecipe {
            name: payload.name.trim().to_string(),
            category_id: category.id,
        },
    )
    .await?;
    apply_recipe_contents(&state.pool, recipe.id, &payload).await?;

    let details = db::recipes::get_recipe_with_details(&state.pool, recipe.id).await?;
    Ok((StatusCode::CREATED, Json(details.into())))
}

/// PUT /api/recipes/:id - Replace a recipe
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<RecipePayload>,
) -> Result<Json<RecipeDetail>> {
    debug!("Update recipe request: {}", id);

    validate_payload(&payload)?;

    let (category, _) =
        db::categories::get_or_create_category(&state.pool, &payload.category).await?;
    db::recipes::update_recipe(
        &state.pool,
        id,
        &NewRecipe {
            name: payload.name.trim().to_string(),
            category_id: category.id,
        },
    )
    .await?;
    apply_recipe_contents(&state.pool, id, &payload).await?;

    let details = db::recipes::get_recipe_with_details(&state.pool, id).await?;
    Ok(Json(details.into()))
}

/// DELETE /api/recipes/:id - Delete a recipe and its contents
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    debug!("Delete recipe request: {}", id);

    db::recipes::delete_recipe(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipes/:id/vote - Record a like vote
pub async fn vote_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<VoteResponse>> {
    debug!("Vote request: {}", id);

    let tally = db::recipes::add_vote(&state.pool, id).await?;

    Ok(Json(VoteResponse {
        status: "success".to_string(),
        rating: VoteRating {
            liked: tally.liked,
            total_votes: tally.total,
        },
    }))
}

/// GET /api/categories - List categories with recipe counts
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<CategoriesResponse>> {
    debug!("List categories request");

    let categories = db::categories::list_categories_with_counts(&state.pool).await?;

    Ok(Json(CategoriesResponse {
        categories: categories
            .into_iter()
            .map(|c| CategoryCard {
                id: c.id,
                name: c.name,
                recipe_count: c.recipe_count,
            })
            .collect(),
    }))
}

/// GET /api/stats - Get system statistics
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<Stats>> {
    debug!("Get stats request");

    let total_recipes = db::recipes::count_all_recipes(&state.pool).await?;
    let total_categories = db::categories::count_categories(&state.pool).await?;
    let total_ingredients = db::ingredients::count_ingredients(&state.pool).await?;
    let total_votes = db::recipes::sum_votes(&state.pool).await?;

    Ok(Json(Stats {
        total_recipes,
        total_categories,
        total_ingredients,
        total_votes,
    }))
}

/// GET /health - Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
    }))
}

/// GET /ready - Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> Result<Json<ReadinessResponse>> {
    let db_healthy = sqlx::query("SELECT 1").fetch_one(&state.pool).await.is_ok();

    Ok(Json(ReadinessResponse {
        ready: db_healthy,
        database: if db_healthy { "ok" } else { "error" }.to_string(),
    }))
}

/// Fetch cards for the given ids, preserving their order
async fn recipe_cards(pool: &DbPool, ids: &[i64]) -> Result<Vec<RecipeCard>> {
    let recipes = db::recipes::recipes_in_order(pool, ids).await?;
    let ingredients_map = db::ingredients::ingredients_for_recipes(pool, ids).await?;

    Ok(recipes
        .into_iter()
        .map(|r| {
            let ingredients = ingredients_map.get(&r.id).cloned().unwrap_or_default();
            to_card(r, ingredients)
        })
        .collect())
}

fn to_card(recipe: RecipeWithCategory, ingredients: Vec<String>) -> RecipeCard {
    RecipeCard {
        id: recipe.id,
        name: recipe.name,
        category: recipe.category_name,
        ingredients,
        votes_liked: recipe.votes_liked,
        votes_total: recipe.votes_total,
    }
}

fn validate_payload(payload: &RecipePayload) -> Result<()> {
    validation::validate_recipe_name(&payload.name)?;
    validation::validate_category_name(&payload.category)?;

    for ingredient in &payload.ingredients {
        validation::validate_ingredient_name(&ingredient.name)?;
        validation::validate_quantity(&ingredient.quantity)?;
    }

    for step in &payload.steps {
        validation::validate_instructions(step)?;
    }

    Ok(())
}

async fn apply_recipe_contents(pool: &DbPool, recipe_id: i64, payload: &RecipePayload) -> Result<()> {
    let ingredients: Vec<NewIngredient> = payload
        .ingredients
        .iter()
        .map(|i| NewIngredient {
            name: i.name.trim().to_string(),
            quantity: i.quantity.trim().to_string(),
        })
        .collect();
    db::ingredients::set_recipe_ingredients(pool, recipe_id, &ingredients).await?;

    let steps: Vec<String> = payload.steps.iter().map(|s| s.trim().to_string()).collect();
    db::steps::set_recipe_steps(pool, recipe_id, &steps).await?;

    Ok(())
}
