use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Deserializer};

use crate::db::models::RecipeWithCategory;
use crate::db::DbPool;
use crate::{api::handlers::AppState, db, error::Error, search, Result};

/// Deserialize optional string, treating empty strings as None
fn deserialize_optional_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => Ok(Some(s.to_string())),
    }
}

fn render<T: Template>(template: T) -> Result<Response> {
    let html = template
        .render()
        .map_err(|e| Error::Internal(format!("Template render failed: {e}")))?;
    Ok(Html(html).into_response())
}

#[derive(Clone)]
#[allow(dead_code)] // Fields are used by Askama templates
struct RecipeCardData {
    id: i64,
    name: String,
    category: String,
    ingredients: Vec<String>,
    votes_liked: i64,
    votes_total: i64,
}

/// Landing page template
#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    recent: Vec<RecipeCardData>,
}

/// Search results page template
#[derive(Template)]
#[template(path = "results.html")]
struct ResultsTemplate {
    query: String,
    results: Vec<RecipeCardData>,
    total: usize,
    page: usize,
    total_pages: usize,
}

/// Empty search state template
#[derive(Template)]
#[template(path = "empty.html")]
struct EmptySearchTemplate {
    query: String,
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    q: Option<String>,
    #[serde(default = "default_page")]
    page: usize,
}

fn default_page() -> usize {
    1
}

/// GET / - Landing page, or search results when ?q= is present
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response> {
    let Some(query) = params.q else {
        // Landing page shows the newest recipes under the search form
        let recipes = db::recipes::list_recipes(&state.pool, None, 6, 0).await?;
        let recent = to_cards(&state.pool, recipes).await?;
        return render(IndexTemplate { recent });
    };

    let mut ids =
        search::run_search(&state.pool, &query, state.settings.search.rank_policy).await?;
    ids.truncate(state.settings.pagination.max_search_results);

    if ids.is_empty() {
        return render(EmptySearchTemplate { query });
    }

    let limit = state.settings.pagination.web_default_limit;
    let offset = params.page.saturating_sub(1) * limit;
    let total = ids.len();
    let total_pages = total
        .div_ceil(limit)
        .min(state.settings.pagination.max_pages);

    let page_ids: Vec<i64> = ids.into_iter().skip(offset).take(limit).collect();
    let recipes = db::recipes::recipes_in_order(&state.pool, &page_ids).await?;
    let results = to_cards(&state.pool, recipes).await?;

    render(ResultsTemplate {
        query,
        results,
        total,
        page: params.page,
        total_pages,
    })
}

/// Recipe detail page template
#[derive(Template)]
#[template(path = "recipe.html")]
struct RecipeTemplate {
    recipe: RecipeData,
}

#[derive(Clone)]
#[allow(dead_code)]
struct RecipeData {
    id: i64,
    name: String,
    category: String,
    votes_liked: i64,
    votes_total: i64,
    ingredients: Vec<IngredientData>,
    steps: Vec<String>,
}

#[derive(Clone)]
#[allow(dead_code)]
struct IngredientData {
    name: String,
    quantity: String,
}

/// GET /recipes/:id - Recipe detail page
pub async fn recipe_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response> {
    let details = db::recipes::get_recipe_with_details(&state.pool, id).await?;

    let recipe = RecipeData {
        id: details.recipe.id,
        name: details.recipe.name,
        category: details.recipe.category_name,
        votes_liked: details.recipe.votes_liked,
        votes_total: details.recipe.votes_total,
        ingredients: details
            .ingredients
            .into_iter()
            .map(|i| IngredientData {
                name: i.name,
                quantity: i.quantity,
            })
            .collect(),
        steps: details.steps.into_iter().map(|s| s.instructions).collect(),
    };

    render(RecipeTemplate { recipe })
}

/// Browse page template
#[derive(Template)]
#[template(path = "browse.html")]
struct BrowseTemplate {
    recipes: Vec<RecipeCardData>,
    categories: Vec<CategoryCardData>,
    category: String,
    page: usize,
    total_pages: usize,
    total: i64,
}

#[derive(Clone)]
#[allow(dead_code)]
struct CategoryCardData {
    name: String,
    recipe_count: i64,
}

#[derive(Deserialize)]
pub struct BrowseParams {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    category: Option<String>,
    #[serde(default = "default_page")]
    page: usize,
}

/// GET /browse - Browse all recipes, optionally filtered by category
pub async fn browse_page(
    State(state): State<AppState>,
    Query(params): Query<BrowseParams>,
) -> Result<Response> {
    let limit = state.settings.pagination.browse_page_size;
    let offset = params.page.saturating_sub(1) * limit;

    let category_id = match &params.category {
        Some(name) => {
            let category = db::categories::get_category_by_name(&state.pool, name)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Category '{name}' not found")))?;
            Some(category.id)
        }
        None => None,
    };

    let recipes =
        db::recipes::list_recipes(&state.pool, category_id, limit as i64, offset as i64).await?;
    let total = db::recipes::count_recipes(&state.pool, category_id).await?;
    let total_pages = (total as usize)
        .div_ceil(limit)
        .min(state.settings.pagination.max_pages);

    let categories = db::categories::list_categories_with_counts(&state.pool)
        .await?
        .into_iter()
        .map(|c| CategoryCardData {
            name: c.name,
            recipe_count: c.recipe_count,
        })
        .collect();

    let recipe_cards = to_cards(&state.pool, recipes).await?;

    render(BrowseTemplate {
        recipes: recipe_cards,
        categories,
        category: params.category.unwrap_or_default(),
        page: params.page,
        total_pages,
        total,
    })
}

/// GET /recipes - Redirect to /browse
pub async fn recipes_redirect() -> impl IntoResponse {
    Redirect::permanent("/browse")
}

/// Batch fetch ingredient names for cards (avoid N+1 query problem)
async fn to_cards(pool: &DbPool, recipes: Vec<RecipeWithCategory>) -> Result<Vec<RecipeCardData>> {
    let ids: Vec<i64> = recipes.iter().map(|r| r.id).collect();
    let ingredients_map = db::ingredients::ingredients_for_recipes(pool, &ids).await?;

    Ok(recipes
        .into_iter()
        .map(|r| {
            let ingredients = ingredients_map.get(&r.id).cloned().unwrap_or_default();
            RecipeCardData {
                id: r.id,
                name: r.name,
                category: r.category_name,
                ingredients,
                votes_liked: r.votes_liked,
                votes_total: r.votes_total,
            }
        })
        .collect())
}
