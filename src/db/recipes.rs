use crate::db::{ingredients, models::*, steps, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;
use std::collections::HashMap;

/// Create a new recipe
pub async fn create_recipe(pool: &DbPool, new_recipe: &NewRecipe) -> Result<Recipe> {
    let now = Utc::now();

    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        INSERT INTO recipes (name, category_id, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&new_recipe.name)
    .bind(new_recipe.category_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(recipe)
}

/// Get recipe by ID
pub async fn get_recipe(pool: &DbPool, recipe_id: i64) -> Result<Recipe> {
    let recipe = sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = ?")
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Recipe {recipe_id} not found")))?;

    Ok(recipe)
}

/// Get recipe by ID joined with its category name
pub async fn get_recipe_with_category(pool: &DbPool, recipe_id: i64) -> Result<RecipeWithCategory> {
    let recipe = sqlx::query_as::<_, RecipeWithCategory>(
        r#"
        SELECT r.id, r.name, r.category_id, c.name AS category_name,
               r.votes_liked, r.votes_total, r.created_at, r.updated_at
        FROM recipes r
        JOIN categories c ON c.id = r.category_id
        WHERE r.id = ?
        "#,
    )
    .bind(recipe_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Recipe {recipe_id} not found")))?;

    Ok(recipe)
}

/// Get recipe with all details (category, ingredients, steps)
pub async fn get_recipe_with_details(pool: &DbPool, recipe_id: i64) -> Result<RecipeWithDetails> {
    let recipe = get_recipe_with_category(pool, recipe_id).await?;
    let ingredients = ingredients::list_for_recipe(pool, recipe_id).await?;
    let steps = steps::list_for_recipe(pool, recipe_id).await?;

    Ok(RecipeWithDetails {
        recipe,
        ingredients,
        steps,
    })
}

/// List recipes, optionally restricted to a category, newest first
pub async fn list_recipes(
    pool: &DbPool,
    category_id: Option<i64>,
    limit: i64,
    offset: i64,
) -> Result<Vec<RecipeWithCategory>> {
    let recipes = match category_id {
        Some(category_id) => {
            sqlx::query_as::<_, RecipeWithCategory>(
                r#"
                SELECT r.id, r.name, r.category_id, c.name AS category_name,
                       r.votes_liked, r.votes_total, r.created_at, r.updated_at
                FROM recipes r
                JOIN categories c ON c.id = r.category_id
                WHERE r.category_id = ?
                ORDER BY r.created_at DESC, r.id DESC
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(category_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, RecipeWithCategory>(
                r#"
                SELECT r.id, r.name, r.category_id, c.name AS category_name,
                       r.votes_liked, r.votes_total, r.created_at, r.updated_at
                FROM recipes r
                JOIN categories c ON c.id = r.category_id
                ORDER BY r.created_at DESC, r.id DESC
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(recipes)
}

/// Count recipes, optionally restricted to a category
pub async fn count_recipes(pool: &DbPool, category_id: Option<i64>) -> Result<i64> {
    let count: (i64,) = match category_id {
        Some(category_id) => {
            sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE category_id = ?")
                .bind(category_id)
                .fetch_one(pool)
                .await?
        }
        None => {
            sqlx::query_as("SELECT COUNT(*) FROM recipes")
                .fetch_one(pool)
                .await?
        }
    };
    Ok(count.0)
}

/// Fetch recipes for the given ids, preserving the caller's order.
/// SQL IN gives no ordering guarantee, so rows are reordered after the fetch.
pub async fn recipes_in_order(pool: &DbPool, recipe_ids: &[i64]) -> Result<Vec<RecipeWithCategory>> {
    if recipe_ids.is_empty() {
        return Ok(Vec::new());
    }

    // Build query with IN clause
    let placeholders = recipe_ids
        .iter()
        .enumerate()
        .map(|(i, _)| format!("?{}", i + 1))
        .collect::<Vec<_>>()
        .join(",");

    let query_str = format!(
        r#"
        SELECT r.id, r.name, r.category_id, c.name AS category_name,
               r.votes_liked, r.votes_total, r.created_at, r.updated_at
        FROM recipes r
        JOIN categories c ON c.id = r.category_id
        WHERE r.id IN ({placeholders})
        "#
    );

    let mut query = sqlx::query_as::<_, RecipeWithCategory>(&query_str);
    for id in recipe_ids {
        query = query.bind(id);
    }

    let rows = query.fetch_all(pool).await?;

    let mut by_id: HashMap<i64, RecipeWithCategory> =
        rows.into_iter().map(|r| (r.id, r)).collect();

    Ok(recipe_ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect())
}

/// Update recipe name and category
pub async fn update_recipe(pool: &DbPool, recipe_id: i64, update: &NewRecipe) -> Result<Recipe> {
    let now = Utc::now();

    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        UPDATE recipes
        SET name = ?, category_id = ?, updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&update.name)
    .bind(update.category_id)
    .bind(now)
    .bind(recipe_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Recipe {recipe_id} not found")))?;

    Ok(recipe)
}

/// Touch the updated_at timestamp without changing anything else
pub async fn touch_recipe(pool: &DbPool, recipe_id: i64) -> Result<()> {
    sqlx::query("UPDATE recipes SET updated_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(recipe_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete recipe (ingredients and steps cascade)
pub async fn delete_recipe(pool: &DbPool, recipe_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(recipe_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Recipe {recipe_id} not found")));
    }

    Ok(())
}

/// Record a positive vote and return the new counters
pub async fn add_vote(pool: &DbPool, recipe_id: i64) -> Result<VoteTally> {
    let tally = sqlx::query_as::<_, VoteTally>(
        r#"
        UPDATE recipes
        SET votes_liked = votes_liked + 1, votes_total = votes_total + 1, updated_at = ?
        WHERE id = ?
        RETURNING votes_liked AS liked, votes_total AS total
        "#,
    )
    .bind(Utc::now())
    .bind(recipe_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::NotFound(format!("Recipe {recipe_id} not found")))?;

    Ok(tally)
}

/// Find a recipe by name within a category
pub async fn find_recipe_in_category(
    pool: &DbPool,
    name: &str,
    category_id: i64,
) -> Result<Option<Recipe>> {
    let recipe =
        sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE name = ? AND category_id = ?")
            .bind(name)
            .bind(category_id)
            .fetch_optional(pool)
            .await?;

    Ok(recipe)
}

/// Count all recipes
pub async fn count_all_recipes(pool: &DbPool) -> Result<i64> {
    count_recipes(pool, None).await
}

/// Sum of all votes ever cast
pub async fn sum_votes(pool: &DbPool) -> Result<i64> {
    let total: (i64,) = sqlx::query_as("SELECT COALESCE(SUM(votes_total), 0) FROM recipes")
        .fetch_one(pool)
        .await?;
    Ok(total.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{categories, init_pool, run_migrations};

    async fn create_test_pool() -> DbPool {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_recipe_crud() {
        let pool = create_test_pool().await;

        let (category, _) = categories::get_or_create_category(&pool, "Mains")
            .await
            .unwrap();

        // Create recipe
        let recipe = create_recipe(
            &pool,
            &NewRecipe {
                name: "Chorizo bake".to_string(),
                category_id: category.id,
            },
        )
        .await
        .unwrap();
        assert_eq!(recipe.name, "Chorizo bake");
        assert_eq!(recipe.votes_liked, 0);
        assert_eq!(recipe.votes_total, 0);

        // Get with category
        let with_category = get_recipe_with_category(&pool, recipe.id).await.unwrap();
        assert_eq!(with_category.category_name, "Mains");

        // Update
        let (starters, _) = categories::get_or_create_category(&pool, "Starters")
            .await
            .unwrap();
        let updated = update_recipe(
            &pool,
            recipe.id,
            &NewRecipe {
                name: "Chorizo skillet".to_string(),
                category_id: starters.id,
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Chorizo skillet");
        assert_eq!(updated.category_id, starters.id);

        // Delete
        delete_recipe(&pool, recipe.id).await.unwrap();
        assert!(get_recipe(&pool, recipe.id).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_recipe_is_not_found() {
        let pool = create_test_pool().await;

        let err = get_recipe(&pool, 42).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let err = delete_recipe(&pool, 42).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_add_vote_increments_counters() {
        let pool = create_test_pool().await;

        let (category, _) = categories::get_or_create_category(&pool, "Mains")
            .await
            .unwrap();
        let recipe = create_recipe(
            &pool,
            &NewRecipe {
                name: "Galette".to_string(),
                category_id: category.id,
            },
        )
        .await
        .unwrap();

        let tally = add_vote(&pool, recipe.id).await.unwrap();
        assert_eq!(tally.liked, 1);
        assert_eq!(tally.total, 1);

        let tally = add_vote(&pool, recipe.id).await.unwrap();
        assert_eq!(tally.liked, 2);
        assert_eq!(tally.total, 2);

        let err = add_vote(&pool, 999).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_recipes_in_order_preserves_caller_order() {
        let pool = create_test_pool().await;

        let (category, _) = categories::get_or_create_category(&pool, "Mains")
            .await
            .unwrap();
        let mut ids = Vec::new();
        for name in ["First", "Second", "Third"] {
            let recipe = create_recipe(
                &pool,
                &NewRecipe {
                    name: name.to_string(),
                    category_id: category.id,
                },
            )
            .await
            .unwrap();
            ids.push(recipe.id);
        }

        let wanted = vec![ids[2], ids[0], ids[1]];
        let fetched = recipes_in_order(&pool, &wanted).await.unwrap();
        let fetched_ids: Vec<i64> = fetched.iter().map(|r| r.id).collect();
        assert_eq!(fetched_ids, wanted);

        // Unknown ids are silently skipped
        let fetched = recipes_in_order(&pool, &[ids[1], 999]).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id, ids[1]);

        assert!(recipes_in_order(&pool, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_recipes_filters_by_category() {
        let pool = create_test_pool().await;

        let (mains, _) = categories::get_or_create_category(&pool, "Mains")
            .await
            .unwrap();
        let (desserts, _) = categories::get_or_create_category(&pool, "Desserts")
            .await
            .unwrap();

        for (name, category_id) in [
            ("Chorizo bake", mains.id),
            ("Galette", mains.id),
            ("Tarte tatin", desserts.id),
        ] {
            create_recipe(
                &pool,
                &NewRecipe {
                    name: name.to_string(),
                    category_id,
                },
            )
            .await
            .unwrap();
        }

        let all = list_recipes(&pool, None, 10, 0).await.unwrap();
        assert_eq!(all.len(), 3);

        let mains_only = list_recipes(&pool, Some(mains.id), 10, 0).await.unwrap();
        assert_eq!(mains_only.len(), 2);
        assert!(mains_only.iter().all(|r| r.category_name == "Mains"));

        assert_eq!(count_recipes(&pool, Some(desserts.id)).await.unwrap(), 1);
        assert_eq!(count_all_recipes(&pool).await.unwrap(), 3);
    }
}
