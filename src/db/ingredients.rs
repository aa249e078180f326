use crate::db::{models::*, DbPool};
use crate::error::Result;
use chrono::Utc;
use std::collections::HashMap;

/// Add a single ingredient row to a recipe
pub async fn add_ingredient(
    pool: &DbPool,
    recipe_id: i64,
    ingredient: &NewIngredient,
) -> Result<Ingredient> {
    let ingredient = sqlx::query_as::<_, Ingredient>(
        r#"
        INSERT INTO ingredients (recipe_id, name, quantity, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(recipe_id)
    .bind(ingredient.name.trim())
    .bind(&ingredient.quantity)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(ingredient)
}

/// Replace a recipe's ingredient list
pub async fn set_recipe_ingredients(
    pool: &DbPool,
    recipe_id: i64,
    ingredients: &[NewIngredient],
) -> Result<()> {
    sqlx::query("DELETE FROM ingredients WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(pool)
        .await?;

    for ingredient in ingredients {
        add_ingredient(pool, recipe_id, ingredient).await?;
    }

    Ok(())
}

/// Get ingredients for a recipe in insertion order
pub async fn list_for_recipe(pool: &DbPool, recipe_id: i64) -> Result<Vec<Ingredient>> {
    let ingredients = sqlx::query_as::<_, Ingredient>(
        "SELECT * FROM ingredients WHERE recipe_id = ? ORDER BY id",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(ingredients)
}

/// Get ingredient names for multiple recipes in a single query (batch loading to avoid N+1)
pub async fn ingredients_for_recipes(
    pool: &DbPool,
    recipe_ids: &[i64],
) -> Result<HashMap<i64, Vec<String>>> {
    if recipe_ids.is_empty() {
        return Ok(HashMap::new());
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
        SELECT recipe_id, name
        FROM ingredients
        WHERE recipe_id IN ({placeholders})
        ORDER BY recipe_id, id
        "#
    );

    let mut query = sqlx::query_as::<_, (i64, String)>(&query_str);
    for id in recipe_ids {
        query = query.bind(id);
    }

    let results: Vec<(i64, String)> = query.fetch_all(pool).await?;

    // Group ingredient names by recipe_id
    let mut names_map: HashMap<i64, Vec<String>> = HashMap::new();
    for (recipe_id, name) in results {
        names_map.entry(recipe_id).or_default().push(name);
    }

    // Ensure all recipe_ids have an entry (even if empty)
    for &recipe_id in recipe_ids {
        names_map.entry(recipe_id).or_default();
    }

    Ok(names_map)
}

/// Count total ingredient rows
pub async fn count_ingredients(pool: &DbPool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ingredients")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{categories, init_pool, recipes, run_migrations};

    async fn create_recipe(pool: &DbPool, name: &str) -> i64 {
        let (category, _) = categories::get_or_create_category(pool, "Mains")
            .await
            .unwrap();
        recipes::create_recipe(
            pool,
            &crate::db::models::NewRecipe {
                name: name.to_string(),
                category_id: category.id,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_set_replaces_existing_ingredients() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let recipe_id = create_recipe(&pool, "Galette").await;

        set_recipe_ingredients(
            &pool,
            recipe_id,
            &[
                NewIngredient {
                    name: "chorizo".to_string(),
                    quantity: "50 g".to_string(),
                },
                NewIngredient {
                    name: "egg".to_string(),
                    quantity: "1".to_string(),
                },
            ],
        )
        .await
        .unwrap();

        let first = list_for_recipe(&pool, recipe_id).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].name, "chorizo");
        assert_eq!(first[0].quantity, "50 g");

        set_recipe_ingredients(
            &pool,
            recipe_id,
            &[NewIngredient {
                name: "cheese".to_string(),
                quantity: String::new(),
            }],
        )
        .await
        .unwrap();

        let second = list_for_recipe(&pool, recipe_id).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "cheese");
        assert_eq!(count_ingredients(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_batch_loading_groups_by_recipe() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();

        let first = create_recipe(&pool, "Galette").await;
        let second = create_recipe(&pool, "Omelette").await;
        let third = create_recipe(&pool, "Plain rice").await;

        set_recipe_ingredients(
            &pool,
            first,
            &[
                NewIngredient {
                    name: "flour".to_string(),
                    quantity: String::new(),
                },
                NewIngredient {
                    name: "egg".to_string(),
                    quantity: String::new(),
                },
            ],
        )
        .await
        .unwrap();
        set_recipe_ingredients(
            &pool,
            second,
            &[NewIngredient {
                name: "egg".to_string(),
                quantity: String::new(),
            }],
        )
        .await
        .unwrap();

        let map = ingredients_for_recipes(&pool, &[first, second, third])
            .await
            .unwrap();
        assert_eq!(map[&first], vec!["flour".to_string(), "egg".to_string()]);
        assert_eq!(map[&second], vec!["egg".to_string()]);
        // Recipe without ingredients still gets an entry
        assert!(map[&third].is_empty());
    }

    #[tokio::test]
    async fn test_deleting_recipe_cascades() {
        let pool = init_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let recipe_id = create_recipe(&pool, "Galette").await;

        set_recipe_ingredients(
            &pool,
            recipe_id,
            &[NewIngredient {
                name: "flour".to_string(),
                quantity: String::new(),
            }],
        )
        .await
        .unwrap();
        assert_eq!(count_ingredients(&pool).await.unwrap(), 1);

        recipes::delete_recipe(&pool, recipe_id).await.unwrap();
        assert_eq!(count_ingredients(&pool).await.unwrap(), 0);
    }
}
