use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;

/// Get or create a category by name, returning whether it was created
pub async fn get_or_create_category(pool: &DbPool, name: &str) -> Result<(Category, bool)> {
    let trimmed = name.trim();

    // Try to find existing category
    let existing = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE name = ?")
        .bind(trimmed)
        .fetch_optional(pool)
        .await?;

    if let Some(category) = existing {
        Ok((category, false))
    } else {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, created_at) VALUES (?, ?) RETURNING *",
        )
        .bind(trimmed)
        .bind(Utc::now())
        .fetch_one(pool)
        .await?;

        Ok((category, true))
    }
}

/// Get category by ID
pub async fn get_category(pool: &DbPool, category_id: i64) -> Result<Category> {
    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Category {category_id} not found")))?;

    Ok(category)
}

/// Look up a category by name
pub async fn get_category_by_name(pool: &DbPool, name: &str) -> Result<Option<Category>> {
    let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE name = ?")
        .bind(name.trim())
        .fetch_optional(pool)
        .await?;

    Ok(category)
}

/// List all categories ordered by name
pub async fn list_categories(pool: &DbPool) -> Result<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(categories)
}

/// List all categories with their recipe counts
pub async fn list_categories_with_counts(pool: &DbPool) -> Result<Vec<CategoryWithCount>> {
    let categories = sqlx::query_as::<_, CategoryWithCount>(
        r#"
        SELECT c.id, c.name, COUNT(r.id) AS recipe_count
        FROM categories c
        LEFT JOIN recipes r ON r.category_id = c.id
        GROUP BY c.id, c.name
        ORDER BY c.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}

/// Count total categories
pub async fn count_categories(pool: &DbPool) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}
