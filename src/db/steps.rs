use crate::db::{models::*, DbPool};
use crate::error::Result;
use chrono::Utc;

/// Replace a recipe's steps. Positions are assigned from list order.
pub async fn set_recipe_steps(pool: &DbPool, recipe_id: i64, steps: &[String]) -> Result<()> {
    sqlx::query("DELETE FROM steps WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(pool)
        .await?;

    let now = Utc::now();
    for (position, instructions) in steps.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO steps (recipe_id, position, instructions, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(recipe_id)
        .bind(position as i64)
        .bind(instructions.trim())
        .bind(now)
        .execute(pool)
        .await?;
    }

    Ok(())
}

/// Get steps for a recipe ordered by position
pub async fn list_for_recipe(pool: &DbPool, recipe_id: i64) -> Result<Vec<Step>> {
    let steps =
        sqlx::query_as::<_, Step>("SELECT * FROM steps WHERE recipe_id = ? ORDER BY position")
            .bind(recipe_id)
            .fetch_all(pool)
            .await?;

    Ok(steps)
}
