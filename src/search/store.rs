use async_trait::async_trait;
use std::collections::HashSet;

use crate::db::DbPool;
use crate::error::Result;

/// Escape LIKE wildcards in a token and wrap it for substring matching.
///
/// `%` and `_` are pattern characters in SQL LIKE; user tokens must match
/// them literally. The escape character is `\`, declared with ESCAPE in
/// every query that consumes these patterns.
pub fn like_pattern(token: &str) -> String {
    let escaped = token
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Per-token lookup of matching recipe ids.
///
/// Matching is case-insensitive substring containment. The two methods probe
/// the two searchable fields; the engine combines their results.
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Ids of recipes with at least one ingredient containing the token
    async fn match_ingredient(&self, token: &str) -> Result<HashSet<i64>>;

    /// Ids of recipes whose name contains the token
    async fn match_name(&self, token: &str) -> Result<HashSet<i64>>;
}

#[async_trait]
impl SearchStore for DbPool {
    async fn match_ingredient(&self, token: &str) -> Result<HashSet<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"SELECT DISTINCT recipe_id FROM ingredients WHERE name LIKE ? ESCAPE '\'"#,
        )
        .bind(like_pattern(token))
        .fetch_all(self)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn match_name(&self, token: &str) -> Result<HashSet<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"SELECT id FROM recipes WHERE name LIKE ? ESCAPE '\'"#,
        )
        .bind(like_pattern(token))
        .fetch_all(self)
        .await?;

        Ok(ids.into_iter().collect())
    }
}
