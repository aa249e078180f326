use futures::future::try_join_all;
use tracing::debug;

use super::query::tokenize;
use super::ranking::{order_matches, RankPolicy, TokenHits};
use super::store::SearchStore;
use crate::error::Result;

async fn collect_hits<S: SearchStore + ?Sized>(store: &S, token: &str) -> Result<TokenHits> {
    let (ingredient, name) =
        futures::try_join!(store.match_ingredient(token), store.match_name(token))?;
    Ok(TokenHits { ingredient, name })
}

/// Run a free-text query and return matching recipe ids in rank order.
///
/// The query is split into tokens; each token is probed against ingredient
/// names and recipe names concurrently. A whitespace-only query selects
/// nothing.
pub async fn run_search<S: SearchStore + ?Sized>(
    store: &S,
    raw_query: &str,
    policy: RankPolicy,
) -> Result<Vec<i64>> {
    let tokens = tokenize(raw_query);
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    debug!(query = raw_query, token_count = tokens.len(), "Running search");

    let hits = try_join_all(tokens.iter().map(|token| collect_hits(store, token))).await?;
    Ok(order_matches(&hits, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;

    /// In-memory stand-in for the database, lowercase substring matching
    struct MemoryStore {
        recipes: Vec<(i64, &'static str, Vec<&'static str>)>,
    }

    impl MemoryStore {
        fn sample() -> Self {
            MemoryStore {
                recipes: vec![
                    (1, "Chorizo bake", vec!["chorizo", "egg"]),
                    (2, "Galette", vec!["chorizo", "cheese"]),
                    (3, "Plain galette", vec!["flour"]),
                ],
            }
        }
    }

    #[async_trait]
    impl SearchStore for MemoryStore {
        async fn match_ingredient(&self, token: &str) -> Result<HashSet<i64>> {
            let token = token.to_lowercase();
            Ok(self
                .recipes
                .iter()
                .filter(|(_, _, ingredients)| {
                    ingredients.iter().any(|i| i.to_lowercase().contains(&token))
                })
                .map(|(id, _, _)| *id)
                .collect())
        }

        async fn match_name(&self, token: &str) -> Result<HashSet<i64>> {
            let token = token.to_lowercase();
            Ok(self
                .recipes
                .iter()
                .filter(|(_, name, _)| name.to_lowercase().contains(&token))
                .map(|(id, _, _)| *id)
                .collect())
        }
    }

    #[tokio::test]
    async fn test_single_token_matches_ingredient_and_name() {
        let store = MemoryStore::sample();
        let ids = run_search(&store, "chorizo", RankPolicy::Storage).await.unwrap();
        assert_eq!(ids, vec![1, 2]);

        let ids = run_search(&store, "galette", RankPolicy::Storage).await.unwrap();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_query_case_is_ignored() {
        let store = MemoryStore::sample();
        let ids = run_search(&store, "CHORIZO", RankPolicy::Storage).await.unwrap();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_blank_query_matches_nothing() {
        let store = MemoryStore::sample();
        assert!(run_search(&store, "", RankPolicy::Storage).await.unwrap().is_empty());
        assert!(run_search(&store, "   ", RankPolicy::Storage).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unmatched_token_matches_nothing() {
        let store = MemoryStore::sample();
        let ids = run_search(&store, "quinoa", RankPolicy::Storage).await.unwrap();
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_multi_token_unions_without_duplicates() {
        let store = MemoryStore::sample();
        let ids = run_search(&store, "chorizo galette", RankPolicy::Storage)
            .await
            .unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_punctuation_only_piece_becomes_empty_token() {
        // "??" strips to the empty token, which matches every name as a
        // substring. Mirrors the behavior of naive per-piece cleanup.
        let store = MemoryStore::sample();
        let ids = run_search(&store, "??", RankPolicy::Storage).await.unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_tiered_policy_orders_by_match_quality() {
        let store = MemoryStore {
            recipes: vec![
                (1, "Paella", vec!["chorizo"]),
                (2, "Eggs benedict", vec!["ham"]),
                (3, "Egg royale", vec!["chorizo"]),
                (4, "Brunch bake", vec!["chorizo", "egg"]),
            ],
        };

        // 4 covers both tokens with ingredients, 3 matches both tokens,
        // 2 matches one token by name, 1 matches one token by ingredient.
        let ids = run_search(&store, "chorizo egg", RankPolicy::Tiered).await.unwrap();
        assert_eq!(ids, vec![4, 3, 2, 1]);

        let ids = run_search(&store, "chorizo egg", RankPolicy::Storage).await.unwrap();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
