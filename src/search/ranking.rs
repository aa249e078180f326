use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Recipe ids matched by a single query token, split by field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenHits {
    pub ingredient: HashSet<i64>,
    pub name: HashSet<i64>,
}

impl TokenHits {
    /// Ids matched in either field
    pub fn any_field(&self) -> HashSet<i64> {
        &self.ingredient | &self.name
    }

    fn matches(&self, recipe_id: i64) -> bool {
        self.ingredient.contains(&recipe_id) || self.name.contains(&recipe_id)
    }
}

/// How matched recipes are ordered in the result list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankPolicy {
    /// Creation order (ascending id), regardless of how a recipe matched
    #[default]
    Storage,
    /// Group by match tier first, creation order within each tier
    Tiered,
}

impl std::str::FromStr for RankPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "storage" => Ok(RankPolicy::Storage),
            "tiered" => Ok(RankPolicy::Tiered),
            other => Err(format!("unknown rank policy '{other}'")),
        }
    }
}

/// Match quality of one recipe against the full token list, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    /// Every token matched an ingredient of the recipe
    AllIngredients,
    /// At least two tokens matched, in any field
    MultiToken,
    /// Some token matched the recipe name
    NameMatch,
    /// Exactly one token matched, through an ingredient
    SingleIngredient,
}

impl Tier {
    /// Classify a recipe that is known to be in the selection.
    pub fn classify(recipe_id: i64, hits: &[TokenHits]) -> Tier {
        if !hits.is_empty() && hits.iter().all(|h| h.ingredient.contains(&recipe_id)) {
            return Tier::AllIngredients;
        }

        let matched_tokens = hits.iter().filter(|h| h.matches(recipe_id)).count();
        if matched_tokens >= 2 {
            return Tier::MultiToken;
        }

        if hits.iter().any(|h| h.name.contains(&recipe_id)) {
            return Tier::NameMatch;
        }

        Tier::SingleIngredient
    }
}

/// Union of id sets. Empty input yields the empty set.
pub fn any_of<I>(sets: I) -> HashSet<i64>
where
    I: IntoIterator<Item = HashSet<i64>>,
{
    let mut union = HashSet::new();
    for set in sets {
        union.extend(set);
    }
    union
}

/// Intersection of id sets, or None when there is nothing to intersect.
pub fn all_of<I>(sets: I) -> Option<HashSet<i64>>
where
    I: IntoIterator<Item = HashSet<i64>>,
{
    let mut iter = sets.into_iter();
    let first = iter.next()?;
    Some(iter.fold(first, |acc, set| &acc & &set))
}

/// Combine per-token hits into an ordered result id list.
///
/// Selection is the union of two branches: recipes whose ingredients cover
/// every token, and recipes where any token matched either field. The first
/// branch is a subset of the second; both are kept because the two-branch
/// form is the selection contract and feeds the tier definitions.
pub fn order_matches(hits: &[TokenHits], policy: RankPolicy) -> Vec<i64> {
    let all_ingredients = all_of(hits.iter().map(|h| h.ingredient.clone())).unwrap_or_default();
    let any_field = any_of(hits.iter().map(TokenHits::any_field));
    let selected = &all_ingredients | &any_field;

    let mut ids: Vec<i64> = selected.into_iter().collect();
    match policy {
        RankPolicy::Storage => ids.sort_unstable(),
        RankPolicy::Tiered => ids.sort_by_cached_key(|&id| (Tier::classify(id, hits), id)),
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[i64]) -> HashSet<i64> {
        ids.iter().copied().collect()
    }

    fn hits(ingredient: &[i64], name: &[i64]) -> TokenHits {
        TokenHits {
            ingredient: set(ingredient),
            name: set(name),
        }
    }

    #[test]
    fn test_any_of_unions() {
        assert_eq!(any_of([set(&[1, 2]), set(&[2, 3])]), set(&[1, 2, 3]));
        assert_eq!(any_of(Vec::<HashSet<i64>>::new()), set(&[]));
    }

    #[test]
    fn test_all_of_intersects() {
        assert_eq!(all_of([set(&[1, 2, 3]), set(&[2, 3, 4])]), Some(set(&[2, 3])));
        assert_eq!(all_of([set(&[1]), set(&[2])]), Some(set(&[])));
        assert_eq!(all_of(Vec::<HashSet<i64>>::new()), None);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::AllIngredients < Tier::MultiToken);
        assert!(Tier::MultiToken < Tier::NameMatch);
        assert!(Tier::NameMatch < Tier::SingleIngredient);
    }

    #[test]
    fn test_classify_all_ingredients_beats_multi_token() {
        // Recipe 1 has both tokens as ingredients, which also means two
        // matched tokens; the stronger tier wins.
        let token_hits = vec![hits(&[1, 2], &[]), hits(&[1], &[2])];
        assert_eq!(Tier::classify(1, &token_hits), Tier::AllIngredients);
        assert_eq!(Tier::classify(2, &token_hits), Tier::MultiToken);
    }

    #[test]
    fn test_classify_name_and_single_ingredient() {
        let token_hits = vec![hits(&[5], &[7]), hits(&[], &[])];
        // 7 matched once via name
        assert_eq!(Tier::classify(7, &token_hits), Tier::NameMatch);
        // 5 matched once via ingredient
        assert_eq!(Tier::classify(5, &token_hits), Tier::SingleIngredient);
    }

    #[test]
    fn test_storage_order_is_ascending_id() {
        let token_hits = vec![hits(&[9, 3], &[5])];
        assert_eq!(order_matches(&token_hits, RankPolicy::Storage), vec![3, 5, 9]);
    }

    #[test]
    fn test_tiered_order_groups_then_sorts_by_id() {
        // Token "a": ingredient {1, 3, 4}; token "b": ingredient {4}, name {2, 3}
        let token_hits = vec![hits(&[1, 3, 4], &[]), hits(&[4], &[2, 3])];

        // 4: all tokens via ingredients; 3: two tokens matched;
        // 2: one name match; 1: one ingredient match.
        assert_eq!(
            order_matches(&token_hits, RankPolicy::Tiered),
            vec![4, 3, 2, 1]
        );

        // Same selection either way
        assert_eq!(
            order_matches(&token_hits, RankPolicy::Storage),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn test_no_tokens_selects_nothing() {
        assert!(order_matches(&[], RankPolicy::Storage).is_empty());
        assert!(order_matches(&[], RankPolicy::Tiered).is_empty());
    }
}
