//! Free-text recipe search.
//!
//! A query is split into word tokens, every token is probed against
//! ingredient names and recipe names, and the per-token hits are combined
//! into one ranked id list. Matching is substring-based and
//! case-insensitive; ranking is a policy choice (storage order by default).

pub mod engine;
pub mod query;
pub mod ranking;
pub mod store;

pub use engine::run_search;
pub use ranking::{RankPolicy, Tier, TokenHits};
pub use store::SearchStore;
