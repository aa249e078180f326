use crate::{Error, Result};
use reqwest::Client;
use serde::Deserialize;

/// Search recipes through a running server
pub async fn search(server_url: &str, query: &str, limit: Option<usize>) -> Result<()> {
    let client = Client::new();

    let mut url = format!("{}/api/search?q={}", server_url, urlencoding::encode(query));

    if let Some(limit) = limit {
        url.push_str(&format!("&limit={limit}"));
    }

    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        return Err(Error::Http(response.error_for_status().unwrap_err()));
    }

    let search_results: SearchResponse = response.json().await?;

    print_search_results(&search_results);

    Ok(())
}

fn print_search_results(results: &SearchResponse) {
    if results.results.is_empty() {
        println!("No recipes found");
        return;
    }

    println!("\nFound {} recipes:\n", results.pagination.total);
    println!(
        "{:<5} {:<38} {:<16} {:<30}",
        "ID", "Name", "Category", "Ingredients"
    );
    println!("{}", "-".repeat(89));

    for recipe in &results.results {
        let ingredients = recipe.ingredients.join(", ");

        println!(
            "{:<5} {:<38} {:<16} {:<30}",
            recipe.id,
            truncate(&recipe.name, 36),
            truncate(&recipe.category, 14),
            truncate(&ingredients, 28)
        );
    }

    println!(
        "\nPage {} of {}",
        results.pagination.page, results.pagination.total_pages
    );
}

// Character-based so accented names cut cleanly
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{cut}...")
    }
}

// Response types (matching API models)

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<RecipeCard>,
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct RecipeCard {
    id: i64,
    name: String,
    category: String,
    ingredients: Vec<String>,
    #[serde(rename = "votes_liked")]
    _votes_liked: i64,
    #[serde(rename = "votes_total")]
    _votes_total: i64,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    page: usize,
    #[serde(rename = "limit")]
    _limit: usize,
    total: usize,
    total_pages: usize,
}
