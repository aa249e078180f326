pub mod seed;

use crate::error::{Error, Result};
use crate::search::RankPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub external_url: Option<String>,
    pub api_rate_limit: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub rank_policy: RankPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub api_max_limit: usize,
    pub web_default_limit: usize,
    pub browse_page_size: usize,
    pub max_search_results: usize,
    pub max_request_body_size: usize,
    pub max_pages: usize, // Maximum pages to prevent overflow
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/potluck.db?mode=rwc".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid PORT value".to_string()))?;

        let external_url = std::env::var("EXTERNAL_URL").ok();

        let api_rate_limit = std::env::var("API_RATE_LIMIT")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid API_RATE_LIMIT value".to_string()))?;

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "25".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DATABASE_MAX_CONNECTIONS value".to_string()))?;

        let min_connections = std::env::var("DATABASE_MIN_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DATABASE_MIN_CONNECTIONS value".to_string()))?;

        let connection_timeout_seconds = std::env::var("DATABASE_CONNECTION_TIMEOUT")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DATABASE_CONNECTION_TIMEOUT value".to_string()))?;

        let idle_timeout_seconds = std::env::var("DATABASE_IDLE_TIMEOUT")
            .unwrap_or_else(|_| "600".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid DATABASE_IDLE_TIMEOUT value".to_string()))?;

        let rank_policy = std::env::var("SEARCH_RANK_POLICY")
            .unwrap_or_else(|_| "storage".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid SEARCH_RANK_POLICY value".to_string()))?;

        let api_max_limit = std::env::var("API_MAX_LIMIT")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid API_MAX_LIMIT value".to_string()))?;

        let web_default_limit = std::env::var("WEB_DEFAULT_LIMIT")
            .unwrap_or_else(|_| "12".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid WEB_DEFAULT_LIMIT value".to_string()))?;

        let browse_page_size = std::env::var("BROWSE_PAGE_SIZE")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid BROWSE_PAGE_SIZE value".to_string()))?;

        let max_search_results = std::env::var("MAX_SEARCH_RESULTS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_SEARCH_RESULTS value".to_string()))?;

        let max_request_body_size = std::env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| "1048576".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_REQUEST_BODY_SIZE value".to_string()))?;

        let max_pages = std::env::var("MAX_PAGES")
            .unwrap_or_else(|_| "10000".to_string())
            .parse()
            .map_err(|_| Error::Config("Invalid MAX_PAGES value".to_string()))?;

        Ok(Settings {
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                min_connections,
                connection_timeout_seconds,
                idle_timeout_seconds,
            },
            server: ServerConfig {
                host,
                port,
                external_url,
                api_rate_limit,
            },
            search: SearchConfig { rank_policy },
            pagination: PaginationConfig {
                api_max_limit,
                web_default_limit,
                browse_page_size,
                max_search_results,
                max_request_body_size,
                max_pages,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("Port must be non-zero".to_string()));
        }

        if self.server.api_rate_limit == 0 {
            return Err(Error::Config("API rate limit must be non-zero".to_string()));
        }

        if self.pagination.api_max_limit == 0
            || self.pagination.web_default_limit == 0
            || self.pagination.browse_page_size == 0
        {
            return Err(Error::Config("Page limits must be non-zero".to_string()));
        }

        Ok(())
    }
}
