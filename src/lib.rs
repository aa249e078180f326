pub mod config;
pub mod db;
pub mod error;

// Search engine
pub mod search;

// HTTP API
pub mod api;

// Web UI
pub mod web;

// Command-line interface
pub mod cli;

// Utilities
pub mod utils;

// Re-exports
pub use config::Settings;
pub use error::{Error, Result};
