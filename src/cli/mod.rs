// Command-line interface

pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "potluck")]
#[command(about = "Potluck - community recipe sharing and search", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Search recipes on a running server
    Search {
        /// Search query
        query: String,

        /// Maximum number of results per page
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Run database migrations
    Migrate,

    /// Load a recipe seed file into the database
    Seed {
        /// Path to the seed file
        #[arg(short, long, default_value = "config/recipes.yaml")]
        file: String,
    },
}
