use clap::Parser;
use potluck::{
    api::{handlers::AppState, routes},
    cli::{Cli, Commands},
    config::{seed, Settings},
    db, Error, Result,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    // Silently ignore if file doesn't exist
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,potluck=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::from_env()?;
    settings.validate()?;

    // Handle commands
    match cli.command {
        Commands::Serve { port, host } => {
            serve(settings, port, host).await?;
        }
        Commands::Migrate => {
            migrate(settings).await?;
        }
        Commands::Search { query, limit } => {
            search_recipes(settings, query, limit).await?;
        }
        Commands::Seed { file } => {
            seed_database(settings, file).await?;
        }
    }

    Ok(())
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    // Override settings with CLI arguments
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }

    info!("Starting Potluck server");
    info!("Database: {}", settings.database.url);
    info!("Server: {}:{}", settings.server.host, settings.server.port);

    // Initialize database with connection pooling configuration
    let pool = db::init_pool_with_config(&settings.database).await?;
    info!(
        "Database connection established (max_connections: {}, min_connections: {})",
        settings.database.max_connections, settings.database.min_connections
    );

    // Run migrations
    db::run_migrations(&pool).await?;
    info!("Database migrations completed");

    // Sync seed recipes into the database when a seed file is configured
    if let Ok(seed_path) = std::env::var("SEED_PATH") {
        match seed::SeedFile::from_file(&seed_path) {
            Ok(seed_file) => {
                info!(
                    "Loaded seed file: {} categories, {} recipes",
                    seed_file.categories.len(),
                    seed_file.recipes.len()
                );

                if let Err(e) = seed::sync_seed(&pool, &seed_file).await {
                    warn!("Failed to sync seed data: {}", e);
                }
            }
            Err(e) => {
                warn!("Failed to load seed file from {}: {}", seed_path, e);
                warn!("Continuing without seed sync - recipes must be added via the API");
            }
        }
    }

    // Create application state
    let state = AppState {
        pool,
        settings: settings.clone(),
    };

    // Create router with rate limiting
    let app = routes::create_router(state, &settings);

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    println!("\n========================================");
    println!("Potluck Recipe Server");
    println!("========================================");
    println!("Status: Running");
    println!("Address: http://{addr}");
    println!("Database: Connected");
    println!("\nAPI Endpoints:");
    println!("  GET    /api/search");
    println!("  GET    /api/recipes");
    println!("  POST   /api/recipes");
    println!("  GET    /api/recipes/:id");
    println!("  PUT    /api/recipes/:id");
    println!("  DELETE /api/recipes/:id");
    println!("  POST   /api/recipes/:id/vote");
    println!("  GET    /api/categories");
    println!("  GET    /api/stats");
    println!("\nPress Ctrl+C to stop");
    println!("========================================\n");

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}

async fn migrate(settings: Settings) -> Result<()> {
    info!("Running database migrations");

    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    println!("✓ Database migrations completed successfully");
    Ok(())
}

async fn search_recipes(settings: Settings, query: String, limit: Option<usize>) -> Result<()> {
    let server_url = settings
        .server
        .external_url
        .unwrap_or_else(|| format!("http://{}:{}", settings.server.host, settings.server.port));

    potluck::cli::commands::search(&server_url, &query, limit).await
}

async fn seed_database(settings: Settings, file: String) -> Result<()> {
    info!("Seeding database from {}", file);

    let pool = db::init_pool(&settings.database.url).await?;
    db::run_migrations(&pool).await?;

    let seed_file = seed::SeedFile::from_file(&file)?;
    let report = seed::sync_seed(&pool, &seed_file).await?;

    println!(
        "\x1b[32m\u{2713}\x1b[0m Seed complete: {} categories added, {} recipes added, {} updated, {} unchanged",
        report.categories_added, report.added, report.updated, report.unchanged
    );
    if !report.errors.is_empty() {
        println!(
            "  {} recipes failed - check logs for details",
            report.errors.len()
        );
    }

    Ok(())
}
