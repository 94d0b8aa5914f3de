//! PharmaNet Console - Backend Server
//!
//! Price comparison across drug suppliers and purchase suggestions for a
//! network of pharmacies.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod persistence;
mod routes;
mod services;
mod store;

pub use config::Config;

use error::AppResult;
use persistence::Repository;
use store::{CatalogStore, Directory, StockStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<CatalogStore>,
    pub stock: Arc<StockStore>,
    pub directory: Arc<Directory>,
    pub repo: Repository,
}

impl AppState {
    pub fn new(config: Config, repo: Repository) -> Self {
        Self {
            config: Arc::new(config),
            catalog: Arc::new(CatalogStore::new()),
            stock: Arc::new(StockStore::new()),
            directory: Arc::new(Directory::new()),
            repo,
        }
    }

    /// Fill the in-memory stores from the database
    pub async fn hydrate(&self) -> AppResult<()> {
        if !self.repo.is_enabled() {
            return Ok(());
        }

        let data = self.repo.load().await?;
        let (offers, stock_rows) = (data.offers.len(), data.stock.len());

        self.directory.load(data.suppliers, data.pharmacies);
        self.catalog.load(data.offers, data.products);
        self.stock.load(data.stock);

        tracing::info!(
            suppliers = self.directory.suppliers().len(),
            pharmacies = self.directory.pharmacies().len(),
            products = self.catalog.snapshot().product_count(),
            offers,
            stock_rows,
            "stores hydrated"
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pharmanet_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting PharmaNet Console Server");
    tracing::info!("Environment: {}", config.environment);

    let repo = match &config.database.url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(url)
                .await?;
            tracing::info!("Database connection established");

            // Run migrations in development
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&db_pool).await?;
                tracing::info!("Migrations completed");
            }
            Repository::new(Some(db_pool))
        }
        None => {
            tracing::warn!("No database configured, running in memory only");
            Repository::new(None)
        }
    };

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    // Create application state
    let state = AppState::new(config, repo);
    state.hydrate().await?;

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "PharmaNet Console API v1.0"
}
