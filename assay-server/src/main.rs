//! Assay Server
//!
//! Accepts client submissions against declaratively configured tests,
//! runs each test's external processing program out of band, and lets
//! clients poll for the terminal outcome.
//!
//! Architecture:
//! - Registry: in-memory test specifications, reloaded on demand
//! - Service: submission validation and artifact layout
//! - Repository: result records in Postgres
//! - Runner: one task per job driving the external program

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod db;
pub mod registry;
pub mod repository;
pub mod runner;
pub mod service;

use crate::api::AppState;
use crate::config::Config;
use crate::registry::TestRegistry;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assay_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Assay Server...");

    let config = Config::from_env();
    config.validate().expect("Invalid configuration");

    tracing::info!("Connecting to database...");

    // Create database connection pool
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");

    tracing::info!("Database connection pool created");

    // Run migrations
    db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // Load test specs
    let registry = TestRegistry::new();
    let loaded = registry.load(&config.tests_dir, &config.test_config_name);
    tracing::info!("Loaded {} test spec(s) from {}", loaded, config.tests_dir.display());

    let addr = config.bind_addr.clone();

    let state = AppState {
        pool,
        registry: Arc::new(registry),
        config: Arc::new(config),
    };

    // Build router with all API endpoints
    let app = api::create_router(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
