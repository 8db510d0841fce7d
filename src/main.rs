mod config;
mod dto;
mod error;
mod handlers;
mod models;
mod repository;
mod service;

use std::sync::Arc;

use axum::http::StatusCode;
use clap::Parser;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use config::Config;
use handlers::rest;
use repository::Repository;
use service::NoteService;

const LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Parser)]
#[command(author, version, about = "Notes CRUD server")]
struct Cli {
    /// Create the database tables before serving.
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::error!("Failed to load configuration: {e}");
        panic!("failed to load configuration: {e}");
    });

    // Repository creation and migration
    let repo = Repository::open(&config.database_path)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to open database: {e}");
            panic!("failed to open database: {e}");
        });

    if cli.migrate {
        repo.migrate().await.unwrap_or_else(|e| {
            tracing::error!("Failed to migrate database: {e}");
            panic!("failed to migrate database: {e}");
        });
    }

    // Service creation
    let service = Arc::new(NoteService::new(repo));

    let router = rest::router(service)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(LISTEN_ADDR)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {LISTEN_ADDR}: {e}"));

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Running on http://{}", addr),
        Err(e) => tracing::warn!("Listening address unavailable: {e}"),
    }

    axum::serve(listener, router)
        .await
        .expect("failed to start server");
}
