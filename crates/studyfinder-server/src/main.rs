//! StudyFinder Server — application entry point.

use std::sync::Arc;

use studyfinder_db::repository::SurrealGroupRepository;
use studyfinder_db::{DbConfig, DbManager};
use studyfinder_service::SearchService;
use tracing_subscriber::EnvFilter;

mod routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("studyfinder=info".parse()?),
        )
        .json()
        .init();

    tracing::info!("Starting StudyFinder server...");

    let config = DbConfig::from_env();
    let manager = DbManager::connect(&config).await?;
    studyfinder_db::run_migrations(manager.client()).await?;

    let search = Arc::new(SearchService::new(SurrealGroupRepository::new(
        manager.client().clone(),
    )));

    let app = routes::router(search);

    let addr =
        std::env::var("STUDYFINDER_LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
