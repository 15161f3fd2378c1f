/// biblioref - bibliographic reference management backend
///
/// REST API over SQLite for managing users, author records, reference
/// entries, and their content paragraphs, with JWT bearer authentication
/// and APA/Chicago citation-format handling.

mod account;
mod api;
mod auth;
mod authors;
mod citation;
mod config;
mod content;
mod context;
mod db;
mod error;
mod names;
mod references;
mod server;

use config::ServerConfig;
use context::AppContext;
use error::ApiResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ApiResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biblioref=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}
