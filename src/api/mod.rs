/// API routes and handlers
pub mod auth;
pub mod authors;
pub mod contents;
pub mod middleware;
pub mod references;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(auth::routes())
        .merge(authors::routes())
        .merge(references::routes())
        .merge(contents::routes())
}
