/// /api/autores endpoints
use crate::{
    authors::{AuthorRecord, AuthorRecordCreated, AuthorRecordRequest},
    context::AppContext,
    error::ApiResult,
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

/// Build author routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/autores", get(list_authors).post(create_author))
        .route("/api/autores/:id", get(get_author).put(update_author))
}

/// Create a new author record
async fn create_author(
    State(ctx): State<AppContext>,
    Json(req): Json<AuthorRecordRequest>,
) -> ApiResult<Json<AuthorRecordCreated>> {
    let id = ctx.author_manager.create(&req.names).await?;
    Ok(Json(AuthorRecordCreated { id }))
}

/// Get an author record by id
async fn get_author(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<AuthorRecord>> {
    Ok(Json(ctx.author_manager.get(id).await?))
}

/// List all author records
async fn list_authors(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<AuthorRecord>>> {
    Ok(Json(ctx.author_manager.list().await?))
}

/// Replace the names of an author record
async fn update_author(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
    Json(req): Json<AuthorRecordRequest>,
) -> ApiResult<Json<AuthorRecord>> {
    Ok(Json(ctx.author_manager.update(id, &req.names).await?))
}
