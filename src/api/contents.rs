/// /api/contenidos endpoints
use crate::{
    account::MessageResponse,
    content::{ContentParagraph, ContentParagraphUpsert, NewContentParagraph},
    context::AppContext,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

/// Build content routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/contenidos", get(list_contents).post(create_content))
        .route(
            "/api/contenidos/:id",
            put(update_content).delete(delete_content),
        )
        .route(
            "/api/contenidos/referencia/:reference_id",
            get(list_by_reference),
        )
        .route("/api/contenidos/porReferencia", put(update_by_reference))
}

/// List all paragraphs
async fn list_contents(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<ContentParagraph>>> {
    Ok(Json(ctx.content_manager.list().await?))
}

/// Paragraphs belonging to one reference entry
async fn list_by_reference(
    State(ctx): State<AppContext>,
    Path(reference_id): Path<i64>,
) -> ApiResult<Json<Vec<ContentParagraph>>> {
    Ok(Json(
        ctx.content_manager.list_by_reference(reference_id).await?,
    ))
}

/// Create a paragraph
async fn create_content(
    State(ctx): State<AppContext>,
    Json(req): Json<NewContentParagraph>,
) -> ApiResult<(StatusCode, Json<ContentParagraph>)> {
    let paragraph = ctx.content_manager.create(&req).await?;
    Ok((StatusCode::CREATED, Json(paragraph)))
}

/// Update a paragraph; path and body ids must agree
async fn update_content(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
    Json(paragraph): Json<ContentParagraph>,
) -> ApiResult<StatusCode> {
    if id != paragraph.id {
        return Err(ApiError::Validation(
            "Path id does not match body id".to_string(),
        ));
    }

    ctx.content_manager.update(&paragraph).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a paragraph
async fn delete_content(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    ctx.content_manager.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bulk upsert of the paragraphs of a reference entry
async fn update_by_reference(
    State(ctx): State<AppContext>,
    Json(paragraphs): Json<Vec<ContentParagraphUpsert>>,
) -> ApiResult<Json<MessageResponse>> {
    ctx.content_manager.update_by_reference(&paragraphs).await?;

    Ok(Json(MessageResponse {
        message: "Content updated successfully".to_string(),
    }))
}
