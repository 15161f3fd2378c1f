/// /api/referencias endpoints
use crate::{
    account::MessageResponse,
    context::AppContext,
    error::ApiResult,
    references::{
        ChangeFormatRequest, CreateReferenceRequest, ReferenceCreated, ReferenceEntry,
        UpdateReferenceRequest, UserReferenceView,
    },
};
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};

/// Build reference routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/referencias", get(list_references).post(create_reference))
        .route(
            "/api/referencias/:id",
            get(get_reference)
                .put(update_reference)
                .delete(delete_reference),
        )
        .route("/api/referencias/usuario/:user_id", get(list_by_user))
        .route("/api/referencias/cambiar-formato/:id", put(change_format))
}

/// List all entries with their paragraphs
async fn list_references(State(ctx): State<AppContext>) -> ApiResult<Json<Vec<ReferenceEntry>>> {
    Ok(Json(ctx.reference_manager.list().await?))
}

/// Get one entry with its paragraphs
async fn get_reference(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ReferenceEntry>> {
    Ok(Json(ctx.reference_manager.get(id).await?))
}

/// A user's entries in display form
async fn list_by_user(
    State(ctx): State<AppContext>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<UserReferenceView>>> {
    Ok(Json(ctx.reference_manager.list_by_user(user_id).await?))
}

/// Create a new entry
async fn create_reference(
    State(ctx): State<AppContext>,
    Json(req): Json<CreateReferenceRequest>,
) -> ApiResult<Json<ReferenceCreated>> {
    let id = ctx.reference_manager.create(req).await?;

    Ok(Json(ReferenceCreated {
        message: "Reference saved successfully".to_string(),
        id,
    }))
}

/// Replace the basic fields of an entry
async fn update_reference(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateReferenceRequest>,
) -> ApiResult<Json<MessageResponse>> {
    ctx.reference_manager.update(id, req).await?;

    Ok(Json(MessageResponse {
        message: "Reference updated successfully".to_string(),
    }))
}

/// Delete an entry, its paragraphs, and its author record
async fn delete_reference(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    ctx.reference_manager.delete(id).await?;

    Ok(Json(MessageResponse {
        message: "Reference deleted successfully".to_string(),
    }))
}

/// Switch an entry between APA and Chicago
async fn change_format(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
    Json(req): Json<ChangeFormatRequest>,
) -> ApiResult<Json<MessageResponse>> {
    ctx.reference_manager
        .change_format(id, &req.format, req.place)
        .await?;

    Ok(Json(MessageResponse {
        message: "Format changed successfully".to_string(),
    }))
}
