//! Categories API endpoints
//!
//! Categories are global; listing is still behind auth like everything
//! else, but the data is not user-scoped.

use api_types::category::{CategoryCreated, CategoryKind as ApiKind, CategoryNew, CategoryView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_kind(kind: engine::CategoryKind) -> ApiKind {
    match kind {
        engine::CategoryKind::Income => ApiKind::Income,
        engine::CategoryKind::Expense => ApiKind::Expense,
    }
}

fn map_api_kind(kind: ApiKind) -> engine::CategoryKind {
    match kind {
        ApiKind::Income => engine::CategoryKind::Income,
        ApiKind::Expense => engine::CategoryKind::Expense,
    }
}

pub async fn list(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.engine.categories().await?;
    Ok(Json(
        categories
            .into_iter()
            .map(|category| CategoryView {
                id: category.id,
                name: category.name,
                kind: map_kind(category.kind),
            })
            .collect(),
    ))
}

pub async fn create(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryCreated>), ServerError> {
    let id = state
        .engine
        .new_category(&payload.name, map_api_kind(payload.kind))
        .await?;
    Ok((StatusCode::CREATED, Json(CategoryCreated { id })))
}

pub async fn delete(
    Extension(_user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
