//! Budgets API endpoints

use api_types::budget::{BudgetCreated, BudgetNew, BudgetUpdate, BudgetView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::Money;
use uuid::Uuid;

use crate::{ServerError, parse_amount, server::ServerState, user};

fn view(budget: engine::Budget) -> BudgetView {
    BudgetView {
        id: budget.id,
        category_id: budget.category_id,
        allocated_amount: Money::new(budget.allocated_minor).to_string(),
        remaining_amount: Money::new(budget.remaining_minor).to_string(),
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let budgets = state.engine.budgets(&user.username).await?;
    Ok(Json(budgets.into_iter().map(view).collect()))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BudgetView>, ServerError> {
    let budget = state.engine.budget(id, &user.username).await?;
    Ok(Json(view(budget)))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<BudgetCreated>), ServerError> {
    let allocated = parse_amount(&payload.allocated_amount)?;
    let id = state
        .engine
        .new_budget(&user.username, payload.category_id, allocated.minor())
        .await?;
    Ok((StatusCode::CREATED, Json(BudgetCreated { id })))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BudgetUpdate>,
) -> Result<StatusCode, ServerError> {
    let allocated = parse_amount(&payload.allocated_amount)?;
    state
        .engine
        .set_budget_allocated(id, allocated.minor(), &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_budget(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
