//! Savings goals API endpoints

use api_types::goal::{GoalCreated, GoalNew, GoalUpdate, GoalView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::Money;
use uuid::Uuid;

use crate::{ServerError, parse_amount, server::ServerState, user};

fn view(goal: engine::SavingsGoal) -> GoalView {
    GoalView {
        id: goal.id,
        name: goal.name,
        description: goal.description,
        current_amount: Money::new(goal.current_minor).to_string(),
        target_amount: Money::new(goal.target_minor).to_string(),
        created_at: goal.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<GoalView>>, ServerError> {
    let goals = state.engine.savings_goals(&user.username).await?;
    Ok(Json(goals.into_iter().map(view).collect()))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalView>, ServerError> {
    let goal = state.engine.savings_goal(id, &user.username).await?;
    Ok(Json(view(goal)))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<GoalNew>,
) -> Result<(StatusCode, Json<GoalCreated>), ServerError> {
    let current = match payload.current_amount.as_deref() {
        Some(raw) => parse_amount(raw)?,
        None => Money::ZERO,
    };
    let target = parse_amount(&payload.target_amount)?;

    let id = state
        .engine
        .new_savings_goal(
            &user.username,
            &payload.name,
            payload.description.as_deref(),
            current.minor(),
            target.minor(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(GoalCreated { id })))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GoalUpdate>,
) -> Result<StatusCode, ServerError> {
    let current = payload
        .current_amount
        .as_deref()
        .map(parse_amount)
        .transpose()?;
    let target = payload
        .target_amount
        .as_deref()
        .map(parse_amount)
        .transpose()?;

    state
        .engine
        .update_savings_goal(
            id,
            &user.username,
            payload.name.as_deref(),
            payload.description.as_deref(),
            current.map(Money::minor),
            target.map(Money::minor),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_savings_goal(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
