//! Accounts API endpoints

use api_types::account::{AccountCreated, AccountNew, AccountUpdate, AccountView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::Money;
use uuid::Uuid;

use crate::{ServerError, parse_amount, server::ServerState, user};

fn view(account: engine::Account) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        balance: Money::new(account.balance_minor).to_string(),
        created_at: account.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    let accounts = state.engine.accounts(&user.username).await?;
    Ok(Json(accounts.into_iter().map(view).collect()))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account(id, &user.username).await?;
    Ok(Json(view(account)))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountCreated>), ServerError> {
    let opening = match payload.balance.as_deref() {
        Some(raw) => parse_amount(raw)?,
        None => Money::ZERO,
    };

    let id = state
        .engine
        .new_account(&user.username, &payload.name, opening.minor())
        .await?;

    Ok((StatusCode::CREATED, Json(AccountCreated { id })))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountUpdate>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .rename_account(id, &payload.name, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_account(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
