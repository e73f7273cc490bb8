//! Transactions API endpoints
//!
//! The three mutating routes are the only callers of the effect engine's
//! create/update/delete operations; everything else here is mapping.

use api_types::transaction::{
    TransactionCreated, TransactionList, TransactionListResponse, TransactionNew,
    TransactionUpdate, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{CreateTransactionCmd, Money, TransactionListFilter, UpdateTransactionCmd};
use uuid::Uuid;

use crate::{ServerError, parse_positive_amount, server::ServerState, user};

fn view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        account_id: tx.account_id,
        category_id: tx.category_id,
        budget_id: tx.budget_id,
        amount: Money::new(tx.amount_minor).to_string(),
        occurred_at: tx.occurred_at,
        note: tx.note,
        created_at: tx.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let filter = TransactionListFilter {
        from: payload.from,
        to: payload.to,
        account_id: payload.account_id,
        category_id: payload.category_id,
    };
    let limit = payload.limit.unwrap_or(50);

    let (transactions, next_cursor) = state
        .engine
        .list_transactions_page(&user.username, limit, payload.cursor.as_deref(), &filter)
        .await?;

    Ok(Json(TransactionListResponse {
        transactions: transactions.into_iter().map(view).collect(),
        next_cursor,
    }))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(id, &user.username).await?;
    Ok(Json(view(tx)))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let amount = parse_positive_amount(&payload.amount)?;
    let occurred_at = payload.occurred_at.unwrap_or_else(Utc::now);

    let mut cmd = CreateTransactionCmd::new(
        &user.username,
        payload.account_id,
        payload.category_id,
        amount.minor(),
        occurred_at,
    );
    if let Some(budget_id) = payload.budget_id {
        cmd = cmd.budget_id(budget_id);
    }
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }

    let id = state.engine.create_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<StatusCode, ServerError> {
    if payload.clear_budget && payload.budget_id.is_some() {
        return Err(ServerError::Generic(
            "budget_id and clear_budget are mutually exclusive".to_string(),
        ));
    }

    let mut cmd = UpdateTransactionCmd::new(&user.username, id);
    if let Some(account_id) = payload.account_id {
        cmd = cmd.account_id(account_id);
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(budget_id) = payload.budget_id {
        cmd = cmd.budget_id(budget_id);
    }
    if payload.clear_budget {
        cmd = cmd.clear_budget();
    }
    if let Some(raw) = payload.amount.as_deref() {
        cmd = cmd.amount_minor(parse_positive_amount(raw)?.minor());
    }
    if let Some(occurred_at) = payload.occurred_at {
        cmd = cmd.occurred_at(occurred_at);
    }
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }

    state.engine.update_transaction(cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
