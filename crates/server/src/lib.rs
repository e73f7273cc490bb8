use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::{EngineError, Money};

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod accounts;
mod budgets;
mod categories;
mod goals;
mod server;
mod transactions;
mod user;

pub mod types {
    pub mod user {
        pub use api_types::user::Register;
    }

    pub mod account {
        pub use api_types::account::{AccountCreated, AccountNew, AccountUpdate, AccountView};
    }

    pub mod category {
        pub use api_types::category::{CategoryCreated, CategoryKind, CategoryNew, CategoryView};
    }

    pub mod budget {
        pub use api_types::budget::{BudgetCreated, BudgetNew, BudgetUpdate, BudgetView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionCreated, TransactionList, TransactionListResponse, TransactionNew,
            TransactionUpdate, TransactionView,
        };
    }

    pub mod goal {
        pub use api_types::goal::{GoalCreated, GoalNew, GoalUpdate, GoalView};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::Protected(_) | EngineError::Conflict(_) => {
            StatusCode::CONFLICT
        }
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidCategory(_)
        | EngineError::InvalidId(_)
        | EngineError::InvalidCursor(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

/// Parse a decimal amount string from a request body.
fn parse_amount(value: &str) -> Result<Money, ServerError> {
    value.parse::<Money>().map_err(ServerError::Engine)
}

/// Parse a decimal amount that must be a positive magnitude.
fn parse_positive_amount(value: &str) -> Result<Money, ServerError> {
    let amount = parse_amount(value)?;
    if !amount.is_positive() {
        return Err(ServerError::Engine(EngineError::InvalidAmount(
            "amount must be > 0".to_string(),
        )));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_retryable_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::Conflict("locked".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_protected_maps_to_409() {
        let res = ServerError::from(EngineError::Protected("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidAmount("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn positive_amount_guard_rejects_zero_and_negative() {
        assert!(parse_positive_amount("0").is_err());
        assert!(parse_positive_amount("-3.50").is_err());
        assert!(parse_positive_amount("3.50").is_ok());
    }
}
