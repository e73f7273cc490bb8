//! The `users` entity and registration endpoint.

use api_types::user::Register;
use axum::{Json, extract::State, http::StatusCode};
use engine::EngineError;
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{ServerError, server::ServerState};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    /// bcrypt hash, never the clear text.
    pub password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Creates a user. The only route outside the auth middleware.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<Register>,
) -> Result<StatusCode, ServerError> {
    let username = payload.username.trim().to_string();
    if username.is_empty() || payload.password.is_empty() {
        return Err(ServerError::Generic(
            "username and password required".to_string(),
        ));
    }

    let exists = Entity::find_by_id(username.clone())
        .one(&state.db)
        .await
        .map_err(|err| ServerError::Engine(EngineError::from(err)))?
        .is_some();
    if exists {
        return Err(ServerError::Engine(EngineError::ExistingKey(username)));
    }

    let hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST)
        .map_err(|err| ServerError::Generic(err.to_string()))?;

    let user = ActiveModel {
        username: ActiveValue::Set(username),
        password: ActiveValue::Set(hash),
    };
    user.insert(&state.db)
        .await
        .map_err(|err| ServerError::Engine(EngineError::from(err)))?;

    Ok(StatusCode::CREATED)
}
