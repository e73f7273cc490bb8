//! Savings goal primitives.
//!
//! Goals are passive records: `current_minor` is maintained by the user,
//! not by transaction effects.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavingsGoal {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub current_minor: i64,
    pub target_minor: i64,
    pub created_at: DateTime<Utc>,
}

impl SavingsGoal {
    pub fn new(
        user_id: String,
        name: String,
        description: Option<String>,
        current_minor: i64,
        target_minor: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            description,
            current_minor,
            target_minor,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "savings_goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub current_minor: i64,
    pub target_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&SavingsGoal> for ActiveModel {
    fn from(value: &SavingsGoal) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            description: ActiveValue::Set(value.description.clone()),
            current_minor: ActiveValue::Set(value.current_minor),
            target_minor: ActiveValue::Set(value.target_minor),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for SavingsGoal {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid savings goal id".to_string()))?,
            user_id: model.user_id,
            name: model.name,
            description: model.description,
            current_minor: model.current_minor,
            target_minor: model.target_minor,
            created_at: model.created_at,
        })
    }
}
