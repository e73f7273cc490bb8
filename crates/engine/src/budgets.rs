//! The module contains the `Budget` struct and its implementation.

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::EngineError;

/// A spending envelope for one expense category, unique per
/// (owner, category).
///
/// `remaining_minor` starts equal to `allocated_minor` and is thereafter
/// moved only by the engine as expense transactions resolving to this
/// budget are applied or reversed. It may go negative: over-budget is
/// reported, not rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: String,
    pub category_id: Uuid,
    pub allocated_minor: i64,
    pub remaining_minor: i64,
}

impl Budget {
    pub fn new(user_id: String, category_id: Uuid, allocated_minor: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            category_id,
            allocated_minor,
            remaining_minor: allocated_minor,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub allocated_minor: i64,
    pub remaining_minor: i64,
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
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Categories,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Budget> for ActiveModel {
    fn from(value: &Budget) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            category_id: ActiveValue::Set(value.category_id.to_string()),
            allocated_minor: ActiveValue::Set(value.allocated_minor),
            remaining_minor: ActiveValue::Set(value.remaining_minor),
        }
    }
}

impl TryFrom<Model> for Budget {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid budget id".to_string()))?,
            user_id: model.user_id,
            category_id: Uuid::parse_str(&model.category_id)
                .map_err(|_| EngineError::InvalidId("invalid category id".to_string()))?,
            allocated_minor: model.allocated_minor,
            remaining_minor: model.remaining_minor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_budget_starts_full() {
        let budget = Budget::new("alice".to_string(), Uuid::new_v4(), 50_000);
        assert_eq!(budget.allocated_minor, 50_000);
        assert_eq!(budget.remaining_minor, 50_000);
    }
}
