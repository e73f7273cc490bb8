//! Transaction primitives.
//!
//! A `Transaction` is the only entity whose lifecycle (create, update,
//! delete) has side effects: the engine propagates its amount into the
//! owning account's balance and, for expenses, into the resolved budget's
//! remaining amount.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// A single income or expense event.
///
/// `amount_minor` is always a positive magnitude; the sign of the effect
/// derives from the category kind, never from the amount itself.
/// `budget_id` is an optional explicit target that takes precedence over
/// the (owner, category) budget lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub account_id: Uuid,
    pub category_id: Uuid,
    pub budget_id: Option<Uuid>,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        account_id: Uuid,
        category_id: Uuid,
        budget_id: Option<Uuid>,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
        note: Option<String>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            account_id,
            category_id,
            budget_id,
            amount_minor,
            occurred_at,
            note,
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub account_id: String,
    pub category_id: String,
    pub budget_id: Option<String>,
    pub amount_minor: i64,
    pub occurred_at: DateTimeUtc,
    pub note: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Categories,
    #[sea_orm(
        belongs_to = "super::budgets::Entity",
        from = "Column::BudgetId",
        to = "super::budgets::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Budgets,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            category_id: ActiveValue::Set(tx.category_id.to_string()),
            budget_id: ActiveValue::Set(tx.budget_id.map(|id| id.to_string())),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            note: ActiveValue::Set(tx.note.clone()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::InvalidId("invalid transaction id".to_string()))?,
            user_id: model.user_id,
            account_id: Uuid::parse_str(&model.account_id)
                .map_err(|_| EngineError::InvalidId("invalid account id".to_string()))?,
            category_id: Uuid::parse_str(&model.category_id)
                .map_err(|_| EngineError::InvalidId("invalid category id".to_string()))?,
            budget_id: model
                .budget_id
                .and_then(|s| Uuid::parse_str(&s).ok()),
            amount_minor: model.amount_minor,
            occurred_at: model.occurred_at,
            note: model.note,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn rejects_non_positive_amounts() {
        for amount in [0, -100] {
            let result = Transaction::new(
                "alice".to_string(),
                Uuid::new_v4(),
                Uuid::new_v4(),
                None,
                amount,
                Utc::now(),
                None,
                Utc::now(),
            );
            assert!(matches!(result, Err(EngineError::InvalidAmount(_))));
        }
    }
}
