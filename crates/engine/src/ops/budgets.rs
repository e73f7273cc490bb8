use uuid::Uuid;

use sea_orm::{ActiveValue, ModelTrait, QueryFilter, TransactionTrait, prelude::*};

use crate::{Budget, CategoryKind, EngineError, ResultEngine, budgets};

use super::{Engine, with_tx};

impl Engine {
    /// Return a budget snapshot from DB.
    pub async fn budget(&self, budget_id: Uuid, user_id: &str) -> ResultEngine<Budget> {
        with_tx!(self, |db_tx| {
            let model = self.require_budget_owned(&db_tx, budget_id, user_id).await?;
            Budget::try_from(model)
        })
    }

    /// Return all budgets owned by the user.
    pub async fn budgets(&self, user_id: &str) -> ResultEngine<Vec<Budget>> {
        with_tx!(self, |db_tx| {
            let models = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?;
            models.into_iter().map(Budget::try_from).collect()
        })
    }

    /// Creates a budget for an expense category, unique per
    /// (owner, category). `remaining` starts equal to `allocated`.
    pub async fn new_budget(
        &self,
        user_id: &str,
        category_id: Uuid,
        allocated_minor: i64,
    ) -> ResultEngine<Uuid> {
        if allocated_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "allocated_minor must be >= 0".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;
            let kind = self.category_kind(&db_tx, category_id).await?;
            if kind != CategoryKind::Expense {
                return Err(EngineError::InvalidCategory(
                    "budgets only apply to expense categories".to_string(),
                ));
            }

            let exists = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id.to_string()))
                .filter(budgets::Column::CategoryId.eq(category_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(
                    "budget for category".to_string(),
                ));
            }

            let budget = Budget::new(user_id.to_string(), category_id, allocated_minor);
            let budget_id = budget.id;
            budgets::ActiveModel::from(&budget).insert(&db_tx).await?;
            Ok(budget_id)
        })
    }

    /// Changes the allocation of an existing budget.
    ///
    /// `remaining` is left untouched: it is initialized at creation and
    /// thereafter moved only by transaction effects.
    pub async fn set_budget_allocated(
        &self,
        budget_id: Uuid,
        allocated_minor: i64,
        user_id: &str,
    ) -> ResultEngine<()> {
        if allocated_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "allocated_minor must be >= 0".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_budget_owned(&db_tx, budget_id, user_id).await?;

            let active = budgets::ActiveModel {
                id: ActiveValue::Set(budget_id.to_string()),
                allocated_minor: ActiveValue::Set(allocated_minor),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Deletes a budget.
    ///
    /// Transactions holding an explicit reference get it nulled by the
    /// schema; their past effects on the budget die with the row.
    pub async fn delete_budget(&self, budget_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_budget_owned(&db_tx, budget_id, user_id).await?;
            model.delete(&db_tx).await?;
            Ok(())
        })
    }

    pub(super) async fn require_budget_owned(
        &self,
        db: &sea_orm::DatabaseTransaction,
        budget_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<budgets::Model> {
        budgets::Entity::find_by_id(budget_id.to_string())
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))
    }
}
