//! Owner-scoped lookups and row-lock reads.
//!
//! Cross-user lookups answer as not-found so existence is never revealed.
//! The `lock_*` readers issue `SELECT ... FOR UPDATE` and must be the only
//! way effect propagation reads a row it is about to mutate: the value
//! used to compute the new balance is always the freshly locked one, never
//! an earlier in-memory copy. On SQLite the query builder drops the lock
//! clause and the single-writer model serializes these instead.

use sea_orm::{DatabaseTransaction, QueryFilter, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{
    CategoryKind, EngineError, ResultEngine, Transaction, accounts, budgets, categories, users,
};

use super::Engine;

impl Engine {
    pub(super) async fn require_user_exists(
        &self,
        db: &DatabaseTransaction,
        username: &str,
    ) -> ResultEngine<()> {
        let exists = users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }

    pub(super) async fn require_account_owned(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<accounts::Model> {
        accounts::Entity::find_by_id(account_id.to_string())
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
    }

    pub(super) async fn require_category(
        &self,
        db: &DatabaseTransaction,
        category_id: Uuid,
    ) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(category_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }

    /// Kind of the given category, parsed from storage.
    pub(super) async fn category_kind(
        &self,
        db: &DatabaseTransaction,
        category_id: Uuid,
    ) -> ResultEngine<CategoryKind> {
        let model = self.require_category(db, category_id).await?;
        CategoryKind::try_from(model.kind.as_str())
    }

    /// Lock-read the account row, scoped by owner.
    ///
    /// Returns `None` when the row is gone or belongs to someone else;
    /// effect propagation treats that as "no account-side effect".
    pub(super) async fn lock_account(
        &self,
        db: &DatabaseTransaction,
        account_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Option<accounts::Model>> {
        accounts::Entity::find_by_id(account_id.to_string())
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .lock_exclusive()
            .one(db)
            .await
            .map_err(Into::into)
    }

    async fn lock_budget(
        &self,
        db: &DatabaseTransaction,
        budget_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Option<budgets::Model>> {
        budgets::Entity::find_by_id(budget_id.to_string())
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .lock_exclusive()
            .one(db)
            .await
            .map_err(Into::into)
    }

    async fn lock_budget_for_category(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        category_id: Uuid,
    ) -> ResultEngine<Option<budgets::Model>> {
        budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .filter(budgets::Column::CategoryId.eq(category_id.to_string()))
            .lock_exclusive()
            .one(db)
            .await
            .map_err(Into::into)
    }

    /// Resolves the budget an expense effect targets, locking the row.
    ///
    /// Evaluated fresh at every apply/reverse:
    /// 1. an explicit `budget_id` wins, filtered by owner; a mismatch or a
    ///    missing row means "no budget", not an error;
    /// 2. otherwise the (owner, category) budget, if any.
    pub(super) async fn resolve_budget(
        &self,
        db: &DatabaseTransaction,
        tx: &Transaction,
    ) -> ResultEngine<Option<budgets::Model>> {
        if let Some(budget_id) = tx.budget_id {
            return self.lock_budget(db, budget_id, &tx.user_id).await;
        }
        self.lock_budget_for_category(db, &tx.user_id, tx.category_id)
            .await
    }
}
