//! Effect propagation shared by create/update/delete.
//!
//! An effect is the pair of deltas a transaction implies: on the owning
//! account's balance and, for expenses, on the resolved budget's remaining
//! amount. Reversal is the exact inverse, so apply-then-reverse always
//! round-trips both rows. All reads go through the lock-readers in
//! `ops::access`; the new value is computed from the row as it is under
//! the lock, never from earlier state.

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{CategoryKind, EngineError, ResultEngine, Transaction, accounts, budgets, transactions};

use super::super::super::Engine;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum EffectDirection {
    Apply,
    Reverse,
}

impl EffectDirection {
    fn signum(self) -> i64 {
        match self {
            Self::Apply => 1,
            Self::Reverse => -1,
        }
    }
}

impl Engine {
    /// Applies the transaction's effects to its account and resolved
    /// budget.
    pub(super) async fn apply_effect(
        &self,
        db_tx: &DatabaseTransaction,
        tx: &Transaction,
    ) -> ResultEngine<()> {
        self.propagate_effect(db_tx, tx, EffectDirection::Apply)
            .await
    }

    /// Reverses a previously applied effect (used for update/delete).
    pub(super) async fn reverse_effect(
        &self,
        db_tx: &DatabaseTransaction,
        tx: &Transaction,
    ) -> ResultEngine<()> {
        self.propagate_effect(db_tx, tx, EffectDirection::Reverse)
            .await
    }

    /// The single effect computation.
    ///
    /// Income moves the account by `+amount` on apply, expense by
    /// `-amount`; reversal negates either. Only expenses touch a budget.
    /// Rows that no longer resolve (account or budget deleted
    /// concurrently) are skipped: the engine applies whatever subset of
    /// effects still has a target.
    async fn propagate_effect(
        &self,
        db_tx: &DatabaseTransaction,
        tx: &Transaction,
        direction: EffectDirection,
    ) -> ResultEngine<()> {
        let kind = self.category_kind(db_tx, tx.category_id).await?;

        let account_delta = match kind {
            CategoryKind::Income => tx.amount_minor,
            CategoryKind::Expense => -tx.amount_minor,
        } * direction.signum();

        if let Some(account) = self.lock_account(db_tx, tx.account_id, &tx.user_id).await? {
            let active = accounts::ActiveModel {
                id: ActiveValue::Set(account.id),
                balance_minor: ActiveValue::Set(account.balance_minor + account_delta),
                ..Default::default()
            };
            active.update(db_tx).await?;
        }

        if kind == CategoryKind::Expense
            && let Some(budget) = self.resolve_budget(db_tx, tx).await?
        {
            let budget_delta = -tx.amount_minor * direction.signum();
            let active = budgets::ActiveModel {
                id: ActiveValue::Set(budget.id),
                remaining_minor: ActiveValue::Set(budget.remaining_minor + budget_delta),
                ..Default::default()
            };
            active.update(db_tx).await?;
        }

        Ok(())
    }

    /// Lock-read the persisted transaction row, scoped by owner.
    ///
    /// Update and delete reverse against this freshly read state, and the
    /// row lock serializes concurrent edits of the same transaction.
    pub(super) async fn lock_transaction_owned(
        &self,
        db_tx: &DatabaseTransaction,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<transactions::Model> {
        transactions::Entity::find_by_id(transaction_id.to_string())
            .filter(transactions::Column::UserId.eq(user_id.to_string()))
            .lock_exclusive()
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))
    }
}
