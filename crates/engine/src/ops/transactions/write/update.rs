use sea_orm::{TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, Transaction, UpdateTransactionCmd, transactions};

use super::super::super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Updates a transaction: reverse old effects, persist the patched
    /// fields, apply new effects, all in one atomic unit.
    ///
    /// Full reversal followed by full reapplication is the only general
    /// strategy: amount, category, account, and budget may all change
    /// between old and new state, so effects are not additive. Budget
    /// resolution therefore runs twice and may land on two different
    /// budgets.
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<()> {
        let user_id = cmd.user_id.as_str();
        with_tx!(self, |db_tx| {
            let old_model = self
                .lock_transaction_owned(&db_tx, cmd.transaction_id, user_id)
                .await?;
            let old = Transaction::try_from(old_model)?;

            self.reverse_effect(&db_tx, &old).await?;

            let new_amount_minor = cmd.amount_minor.unwrap_or(old.amount_minor);
            if new_amount_minor <= 0 {
                return Err(EngineError::InvalidAmount(
                    "amount_minor must be > 0".to_string(),
                ));
            }
            let new_account_id = cmd.account_id.unwrap_or(old.account_id);
            let new_category_id = cmd.category_id.unwrap_or(old.category_id);
            if new_account_id != old.account_id {
                self.require_account_owned(&db_tx, new_account_id, user_id)
                    .await?;
            }
            if new_category_id != old.category_id {
                self.require_category(&db_tx, new_category_id).await?;
            }

            let new = Transaction {
                id: old.id,
                user_id: old.user_id.clone(),
                account_id: new_account_id,
                category_id: new_category_id,
                budget_id: cmd.budget_id.unwrap_or(old.budget_id),
                amount_minor: new_amount_minor,
                occurred_at: cmd.occurred_at.unwrap_or(old.occurred_at),
                note: match cmd.note.as_deref() {
                    None => old.note.clone(),
                    Some(value) => normalize_optional_text(Some(value)),
                },
                created_at: old.created_at,
            };

            let mut active = transactions::ActiveModel::from(&new);
            active.created_at = sea_orm::ActiveValue::NotSet;
            active.update(&db_tx).await?;

            self.apply_effect(&db_tx, &new).await?;

            Ok(())
        })
    }
}
