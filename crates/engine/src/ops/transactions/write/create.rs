use chrono::Utc;
use uuid::Uuid;

use sea_orm::{TransactionTrait, prelude::*};

use crate::{CreateTransactionCmd, ResultEngine, Transaction, transactions};

use super::super::super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Creates a transaction and applies its effects, atomically.
    ///
    /// The account must exist and belong to the caller, the category must
    /// exist. The explicit budget reference is deliberately not validated:
    /// resolution decides at effect time whether it yields a budget-side
    /// effect.
    pub async fn create_transaction(&self, cmd: CreateTransactionCmd) -> ResultEngine<Uuid> {
        let tx = Transaction::new(
            cmd.user_id,
            cmd.account_id,
            cmd.category_id,
            cmd.budget_id,
            cmd.amount_minor,
            cmd.occurred_at,
            normalize_optional_text(cmd.note.as_deref()),
            Utc::now(),
        )?;

        with_tx!(self, |db_tx| {
            self.require_account_owned(&db_tx, tx.account_id, &tx.user_id)
                .await?;
            self.require_category(&db_tx, tx.category_id).await?;

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            self.apply_effect(&db_tx, &tx).await?;

            Ok(tx.id)
        })
    }
}
