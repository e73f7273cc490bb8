use uuid::Uuid;

use sea_orm::{ModelTrait, TransactionTrait, prelude::*};

use crate::{ResultEngine, Transaction};

use super::super::super::{Engine, with_tx};

impl Engine {
    /// Deletes a transaction: reverse its effects against the re-read
    /// persisted state, then remove the row, atomically.
    ///
    /// Reversal tolerates targets that have since disappeared: an expense
    /// whose explicit budget was deleted still gets its account balance
    /// restored, and the budget side is skipped.
    pub async fn delete_transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self
                .lock_transaction_owned(&db_tx, transaction_id, user_id)
                .await?;
            let tx = Transaction::try_from(model.clone())?;

            self.reverse_effect(&db_tx, &tx).await?;
            model.delete(&db_tx).await?;

            Ok(())
        })
    }
}
