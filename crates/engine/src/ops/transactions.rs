use uuid::Uuid;

use sea_orm::{QueryFilter, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, Transaction, transactions};

use super::{Engine, with_tx};

mod list;
mod write;

pub use list::TransactionListFilter;

impl Engine {
    /// Return a transaction snapshot from DB.
    pub async fn transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(transaction_id.to_string())
                .filter(transactions::Column::UserId.eq(user_id.to_string()))
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("transaction not exists".to_string())
                })?;
            Transaction::try_from(model)
        })
    }
}
