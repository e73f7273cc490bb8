use chrono::Utc;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, ModelTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{Account, EngineError, ResultEngine, accounts};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Return an account snapshot from DB.
    pub async fn account(&self, account_id: Uuid, user_id: &str) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_account_owned(&db_tx, account_id, user_id)
                .await?;
            Account::try_from(model)
        })
    }

    /// Return all accounts owned by the user, ordered by creation time.
    pub async fn accounts(&self, user_id: &str) -> ResultEngine<Vec<Account>> {
        with_tx!(self, |db_tx| {
            let models = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(accounts::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Account::try_from).collect()
        })
    }

    /// Add a new account for the user.
    ///
    /// `opening_minor` is stored directly as the starting balance; from
    /// then on only transaction effects move it.
    pub async fn new_account(
        &self,
        user_id: &str,
        name: &str,
        opening_minor: i64,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "account")?;
        let created_at = Utc::now();
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            let exists = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id.to_string()))
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let account = Account::new(user_id.to_string(), name, opening_minor, created_at);
            let account_id = account.id;
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;

            Ok(account_id)
        })
    }

    /// Renames an existing account.
    pub async fn rename_account(
        &self,
        account_id: Uuid,
        new_name: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        let new_name = normalize_required_name(new_name, "account")?;
        with_tx!(self, |db_tx| {
            self.require_account_owned(&db_tx, account_id, user_id)
                .await?;

            let exists = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id.to_string()))
                .filter(Expr::cust("LOWER(name)").eq(new_name.to_lowercase()))
                .filter(accounts::Column::Id.ne(account_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(new_name));
            }

            let active = accounts::ActiveModel {
                id: ActiveValue::Set(account_id.to_string()),
                name: ActiveValue::Set(new_name),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Deletes an account.
    ///
    /// The account's transactions go with it (FK cascade) without effect
    /// reversal; budgets keep whatever those expenses already consumed.
    pub async fn delete_account(&self, account_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_account_owned(&db_tx, account_id, user_id)
                .await?;
            model.delete(&db_tx).await?;
            Ok(())
        })
    }
}
