use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::{
    Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};

use crate::{EngineError, ResultEngine, Transaction, transactions};

use super::super::{Engine, with_tx};

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::InvalidAmount(
            "invalid range: from must be < to".to_string(),
        ));
    }
    Ok(())
}

fn apply_tx_filters(
    mut query: sea_orm::Select<transactions::Entity>,
    filter: &TransactionListFilter,
) -> sea_orm::Select<transactions::Entity> {
    if let Some(from) = filter.from {
        query = query.filter(transactions::Column::OccurredAt.gte(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(transactions::Column::OccurredAt.lt(to));
    }
    if let Some(account_id) = filter.account_id {
        query = query.filter(transactions::Column::AccountId.eq(account_id.to_string()));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(transactions::Column::CategoryId.eq(category_id.to_string()));
    }
    query
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TransactionsCursor {
    occurred_at: DateTime<Utc>,
    transaction_id: String,
}

impl TransactionsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))
    }
}

impl Engine {
    /// Lists the user's most recent transactions.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        limit: u64,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        let (items, _next) = self
            .list_transactions_page(user_id, limit, None, filter)
            .await?;
        Ok(items)
    }

    /// Lists the user's transactions with cursor-based pagination.
    ///
    /// Pagination is newest → older by `(occurred_at DESC, id DESC)`; the
    /// opaque cursor encodes the last row of the previous page.
    pub async fn list_transactions_page(
        &self,
        user_id: &str,
        limit: u64,
        cursor: Option<&str>,
        filter: &TransactionListFilter,
    ) -> ResultEngine<(Vec<Transaction>, Option<String>)> {
        validate_list_filter(filter)?;
        let limit = limit.clamp(1, 200);
        let cursor = cursor.map(TransactionsCursor::decode).transpose()?;

        with_tx!(self, |db_tx| {
            let mut query = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id.to_string()));
            query = apply_tx_filters(query, filter);

            if let Some(cursor) = cursor {
                query = query.filter(
                    Condition::any()
                        .add(transactions::Column::OccurredAt.lt(cursor.occurred_at))
                        .add(
                            Condition::all()
                                .add(transactions::Column::OccurredAt.eq(cursor.occurred_at))
                                .add(transactions::Column::Id.lt(cursor.transaction_id)),
                        ),
                );
            }

            let models = query
                .order_by_desc(transactions::Column::OccurredAt)
                .order_by_desc(transactions::Column::Id)
                .limit(limit + 1)
                .all(&db_tx)
                .await?;

            let has_more = models.len() as u64 > limit;
            let items: Vec<Transaction> = models
                .into_iter()
                .take(limit as usize)
                .map(Transaction::try_from)
                .collect::<ResultEngine<_>>()?;

            let next_cursor = if has_more {
                items.last().map(|last| {
                    TransactionsCursor {
                        occurred_at: last.occurred_at,
                        transaction_id: last.id.to_string(),
                    }
                    .encode()
                })
            } else {
                None
            };
            let next_cursor = next_cursor.transpose()?;

            Ok((items, next_cursor))
        })
    }
}
