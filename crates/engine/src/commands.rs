//! Command structs for engine write operations.
//!
//! These types group parameters for transaction writes, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Create a transaction and apply its effects.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub user_id: String,
    pub account_id: Uuid,
    pub category_id: Uuid,
    /// Explicit budget target; takes precedence over the
    /// (owner, category) lookup when resolving the budget effect.
    pub budget_id: Option<Uuid>,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        account_id: Uuid,
        category_id: Uuid,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            category_id,
            budget_id: None,
            amount_minor,
            occurred_at,
            note: None,
        }
    }

    #[must_use]
    pub fn budget_id(mut self, budget_id: Uuid) -> Self {
        self.budget_id = Some(budget_id);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Update a persisted transaction: reverse the old effects, persist the
/// patched fields, apply the new effects.
///
/// `None` fields keep the persisted value. `budget_id` is a two-level
/// option: `Some(None)` detaches the explicit budget, `Some(Some(id))`
/// replaces it.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub user_id: String,
    pub transaction_id: Uuid,
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub budget_id: Option<Option<Uuid>>,
    pub amount_minor: Option<i64>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, transaction_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            transaction_id,
            account_id: None,
            category_id: None,
            budget_id: None,
            amount_minor: None,
            occurred_at: None,
            note: None,
        }
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn budget_id(mut self, budget_id: Uuid) -> Self {
        self.budget_id = Some(Some(budget_id));
        self
    }

    #[must_use]
    pub fn clear_budget(mut self) -> Self {
        self.budget_id = Some(None);
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
