//! Core library for the Moneta finance tracker.
//!
//! The crate owns the domain model (accounts, categories, budgets,
//! transactions, savings goals) and the [`Engine`], the only component
//! allowed to mutate denormalized money fields: `accounts.balance_minor`
//! and `budgets.remaining_minor` always equal the net effect of the
//! currently persisted transactions.
//!
//! Every write operation runs inside a single database transaction and
//! row-locks the account and budget rows it is about to mutate, so
//! concurrent writes against the same rows serialize instead of losing
//! updates.

pub use accounts::Account;
pub use budgets::Budget;
pub use categories::{Category, CategoryKind};
pub use commands::{CreateTransactionCmd, UpdateTransactionCmd};
pub use error::EngineError;
pub use money::Money;
pub use ops::{Engine, EngineBuilder, TransactionListFilter};
pub use savings_goals::SavingsGoal;
pub use transactions::Transaction;

mod accounts;
mod budgets;
mod categories;
mod commands;
mod error;
mod money;
mod ops;
mod savings_goals;
mod transactions;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
