//! Seeds the global category list.
//!
//! Categories are shared by all users; fresh installations get a usable
//! set out of the box. Names are unique, so reruns on an already seeded
//! database are guarded by a lookup instead of relying on the driver's
//! conflict behavior.

use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::*;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    // Income
    ("Salary", "income"),
    ("Bonus", "income"),
    ("Interest", "income"),
    ("Dividends", "income"),
    ("Investment Income", "income"),
    ("Gift", "income"),
    ("Refund", "income"),
    ("Other Income", "income"),
    // Expenses
    ("Rent / Mortgage", "expense"),
    ("Utilities", "expense"),
    ("Internet / Phone", "expense"),
    ("Groceries", "expense"),
    ("Eating Out", "expense"),
    ("Transportation", "expense"),
    ("Fuel", "expense"),
    ("Insurance", "expense"),
    ("Health / Medical", "expense"),
    ("Education", "expense"),
    ("Entertainment", "expense"),
    ("Subscriptions", "expense"),
    ("Shopping", "expense"),
    ("Clothing", "expense"),
    ("Personal Care", "expense"),
    ("Travel", "expense"),
    ("Taxes", "expense"),
    ("Fees & Charges", "expense"),
    ("Home Maintenance", "expense"),
    ("Childcare", "expense"),
    ("Pets", "expense"),
    ("Gifts & Donations", "expense"),
    ("Debt Payment", "expense"),
    ("Savings Transfer", "expense"),
    ("Miscellaneous", "expense"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = manager.get_database_backend();

        for (name, kind) in DEFAULT_CATEGORIES {
            let existing = db
                .query_one(Statement::from_sql_and_values(
                    backend,
                    "SELECT id FROM categories WHERE name = ?",
                    vec![(*name).into()],
                ))
                .await?;
            if existing.is_some() {
                continue;
            }

            db.execute(Statement::from_sql_and_values(
                backend,
                "INSERT INTO categories (id, name, kind) VALUES (?, ?, ?)",
                vec![
                    Uuid::new_v4().to_string().into(),
                    (*name).into(),
                    (*kind).into(),
                ],
            ))
            .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = manager.get_database_backend();

        for (name, _) in DEFAULT_CATEGORIES {
            db.execute(Statement::from_sql_and_values(
                backend,
                "DELETE FROM categories WHERE name = ?",
                vec![(*name).into()],
            ))
            .await?;
        }

        Ok(())
    }
}
