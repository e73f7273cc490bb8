use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    CategoryKind, CreateTransactionCmd, Engine, EngineError, UpdateTransactionCmd,
};
use migration::MigratorTrait;

async fn add_user(db: &DatabaseConnection, username: &str) {
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec![username.into(), "hash".into()],
    ))
    .await
    .unwrap();
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    add_user(&db, "alice").await;
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db)
}

async fn engine_with_file_db() -> (Engine, std::path::PathBuf) {
    let root =
        std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    add_user(&db, "alice").await;
    let engine = Engine::builder().database(db).build().await.unwrap();

    (engine, path)
}

/// Seeded category id by name; the default list covers both kinds.
async fn category_id(engine: &Engine, name: &str) -> Uuid {
    engine
        .categories()
        .await
        .unwrap()
        .into_iter()
        .find_map(|category| (category.name == name).then_some(category.id))
        .unwrap_or_else(|| panic!("seeded category {name} missing"))
}

#[tokio::test]
async fn income_apply_and_reverse_round_trip() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_account("alice", "Checking", 0).await.unwrap();
    let salary = category_id(&engine, "Salary").await;

    let tx_id = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice", account_id, salary, 1_000, Utc::now(),
        ))
        .await
        .unwrap();

    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(account.balance_minor, 1_000);

    engine.delete_transaction(tx_id, "alice").await.unwrap();

    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(account.balance_minor, 0);
    assert!(matches!(
        engine.transaction(tx_id, "alice").await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn expense_moves_account_and_budget() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine
        .new_account("alice", "Checking", 100_000)
        .await
        .unwrap();
    let groceries = category_id(&engine, "Groceries").await;
    let budget_id = engine.new_budget("alice", groceries, 30_000).await.unwrap();

    let tx_id = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice", account_id, groceries, 20_000, Utc::now(),
        ))
        .await
        .unwrap();

    let account = engine.account(account_id, "alice").await.unwrap();
    let budget = engine.budget(budget_id, "alice").await.unwrap();
    assert_eq!(account.balance_minor, 80_000);
    assert_eq!(budget.remaining_minor, 10_000);

    engine.delete_transaction(tx_id, "alice").await.unwrap();

    let account = engine.account(account_id, "alice").await.unwrap();
    let budget = engine.budget(budget_id, "alice").await.unwrap();
    assert_eq!(account.balance_minor, 100_000);
    assert_eq!(budget.remaining_minor, 30_000);
}

#[tokio::test]
async fn editing_amount_reapplies_effects() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine
        .new_account("alice", "Checking", 100_000)
        .await
        .unwrap();
    let groceries = category_id(&engine, "Groceries").await;
    let budget_id = engine.new_budget("alice", groceries, 30_000).await.unwrap();

    let tx_id = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice", account_id, groceries, 20_000, Utc::now(),
        ))
        .await
        .unwrap();

    engine
        .update_transaction(UpdateTransactionCmd::new("alice", tx_id).amount_minor(5_000))
        .await
        .unwrap();

    let account = engine.account(account_id, "alice").await.unwrap();
    let budget = engine.budget(budget_id, "alice").await.unwrap();
    assert_eq!(account.balance_minor, 95_000);
    assert_eq!(budget.remaining_minor, 25_000);
}

#[tokio::test]
async fn expense_without_budget_touches_only_account() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine
        .new_account("alice", "Checking", 50_000)
        .await
        .unwrap();
    let fuel = category_id(&engine, "Fuel").await;

    engine
        .create_transaction(CreateTransactionCmd::new(
            "alice", account_id, fuel, 10_000, Utc::now(),
        ))
        .await
        .unwrap();

    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(account.balance_minor, 40_000);
    assert!(engine.budgets("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_with_dangling_explicit_budget_still_reverses_account() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine
        .new_account("alice", "Checking", 50_000)
        .await
        .unwrap();
    let groceries = category_id(&engine, "Groceries").await;
    let budget_id = engine.new_budget("alice", groceries, 30_000).await.unwrap();

    let tx_id = engine
        .create_transaction(
            CreateTransactionCmd::new("alice", account_id, groceries, 10_000, Utc::now())
                .budget_id(budget_id),
        )
        .await
        .unwrap();

    // Another actor removes the budget between apply and delete.
    engine.delete_budget(budget_id, "alice").await.unwrap();

    engine.delete_transaction(tx_id, "alice").await.unwrap();

    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(account.balance_minor, 50_000);
}

#[tokio::test]
async fn cross_user_explicit_budget_is_ignored() {
    let (engine, db) = engine_with_db().await;
    add_user(&db, "bob").await;

    let groceries = category_id(&engine, "Groceries").await;
    let bob_budget = engine.new_budget("bob", groceries, 30_000).await.unwrap();

    let account_id = engine
        .new_account("alice", "Checking", 50_000)
        .await
        .unwrap();

    // An explicit reference to a budget alice does not own resolves to
    // "no budget": only the account moves, bob's budget stays untouched.
    engine
        .create_transaction(
            CreateTransactionCmd::new("alice", account_id, groceries, 10_000, Utc::now())
                .budget_id(bob_budget),
        )
        .await
        .unwrap();

    let account = engine.account(account_id, "alice").await.unwrap();
    let budget = engine.budget(bob_budget, "bob").await.unwrap();
    assert_eq!(account.balance_minor, 40_000);
    assert_eq!(budget.remaining_minor, 30_000);
}

#[tokio::test]
async fn update_moves_effects_between_budgets() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine
        .new_account("alice", "Checking", 100_000)
        .await
        .unwrap();
    let groceries = category_id(&engine, "Groceries").await;
    let travel = category_id(&engine, "Travel").await;
    let groceries_budget = engine.new_budget("alice", groceries, 30_000).await.unwrap();
    let travel_budget = engine.new_budget("alice", travel, 40_000).await.unwrap();

    let tx_id = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice", account_id, groceries, 10_000, Utc::now(),
        ))
        .await
        .unwrap();

    engine
        .update_transaction(UpdateTransactionCmd::new("alice", tx_id).category_id(travel))
        .await
        .unwrap();

    let groceries_budget = engine.budget(groceries_budget, "alice").await.unwrap();
    let travel_budget = engine.budget(travel_budget, "alice").await.unwrap();
    let account = engine.account(account_id, "alice").await.unwrap();
    assert_eq!(groceries_budget.remaining_minor, 30_000);
    assert_eq!(travel_budget.remaining_minor, 30_000);
    assert_eq!(account.balance_minor, 90_000);
}

#[tokio::test]
async fn update_moves_balance_between_accounts() {
    let (engine, _db) = engine_with_db().await;
    let checking = engine
        .new_account("alice", "Checking", 50_000)
        .await
        .unwrap();
    let savings = engine.new_account("alice", "Savings", 50_000).await.unwrap();
    let salary = category_id(&engine, "Salary").await;

    let tx_id = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice", checking, salary, 10_000, Utc::now(),
        ))
        .await
        .unwrap();

    engine
        .update_transaction(UpdateTransactionCmd::new("alice", tx_id).account_id(savings))
        .await
        .unwrap();

    let checking = engine.account(checking, "alice").await.unwrap();
    let savings = engine.account(savings, "alice").await.unwrap();
    assert_eq!(checking.balance_minor, 50_000);
    assert_eq!(savings.balance_minor, 60_000);
}

#[tokio::test]
async fn update_then_delete_restores_pristine_state() {
    let (engine, _db) = engine_with_db().await;
    let checking = engine
        .new_account("alice", "Checking", 100_000)
        .await
        .unwrap();
    let savings = engine.new_account("alice", "Savings", 20_000).await.unwrap();
    let groceries = category_id(&engine, "Groceries").await;
    let travel = category_id(&engine, "Travel").await;
    let groceries_budget = engine.new_budget("alice", groceries, 30_000).await.unwrap();
    let travel_budget = engine.new_budget("alice", travel, 40_000).await.unwrap();

    let tx_id = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice", checking, groceries, 10_000, Utc::now(),
        ))
        .await
        .unwrap();

    // Change every effect-relevant field at once.
    engine
        .update_transaction(
            UpdateTransactionCmd::new("alice", tx_id)
                .account_id(savings)
                .category_id(travel)
                .budget_id(travel_budget)
                .amount_minor(7_500),
        )
        .await
        .unwrap();

    engine.delete_transaction(tx_id, "alice").await.unwrap();

    let checking = engine.account(checking, "alice").await.unwrap();
    let savings = engine.account(savings, "alice").await.unwrap();
    let groceries_budget = engine.budget(groceries_budget, "alice").await.unwrap();
    let travel_budget = engine.budget(travel_budget, "alice").await.unwrap();
    assert_eq!(checking.balance_minor, 100_000);
    assert_eq!(savings.balance_minor, 20_000);
    assert_eq!(groceries_budget.remaining_minor, 30_000);
    assert_eq!(travel_budget.remaining_minor, 40_000);
}

#[tokio::test]
async fn income_ignores_explicit_budget() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_account("alice", "Checking", 0).await.unwrap();
    let salary = category_id(&engine, "Salary").await;
    let groceries = category_id(&engine, "Groceries").await;
    let budget_id = engine.new_budget("alice", groceries, 30_000).await.unwrap();

    engine
        .create_transaction(
            CreateTransactionCmd::new("alice", account_id, salary, 10_000, Utc::now())
                .budget_id(budget_id),
        )
        .await
        .unwrap();

    let budget = engine.budget(budget_id, "alice").await.unwrap();
    assert_eq!(budget.remaining_minor, 30_000);
}

#[tokio::test]
async fn listing_paginates_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine.new_account("alice", "Checking", 0).await.unwrap();
    let salary = category_id(&engine, "Salary").await;

    for i in 0..5 {
        engine
            .create_transaction(CreateTransactionCmd::new(
                "alice",
                account_id,
                salary,
                1_000 + i,
                Utc::now() + chrono::Duration::seconds(i),
            ))
            .await
            .unwrap();
    }

    let filter = engine::TransactionListFilter::default();
    let (page_one, cursor) = engine
        .list_transactions_page("alice", 3, None, &filter)
        .await
        .unwrap();
    assert_eq!(page_one.len(), 3);
    assert_eq!(page_one[0].amount_minor, 1_004);
    let cursor = cursor.expect("second page expected");

    let (page_two, cursor) = engine
        .list_transactions_page("alice", 3, Some(&cursor), &filter)
        .await
        .unwrap();
    assert_eq!(page_two.len(), 2);
    assert_eq!(page_two[1].amount_minor, 1_000);
    assert!(cursor.is_none());
}

#[tokio::test]
async fn concurrent_expenses_do_not_lose_updates() {
    let (engine, _path) = engine_with_file_db().await;
    let account_id = engine
        .new_account("alice", "Checking", 100_000)
        .await
        .unwrap();
    let groceries = category_id(&engine, "Groceries").await;
    let budget_id = engine.new_budget("alice", groceries, 50_000).await.unwrap();

    let engine = Arc::new(engine);
    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            // Conflicts are the documented retryable failure mode.
            loop {
                let cmd = CreateTransactionCmd::new(
                    "alice", account_id, groceries, 1_000, Utc::now(),
                );
                match engine.create_transaction(cmd).await {
                    Ok(_) => break,
                    Err(EngineError::Conflict(_)) => tokio::task::yield_now().await,
                    Err(err) => panic!("unexpected error: {err:?}"),
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let account = engine.account(account_id, "alice").await.unwrap();
    let budget = engine.budget(budget_id, "alice").await.unwrap();
    assert_eq!(account.balance_minor, 100_000 - 8_000);
    assert_eq!(budget.remaining_minor, 50_000 - 8_000);
}

#[tokio::test]
async fn kind_change_is_not_possible_via_category_ops() {
    let (engine, _db) = engine_with_db().await;
    let id = engine
        .new_category("Side Projects", CategoryKind::Income)
        .await
        .unwrap();

    let categories = engine.categories().await.unwrap();
    let created = categories
        .into_iter()
        .find(|category| category.id == id)
        .unwrap();
    assert_eq!(created.kind, CategoryKind::Income);
}
