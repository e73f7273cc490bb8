use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{CategoryKind, CreateTransactionCmd, Engine, EngineError};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "hash".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder().database(db.clone()).build().await.unwrap();
    (engine, db)
}

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
async fn new_budget_starts_with_remaining_equal_allocated() {
    let (engine, _db) = engine_with_db().await;
    let groceries = category_id(&engine, "Groceries").await;

    let budget_id = engine.new_budget("alice", groceries, 50_000).await.unwrap();

    let budget = engine.budget(budget_id, "alice").await.unwrap();
    assert_eq!(budget.allocated_minor, 50_000);
    assert_eq!(budget.remaining_minor, 50_000);
}

#[tokio::test]
async fn budget_is_unique_per_user_and_category() {
    let (engine, _db) = engine_with_db().await;
    let groceries = category_id(&engine, "Groceries").await;

    engine.new_budget("alice", groceries, 50_000).await.unwrap();
    let duplicate = engine.new_budget("alice", groceries, 10_000).await;
    assert!(matches!(duplicate, Err(EngineError::ExistingKey(_))));
}

#[tokio::test]
async fn budget_rejects_income_categories() {
    let (engine, _db) = engine_with_db().await;
    let salary = category_id(&engine, "Salary").await;

    let result = engine.new_budget("alice", salary, 50_000).await;
    assert!(matches!(result, Err(EngineError::InvalidCategory(_))));
}

#[tokio::test]
async fn allocation_update_leaves_remaining_untouched() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine
        .new_account("alice", "Checking", 100_000)
        .await
        .unwrap();
    let groceries = category_id(&engine, "Groceries").await;
    let budget_id = engine.new_budget("alice", groceries, 30_000).await.unwrap();

    engine
        .create_transaction(CreateTransactionCmd::new(
            "alice", account_id, groceries, 10_000, Utc::now(),
        ))
        .await
        .unwrap();

    engine
        .set_budget_allocated(budget_id, 60_000, "alice")
        .await
        .unwrap();

    let budget = engine.budget(budget_id, "alice").await.unwrap();
    assert_eq!(budget.allocated_minor, 60_000);
    assert_eq!(budget.remaining_minor, 20_000);
}

#[tokio::test]
async fn remaining_may_go_negative() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine
        .new_account("alice", "Checking", 100_000)
        .await
        .unwrap();
    let groceries = category_id(&engine, "Groceries").await;
    let budget_id = engine.new_budget("alice", groceries, 5_000).await.unwrap();

    engine
        .create_transaction(CreateTransactionCmd::new(
            "alice", account_id, groceries, 20_000, Utc::now(),
        ))
        .await
        .unwrap();

    let budget = engine.budget(budget_id, "alice").await.unwrap();
    assert_eq!(budget.remaining_minor, -15_000);
}

#[tokio::test]
async fn protected_category_cannot_be_deleted_while_referenced() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine
        .new_account("alice", "Checking", 100_000)
        .await
        .unwrap();
    let fuel = category_id(&engine, "Fuel").await;

    let tx_id = engine
        .create_transaction(CreateTransactionCmd::new(
            "alice", account_id, fuel, 1_000, Utc::now(),
        ))
        .await
        .unwrap();

    let blocked = engine.delete_category(fuel).await;
    assert!(matches!(blocked, Err(EngineError::Protected(_))));

    engine.delete_transaction(tx_id, "alice").await.unwrap();
    engine.delete_category(fuel).await.unwrap();
}

#[tokio::test]
async fn deleting_account_keeps_budget_consumption() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine
        .new_account("alice", "Checking", 100_000)
        .await
        .unwrap();
    let groceries = category_id(&engine, "Groceries").await;
    let budget_id = engine.new_budget("alice", groceries, 30_000).await.unwrap();

    engine
        .create_transaction(CreateTransactionCmd::new(
            "alice", account_id, groceries, 10_000, Utc::now(),
        ))
        .await
        .unwrap();

    // Cascade removes the transactions without reversing them.
    engine.delete_account(account_id, "alice").await.unwrap();

    assert!(matches!(
        engine.account(account_id, "alice").await,
        Err(EngineError::KeyNotFound(_))
    ));
    let budget = engine.budget(budget_id, "alice").await.unwrap();
    assert_eq!(budget.remaining_minor, 20_000);
    assert!(
        engine
            .list_transactions("alice", 10, &engine::TransactionListFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn duplicate_account_name_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine.new_account("alice", "Checking", 0).await.unwrap();
    let duplicate = engine.new_account("alice", "checking", 0).await;
    assert!(matches!(duplicate, Err(EngineError::ExistingKey(_))));
}

#[tokio::test]
async fn savings_goals_stay_passive() {
    let (engine, _db) = engine_with_db().await;
    let account_id = engine
        .new_account("alice", "Checking", 100_000)
        .await
        .unwrap();
    let goal_id = engine
        .new_savings_goal("alice", "Holiday", None, 0, 200_000)
        .await
        .unwrap();
    let transfer = category_id(&engine, "Savings Transfer").await;

    engine
        .create_transaction(CreateTransactionCmd::new(
            "alice", account_id, transfer, 10_000, Utc::now(),
        ))
        .await
        .unwrap();

    // No automatic linkage: the goal only moves when told to.
    let goal = engine.savings_goal(goal_id, "alice").await.unwrap();
    assert_eq!(goal.current_minor, 0);

    engine
        .update_savings_goal(goal_id, "alice", None, None, Some(10_000), None)
        .await
        .unwrap();
    let goal = engine.savings_goal(goal_id, "alice").await.unwrap();
    assert_eq!(goal.current_minor, 10_000);
}

#[tokio::test]
async fn empty_category_name_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    assert!(matches!(
        engine.new_category("  ", CategoryKind::Expense).await,
        Err(EngineError::InvalidAmount(_))
    ));
}