use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{BudgetCmd, CreateExpenseCmd, Engine, EngineError, OpenAccountCmd};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[tokio::test]
async fn create_and_list_budgets() {
    let (engine, _db) = engine_with_db().await;
    let older = engine
        .create_budget(BudgetCmd::new(
            "alice",
            " Groceries ",
            30_000,
            today() - Duration::days(60),
            today() - Duration::days(31),
        ))
        .await
        .unwrap();
    let current = engine
        .create_budget(BudgetCmd::new(
            "alice",
            "Groceries",
            40_000,
            today() - Duration::days(1),
            today() + Duration::days(29),
        ))
        .await
        .unwrap();
    engine
        .create_budget(BudgetCmd::new("bob", "Rent", 90_000, today(), today()))
        .await
        .unwrap();

    assert_eq!(older.category, "Groceries");
    assert_eq!(current.spent_minor, 0);
    assert_eq!(current.remaining_minor(), 40_000);

    let listed = engine.budgets("alice").await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![current.id, older.id]);
}

#[tokio::test]
async fn invalid_budgets_are_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_budget(BudgetCmd::new("alice", "Groceries", 0, today(), today()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err:?}");

    let err = engine
        .create_budget(BudgetCmd::new(
            "alice",
            "Groceries",
            100,
            today(),
            today() - Duration::days(1),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err:?}");

    let err = engine
        .create_budget(BudgetCmd::new("alice", "  ", 100, today(), today()))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err:?}");

    assert!(engine.budgets("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn single_day_budget_covers_the_whole_day() {
    let (engine, _db) = engine_with_db().await;
    let account = engine
        .open_account(OpenAccountCmd::new("alice", "Checking", "bank", "0001").opening_minor(5_000))
        .await
        .unwrap()
        .id;
    let budget = engine
        .create_budget(BudgetCmd::new("alice", "Coffee", 1_000, today(), today()))
        .await
        .unwrap()
        .id;

    engine
        .create_expense(
            CreateExpenseCmd::new("alice", account, 350, "Coffee")
                .description("Flat white")
                .source("Cafe"),
        )
        .await
        .unwrap();

    assert_eq!(engine.budget("alice", budget).await.unwrap().spent_minor, 350);
}

#[tokio::test]
async fn expense_hits_the_most_recent_matching_budget() {
    let (engine, _db) = engine_with_db().await;
    let account = engine
        .open_account(OpenAccountCmd::new("alice", "Checking", "bank", "0001").opening_minor(50_000))
        .await
        .unwrap()
        .id;
    let quarterly = engine
        .create_budget(BudgetCmd::new(
            "alice",
            "Groceries",
            90_000,
            today() - Duration::days(45),
            today() + Duration::days(45),
        ))
        .await
        .unwrap()
        .id;
    let monthly = engine
        .create_budget(BudgetCmd::new(
            "alice",
            "Groceries",
            30_000,
            today() - Duration::days(5),
            today() + Duration::days(25),
        ))
        .await
        .unwrap()
        .id;
    let expired = engine
        .create_budget(BudgetCmd::new(
            "alice",
            "Groceries",
            30_000,
            today() - Duration::days(40),
            today() - Duration::days(10),
        ))
        .await
        .unwrap()
        .id;

    engine
        .create_expense(
            CreateExpenseCmd::new("alice", account, 1_200, "Groceries")
                .description("Market")
                .source("Card"),
        )
        .await
        .unwrap();

    assert_eq!(engine.budget("alice", monthly).await.unwrap().spent_minor, 1_200);
    assert_eq!(engine.budget("alice", quarterly).await.unwrap().spent_minor, 0);
    assert_eq!(engine.budget("alice", expired).await.unwrap().spent_minor, 0);
}

#[tokio::test]
async fn update_keeps_spend_and_delete_removes() {
    let (engine, _db) = engine_with_db().await;
    let account = engine
        .open_account(OpenAccountCmd::new("alice", "Checking", "bank", "0001").opening_minor(10_000))
        .await
        .unwrap()
        .id;
    let budget = engine
        .create_budget(BudgetCmd::new(
            "alice",
            "Groceries",
            20_000,
            today() - Duration::days(1),
            today() + Duration::days(1),
        ))
        .await
        .unwrap();
    engine
        .create_expense(
            CreateExpenseCmd::new("alice", account, 2_000, "Groceries")
                .description("Market")
                .source("Card"),
        )
        .await
        .unwrap();

    let updated = engine
        .update_budget(
            budget.id,
            BudgetCmd::new(
                "alice",
                "Food",
                25_000,
                today() - Duration::days(2),
                today() + Duration::days(10),
            ),
        )
        .await
        .unwrap();
    assert_eq!(updated.category, "Food");
    assert_eq!(updated.amount_minor, 25_000);
    assert_eq!(updated.spent_minor, 2_000);
    assert_eq!(updated.created_at, budget.created_at);

    let err = engine
        .update_budget(
            budget.id,
            BudgetCmd::new("bob", "Food", 25_000, today(), today()),
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("budget not exists".to_string()));

    engine.delete_budget("alice", budget.id).await.unwrap();
    assert!(engine.budgets("alice").await.unwrap().is_empty());
    assert_eq!(
        engine.delete_budget("alice", budget.id).await.unwrap_err(),
        EngineError::KeyNotFound("budget not exists".to_string())
    );
    assert_eq!(engine.account("alice", account).await.unwrap().balance_minor, 8_000);
}
