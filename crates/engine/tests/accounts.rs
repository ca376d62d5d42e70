use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    CreateExpenseCmd, Engine, EngineError, OpenAccountCmd, TransactionKind,
    TransactionListFilter, TransferCmd,
};
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

#[tokio::test]
async fn open_account_books_the_initial_deposit() {
    let (engine, _db) = engine_with_db().await;

    let account = engine
        .open_account(
            OpenAccountCmd::new("alice", " Checking ", "bank", "1234 5678 9012").opening_minor(25_000),
        )
        .await
        .unwrap();

    assert_eq!(account.name, "Checking");
    assert_eq!(account.account_number, "****9012");
    assert_eq!(account.balance_minor, 25_000);

    let history = engine
        .list_transactions("alice", &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, TransactionKind::Income);
    assert_eq!(history[0].description, "Initial Deposit");
    assert_eq!(history[0].category, "Initial Deposit");
    assert_eq!(history[0].source, "Checking");
    assert_eq!(history[0].account_id, Some(account.id));
}

#[tokio::test]
async fn open_account_without_deposit_has_no_history() {
    let (engine, _db) = engine_with_db().await;

    let account = engine
        .open_account(OpenAccountCmd::new("alice", "Wallet", "cash", "0000"))
        .await
        .unwrap();

    assert_eq!(account.balance_minor, 0);
    assert!(
        engine
            .list_transactions("alice", &TransactionListFilter::default())
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn account_names_are_unique_per_owner() {
    let (engine, _db) = engine_with_db().await;
    engine
        .open_account(OpenAccountCmd::new("alice", "Checking", "bank", "1111"))
        .await
        .unwrap();

    let err = engine
        .open_account(OpenAccountCmd::new("alice", "CHECKING", "bank", "2222"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("CHECKING".to_string()));

    engine
        .open_account(OpenAccountCmd::new("bob", "Checking", "bank", "3333"))
        .await
        .unwrap();
    assert_eq!(engine.accounts("alice").await.unwrap().len(), 1);
}

#[tokio::test]
async fn open_account_validates_input() {
    let (engine, _db) = engine_with_db().await;

    for cmd in [
        OpenAccountCmd::new("alice", "", "bank", "1111"),
        OpenAccountCmd::new("alice", "Checking", " ", "1111"),
        OpenAccountCmd::new("alice", "Checking", "bank", "  "),
        OpenAccountCmd::new("alice", "Checking", "bank", "1111").opening_minor(-1),
    ] {
        let err = engine.open_account(cmd).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)), "{err:?}");
    }
    assert!(engine.accounts("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn add_money_credits_the_account() {
    let (engine, _db) = engine_with_db().await;
    let account = engine
        .open_account(OpenAccountCmd::new("alice", "Checking", "bank", "1111"))
        .await
        .unwrap();

    let tx = engine.add_money("alice", account.id, 4_200).await.unwrap();
    assert_eq!(tx.description, "Account Funding");
    assert_eq!(tx.kind, TransactionKind::Income);
    assert_eq!(
        engine.account("alice", account.id).await.unwrap().balance_minor,
        4_200
    );

    let err = engine.add_money("alice", account.id, 0).await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err:?}");
    let err = engine
        .add_money("alice", Uuid::new_v4(), 100)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("account not exists".to_string()));
}

#[tokio::test]
async fn accounts_are_listed_newest_first() {
    let (engine, _db) = engine_with_db().await;
    let first = engine
        .open_account(OpenAccountCmd::new("alice", "First", "bank", "1111"))
        .await
        .unwrap();
    let second = engine
        .open_account(OpenAccountCmd::new("alice", "Second", "cash", "2222"))
        .await
        .unwrap();

    let ids: Vec<Uuid> = engine
        .accounts("alice")
        .await
        .unwrap()
        .iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
    assert!(engine.accounts("bob").await.unwrap().is_empty());
}

#[tokio::test]
async fn list_filters_by_window_and_search() {
    let (engine, db) = engine_with_db().await;
    let checking = engine
        .open_account(OpenAccountCmd::new("alice", "Checking", "bank", "1111").opening_minor(50_000))
        .await
        .unwrap()
        .id;
    let savings = engine
        .open_account(OpenAccountCmd::new("alice", "Savings", "bank", "2222"))
        .await
        .unwrap()
        .id;
    let old = engine
        .create_expense(
            CreateExpenseCmd::new("alice", checking, 1_000, "Groceries")
                .description("Old market run")
                .source("Card"),
        )
        .await
        .unwrap();
    engine
        .create_expense(
            CreateExpenseCmd::new("alice", checking, 2_000, "Dining")
                .description("Pizza night")
                .source("Cash"),
        )
        .await
        .unwrap();
    engine
        .transfer(TransferCmd::new("alice", checking, savings, 5_000))
        .await
        .unwrap();

    let backend = db.get_database_backend();
    let old_at = Utc::now() - Duration::days(20);
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE transactions SET created_at = ? WHERE id = ?",
        vec![old_at.into(), old.id.to_string().into()],
    ))
    .await
    .unwrap();

    let recent = engine
        .list_transactions("alice", &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(recent.len(), 4);
    assert!(recent.iter().all(|t| t.id != old.id));
    assert!(recent.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    let pizza = engine
        .list_transactions(
            "alice",
            &TransactionListFilter {
                search: Some("  PIZZA ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(pizza.len(), 1);
    assert_eq!(pizza[0].category, "Dining");

    let transfers = engine
        .list_transactions(
            "alice",
            &TransactionListFilter {
                search: Some("transfer".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(transfers.len(), 2);

    let everything = engine
        .list_transactions(
            "alice",
            &TransactionListFilter {
                from: Some(Utc::now() - Duration::days(30)),
                to: Some(Utc::now()),
                search: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(everything.len(), 5);
    assert_eq!(everything.last().map(|t| t.id), Some(old.id));

    let err = engine
        .list_transactions(
            "alice",
            &TransactionListFilter {
                from: Some(Utc::now()),
                to: Some(Utc::now() - Duration::days(1)),
                search: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err:?}");
}

#[tokio::test]
async fn receipt_url_is_attached() {
    let (engine, _db) = engine_with_db().await;
    let account = engine
        .open_account(OpenAccountCmd::new("alice", "Checking", "bank", "1111").opening_minor(5_000))
        .await
        .unwrap()
        .id;
    let tx = engine
        .create_expense(
            CreateExpenseCmd::new("alice", account, 900, "Books")
                .description("Novel")
                .source("Bookshop"),
        )
        .await
        .unwrap();

    let updated = engine
        .attach_receipt("alice", tx.id, " https://receipts.example/r/1.png ")
        .await
        .unwrap();
    assert_eq!(
        updated.receipt_url.as_deref(),
        Some("https://receipts.example/r/1.png")
    );
    assert_eq!(updated.amount_minor, 900);

    let err = engine.attach_receipt("alice", tx.id, " ").await.unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err:?}");
    let err = engine
        .attach_receipt("bob", tx.id, "https://receipts.example/r/2.png")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("transaction not exists".to_string())
    );
}
