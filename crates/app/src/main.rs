use std::{error::Error, process::ExitCode};

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use engine::{
    BudgetCmd, CreateExpenseCmd, EditTransactionCmd, Engine, MoneyCents, OpenAccountCmd,
    TransactionKind, TransactionListFilter, TransactionStatus, TransferCmd,
};
use migration::{Migrator, MigratorTrait};
use serde::Serialize;
use uuid::Uuid;

mod settings;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "fintrack")]
#[command(about = "Personal finance ledger: accounts, transactions and budgets")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Owner of the ledger the command acts on.
    #[arg(long, env = "FINTRACK_USER")]
    user: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Account(Account),
    /// Book an expense.
    Expense(ExpenseArgs),
    /// Rewrite a transaction.
    Edit(EditArgs),
    /// Delete a transaction and undo its effects.
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Move money between two accounts.
    Transfer {
        #[arg(long)]
        from: Uuid,
        #[arg(long)]
        to: Uuid,
        #[arg(long)]
        amount: MoneyCents,
    },
    #[command(name = "tx")]
    Transaction(Transaction),
    Budget(Budget),
    /// List categories.
    Categories,
    /// Recompute balances from transaction history.
    Reconcile {
        /// Only this account.
        #[arg(long)]
        account: Option<Uuid>,
    },
}

#[derive(Args, Debug)]
struct Account {
    #[command(subcommand)]
    command: AccountCommand,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    Open {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "bank")]
        kind: String,
        #[arg(long)]
        number: String,
        #[arg(long, default_value = "0")]
        opening: MoneyCents,
    },
    List,
    Show {
        #[arg(long)]
        id: Uuid,
    },
    /// Deposit money into an account.
    Fund {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        amount: MoneyCents,
    },
}

#[derive(Args, Debug)]
struct ExpenseArgs {
    #[arg(long)]
    account: Uuid,
    #[arg(long)]
    amount: MoneyCents,
    #[arg(long)]
    category: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    source: String,
}

#[derive(Args, Debug)]
struct EditArgs {
    #[arg(long)]
    id: Uuid,
    #[arg(long)]
    account: Uuid,
    #[arg(long)]
    amount: MoneyCents,
    #[arg(long)]
    category: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    source: String,
    #[arg(long, value_parser = parse_kind, default_value = "expense")]
    kind: TransactionKind,
    #[arg(long, value_parser = parse_status, default_value = "completed")]
    status: TransactionStatus,
}

#[derive(Args, Debug)]
struct Transaction {
    #[command(subcommand)]
    command: TransactionCommand,
}

#[derive(Subcommand, Debug)]
enum TransactionCommand {
    List {
        /// Inclusive lower bound (RFC 3339); defaults to seven days ago.
        #[arg(long)]
        from: Option<DateTime<Utc>>,
        /// Inclusive upper bound (RFC 3339); defaults to now.
        #[arg(long)]
        to: Option<DateTime<Utc>>,
        #[arg(long)]
        search: Option<String>,
    },
    Show {
        #[arg(long)]
        id: Uuid,
    },
    Receipt {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        url: String,
    },
}

#[derive(Args, Debug)]
struct Budget {
    #[command(subcommand)]
    command: BudgetCommand,
}

#[derive(Args, Debug)]
struct BudgetFields {
    #[arg(long)]
    category: String,
    #[arg(long)]
    amount: MoneyCents,
    /// First day of the period (YYYY-MM-DD).
    #[arg(long)]
    start: NaiveDate,
    /// Last day of the period, inclusive.
    #[arg(long)]
    end: NaiveDate,
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    Create(BudgetFields),
    List,
    Update {
        #[arg(long)]
        id: Uuid,
        #[command(flatten)]
        fields: BudgetFields,
    },
    Delete {
        #[arg(long)]
        id: Uuid,
    },
}

fn parse_kind(raw: &str) -> Result<TransactionKind, String> {
    TransactionKind::try_from(raw).map_err(|err| err.to_string())
}

fn parse_status(raw: &str) -> Result<TransactionStatus, String> {
    TransactionStatus::try_from(raw).map_err(|err| err.to_string())
}

impl BudgetFields {
    fn into_cmd(self, user: &str) -> BudgetCmd {
        BudgetCmd::new(user, self.category, self.amount.cents(), self.start, self.end)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), BoxError> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "fintrack={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let url = cli.database_url.unwrap_or(settings.database.url);
    let db = parse_database(&url).await?;
    tracing::debug!("ledger database ready at {url}");
    let engine = Engine::builder().database(db).build().await?;
    let user = cli.user.as_str();

    match cli.command {
        Command::Account(account) => match account.command {
            AccountCommand::Open {
                name,
                kind,
                number,
                opening,
            } => print_json(
                &engine
                    .open_account(
                        OpenAccountCmd::new(user, name, kind, number)
                            .opening_minor(opening.cents()),
                    )
                    .await?,
            ),
            AccountCommand::List => print_json(&engine.accounts(user).await?),
            AccountCommand::Show { id } => print_json(&engine.account(user, id).await?),
            AccountCommand::Fund { id, amount } => {
                print_json(&engine.add_money(user, id, amount.cents()).await?)
            }
        },
        Command::Expense(args) => print_json(
            &engine
                .create_expense(
                    CreateExpenseCmd::new(user, args.account, args.amount.cents(), args.category)
                        .description(args.description)
                        .source(args.source),
                )
                .await?,
        ),
        Command::Edit(args) => print_json(
            &engine
                .edit_transaction(EditTransactionCmd {
                    user_id: user.to_string(),
                    transaction_id: args.id,
                    account_id: args.account,
                    description: args.description,
                    source: args.source,
                    amount_minor: args.amount.cents(),
                    category: args.category,
                    kind: args.kind,
                    status: args.status,
                })
                .await?,
        ),
        Command::Delete { id } => print_json(&engine.delete_transaction(user, id).await?),
        Command::Transfer { from, to, amount } => print_json(
            &engine
                .transfer(TransferCmd::new(user, from, to, amount.cents()))
                .await?,
        ),
        Command::Transaction(transaction) => match transaction.command {
            TransactionCommand::List { from, to, search } => print_json(
                &engine
                    .list_transactions(user, &TransactionListFilter { from, to, search })
                    .await?,
            ),
            TransactionCommand::Show { id } => print_json(&engine.transaction(user, id).await?),
            TransactionCommand::Receipt { id, url } => {
                print_json(&engine.attach_receipt(user, id, &url).await?)
            }
        },
        Command::Budget(budget) => match budget.command {
            BudgetCommand::Create(fields) => {
                print_json(&engine.create_budget(fields.into_cmd(user)).await?)
            }
            BudgetCommand::List => print_json(&engine.budgets(user).await?),
            BudgetCommand::Update { id, fields } => {
                print_json(&engine.update_budget(id, fields.into_cmd(user)).await?)
            }
            BudgetCommand::Delete { id } => {
                engine.delete_budget(user, id).await?;
                print_json(&serde_json::json!({ "deleted": id }))
            }
        },
        Command::Categories => print_json(&engine.categories(user).await?),
        Command::Reconcile { account: Some(id) } => {
            print_json(&engine.reconcile_account(user, id).await?)
        }
        Command::Reconcile { account: None } => print_json(&engine.reconcile(user).await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), BoxError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn parse_database(url: &str) -> Result<sea_orm::DatabaseConnection, BoxError> {
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
