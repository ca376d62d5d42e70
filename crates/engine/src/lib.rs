//! Ledger consistency engine.
//!
//! Keeps account balances, transaction records and budget spend totals
//! consistent across create, edit, delete and transfer. Every operation runs
//! inside one database transaction (an atomic unit): either all of its rows
//! change or none do.

pub use accounts::Account;
pub use budgets::Budget;
pub use categories::Category;
pub use commands::{BudgetCmd, CreateExpenseCmd, EditTransactionCmd, OpenAccountCmd, TransferCmd};
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{
    BalanceFix, Engine, EngineBuilder, TRANSFER_IN_CATEGORY, TRANSFER_OUT_CATEGORY,
    TransactionListFilter, TransferReceipt,
};
pub use transactions::{Transaction, TransactionKind, TransactionStatus};

mod accounts;
mod budgets;
mod categories;
mod commands;
mod error;
mod money;
mod ops;
mod transactions;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
