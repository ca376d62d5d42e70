//! Command structs for engine write operations.
//!
//! These types group parameters for create/edit/transfer and the account
//! and budget operations, keeping call sites readable.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{TransactionKind, TransactionStatus};

/// Book an expense against an account.
#[derive(Clone, Debug)]
pub struct CreateExpenseCmd {
    pub user_id: String,
    pub account_id: Uuid,
    pub description: String,
    pub source: String,
    pub amount_minor: i64,
    pub category: String,
}

impl CreateExpenseCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        account_id: Uuid,
        amount_minor: i64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            description: String::new(),
            source: String::new(),
            amount_minor,
            category: category.into(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

/// Rewrite every mutable field of an existing transaction.
#[derive(Clone, Debug)]
pub struct EditTransactionCmd {
    pub user_id: String,
    pub transaction_id: Uuid,
    pub account_id: Uuid,
    pub description: String,
    pub source: String,
    pub amount_minor: i64,
    pub category: String,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
}

/// Move money between two accounts of the same owner.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub user_id: String,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount_minor: i64,
}

impl TransferCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        from_account_id: Uuid,
        to_account_id: Uuid,
        amount_minor: i64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            from_account_id,
            to_account_id,
            amount_minor,
        }
    }
}

/// Open a new account.
///
/// A positive `opening_minor` is booked as an "Initial Deposit" income.
#[derive(Clone, Debug)]
pub struct OpenAccountCmd {
    pub user_id: String,
    pub name: String,
    pub kind: String,
    pub account_number: String,
    pub opening_minor: i64,
}

impl OpenAccountCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        account_number: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            kind: kind.into(),
            account_number: account_number.into(),
            opening_minor: 0,
        }
    }

    #[must_use]
    pub fn opening_minor(mut self, opening_minor: i64) -> Self {
        self.opening_minor = opening_minor;
        self
    }
}

/// Budget fields used both to create and to update a budget.
#[derive(Clone, Debug)]
pub struct BudgetCmd {
    pub user_id: String,
    pub category: String,
    pub amount_minor: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl BudgetCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        category: impl Into<String>,
        amount_minor: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            category: category.into(),
            amount_minor,
            start_date,
            end_date,
        }
    }
}
