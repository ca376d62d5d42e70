use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseTransaction, QueryFilter, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Transaction, transactions};

use super::Engine;

mod create;
mod delete;
mod edit;
mod list;
mod transfer;

/// Category booked on the outgoing side of a transfer.
pub const TRANSFER_OUT_CATEGORY: &str = "Transfer Out";
/// Category booked on the incoming side of a transfer.
pub const TRANSFER_IN_CATEGORY: &str = "Transfer In";

/// Transfer rows move money between accounts and never count as spend.
pub(super) fn is_transfer_category(category: &str) -> bool {
    category == TRANSFER_OUT_CATEGORY || category == TRANSFER_IN_CATEGORY
}

/// Filters for listing transactions.
///
/// `from` and `to` are both inclusive, in UTC. When `from` is missing the
/// window starts seven days before `to`; when `to` is missing it ends now.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Case-insensitive substring matched against description, status,
    /// source and category.
    pub search: Option<String>,
}

/// Result of a transfer: both rows and both balances after the move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub outgoing: Transaction,
    pub incoming: Transaction,
    pub from_balance_minor: i64,
    pub to_balance_minor: i64,
}

impl Engine {
    /// Loads a transaction inside the unit, scoped to its owner.
    pub(super) async fn require_transaction(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(transaction_id.to_string())
            .filter(transactions::Column::OwnerId.eq(user_id))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        Transaction::try_from(model)
    }

    pub(super) async fn insert_transaction(
        &self,
        db_tx: &DatabaseTransaction,
        tx: &Transaction,
    ) -> ResultEngine<()> {
        transactions::ActiveModel::from(tx).insert(db_tx).await?;
        Ok(())
    }
}
