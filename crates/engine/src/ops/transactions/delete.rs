use sea_orm::{DatabaseTransaction, prelude::*};
use uuid::Uuid;

use crate::{MoneyCents, ResultEngine, Transaction, transactions};

use super::super::{Engine, with_tx};

impl Engine {
    /// Delete a transaction and undo its effects.
    ///
    /// A transaction whose account row no longer exists (`account_id` is
    /// `None`) is still deleted; only its budget effect is undone.
    pub async fn delete_transaction(
        &self,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        let tx = with_tx!(self, |db_tx| {
            self.delete_transaction_in(&db_tx, user_id, transaction_id)
                .await
        })?;
        tracing::info!(
            "transaction {} deleted: {} {} reversed",
            tx.id,
            tx.kind.as_str(),
            MoneyCents::new(tx.amount_minor)
        );
        Ok(tx)
    }

    async fn delete_transaction_in(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<Transaction> {
        let tx = self
            .require_transaction(db_tx, user_id, transaction_id)
            .await?;
        if let Some(account_id) = tx.account_id {
            self.require_account(db_tx, user_id, account_id).await?;
        }

        if tx.kind.tracks_budget() {
            self.adjust_budget(db_tx, user_id, &tx.category, tx.created_at, -tx.amount_minor)
                .await?;
        }
        match tx.account_id {
            Some(account_id) => {
                self.adjust_balance(db_tx, account_id, -tx.balance_effect())
                    .await?;
            }
            None => tracing::warn!("transaction {} has no account, balance untouched", tx.id),
        }

        transactions::Entity::delete_by_id(tx.id.to_string())
            .exec(db_tx)
            .await?;
        Ok(tx)
    }
}
