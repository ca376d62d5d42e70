use chrono::{DateTime, Utc};
use sea_orm::DatabaseTransaction;

use crate::{
    EngineError, MoneyCents, ResultEngine, Transaction, TransactionKind, TransferCmd,
    util::normalize_required_text,
};

use super::{super::{Engine, with_tx}, TRANSFER_IN_CATEGORY, TRANSFER_OUT_CATEGORY, TransferReceipt};

impl Engine {
    /// Move money between two accounts of the same owner.
    ///
    /// Books an expense ("Transfer Out") on the source and an income
    /// ("Transfer In") on the destination. Transfers never count against a
    /// budget.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<TransferReceipt> {
        MoneyCents::new(cmd.amount_minor).positive("amount")?;
        if cmd.from_account_id == cmd.to_account_id {
            return Err(EngineError::Validation(
                "cannot transfer to the same account".to_string(),
            ));
        }
        let cmd = TransferCmd {
            user_id: normalize_required_text(&cmd.user_id, "user")?,
            ..cmd
        };
        let occurred_at = Utc::now();

        let receipt = with_tx!(self, |db_tx| {
            self.transfer_in(&db_tx, &cmd, occurred_at).await
        })?;
        tracing::info!(
            "transferred {} from {} to {}",
            MoneyCents::new(cmd.amount_minor),
            cmd.from_account_id,
            cmd.to_account_id
        );
        Ok(receipt)
    }

    async fn transfer_in(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &TransferCmd,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<TransferReceipt> {
        let from = self
            .require_account(db_tx, &cmd.user_id, cmd.from_account_id)
            .await?;
        let to = self
            .require_account(db_tx, &cmd.user_id, cmd.to_account_id)
            .await?;
        if from.balance_minor < cmd.amount_minor {
            return Err(EngineError::InsufficientFunds(format!(
                "account '{}' holds {}, transfer needs {}",
                from.name,
                MoneyCents::new(from.balance_minor),
                MoneyCents::new(cmd.amount_minor)
            )));
        }

        self.withdraw(db_tx, cmd.from_account_id, cmd.amount_minor)
            .await?;
        self.adjust_balance(db_tx, cmd.to_account_id, cmd.amount_minor)
            .await?;

        let out_category_id = self
            .resolve_category(
                db_tx,
                &cmd.user_id,
                TRANSFER_OUT_CATEGORY,
                TransactionKind::Expense,
            )
            .await?;
        let in_category_id = self
            .resolve_category(
                db_tx,
                &cmd.user_id,
                TRANSFER_IN_CATEGORY,
                TransactionKind::Income,
            )
            .await?;

        let outgoing = Transaction::new(
            cmd.user_id.clone(),
            cmd.from_account_id,
            format!("Transfer to {}", to.name),
            from.name.clone(),
            TransactionKind::Expense,
            cmd.amount_minor,
            TRANSFER_OUT_CATEGORY.to_string(),
            out_category_id,
            occurred_at,
        )?;
        let incoming = Transaction::new(
            cmd.user_id.clone(),
            cmd.to_account_id,
            format!("Received from {}", from.name),
            to.name.clone(),
            TransactionKind::Income,
            cmd.amount_minor,
            TRANSFER_IN_CATEGORY.to_string(),
            in_category_id,
            occurred_at,
        )?;
        self.insert_transaction(db_tx, &outgoing).await?;
        self.insert_transaction(db_tx, &incoming).await?;

        let from_balance_minor = self
            .require_account(db_tx, &cmd.user_id, cmd.from_account_id)
            .await?
            .balance_minor;
        let to_balance_minor = self
            .require_account(db_tx, &cmd.user_id, cmd.to_account_id)
            .await?
            .balance_minor;

        Ok(TransferReceipt {
            outgoing,
            incoming,
            from_balance_minor,
            to_balance_minor,
        })
    }
}
