use chrono::{DateTime, Utc};
use sea_orm::DatabaseTransaction;

use crate::{
    CreateExpenseCmd, EngineError, MoneyCents, ResultEngine, Transaction, TransactionKind,
    util::normalize_required_text,
};

use super::super::{Engine, with_tx};

impl Engine {
    /// Book an expense against an account.
    ///
    /// The account is debited, the category is created on first use and the
    /// spend of the matching budget (if any) grows by the amount, all in one
    /// unit.
    pub async fn create_expense(&self, cmd: CreateExpenseCmd) -> ResultEngine<Transaction> {
        MoneyCents::new(cmd.amount_minor).positive("amount")?;
        let cmd = CreateExpenseCmd {
            user_id: normalize_required_text(&cmd.user_id, "user")?,
            description: normalize_required_text(&cmd.description, "description")?,
            source: normalize_required_text(&cmd.source, "source")?,
            category: normalize_required_text(&cmd.category, "category")?,
            ..cmd
        };
        let occurred_at = Utc::now();

        let tx = with_tx!(self, |db_tx| {
            self.create_expense_in(&db_tx, &cmd, occurred_at).await
        })?;
        tracing::info!(
            "expense {} booked on account {}: {} ({})",
            tx.id,
            cmd.account_id,
            MoneyCents::new(tx.amount_minor),
            tx.category
        );
        Ok(tx)
    }

    async fn create_expense_in(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &CreateExpenseCmd,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        let account = self
            .require_account(db_tx, &cmd.user_id, cmd.account_id)
            .await?;
        if account.balance_minor < cmd.amount_minor {
            return Err(EngineError::InsufficientFunds(format!(
                "account '{}' holds {}, expense needs {}",
                account.name,
                MoneyCents::new(account.balance_minor),
                MoneyCents::new(cmd.amount_minor)
            )));
        }
        self.withdraw(db_tx, cmd.account_id, cmd.amount_minor)
            .await?;

        let category_id = self
            .resolve_category(db_tx, &cmd.user_id, &cmd.category, TransactionKind::Expense)
            .await?;
        let tx = Transaction::new(
            cmd.user_id.clone(),
            cmd.account_id,
            cmd.description.clone(),
            cmd.source.clone(),
            TransactionKind::Expense,
            cmd.amount_minor,
            cmd.category.clone(),
            category_id,
            occurred_at,
        )?;
        self.insert_transaction(db_tx, &tx).await?;

        self.adjust_budget(db_tx, &tx.owner_id, &tx.category, tx.created_at, tx.amount_minor)
            .await?;
        Ok(tx)
    }
}
