use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseTransaction};

use crate::{
    EditTransactionCmd, MoneyCents, ResultEngine, Transaction, transactions,
    util::normalize_required_text,
};

use super::super::{Engine, with_tx};

impl Engine {
    /// Rewrite a transaction and move its effects accordingly.
    ///
    /// The old effect is reversed on the old account and budget, the new one
    /// applied on the new account and budget. Both budget lookups use the
    /// transaction's original `created_at`.
    ///
    /// There is no funds check: an edit can leave the new account negative.
    pub async fn edit_transaction(&self, cmd: EditTransactionCmd) -> ResultEngine<Transaction> {
        MoneyCents::new(cmd.amount_minor).positive("amount")?;
        let cmd = EditTransactionCmd {
            user_id: normalize_required_text(&cmd.user_id, "user")?,
            description: normalize_required_text(&cmd.description, "description")?,
            source: normalize_required_text(&cmd.source, "source")?,
            category: normalize_required_text(&cmd.category, "category")?,
            ..cmd
        };

        let tx = with_tx!(self, |db_tx| self.edit_transaction_in(&db_tx, &cmd).await)?;
        tracing::info!(
            "transaction {} edited: {} {} on account {}",
            tx.id,
            tx.kind.as_str(),
            MoneyCents::new(tx.amount_minor),
            cmd.account_id
        );
        Ok(tx)
    }

    async fn edit_transaction_in(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: &EditTransactionCmd,
    ) -> ResultEngine<Transaction> {
        let old = self
            .require_transaction(db_tx, &cmd.user_id, cmd.transaction_id)
            .await?;
        self.require_account(db_tx, &cmd.user_id, cmd.account_id)
            .await?;

        if let Some(old_account_id) = old.account_id {
            self.adjust_balance(db_tx, old_account_id, -old.balance_effect())
                .await?;
        }
        self.adjust_balance(
            db_tx,
            cmd.account_id,
            cmd.kind.balance_effect(cmd.amount_minor),
        )
        .await?;

        if old.kind.tracks_budget() {
            self.adjust_budget(
                db_tx,
                &cmd.user_id,
                &old.category,
                old.created_at,
                -old.amount_minor,
            )
            .await?;
        }
        if cmd.kind.tracks_budget() {
            self.adjust_budget(
                db_tx,
                &cmd.user_id,
                &cmd.category,
                old.created_at,
                cmd.amount_minor,
            )
            .await?;
        }

        let category_id = self
            .resolve_category(db_tx, &cmd.user_id, &cmd.category, cmd.kind)
            .await?;

        let active = transactions::ActiveModel {
            id: ActiveValue::Set(old.id.to_string()),
            account_id: ActiveValue::Set(Some(cmd.account_id.to_string())),
            description: ActiveValue::Set(cmd.description.clone()),
            source: ActiveValue::Set(cmd.source.clone()),
            kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
            status: ActiveValue::Set(cmd.status.as_str().to_string()),
            amount_minor: ActiveValue::Set(cmd.amount_minor),
            category: ActiveValue::Set(cmd.category.clone()),
            category_id: ActiveValue::Set(Some(category_id.to_string())),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        let model = active.update(db_tx).await?;
        Transaction::try_from(model)
    }
}
