use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, prelude::*, sea_query::Expr};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine, Transaction, accounts, transactions,
    util::parse_uuid,
};

use super::{Engine, with_tx};

/// Outcome of reconciling one account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BalanceFix {
    pub account_id: Uuid,
    pub name: String,
    pub old_balance_minor: i64,
    pub new_balance_minor: i64,
    pub transaction_count: usize,
}

impl BalanceFix {
    /// `true` when the stored balance had drifted from the ledger.
    pub fn drifted(&self) -> bool {
        self.old_balance_minor != self.new_balance_minor
    }
}

impl Engine {
    /// Applies `delta_minor` to an account balance as an SQL increment.
    ///
    /// Callers validate the account beforehand; a missing row is logged and
    /// otherwise ignored.
    pub(super) async fn adjust_balance(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        delta_minor: i64,
    ) -> ResultEngine<()> {
        if delta_minor == 0 {
            return Ok(());
        }
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::BalanceMinor,
                Expr::col(accounts::Column::BalanceMinor).add(delta_minor),
            )
            .filter(accounts::Column::Id.eq(account_id.to_string()))
            .exec(db_tx)
            .await?;
        if result.rows_affected == 0 {
            tracing::warn!("balance delta {delta_minor} ignored: account {account_id} not found");
        }
        Ok(())
    }

    /// Debits `amount_minor` only if the balance still covers it.
    ///
    /// The check and the decrement are one statement, so a concurrent debit
    /// committed after the caller's read cannot push the balance below zero.
    pub(super) async fn withdraw(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
        amount_minor: i64,
    ) -> ResultEngine<()> {
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::BalanceMinor,
                Expr::col(accounts::Column::BalanceMinor).sub(amount_minor),
            )
            .filter(accounts::Column::Id.eq(account_id.to_string()))
            .filter(accounts::Column::BalanceMinor.gte(amount_minor))
            .exec(db_tx)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::InsufficientFunds(format!(
                "account {account_id} cannot cover {}",
                MoneyCents::new(amount_minor)
            )));
        }
        Ok(())
    }

    /// Recomputes every account balance of `user_id` from its transactions
    /// and overwrites the stored value.
    ///
    /// This is an absolute write: it must not run while balance-changing
    /// operations on the same accounts are in flight.
    pub async fn reconcile(&self, user_id: &str) -> ResultEngine<Vec<BalanceFix>> {
        let fixes = with_tx!(self, |db_tx| self.reconcile_in(&db_tx, user_id).await)?;
        let drifted = fixes.iter().filter(|fix| fix.drifted()).count();
        tracing::info!(
            "reconciled {} accounts for {user_id}, {drifted} had drifted",
            fixes.len()
        );
        Ok(fixes)
    }

    /// Same as [`Engine::reconcile`] for a single account.
    pub async fn reconcile_account(
        &self,
        user_id: &str,
        account_id: Uuid,
    ) -> ResultEngine<BalanceFix> {
        let fix = with_tx!(self, |db_tx| {
            self.reconcile_account_in(&db_tx, user_id, account_id).await
        })?;
        if fix.drifted() {
            tracing::info!(
                "account {} balance fixed: {} -> {}",
                fix.account_id,
                MoneyCents::new(fix.old_balance_minor),
                MoneyCents::new(fix.new_balance_minor)
            );
        }
        Ok(fix)
    }

    async fn reconcile_in(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<Vec<BalanceFix>> {
        let account_models = accounts::Entity::find()
            .filter(accounts::Column::OwnerId.eq(user_id))
            .order_by_asc(accounts::Column::CreatedAt)
            .all(db_tx)
            .await?;

        let mut fixes = Vec::with_capacity(account_models.len());
        for model in account_models {
            fixes.push(recompute_balance(db_tx, model).await?);
        }
        Ok(fixes)
    }

    async fn reconcile_account_in(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        account_id: Uuid,
    ) -> ResultEngine<BalanceFix> {
        let model = self.require_account(db_tx, user_id, account_id).await?;
        recompute_balance(db_tx, model).await
    }
}

async fn recompute_balance(
    db_tx: &DatabaseTransaction,
    model: accounts::Model,
) -> ResultEngine<BalanceFix> {
    let tx_models = transactions::Entity::find()
        .filter(transactions::Column::AccountId.eq(model.id.clone()))
        .all(db_tx)
        .await?;

    let transaction_count = tx_models.len();
    let mut balance_minor = 0i64;
    for tx_model in tx_models {
        balance_minor += Transaction::try_from(tx_model)?.balance_effect();
    }

    if balance_minor != model.balance_minor {
        accounts::Entity::update_many()
            .col_expr(accounts::Column::BalanceMinor, Expr::value(balance_minor))
            .filter(accounts::Column::Id.eq(model.id.clone()))
            .exec(db_tx)
            .await?;
    }

    Ok(BalanceFix {
        account_id: parse_uuid(&model.id, "account")?,
        name: model.name,
        old_balance_minor: model.balance_minor,
        new_balance_minor: balance_minor,
        transaction_count,
    })
}
