use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Account, EngineError, MoneyCents, OpenAccountCmd, ResultEngine, Transaction, TransactionKind,
    accounts,
    util::{mask_account_number, normalize_required_text},
};

use super::{Engine, with_tx};

const INITIAL_DEPOSIT: &str = "Initial Deposit";
const ACCOUNT_FUNDING: &str = "Account Funding";

struct NewAccount {
    user_id: String,
    name: String,
    kind: String,
    account_number: String,
    opening_minor: i64,
    created_at: DateTime<Utc>,
}

impl Engine {
    /// Opens a new account.
    ///
    /// Names are unique per owner, case-insensitive. A positive opening
    /// amount is booked as an "Initial Deposit" income so the balance stays
    /// derivable from the transaction history.
    pub async fn open_account(&self, cmd: OpenAccountCmd) -> ResultEngine<Account> {
        if cmd.opening_minor < 0 {
            return Err(EngineError::Validation(
                "opening amount must be >= 0".to_string(),
            ));
        }
        let new_account = NewAccount {
            user_id: normalize_required_text(&cmd.user_id, "user")?,
            name: normalize_required_text(&cmd.name, "account name")?,
            kind: normalize_required_text(&cmd.kind, "account type")?,
            account_number: mask_account_number(&cmd.account_number)?,
            opening_minor: cmd.opening_minor,
            created_at: Utc::now(),
        };

        let account = with_tx!(self, |db_tx| {
            self.open_account_in(&db_tx, &new_account).await
        })?;
        tracing::info!(
            "account '{}' ({}) opened for {} with {}",
            account.name,
            account.id,
            account.owner_id,
            MoneyCents::new(account.balance_minor)
        );
        Ok(account)
    }

    /// Deposits `amount_minor` into an account as an "Account Funding" income.
    pub async fn add_money(
        &self,
        user_id: &str,
        account_id: Uuid,
        amount_minor: i64,
    ) -> ResultEngine<Transaction> {
        MoneyCents::new(amount_minor).positive("amount")?;
        let occurred_at = Utc::now();

        let tx = with_tx!(self, |db_tx| {
            self.add_money_in(&db_tx, user_id, account_id, amount_minor, occurred_at)
                .await
        })?;
        tracing::info!(
            "account {account_id} funded with {}",
            MoneyCents::new(amount_minor)
        );
        Ok(tx)
    }

    /// Return an account of `user_id`.
    pub async fn account(&self, user_id: &str, account_id: Uuid) -> ResultEngine<Account> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .filter(accounts::Column::OwnerId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        Account::try_from(model)
    }

    /// Return all accounts of `user_id`, newest first.
    pub async fn accounts(&self, user_id: &str) -> ResultEngine<Vec<Account>> {
        accounts::Entity::find()
            .filter(accounts::Column::OwnerId.eq(user_id))
            .order_by_desc(accounts::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Account::try_from)
            .collect()
    }

    /// Loads an account inside the unit, scoped to its owner.
    pub(super) async fn require_account(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        account_id: Uuid,
    ) -> ResultEngine<accounts::Model> {
        accounts::Entity::find_by_id(account_id.to_string())
            .filter(accounts::Column::OwnerId.eq(user_id))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
    }

    async fn open_account_in(
        &self,
        db_tx: &DatabaseTransaction,
        new_account: &NewAccount,
    ) -> ResultEngine<Account> {
        let name_taken = accounts::Entity::find()
            .filter(accounts::Column::OwnerId.eq(new_account.user_id.as_str()))
            .filter(Expr::cust("LOWER(name)").eq(new_account.name.to_lowercase()))
            .one(db_tx)
            .await?;
        if name_taken.is_some() {
            return Err(EngineError::ExistingKey(new_account.name.clone()));
        }

        let account = Account::new(
            new_account.user_id.clone(),
            new_account.name.clone(),
            new_account.kind.clone(),
            new_account.account_number.clone(),
            new_account.created_at,
        );
        accounts::ActiveModel::from(&account).insert(db_tx).await?;

        if new_account.opening_minor > 0 {
            self.book_income(
                db_tx,
                &account.owner_id,
                account.id,
                &account.name,
                INITIAL_DEPOSIT,
                new_account.opening_minor,
                new_account.created_at,
            )
            .await?;
        }

        let model = self
            .require_account(db_tx, &account.owner_id, account.id)
            .await?;
        Account::try_from(model)
    }

    async fn add_money_in(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        account_id: Uuid,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        let account = self.require_account(db_tx, user_id, account_id).await?;
        self.book_income(
            db_tx,
            user_id,
            account_id,
            &account.name,
            ACCOUNT_FUNDING,
            amount_minor,
            occurred_at,
        )
        .await
    }

    /// Credits the account and records the matching income row. The
    /// description doubles as the category name.
    #[allow(clippy::too_many_arguments)]
    async fn book_income(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        account_id: Uuid,
        account_name: &str,
        label: &str,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        self.adjust_balance(db_tx, account_id, amount_minor).await?;
        let category_id = self
            .resolve_category(db_tx, user_id, label, TransactionKind::Income)
            .await?;
        let tx = Transaction::new(
            user_id.to_string(),
            account_id,
            label.to_string(),
            account_name.to_string(),
            TransactionKind::Income,
            amount_minor,
            label.to_string(),
            category_id,
            occurred_at,
        )?;
        self.insert_transaction(db_tx, &tx).await?;
        Ok(tx)
    }
}
