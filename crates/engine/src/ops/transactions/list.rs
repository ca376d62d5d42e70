use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, transactions,
    util::{normalize_optional_text, normalize_required_text},
};

use super::{
    super::{Engine, with_tx},
    TransactionListFilter,
};

const DEFAULT_WINDOW_DAYS: i64 = 7;

impl Engine {
    /// Return a transaction of `user_id`.
    pub async fn transaction(&self, user_id: &str, transaction_id: Uuid) -> ResultEngine<Transaction> {
        let model = transactions::Entity::find_by_id(transaction_id.to_string())
            .filter(transactions::Column::OwnerId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        Transaction::try_from(model)
    }

    /// List transactions of `user_id`, newest first.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        let to = filter.to.unwrap_or_else(Utc::now);
        let from = filter
            .from
            .unwrap_or(to - Duration::days(DEFAULT_WINDOW_DAYS));
        if from > to {
            return Err(EngineError::Validation(
                "invalid range: from must be <= to".to_string(),
            ));
        }

        let mut query = transactions::Entity::find()
            .filter(transactions::Column::OwnerId.eq(user_id))
            .filter(transactions::Column::CreatedAt.gte(from))
            .filter(transactions::Column::CreatedAt.lte(to));

        if let Some(search) = normalize_optional_text(filter.search.as_deref()) {
            // sqlite LIKE folds ASCII case.
            query = query.filter(
                Condition::any()
                    .add(transactions::Column::Description.contains(search.as_str()))
                    .add(transactions::Column::Status.contains(search.as_str()))
                    .add(transactions::Column::Source.contains(search.as_str()))
                    .add(transactions::Column::Category.contains(search.as_str())),
            );
        }

        query
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    /// Store the receipt URL of a transaction, replacing any previous one.
    pub async fn attach_receipt(
        &self,
        user_id: &str,
        transaction_id: Uuid,
        receipt_url: &str,
    ) -> ResultEngine<Transaction> {
        let receipt_url = normalize_required_text(receipt_url, "receipt url")?;
        let tx = with_tx!(self, |db_tx| {
            self.attach_receipt_in(&db_tx, user_id, transaction_id, receipt_url)
                .await
        })?;
        tracing::info!("receipt attached to transaction {}", tx.id);
        Ok(tx)
    }

    async fn attach_receipt_in(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        transaction_id: Uuid,
        receipt_url: String,
    ) -> ResultEngine<Transaction> {
        self.require_transaction(db_tx, user_id, transaction_id)
            .await?;
        let active = transactions::ActiveModel {
            id: ActiveValue::Set(transaction_id.to_string()),
            receipt_url: ActiveValue::Set(Some(receipt_url)),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        let model = active.update(db_tx).await?;
        Transaction::try_from(model)
    }
}
