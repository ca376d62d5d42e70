use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};

use crate::{EngineError, ResultEngine};

mod accounts;
mod balances;
mod budgets;
mod categories;
mod transactions;

pub use balances::BalanceFix;
pub use transactions::{
    TRANSFER_IN_CATEGORY, TRANSFER_OUT_CATEGORY, TransactionListFilter, TransferReceipt,
};

/// Run `$body` inside one atomic unit.
///
/// The unit commits when `$body` evaluates to `Ok`, and is aborted when it
/// evaluates to `Err`. `$body` must not early-return with `?`: put the
/// steps in a `*_in(&db_tx, ..)` method and call it here.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.begin_unit().await?;
        let result = $body;
        $self.finish_unit($tx, result).await
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    async fn begin_unit(&self) -> ResultEngine<DatabaseTransaction> {
        self.database.begin().await.map_err(|err| {
            tracing::error!("cannot open atomic unit: {err}");
            EngineError::StorageUnavailable(err)
        })
    }

    async fn finish_unit<T>(
        &self,
        unit: DatabaseTransaction,
        result: ResultEngine<T>,
    ) -> ResultEngine<T> {
        match result {
            Ok(value) => settle_commit(value, unit.commit().await),
            Err(cause) => settle_abort(cause, unit.rollback().await),
        }
    }
}

/// Outcome of a unit whose steps all succeeded.
fn settle_commit<T>(value: T, commit: Result<(), DbErr>) -> ResultEngine<T> {
    match commit {
        Ok(()) => Ok(value),
        Err(err) => {
            tracing::error!("atomic unit commit failed: {err}");
            Err(EngineError::CommitFailed(err))
        }
    }
}

/// Outcome of a unit aborted because of `cause`.
fn settle_abort<T>(cause: EngineError, abort: Result<(), DbErr>) -> ResultEngine<T> {
    match abort {
        Ok(()) => {
            tracing::debug!("atomic unit aborted: {cause}");
            Err(cause)
        }
        Err(abort) => {
            tracing::error!(
                "FATAL ledger inconsistency: abort failed ({abort}) after: {cause}; \
                 run a reconcile before accepting new writes"
            );
            Err(EngineError::AbortFailed {
                cause: Box::new(cause),
                abort,
            })
        }
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
