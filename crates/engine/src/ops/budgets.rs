use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Budget, BudgetCmd, EngineError, MoneyCents, ResultEngine,
    budgets::{self, period_bounds, select_budget},
    util::{normalize_required_text, parse_uuid},
};

use super::{Engine, transactions::is_transfer_category, with_tx};

/// Budget fields after validation.
struct BudgetInput {
    user_id: String,
    category: String,
    amount_minor: i64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
}

impl TryFrom<BudgetCmd> for BudgetInput {
    type Error = EngineError;

    fn try_from(cmd: BudgetCmd) -> Result<Self, Self::Error> {
        MoneyCents::new(cmd.amount_minor).positive("budget amount")?;
        let (start_date, end_date) = period_bounds(cmd.start_date, cmd.end_date)?;
        Ok(Self {
            user_id: normalize_required_text(&cmd.user_id, "user")?,
            category: normalize_required_text(&cmd.category, "category")?,
            amount_minor: cmd.amount_minor,
            start_date,
            end_date,
        })
    }
}

impl Engine {
    /// Adds `delta_minor` to the spend of the budget matching
    /// `(user_id, category)` at `at`.
    ///
    /// No matching budget is not an error: the transaction simply isn't
    /// budgeted. Returns the id of the budget that was touched.
    pub(super) async fn adjust_budget(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        category: &str,
        at: DateTime<Utc>,
        delta_minor: i64,
    ) -> ResultEngine<Option<Uuid>> {
        if delta_minor == 0 {
            return Ok(None);
        }
        if is_transfer_category(category) {
            tracing::debug!("'{category}' belongs to a transfer, budgets untouched");
            return Ok(None);
        }
        let candidates = budgets::Entity::find()
            .filter(budgets::Column::OwnerId.eq(user_id))
            .filter(budgets::Column::Category.eq(category))
            .all(db_tx)
            .await?;
        let Some(budget) = select_budget(candidates, at) else {
            tracing::debug!("no budget for '{category}' at {at}");
            return Ok(None);
        };
        tracing::debug!("budget {} matched for '{category}', delta {delta_minor}", budget.id);

        budgets::Entity::update_many()
            .col_expr(
                budgets::Column::SpentMinor,
                Expr::col(budgets::Column::SpentMinor).add(delta_minor),
            )
            .filter(budgets::Column::Id.eq(budget.id.clone()))
            .exec(db_tx)
            .await?;
        Ok(Some(parse_uuid(&budget.id, "budget")?))
    }

    /// Create a budget for a category over `[start_date, end_date]`.
    ///
    /// `spent_minor` starts at zero; transactions booked before the budget
    /// existed are not counted.
    pub async fn create_budget(&self, cmd: BudgetCmd) -> ResultEngine<Budget> {
        let input = BudgetInput::try_from(cmd)?;
        let now = Utc::now();
        let budget = Budget {
            id: Uuid::new_v4(),
            owner_id: input.user_id,
            category: input.category,
            amount_minor: input.amount_minor,
            spent_minor: 0,
            start_date: input.start_date,
            end_date: input.end_date,
            created_at: now,
            updated_at: now,
        };

        let active = budgets::ActiveModel {
            id: ActiveValue::Set(budget.id.to_string()),
            owner_id: ActiveValue::Set(budget.owner_id.clone()),
            category: ActiveValue::Set(budget.category.clone()),
            amount_minor: ActiveValue::Set(budget.amount_minor),
            spent_minor: ActiveValue::Set(budget.spent_minor),
            start_date: ActiveValue::Set(budget.start_date),
            end_date: ActiveValue::Set(budget.end_date),
            created_at: ActiveValue::Set(budget.created_at),
            updated_at: ActiveValue::Set(budget.updated_at),
        };
        active.insert(&self.database).await?;
        tracing::info!(
            "budget {} for '{}' created: {}",
            budget.id,
            budget.category,
            MoneyCents::new(budget.amount_minor)
        );
        Ok(budget)
    }

    /// Return a budget of `user_id`.
    pub async fn budget(&self, user_id: &str, budget_id: Uuid) -> ResultEngine<Budget> {
        let model = budgets::Entity::find_by_id(budget_id.to_string())
            .filter(budgets::Column::OwnerId.eq(user_id))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))?;
        Budget::try_from(model)
    }

    /// Return the budgets of `user_id`, most recent period first.
    pub async fn budgets(&self, user_id: &str) -> ResultEngine<Vec<Budget>> {
        budgets::Entity::find()
            .filter(budgets::Column::OwnerId.eq(user_id))
            .order_by_desc(budgets::Column::StartDate)
            .order_by_desc(budgets::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Budget::try_from)
            .collect()
    }

    /// Overwrite category, amount and period of a budget. `spent_minor` is
    /// kept as is.
    pub async fn update_budget(&self, budget_id: Uuid, cmd: BudgetCmd) -> ResultEngine<Budget> {
        let input = BudgetInput::try_from(cmd)?;
        let budget = with_tx!(self, |db_tx| {
            self.update_budget_in(&db_tx, budget_id, &input).await
        })?;
        tracing::info!("budget {budget_id} updated");
        Ok(budget)
    }

    /// Delete a budget. Transactions keep their rows and balances.
    pub async fn delete_budget(&self, user_id: &str, budget_id: Uuid) -> ResultEngine<()> {
        let result = budgets::Entity::delete_many()
            .filter(budgets::Column::Id.eq(budget_id.to_string()))
            .filter(budgets::Column::OwnerId.eq(user_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("budget not exists".to_string()));
        }
        tracing::info!("budget {budget_id} deleted");
        Ok(())
    }

    async fn update_budget_in(
        &self,
        db_tx: &DatabaseTransaction,
        budget_id: Uuid,
        input: &BudgetInput,
    ) -> ResultEngine<Budget> {
        budgets::Entity::find_by_id(budget_id.to_string())
            .filter(budgets::Column::OwnerId.eq(input.user_id.as_str()))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))?;

        let active = budgets::ActiveModel {
            id: ActiveValue::Set(budget_id.to_string()),
            category: ActiveValue::Set(input.category.clone()),
            amount_minor: ActiveValue::Set(input.amount_minor),
            start_date: ActiveValue::Set(input.start_date),
            end_date: ActiveValue::Set(input.end_date),
            updated_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        };
        let model = active.update(db_tx).await?;
        Budget::try_from(model)
    }
}
