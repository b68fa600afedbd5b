use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Budget, CreateBudgetCmd, EngineError, ResultEngine, UpdateBudgetCmd, YearMonth, budgets,
    util::{ensure_amount, normalize_required_text},
};

use super::{Engine, with_tx};

const NOT_FOUND: &str = "Budget not found";

impl Engine {
    async fn find_owned_budget<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
        budget_id: Uuid,
    ) -> ResultEngine<budgets::Model> {
        budgets::Entity::find_by_id(budget_id.to_string())
            .filter(budgets::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(NOT_FOUND.to_string()))
    }

    /// The user's budgets for `month`, oldest first.
    pub(super) async fn budgets_of_month<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
        month: YearMonth,
    ) -> ResultEngine<Vec<Budget>> {
        budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::Month.eq(month.to_string()))
            .order_by_asc(budgets::Column::CreatedAt)
            .order_by_asc(budgets::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(Budget::try_from)
            .collect()
    }

    /// Sets a spending limit for a category in a month.
    ///
    /// Duplicate `(category, month)` pairs are accepted.
    pub async fn create_budget(&self, cmd: CreateBudgetCmd) -> ResultEngine<Budget> {
        let category = normalize_required_text(&cmd.category, "category")?;
        ensure_amount(cmd.limit, "limit")?;

        let now = Utc::now();
        let budget = Budget {
            id: Uuid::new_v4(),
            user_id: cmd.user_id,
            category,
            limit: cmd.limit,
            month: cmd.month,
            created_at: now,
            updated_at: now,
        };

        budgets::ActiveModel::from(&budget)
            .insert(self.db().await?)
            .await?;
        tracing::debug!(budget_id = %budget.id, month = %budget.month, "budget created");

        Ok(budget)
    }

    /// The user's budgets, optionally for one month only, most recently
    /// created first.
    pub async fn list_budgets(
        &self,
        user_id: &str,
        month: Option<YearMonth>,
    ) -> ResultEngine<Vec<Budget>> {
        let mut select = budgets::Entity::find().filter(budgets::Column::UserId.eq(user_id));
        if let Some(month) = month {
            select = select.filter(budgets::Column::Month.eq(month.to_string()));
        }

        select
            .order_by_desc(budgets::Column::CreatedAt)
            .order_by_desc(budgets::Column::Id)
            .all(self.db().await?)
            .await?
            .into_iter()
            .map(Budget::try_from)
            .collect()
    }

    pub async fn update_budget(&self, cmd: UpdateBudgetCmd) -> ResultEngine<Budget> {
        let category = cmd
            .category
            .as_deref()
            .map(|c| normalize_required_text(c, "category"))
            .transpose()?;
        if let Some(limit) = cmd.limit {
            ensure_amount(limit, "limit")?;
        }

        with_tx!(self, |db_tx| {
            let model = Self::find_owned_budget(&db_tx, &cmd.user_id, cmd.budget_id).await?;
            let mut active: budgets::ActiveModel = model.into();

            if let Some(category) = category {
                active.category = ActiveValue::Set(category);
            }
            if let Some(limit) = cmd.limit {
                active.limit_minor = ActiveValue::Set(limit.cents());
            }
            if let Some(month) = cmd.month {
                active.month = ActiveValue::Set(month.to_string());
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let updated = active.update(&db_tx).await?;
            tracing::debug!(budget_id = %cmd.budget_id, "budget updated");
            Budget::try_from(updated)
        })
    }

    pub async fn delete_budget(&self, user_id: &str, budget_id: Uuid) -> ResultEngine<()> {
        let result = budgets::Entity::delete_many()
            .filter(budgets::Column::Id.eq(budget_id.to_string()))
            .filter(budgets::Column::UserId.eq(user_id))
            .exec(self.db().await?)
            .await?;

        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(NOT_FOUND.to_string()));
        }
        tracing::debug!(budget_id = %budget_id, "budget deleted");
        Ok(())
    }
}
