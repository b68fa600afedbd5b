use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, Statement, Value};

use crate::{
    BudgetSummaryEntry, CategoryTotal, Dashboard, LedgerStats, Money, MonthlyTrendPoint,
    ResultEngine, TransactionKind, YearMonth, aggregate,
};

use super::Engine;

type Range = Option<(DateTime<Utc>, DateTime<Utc>)>;

/// Appends the `[from, to)` bounds to `values` and returns the matching
/// `occurred_at` condition.
fn range_condition(range: Range, values: &mut Vec<Value>) -> &'static str {
    match range {
        Some((from, to)) => {
            values.push(from.into());
            values.push(to.into());
            " AND occurred_at >= ? AND occurred_at < ?"
        }
        None => "",
    }
}

impl Engine {
    /// Returns `(income, expense)` of the user, optionally within `range`.
    async fn kind_totals<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
        range: Range,
    ) -> ResultEngine<(Money, Money)> {
        let mut values: Vec<Value> = vec![user_id.into()];
        let range_cond = range_condition(range, &mut values);
        let stmt = Statement::from_sql_and_values(
            db.get_database_backend(),
            format!(
                "SELECT kind, COALESCE(SUM(amount_minor), 0) AS total \
                 FROM transactions \
                 WHERE user_id = ?{range_cond} \
                 GROUP BY kind"
            ),
            values,
        );

        let (mut income, mut expense) = (Money::ZERO, Money::ZERO);
        for row in db.query_all(stmt).await? {
            let kind: String = row.try_get("", "kind")?;
            let total = Money::new(row.try_get("", "total")?);
            match kind.parse::<TransactionKind>()? {
                TransactionKind::Income => income = total,
                TransactionKind::Expense => expense = total,
            }
        }
        Ok((income, expense))
    }

    /// Expense per category, largest first (ties by name).
    async fn expense_by_category<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
        range: Range,
    ) -> ResultEngine<Vec<CategoryTotal>> {
        let mut values: Vec<Value> = vec![user_id.into(), TransactionKind::Expense.as_str().into()];
        let range_cond = range_condition(range, &mut values);
        let stmt = Statement::from_sql_and_values(
            db.get_database_backend(),
            format!(
                "SELECT category, SUM(amount_minor) AS total \
                 FROM transactions \
                 WHERE user_id = ? AND kind = ?{range_cond} \
                 GROUP BY category \
                 ORDER BY total DESC, category ASC"
            ),
            values,
        );

        db.query_all(stmt)
            .await?
            .into_iter()
            .map(|row| -> ResultEngine<CategoryTotal> {
                Ok(CategoryTotal {
                    category: row.try_get("", "category")?,
                    total: Money::new(row.try_get("", "total")?),
                })
            })
            .collect()
    }

    /// Income and expense per calendar month over the whole history.
    async fn monthly_trend<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
    ) -> ResultEngine<Vec<MonthlyTrendPoint>> {
        // `occurred_at` is stored as RFC 3339 text in UTC, so its first seven
        // characters are the `YYYY-MM` month.
        let stmt = Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT substr(occurred_at, 1, 7) AS period, kind, SUM(amount_minor) AS total \
             FROM transactions \
             WHERE user_id = ? \
             GROUP BY period, kind",
            vec![user_id.into()],
        );

        let rows = db
            .query_all(stmt)
            .await?
            .into_iter()
            .map(|row| -> ResultEngine<(YearMonth, TransactionKind, Money)> {
                let period: String = row.try_get("", "period")?;
                let kind: String = row.try_get("", "kind")?;
                Ok((
                    period.parse::<YearMonth>()?,
                    kind.parse::<TransactionKind>()?,
                    Money::new(row.try_get("", "total")?),
                ))
            })
            .collect::<ResultEngine<Vec<_>>>()?;
        aggregate::monthly_series(rows)
    }

    /// Lifetime totals, expense per category and the monthly trend series.
    pub async fn transaction_stats(&self, user_id: &str) -> ResultEngine<LedgerStats> {
        let db = self.db().await?;
        let (income, expense) = Self::kind_totals(db, user_id, None).await?;

        Ok(LedgerStats {
            income,
            expense,
            categories: Self::expense_by_category(db, user_id, None).await?,
            monthly: Self::monthly_trend(db, user_id).await?,
        })
    }

    /// Compares every budget of `month` with the month's expenses in the same
    /// category. Budgets are returned in creation order.
    pub async fn budget_summary(
        &self,
        user_id: &str,
        month: YearMonth,
    ) -> ResultEngine<Vec<BudgetSummaryEntry>> {
        let db = self.db().await?;
        let budgets = Self::budgets_of_month(db, user_id, month).await?;
        if budgets.is_empty() {
            return Ok(Vec::new());
        }

        let spent = Self::expense_by_category(db, user_id, Some(month.range()?)).await?;
        aggregate::summarize_budgets(&budgets, &spent)
    }

    /// Month totals, month category breakdown, the full-history trend and the
    /// month's budget summary in one read.
    pub async fn dashboard(&self, user_id: &str, month: YearMonth) -> ResultEngine<Dashboard> {
        let db = self.db().await?;
        let range = Some(month.range()?);

        let (income, expense) = Self::kind_totals(db, user_id, range).await?;
        let categories = Self::expense_by_category(db, user_id, range).await?;
        let budgets = Self::budgets_of_month(db, user_id, month).await?;

        Ok(Dashboard {
            month,
            income,
            expense,
            balance: aggregate::difference(income, expense)?,
            budgets: aggregate::summarize_budgets(&budgets, &categories)?,
            categories,
            monthly: Self::monthly_trend(db, user_id).await?,
        })
    }
}
