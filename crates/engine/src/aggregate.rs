//! Derived, non-persisted views over a user's ledger.
//!
//! The sums themselves come from `GROUP BY` queries in the ops layer; this
//! module shapes the grouped rows into the records the API returns.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::{Budget, EngineError, Money, ResultEngine, TransactionKind, YearMonth};

/// Total expense for one category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Money,
}

/// Income and expense totals for one calendar month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthlyTrendPoint {
    pub year: i32,
    pub month: u32,
    pub income: Money,
    pub expense: Money,
}

/// A budget compared against the actual spend of its month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetSummaryEntry {
    pub budget_id: Uuid,
    pub category: String,
    pub limit: Money,
    pub spent: Money,
    /// `limit - spent`, negative once the budget is exceeded.
    pub remaining: Money,
    /// `remaining < 0`.
    pub over_budget: bool,
}

impl BudgetSummaryEntry {
    pub fn new(budget: &Budget, spent: Money) -> ResultEngine<Self> {
        let remaining = difference(budget.limit, spent)?;
        Ok(Self {
            budget_id: budget.id,
            category: budget.category.clone(),
            limit: budget.limit,
            spent,
            remaining,
            over_budget: remaining.is_negative(),
        })
    }
}

/// Lifetime aggregates of a user's ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerStats {
    pub income: Money,
    pub expense: Money,
    /// Expense per category, largest first.
    pub categories: Vec<CategoryTotal>,
    /// Chronological monthly series.
    pub monthly: Vec<MonthlyTrendPoint>,
}

/// Everything the dashboard shows for one month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dashboard {
    pub month: YearMonth,
    pub income: Money,
    pub expense: Money,
    /// `income - expense` for the month.
    pub balance: Money,
    pub categories: Vec<CategoryTotal>,
    /// Full-history monthly series, not limited to `month`.
    pub monthly: Vec<MonthlyTrendPoint>,
    pub budgets: Vec<BudgetSummaryEntry>,
}

/// `a - b`, failing instead of wrapping.
pub(crate) fn difference(a: Money, b: Money) -> ResultEngine<Money> {
    a.checked_sub(b)
        .ok_or_else(|| EngineError::Validation("amount out of range".to_string()))
}

/// Folds `(month, kind, total)` rows into one point per month, oldest first.
/// Months without transactions are omitted.
pub(crate) fn monthly_series(
    rows: impl IntoIterator<Item = (YearMonth, TransactionKind, Money)>,
) -> ResultEngine<Vec<MonthlyTrendPoint>> {
    let mut months: BTreeMap<YearMonth, (Money, Money)> = BTreeMap::new();
    for (month, kind, total) in rows {
        let (income, expense) = months.entry(month).or_default();
        let slot = match kind {
            TransactionKind::Income => income,
            TransactionKind::Expense => expense,
        };
        *slot = slot
            .checked_add(total)
            .ok_or_else(|| EngineError::Validation("amount out of range".to_string()))?;
    }
    Ok(months
        .into_iter()
        .map(|(month, (income, expense))| MonthlyTrendPoint {
            year: month.year(),
            month: month.month(),
            income,
            expense,
        })
        .collect())
}

/// One entry per budget, in the order given. `spent` maps a category to the
/// expense total of the budgets' month.
pub(crate) fn summarize_budgets(
    budgets: &[Budget],
    spent: &[CategoryTotal],
) -> ResultEngine<Vec<BudgetSummaryEntry>> {
    let spent: HashMap<&str, Money> = spent
        .iter()
        .map(|c| (c.category.as_str(), c.total))
        .collect();
    budgets
        .iter()
        .map(|budget| {
            let spent = spent
                .get(budget.category.as_str())
                .copied()
                .unwrap_or(Money::ZERO);
            BudgetSummaryEntry::new(budget, spent)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn budget(category: &str, limit_cents: i64) -> Budget {
        let now = Utc::now();
        Budget {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            category: category.to_string(),
            limit: Money::new(limit_cents),
            month: "2025-06".parse().unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    fn spent(category: &str, cents: i64) -> CategoryTotal {
        CategoryTotal {
            category: category.to_string(),
            total: Money::new(cents),
        }
    }

    fn ym(raw: &str) -> YearMonth {
        raw.parse().unwrap()
    }

    use TransactionKind::{Expense, Income};

    #[test]
    fn monthly_series_is_chronological() {
        let rows = vec![
            (ym("2025-02"), Expense, Money::new(100)),
            (ym("2024-12"), Income, Money::new(1000)),
            (ym("2025-02"), Income, Money::new(1000)),
            (ym("2024-12"), Expense, Money::new(50)),
        ];
        let series = monthly_series(rows).unwrap();
        assert_eq!(
            series,
            vec![
                MonthlyTrendPoint {
                    year: 2024,
                    month: 12,
                    income: Money::new(1000),
                    expense: Money::new(50),
                },
                MonthlyTrendPoint {
                    year: 2025,
                    month: 2,
                    income: Money::new(1000),
                    expense: Money::new(100),
                },
            ]
        );
        assert!(monthly_series(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn monthly_series_rejects_overflow() {
        let rows = vec![
            (ym("2025-02"), Expense, Money::new(i64::MAX)),
            (ym("2025-02"), Expense, Money::new(1)),
        ];
        assert!(matches!(
            monthly_series(rows),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn summary_computes_remaining_and_over_budget() {
        let budgets = vec![budget("Food", 100_000), budget("Travel", 20_000)];
        let summary =
            summarize_budgets(&budgets, &[spent("Food", 110_000), spent("Games", 7_000)]).unwrap();
        assert_eq!(summary.len(), 2);

        assert_eq!(summary[0].category, "Food");
        assert_eq!(summary[0].spent, Money::new(110_000));
        assert_eq!(summary[0].remaining, Money::new(-10_000));
        assert!(summary[0].over_budget);

        assert_eq!(summary[1].spent, Money::ZERO);
        assert_eq!(summary[1].remaining, Money::new(20_000));
        assert!(!summary[1].over_budget);
    }

    #[test]
    fn zero_limit_is_over_budget_with_any_spend() {
        let budgets = vec![budget("Coffee", 0)];
        let untouched = summarize_budgets(&budgets, &[]).unwrap();
        assert!(!untouched[0].over_budget);
        assert_eq!(untouched[0].remaining, Money::ZERO);

        let summary = summarize_budgets(&budgets, &[spent("Coffee", 1)]).unwrap();
        assert!(summary[0].over_budget);
    }

    #[test]
    fn duplicate_budgets_are_summarised_independently() {
        let budgets = vec![budget("Food", 1000), budget("Food", 300)];
        let summary = summarize_budgets(&budgets, &[spent("Food", 500)]).unwrap();
        assert_eq!(summary.len(), 2);
        assert!(!summary[0].over_budget);
        assert!(summary[1].over_budget);
        assert_eq!(summary[0].spent, summary[1].spent);
    }

    #[test]
    fn spend_matches_category_exactly() {
        let summary = summarize_budgets(&[budget("food", 1000)], &[spent("Food", 500)]).unwrap();
        assert_eq!(summary[0].spent, Money::ZERO);
    }

    #[test]
    fn remaining_never_wraps() {
        let mut huge = budget("Food", 0);
        huge.limit = Money::new(i64::MIN);
        assert!(matches!(
            BudgetSummaryEntry::new(&huge, Money::new(1)),
            Err(EngineError::Validation(_))
        ));
    }
}
