//! Command structs for engine operations.
//!
//! These types group parameters for write operations (create/update of
//! transactions and budgets) and for the ledger listing, keeping call sites
//! readable and avoiding long argument lists.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{EngineError, Money, Transaction, TransactionKind, YearMonth};

/// Create a transaction.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub user_id: String,
    pub kind: TransactionKind,
    pub category: String,
    pub amount: Money,
    pub description: Option<String>,
    /// Defaults to the creation time when `None`.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        kind: TransactionKind,
        category: impl Into<String>,
        amount: Money,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            category: category.into(),
            amount,
            description: None,
            occurred_at: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }
}

/// Update a transaction. `None` fields are left untouched.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub user_id: String,
    pub transaction_id: Uuid,
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub amount: Option<Money>,
    pub description: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, transaction_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            transaction_id,
            kind: None,
            category: None,
            amount: None,
            description: None,
            occurred_at: None,
        }
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: Money) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }
}

/// Create a monthly budget.
#[derive(Clone, Debug)]
pub struct CreateBudgetCmd {
    pub user_id: String,
    pub category: String,
    pub limit: Money,
    pub month: YearMonth,
}

impl CreateBudgetCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        category: impl Into<String>,
        limit: Money,
        month: YearMonth,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            category: category.into(),
            limit,
            month,
        }
    }
}

/// Update a budget. `None` fields are left untouched.
#[derive(Clone, Debug)]
pub struct UpdateBudgetCmd {
    pub user_id: String,
    pub budget_id: Uuid,
    pub category: Option<String>,
    pub limit: Option<Money>,
    pub month: Option<YearMonth>,
}

impl UpdateBudgetCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, budget_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            budget_id,
            category: None,
            limit: None,
            month: None,
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: Money) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn month(mut self, month: YearMonth) -> Self {
        self.month = Some(month);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Date,
    Amount,
}

/// Ordering of a transaction listing.
///
/// Written `date`, `-date`, `amount` or `-amount`; a leading `-` sorts in
/// descending order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub descending: bool,
}

impl Default for SortSpec {
    /// Newest first.
    fn default() -> Self {
        Self {
            field: SortField::Date,
            descending: true,
        }
    }
}

impl FromStr for SortSpec {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (descending, name) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let field = match name {
            "date" => SortField::Date,
            "amount" => SortField::Amount,
            _ => {
                return Err(EngineError::Validation(format!(
                    "invalid sort '{trimmed}', expected date, -date, amount or -amount"
                )));
            }
        };
        Ok(Self { field, descending })
    }
}

/// Filters and paging for [`Engine::list_transactions`].
///
/// [`Engine::list_transactions`]: crate::Engine::list_transactions
#[derive(Clone, Debug)]
pub struct TransactionQuery {
    /// 1-based page number.
    pub page: u64,
    pub page_size: u64,
    /// Case-insensitive substring matched against category or description.
    pub search: Option<String>,
    pub kind: Option<TransactionKind>,
    pub sort: SortSpec,
}

impl TransactionQuery {
    pub const DEFAULT_PAGE: u64 = 1;
    pub const DEFAULT_PAGE_SIZE: u64 = 10;
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            page_size: Self::DEFAULT_PAGE_SIZE,
            search: None,
            kind: None,
            sort: SortSpec::default(),
        }
    }
}

/// One page of a transaction listing.
#[derive(Clone, Debug)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    /// Number of transactions matching the filters, across all pages.
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl TransactionPage {
    #[must_use]
    pub fn page_count(&self) -> u64 {
        self.total.div_ceil(self.page_size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_spec_parses_direction_prefix() {
        assert_eq!(
            "-date".parse::<SortSpec>().unwrap(),
            SortSpec {
                field: SortField::Date,
                descending: true
            }
        );
        assert_eq!(
            "amount".parse::<SortSpec>().unwrap(),
            SortSpec {
                field: SortField::Amount,
                descending: false
            }
        );
        assert!("-createdAt".parse::<SortSpec>().is_err());
        assert!("".parse::<SortSpec>().is_err());
    }

    #[test]
    fn default_query_is_first_page_of_ten_newest_first() {
        let query = TransactionQuery::default();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 10);
        assert_eq!(query.sort, SortSpec::default());
        assert!(query.sort.descending);
    }

    #[test]
    fn page_count_rounds_up() {
        let page = |total| TransactionPage {
            transactions: Vec::new(),
            total,
            page: 1,
            page_size: 10,
        };
        assert_eq!(page(0).page_count(), 0);
        assert_eq!(page(10).page_count(), 1);
        assert_eq!(page(11).page_count(), 2);
    }
}
