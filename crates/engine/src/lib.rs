//! Ledger engine: persistence entities, the transaction ledger, monthly
//! budgets and the aggregations built on top of them.
//!
//! Every operation is scoped to a single user id; an entity that belongs to a
//! different user is reported as missing, never as forbidden.

pub use aggregate::{
    BudgetSummaryEntry, CategoryTotal, Dashboard, LedgerStats, MonthlyTrendPoint,
};
pub use budgets::Budget;
pub use calendar::{YearMonth, parse_occurred_at};
pub use commands::{
    CreateBudgetCmd, CreateTransactionCmd, SortField, SortSpec, TransactionPage,
    TransactionQuery, UpdateBudgetCmd, UpdateTransactionCmd,
};
pub use error::EngineError;
pub use money::Money;
pub use ops::{Engine, EngineBuilder};
pub use store::Store;
pub use transactions::{Transaction, TransactionKind};
pub use users::User;

mod aggregate;
mod budgets;
mod calendar;
mod commands;
mod error;
mod money;
mod ops;
mod store;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
