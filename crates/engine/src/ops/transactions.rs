use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, ConnectionTrait, Order, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
    prelude::*,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};
use uuid::Uuid;

use crate::{
    CreateTransactionCmd, EngineError, ResultEngine, SortField, Transaction, TransactionPage,
    TransactionQuery, UpdateTransactionCmd, transactions,
    util::{contains_pattern, ensure_amount, normalize_optional_text, normalize_required_text},
};

use super::{Engine, with_tx};

const NOT_FOUND: &str = "Transaction not found";

/// Checks paging bounds and returns the row offset of the requested page.
///
/// Offsets and limits are bound as signed 64-bit integers, so both must fit.
fn page_offset(query: &TransactionQuery) -> ResultEngine<u64> {
    const MAX_BOUND: u64 = i64::MAX as u64;

    if query.page == 0 {
        return Err(EngineError::Validation("page must be >= 1".to_string()));
    }
    if query.page_size == 0 {
        return Err(EngineError::Validation("limit must be >= 1".to_string()));
    }
    if query.page_size > MAX_BOUND {
        return Err(EngineError::Validation("limit is too large".to_string()));
    }
    (query.page - 1)
        .checked_mul(query.page_size)
        .filter(|offset| *offset <= MAX_BOUND)
        .ok_or_else(|| EngineError::Validation("page is too large".to_string()))
}

/// `LOWER(column) LIKE pattern ESCAPE '\'`
fn lower_like(column: transactions::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

impl Engine {
    /// Loads a transaction owned by `user_id`, reporting foreign ids as missing.
    pub(super) async fn find_owned_transaction<C: ConnectionTrait>(
        db: &C,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<transactions::Model> {
        transactions::Entity::find_by_id(transaction_id.to_string())
            .filter(transactions::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(NOT_FOUND.to_string()))
    }

    /// Records a new income or expense.
    pub async fn create_transaction(&self, cmd: CreateTransactionCmd) -> ResultEngine<Transaction> {
        let category = normalize_required_text(&cmd.category, "category")?;
        ensure_amount(cmd.amount, "amount")?;

        let now = Utc::now();
        let tx = Transaction {
            id: Uuid::new_v4(),
            user_id: cmd.user_id,
            kind: cmd.kind,
            category,
            description: normalize_optional_text(cmd.description.as_deref()),
            amount: cmd.amount,
            occurred_at: cmd.occurred_at.unwrap_or(now),
            created_at: now,
            updated_at: now,
        };

        transactions::ActiveModel::from(&tx)
            .insert(self.db().await?)
            .await?;
        tracing::debug!(transaction_id = %tx.id, kind = %tx.kind, "transaction created");

        Ok(tx)
    }

    /// Returns one of the user's transactions.
    pub async fn transaction(&self, user_id: &str, transaction_id: Uuid) -> ResultEngine<Transaction> {
        let model = Self::find_owned_transaction(self.db().await?, user_id, transaction_id).await?;
        Transaction::try_from(model)
    }

    /// Replaces the supplied fields of a transaction (last write wins).
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<Transaction> {
        let category = cmd
            .category
            .as_deref()
            .map(|c| normalize_required_text(c, "category"))
            .transpose()?;
        if let Some(amount) = cmd.amount {
            ensure_amount(amount, "amount")?;
        }

        with_tx!(self, |db_tx| {
            let model =
                Self::find_owned_transaction(&db_tx, &cmd.user_id, cmd.transaction_id).await?;
            let mut active: transactions::ActiveModel = model.into();

            if let Some(kind) = cmd.kind {
                active.kind = ActiveValue::Set(kind.as_str().to_string());
            }
            if let Some(category) = category {
                active.category = ActiveValue::Set(category);
            }
            if let Some(amount) = cmd.amount {
                active.amount_minor = ActiveValue::Set(amount.cents());
            }
            if cmd.description.is_some() {
                active.description =
                    ActiveValue::Set(normalize_optional_text(cmd.description.as_deref()));
            }
            if let Some(occurred_at) = cmd.occurred_at {
                active.occurred_at = ActiveValue::Set(occurred_at);
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let updated = active.update(&db_tx).await?;
            tracing::debug!(transaction_id = %cmd.transaction_id, "transaction updated");
            Transaction::try_from(updated)
        })
    }

    /// Deletes a transaction. Deleting an id twice reports not-found.
    pub async fn delete_transaction(&self, user_id: &str, transaction_id: Uuid) -> ResultEngine<()> {
        let result = transactions::Entity::delete_many()
            .filter(transactions::Column::Id.eq(transaction_id.to_string()))
            .filter(transactions::Column::UserId.eq(user_id))
            .exec(self.db().await?)
            .await?;

        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound(NOT_FOUND.to_string()));
        }
        tracing::debug!(transaction_id = %transaction_id, "transaction deleted");
        Ok(())
    }

    /// Lists one page of the user's transactions.
    ///
    /// Ties on the sort field are broken by id in the same direction, so the
    /// pages partition the result set.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        query: &TransactionQuery,
    ) -> ResultEngine<TransactionPage> {
        let offset = page_offset(query)?;
        let db = self.db().await?;

        let mut select =
            transactions::Entity::find().filter(transactions::Column::UserId.eq(user_id));
        if let Some(kind) = query.kind {
            select = select.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = contains_pattern(search);
            select = select.filter(
                Condition::any()
                    .add(lower_like(transactions::Column::Category, &pattern))
                    .add(lower_like(transactions::Column::Description, &pattern)),
            );
        }

        let total = select.clone().count(db).await?;

        let column = match query.sort.field {
            SortField::Date => transactions::Column::OccurredAt,
            SortField::Amount => transactions::Column::AmountMinor,
        };
        let order = if query.sort.descending {
            Order::Desc
        } else {
            Order::Asc
        };

        let transactions = select
            .order_by(column, order.clone())
            .order_by(transactions::Column::Id, order)
            .offset(offset)
            .limit(query.page_size)
            .all(db)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(TransactionPage {
            transactions,
            total,
            page: query.page,
            page_size: query.page_size,
        })
    }
}
