//! Transactions API endpoints

use api_types::{
    Empty, Success,
    stats::{CategoryTotal, LedgerStats, MonthlyTrendPoint},
    transaction::{
        TransactionDelete, TransactionKind as ApiKind, TransactionList, TransactionListResponse,
        TransactionNew, TransactionResponse, TransactionUpdate, TransactionView,
    },
};
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{
    CreateTransactionCmd, TransactionKind, TransactionQuery, UpdateTransactionCmd, User,
};

use crate::{
    ServerError,
    extract::{ApiJson, ApiQuery, optional_json},
    params::{amount, non_blank, parse_amount, parse_date, parse_id},
    server::ServerState,
};

const NOT_FOUND: &str = "Transaction not found";
const ID_REQUIRED: &str = "Transaction ID required";
const REQUIRED_FIELDS: &str = "Type, category, and amount are required";

fn map_kind(kind: TransactionKind) -> ApiKind {
    match kind {
        TransactionKind::Income => ApiKind::Income,
        TransactionKind::Expense => ApiKind::Expense,
    }
}

pub(crate) fn view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        kind: map_kind(tx.kind),
        category: tx.category,
        description: tx.description,
        amount: amount(tx.amount),
        date: tx.occurred_at,
        created_at: tx.created_at,
        updated_at: tx.updated_at,
    }
}

pub(crate) fn category_total(total: engine::CategoryTotal) -> CategoryTotal {
    CategoryTotal {
        category: total.category,
        total: amount(total.total),
    }
}

pub(crate) fn trend_point(point: engine::MonthlyTrendPoint) -> MonthlyTrendPoint {
    MonthlyTrendPoint {
        year: point.year,
        month: point.month,
        income: amount(point.income),
        expense: amount(point.expense),
    }
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<TransactionNew>,
) -> Result<(StatusCode, Json<Success<TransactionResponse>>), ServerError> {
    let (Some(kind), Some(category), Some(raw_amount)) =
        (payload.kind, payload.category, payload.amount)
    else {
        return Err(ServerError::BadRequest(REQUIRED_FIELDS.to_string()));
    };

    let mut cmd = CreateTransactionCmd::new(
        user.id,
        TransactionKind::try_from(kind.trim())?,
        category,
        parse_amount(&raw_amount)?,
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(date) = non_blank(payload.date.as_deref()) {
        cmd = cmd.occurred_at(parse_date(date)?);
    }

    let tx = state.engine.create_transaction(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(Success::new(TransactionResponse {
            transaction: view(tx),
        })),
    ))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiQuery(params): ApiQuery<TransactionList>,
) -> Result<Json<Success<TransactionListResponse>>, ServerError> {
    let mut query = TransactionQuery::default();
    if let Some(page) = params.page {
        query.page = page;
    }
    if let Some(limit) = params.limit {
        query.page_size = limit;
    }
    query.search = non_blank(params.search.as_deref()).map(ToString::to_string);
    query.kind = non_blank(params.kind.as_deref())
        .map(TransactionKind::try_from)
        .transpose()?;
    if let Some(sort) = non_blank(params.sort.as_deref()) {
        query.sort = sort.parse()?;
    }

    let page = state.engine.list_transactions(&user.id, &query).await?;
    tracing::debug!(total = page.total, page = page.page, "transactions listed");

    Ok(Json(Success::new(TransactionListResponse {
        total: page.total,
        page: page.page,
        limit: page.page_size,
        transactions: page.transactions.into_iter().map(view).collect(),
    })))
}

pub async fn get_one(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Success<TransactionResponse>>, ServerError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let tx = state.engine.transaction(&user.id, id).await?;

    Ok(Json(Success::new(TransactionResponse {
        transaction: view(tx),
    })))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<TransactionUpdate>,
) -> Result<Json<Success<TransactionResponse>>, ServerError> {
    let Some(id) = non_blank(payload.id.as_deref()) else {
        return Err(ServerError::BadRequest(ID_REQUIRED.to_string()));
    };

    let mut cmd = UpdateTransactionCmd::new(user.id, parse_id(id, NOT_FOUND)?);
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(TransactionKind::try_from(kind.trim())?);
    }
    if let Some(category) = payload.category {
        cmd = cmd.category(category);
    }
    if let Some(raw_amount) = &payload.amount {
        cmd = cmd.amount(parse_amount(raw_amount)?);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(date) = non_blank(payload.date.as_deref()) {
        cmd = cmd.occurred_at(parse_date(date)?);
    }

    let tx = state.engine.update_transaction(cmd).await?;

    Ok(Json(Success::new(TransactionResponse {
        transaction: view(tx),
    })))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<Json<Success<Empty>>, ServerError> {
    let payload: TransactionDelete = optional_json(&body)?;
    let Some(id) = non_blank(payload.id.as_deref()) else {
        return Err(ServerError::BadRequest(ID_REQUIRED.to_string()));
    };

    state
        .engine
        .delete_transaction(&user.id, parse_id(id, NOT_FOUND)?)
        .await?;

    Ok(Json(Success::new(Empty {})))
}

pub async fn stats(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Success<LedgerStats>>, ServerError> {
    let stats = state.engine.transaction_stats(&user.id).await?;

    Ok(Json(Success::new(LedgerStats {
        income: amount(stats.income),
        expense: amount(stats.expense),
        categories: stats.categories.into_iter().map(category_total).collect(),
        monthly: stats.monthly.into_iter().map(trend_point).collect(),
    })))
}
