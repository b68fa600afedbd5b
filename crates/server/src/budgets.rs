//! Budgets API endpoints

use api_types::{
    Empty, Success,
    budget::{
        BudgetDelete, BudgetListResponse, BudgetNew, BudgetResponse, BudgetSummaryEntry,
        BudgetSummaryResponse, BudgetUpdate, BudgetView, MonthQuery,
    },
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{CreateBudgetCmd, UpdateBudgetCmd, User};

use crate::{
    ServerError,
    extract::{ApiJson, ApiQuery},
    params::{amount, non_blank, parse_amount, parse_id, parse_month},
    server::ServerState,
};

const NOT_FOUND: &str = "Budget not found";
const ID_REQUIRED: &str = "Budget ID required";
const MONTH_REQUIRED: &str = "month (YYYY-MM) is required";
const REQUIRED_FIELDS: &str = "Category, limit, and month are required";

fn view(budget: engine::Budget) -> BudgetView {
    BudgetView {
        id: budget.id,
        category: budget.category,
        limit: amount(budget.limit),
        month: budget.month.to_string(),
        created_at: budget.created_at,
        updated_at: budget.updated_at,
    }
}

pub(crate) fn summary_entry(entry: engine::BudgetSummaryEntry) -> BudgetSummaryEntry {
    BudgetSummaryEntry {
        id: entry.budget_id,
        category: entry.category,
        limit: amount(entry.limit),
        spent: amount(entry.spent),
        remaining: amount(entry.remaining),
        over_budget: entry.over_budget,
    }
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<BudgetNew>,
) -> Result<(StatusCode, Json<Success<BudgetResponse>>), ServerError> {
    let (Some(category), Some(limit), Some(month)) =
        (payload.category, payload.limit, payload.month)
    else {
        return Err(ServerError::BadRequest(REQUIRED_FIELDS.to_string()));
    };

    let budget = state
        .engine
        .create_budget(CreateBudgetCmd::new(
            user.id,
            category,
            parse_amount(&limit)?,
            parse_month(&month)?,
        ))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Success::new(BudgetResponse {
            budget: view(budget),
        })),
    ))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiQuery(params): ApiQuery<MonthQuery>,
) -> Result<Json<Success<BudgetListResponse>>, ServerError> {
    let month = non_blank(params.month.as_deref())
        .map(parse_month)
        .transpose()?;
    let budgets = state.engine.list_budgets(&user.id, month).await?;

    Ok(Json(Success::new(BudgetListResponse {
        budgets: budgets.into_iter().map(view).collect(),
    })))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<BudgetUpdate>,
) -> Result<Json<Success<BudgetResponse>>, ServerError> {
    let Some(id) = non_blank(payload.id.as_deref()) else {
        return Err(ServerError::BadRequest(ID_REQUIRED.to_string()));
    };

    let mut cmd = UpdateBudgetCmd::new(user.id, parse_id(id, NOT_FOUND)?);
    if let Some(category) = payload.category {
        cmd = cmd.category(category);
    }
    if let Some(limit) = &payload.limit {
        cmd = cmd.limit(parse_amount(limit)?);
    }
    if let Some(month) = &payload.month {
        cmd = cmd.month(parse_month(month)?);
    }

    let budget = state.engine.update_budget(cmd).await?;

    Ok(Json(Success::new(BudgetResponse {
        budget: view(budget),
    })))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiQuery(params): ApiQuery<BudgetDelete>,
) -> Result<Json<Success<Empty>>, ServerError> {
    let Some(id) = non_blank(params.id.as_deref()) else {
        return Err(ServerError::BadRequest(ID_REQUIRED.to_string()));
    };

    state
        .engine
        .delete_budget(&user.id, parse_id(id, NOT_FOUND)?)
        .await?;

    Ok(Json(Success::new(Empty {})))
}

pub async fn summary(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiQuery(params): ApiQuery<MonthQuery>,
) -> Result<Json<Success<BudgetSummaryResponse>>, ServerError> {
    let Some(month) = non_blank(params.month.as_deref()) else {
        return Err(ServerError::BadRequest(MONTH_REQUIRED.to_string()));
    };

    let entries = state
        .engine
        .budget_summary(&user.id, parse_month(month)?)
        .await?;

    Ok(Json(Success::new(BudgetSummaryResponse {
        summary: entries.into_iter().map(summary_entry).collect(),
    })))
}
