use api_types::{
    Success,
    stats::{Dashboard, DashboardQuery},
};
use axum::{Extension, Json, extract::State};
use engine::{User, YearMonth};

use crate::{
    ServerError, budgets,
    extract::ApiQuery,
    params::{amount, non_blank, parse_month},
    server::ServerState,
    transactions,
};

/// Month totals, category breakdown, trend and budgets in one response.
/// Without `month` the current UTC month is used.
pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    ApiQuery(params): ApiQuery<DashboardQuery>,
) -> Result<Json<Success<Dashboard>>, ServerError> {
    let month = match non_blank(params.month.as_deref()) {
        Some(raw) => parse_month(raw)?,
        None => YearMonth::current(),
    };

    let dashboard = state.engine.dashboard(&user.id, month).await?;

    Ok(Json(Success::new(Dashboard {
        month: dashboard.month.to_string(),
        income: amount(dashboard.income),
        expense: amount(dashboard.expense),
        balance: amount(dashboard.balance),
        categories: dashboard
            .categories
            .into_iter()
            .map(transactions::category_total)
            .collect(),
        monthly: dashboard
            .monthly
            .into_iter()
            .map(transactions::trend_point)
            .collect(),
        budgets: dashboard
            .budgets
            .into_iter()
            .map(budgets::summary_entry)
            .collect(),
    })))
}
