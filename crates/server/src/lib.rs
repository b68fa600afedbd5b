use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::EngineError;

pub use auth::{AuthError, Claims, CredentialVerifier, JwtVerifier};
pub use server::{ServerState, router, run_with_listener};

mod auth;
mod budgets;
mod dashboard;
mod extract;
mod params;
mod server;
mod transactions;

pub mod types {
    pub use api_types::{Amount, AmountInput, Empty, Failure, Success};

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionDelete, TransactionKind, TransactionList, TransactionListResponse,
            TransactionNew, TransactionResponse, TransactionUpdate, TransactionView,
        };
    }

    pub mod budget {
        pub use api_types::budget::{
            BudgetDelete, BudgetListResponse, BudgetNew, BudgetResponse, BudgetSummaryEntry,
            BudgetSummaryResponse, BudgetUpdate, BudgetView, MonthQuery,
        };
    }

    pub mod stats {
        pub use api_types::stats::{
            CategoryTotal, Dashboard, DashboardQuery, LedgerStats, MonthlyTrendPoint,
        };
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// Missing, malformed or unknown credentials. The reason is never
    /// disclosed to the client.
    Unauthorized,
    BadRequest(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::KeyNotFound(_) | EngineError::InvalidId(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Configuration(_) | EngineError::Database(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Configuration(msg) => {
            tracing::error!("configuration error: {msg}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ServerError::BadRequest(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(api_types::Failure::new(error))).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use sea_orm::DbErr;

    use super::*;

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let res = ServerError::from(EngineError::InvalidId("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn database_error_is_not_disclosed() {
        let res = ServerError::from(EngineError::Database(DbErr::Custom(
            "disk I/O error".to_string(),
        )))
        .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "internal server error");
    }

    #[tokio::test]
    async fn unauthorized_uses_envelope() {
        let res = ServerError::Unauthorized.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(res).await;
        assert_eq!(body, serde_json::json!({"success": false, "error": "Unauthorized"}));
    }

    #[test]
    fn bad_request_maps_to_400() {
        let res = ServerError::BadRequest("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
