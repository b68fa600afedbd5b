use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use tower_http::trace::TraceLayer;

use std::sync::Arc;

use crate::{CredentialVerifier, ServerError, budgets, dashboard, transactions};
use api_types::{Empty, Success};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub verifier: Arc<dyn CredentialVerifier>,
}

impl ServerState {
    pub fn new(engine: Engine, verifier: impl CredentialVerifier + 'static) -> Self {
        Self {
            engine: Arc::new(engine),
            verifier: Arc::new(verifier),
        }
    }
}

/// Resolves the bearer token to a stored user and attaches it to the request.
async fn auth(
    State(state): State<ServerState>,
    auth_header: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Ok(TypedHeader(Authorization(bearer))) = auth_header else {
        tracing::warn!("request without bearer credentials");
        return Err(ServerError::Unauthorized);
    };

    let user_id = state.verifier.verify(bearer.token()).map_err(|err| {
        tracing::warn!("rejected bearer token: {err}");
        ServerError::Unauthorized
    })?;

    let Some(user) = state.engine.user(&user_id).await? else {
        tracing::warn!(user_id = %user_id, "token for unknown user");
        return Err(ServerError::Unauthorized);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

async fn health() -> Json<Success<Empty>> {
    Json(Success::new(Empty {}))
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route(
            "/transactions",
            get(transactions::list)
                .post(transactions::create)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route("/transactions/stats", get(transactions::stats))
        .route("/transactions/{id}", get(transactions::get_one))
        .route(
            "/budgets",
            get(budgets::list)
                .post(budgets::create)
                .put(budgets::update)
                .delete(budgets::delete),
        )
        .route("/budgets/summary", get(budgets::summary))
        .route("/dashboard", get(dashboard::get))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}
