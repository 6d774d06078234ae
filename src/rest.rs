//! Axum handlers and router for the expense API.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::ApiError;
use crate::service::{CreateOutcome, ExpenseService, SortOrder};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub expense_service: ExpenseService,
}

impl AppState {
    pub fn new(expense_service: ExpenseService) -> Self {
        Self { expense_service }
    }
}

/// Build the API router for the given state.
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new().route(
        "/expenses",
        get(list_expenses).post(create_expense).delete(delete_expense),
    );

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Query parameters for the expense list endpoint.
#[derive(Deserialize, Debug)]
pub struct ExpenseListQuery {
    pub category: Option<String>,
    pub sort: Option<String>,
}

/// Query parameters for the expense delete endpoint.
#[derive(Deserialize, Debug)]
pub struct ExpenseDeleteQuery {
    pub id: Option<String>,
}

/// Handler for GET /api/expenses
pub async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<ExpenseListQuery>,
) -> impl IntoResponse {
    info!("GET /api/expenses - query: {:?}", query);

    let sort = SortOrder::from_token(query.sort.as_deref());
    let expenses = state
        .expense_service
        .list(query.category.as_deref(), sort)
        .await;

    (StatusCode::OK, Json(expenses))
}

/// Handler for POST /api/expenses
pub async fn create_expense(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> impl IntoResponse {
    info!("POST /api/expenses");

    match state.expense_service.create(&payload).await {
        Ok(CreateOutcome::Created(expense)) => {
            (StatusCode::CREATED, Json(expense)).into_response()
        }
        Ok(CreateOutcome::AlreadyExists(expense)) => {
            (StatusCode::OK, Json(expense)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Handler for DELETE /api/expenses?id=...
pub async fn delete_expense(
    State(state): State<AppState>,
    Query(query): Query<ExpenseDeleteQuery>,
) -> impl IntoResponse {
    info!("DELETE /api/expenses - id: {:?}", query.id);

    let id = match query.id.as_deref() {
        Some(id) if !id.is_empty() => id,
        _ => return ApiError::MissingIdentifier.into_response(),
    };

    match state.expense_service.delete(id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => e.into_response(),
    }
}
