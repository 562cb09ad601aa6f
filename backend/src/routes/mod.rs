//! Route definitions for the Stockroom server

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{
    handlers,
    middleware::{auth_middleware, require_admin},
    AppState,
};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes
        .merge(protected_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
}

/// Everything behind a bearer token
fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/materials", material_routes())
        .nest("/work-orders", work_order_routes())
        .nest("/transactions", transaction_routes())
        .nest("/reports", report_routes())
        .nest("/admin", admin_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Stock overview routes
fn material_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_materials))
        .route("/:material_id", get(handlers::get_material))
}

/// Work order routes
fn work_order_routes() -> Router<AppState> {
    Router::new().route("/", post(handlers::submit_work_order))
}

/// Ledger routes
fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_transactions))
        .route("/:transaction_id", get(handlers::get_transaction))
}

/// Report download routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/materials", get(handlers::materials_report))
        .route("/transactions", get(handlers::transactions_report))
        .route("/transactions/:transaction_id", get(handlers::transaction_report))
}

/// Admin routes; the role guard runs after authentication
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::list_users))
        .route_layer(middleware::from_fn(require_admin))
}
