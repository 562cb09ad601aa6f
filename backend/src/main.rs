//! Stockroom - Backend Server
//!
//! Warehouse inventory: materials on hand, receipt and issuance work orders
//! applied atomically, an append-only ledger and downloadable reports.

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod handlers;
mod middleware;
mod routes;
mod services;

pub use config::Config;

use services::{CsvReportRenderer, ReportRenderer};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub renderer: Arc<dyn ReportRenderer>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockroom_server=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Stockroom server");
    tracing::info!("Environment: {}", config.environment);

    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await?;

    tracing::info!("Database connection established");

    // Run migrations in development
    if config.is_development() {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&db_pool).await?;
        tracing::info!("Migrations completed");
    }

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));

    let state = AppState {
        db: db_pool,
        config: Arc::new(config),
        renderer: Arc::new(CsvReportRenderer::new()),
    };

    let app = create_app(state);

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Stockroom API v1"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use chrono::Utc;
    use shared::{Role, User};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::services::AuthService;

    fn test_state() -> AppState {
        let config = Config::for_tests();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();
        AppState {
            db,
            config: Arc::new(config),
            renderer: Arc::new(CsvReportRenderer::new()),
        }
    }

    fn bearer(state: &AppState, role: Role) -> String {
        let user = User {
            id: Uuid::new_v4(),
            username: "ivo".to_string(),
            first_name: "Ivo".to_string(),
            last_name: "Ivić".to_string(),
            role,
            created_at: Utc::now(),
        };
        let tokens = AuthService::new(state.db.clone(), &state.config)
            .generate_token(&user)
            .unwrap();
        format!("Bearer {}", tokens.access_token)
    }

    #[tokio::test]
    async fn test_root() {
        let app = create_app(test_state());
        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let app = create_app(test_state());
        let response = app
            .oneshot(
                Request::get("/api/v1/materials")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() {
        let app = create_app(test_state());
        let response = app
            .oneshot(
                Request::get("/api/v1/transactions")
                    .header(header::AUTHORIZATION, "Bearer not-a-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_route_refuses_employee() {
        let state = test_state();
        let token = bearer(&state, Role::Employee);
        let app = create_app(state);

        let response = app
            .oneshot(
                Request::get("/api/v1/admin/users")
                    .header(header::AUTHORIZATION, token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unknown_kind_is_rejected_before_touching_stock() {
        let state = test_state();
        let token = bearer(&state, Role::Employee);
        let app = create_app(state);

        let body = serde_json::json!({
            "kind": "transfer",
            "items": [{ "name": "Cement", "quantity": 5, "unit": "kg" }]
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/work-orders")
                    .header(header::AUTHORIZATION, token)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_duplicate_items_conflict() {
        let state = test_state();
        let token = bearer(&state, Role::Admin);
        let app = create_app(state);

        let body = serde_json::json!({
            "kind": "receipt",
            "items": [
                { "name": "Cement", "quantity": 5, "unit": "kg" },
                { "name": "cement", "quantity": 2, "unit": "kg" }
            ]
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/work-orders?format=json")
                    .header(header::AUTHORIZATION, token)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_json_validation_error() {
        let state = test_state();
        let token = bearer(&state, Role::Employee);
        let app = create_app(state);

        let body = serde_json::json!({
            "kind": "receipt",
            "items": [{ "name": "Cement", "quantity": 2.5, "unit": "kg" }]
        });

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/work-orders?format=json")
                    .header(header::AUTHORIZATION, token)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["field"], "body");
    }

    #[tokio::test]
    async fn test_login_without_json_content_type_is_a_validation_error() {
        let app = create_app(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/v1/auth/login")
                    .body(Body::from("username=ivo"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
