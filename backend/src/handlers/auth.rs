//! Authentication handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use shared::Role;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::services::auth::RegisterInput;
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3 to 50 characters"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(body) = payload?;
    body.validate()?;

    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.login(body.username.trim(), &body.password).await?;

    Ok(Json(LoginResponse {
        access_token: tokens.access_token,
        token_type: tokens.token_type,
        expires_in: tokens.expires_in,
    }))
}

/// Register account endpoint handler
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(body) = payload?;
    body.validate()?;

    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let user = auth_service
        .register(RegisterInput {
            username: body.username,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
        })
        .await?;
    let tokens = auth_service.generate_token(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            username: user.username,
            role: user.role,
            access_token: tokens.access_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_rules() {
        let valid = RegisterRequest {
            username: "ana".to_string(),
            password: "correct horse".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Horvat".to_string(),
        };
        assert!(valid.validate().is_ok());

        let short_password = RegisterRequest {
            password: "short".to_string(),
            ..valid
        };
        let err = crate::error::AppError::from(short_password.validate().unwrap_err());
        assert!(matches!(
            err,
            crate::error::AppError::Validation { ref field, .. } if field == "password"
        ));
    }

    #[test]
    fn test_register_request_rejects_short_username() {
        let request = RegisterRequest {
            username: "ab".to_string(),
            password: "correct horse".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Horvat".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
