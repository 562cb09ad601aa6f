//! Authentication service for account registration, login and access tokens

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::{Role, User};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// Input for registering a new account
#[derive(Debug)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub username: String,
    pub name: String, // Display name
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| AppError::Internal(format!("Corrupt user row {}: {}", row.id, e)))?;
        Ok(User {
            id: row.id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            role,
            created_at: row.created_at,
        })
    }
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
        }
    }

    /// Register a new account.
    ///
    /// The very first account becomes the administrator; everyone after that
    /// is an employee.
    pub async fn register(&self, input: RegisterInput) -> AppResult<User> {
        let username = input.username.trim().to_string();

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let mut tx = self.db.begin().await?;

        // Serialize registrations so the first-account check cannot race
        sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE lower(username) = lower($1))",
        )
        .bind(&username)
        .fetch_one(&mut *tx)
        .await?;

        if taken {
            return Err(AppError::DuplicateEntry("username".to_string()));
        }

        let user_count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;
        let role = if user_count == 0 { Role::Admin } else { Role::Employee };

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash, first_name, last_name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, password_hash, first_name, last_name, role, created_at
            "#,
        )
        .bind(&username)
        .bind(&password_hash)
        .bind(input.first_name.trim())
        .bind(input.last_name.trim())
        .bind(role.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(user_id = %row.id, role = role.as_str(), "account registered");

        row.try_into()
    }

    /// Authenticate user with username and password
    pub async fn login(&self, username: &str, password: &str) -> AppResult<AuthTokens> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, first_name, last_name, role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(password, &row.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let user = User::try_from(row)?;
        self.generate_token(&user)
    }

    /// Generate an access token for a user
    pub fn generate_token(&self, user: &User) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_token_expiry);

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            name: user.display_name(),
            role: user.role.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        Ok(AuthTokens {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// List every account, for administrators
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, first_name, last_name, role, created_at
            FROM users
            ORDER BY last_name, first_name, username
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }
}

/// Validate an access token and return its claims
pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::InvalidToken(format!("Invalid token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn test_service() -> AuthService {
        let config = Config::for_tests();
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();
        AuthService::new(pool, &config)
    }

    fn test_user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: "ana".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Horvat".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let service = test_service();
        let user = test_user(Role::Admin);

        let tokens = service.generate_token(&user).unwrap();
        assert_eq!(tokens.token_type, "Bearer");

        let claims = decode_token(&tokens.access_token, "test-secret").unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.name, "Ana Horvat");
        assert_eq!(claims.role, "admin");
    }

    #[tokio::test]
    async fn test_token_rejects_wrong_secret() {
        let service = test_service();
        let tokens = service.generate_token(&test_user(Role::Employee)).unwrap();

        assert!(matches!(
            decode_token(&tokens.access_token, "other-secret"),
            Err(AppError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_corrupt_role_is_rejected() {
        let row = UserRow {
            id: Uuid::new_v4(),
            username: "ana".to_string(),
            password_hash: String::new(),
            first_name: "Ana".to_string(),
            last_name: "Horvat".to_string(),
            role: "owner".to_string(),
            created_at: Utc::now(),
        };
        assert!(User::try_from(row).is_err());
    }
}
