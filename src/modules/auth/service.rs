use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::config::jwt::JwtConfig;
use crate::modules::users::model::{User, UserRole, normalize_email};
use crate::utils::errors::AppError;
use crate::utils::jwt::{create_access_token, create_refresh_token};
use crate::utils::password::{hash_password, verify_password};

use super::model::{AuthData, LoginRequest, RegisterRequest};

/// Credential row loaded for password verification. The only type in the
/// crate that carries the password hash; it never leaves this module.
#[derive(sqlx::FromRow)]
struct UserWithPassword {
    id: Uuid,
    name: String,
    email: String,
    password: String,
    role: UserRole,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserWithPassword {
    fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            role: self.role,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, jwt_config))]
    pub async fn register(
        db: &PgPool,
        dto: RegisterRequest,
        jwt_config: &JwtConfig,
    ) -> Result<AuthData, AppError> {
        let name = dto.name.trim().to_string();
        let email = normalize_email(&dto.email);

        if name.is_empty() {
            return Err(AppError::validation("Name cannot be empty"));
        }

        // Format is checked on the normalized address so inputs like
        // "  TEST@EXAMPLE.COM " are accepted and stored canonically.
        if !email.validate_email() {
            return Err(AppError::validation("A valid email is required"));
        }

        let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(db)
            .await?;

        if existing.is_some() {
            return Err(AppError::conflict("Email already exists"));
        }

        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password)
             VALUES ($1, $2, $3)
             RETURNING id, name, email, role, is_active, created_at, updated_at",
        )
        .bind(&name)
        .bind(&email)
        .bind(&hashed_password)
        .fetch_one(db)
        .await
        .map_err(|e| match &e {
            // Backstop for the race between the pre-check and the insert.
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::conflict("Email already exists")
            }
            _ => AppError::internal(e),
        })?;

        Self::issue_tokens(user, jwt_config)
    }

    #[instrument(skip(db, jwt_config))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<AuthData, AppError> {
        let email = normalize_email(&dto.email);

        let user = sqlx::query_as::<_, UserWithPassword>(
            "SELECT id, name, email, password, role, is_active, created_at, updated_at
             FROM users WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(db)
        .await?
        // Unknown email and wrong password produce the same message so the
        // endpoint cannot be used to enumerate accounts.
        .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

        if !verify_password(&dto.password, &user.password)? {
            return Err(AppError::unauthorized("Invalid credentials"));
        }

        if !user.is_active {
            return Err(AppError::unauthorized(
                "Account is inactive, please contact support",
            ));
        }

        Self::issue_tokens(user.into_user(), jwt_config)
    }

    fn issue_tokens(user: User, jwt_config: &JwtConfig) -> Result<AuthData, AppError> {
        let token = create_access_token(user.id, jwt_config)?;
        let refresh_token = create_refresh_token(user.id, jwt_config)?;

        Ok(AuthData {
            user,
            token,
            refresh_token,
        })
    }
}
