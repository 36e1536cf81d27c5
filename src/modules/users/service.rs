use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::modules::users::model::{UpdateUserDto, User, normalize_email};
use crate::utils::errors::AppError;
use crate::utils::pagination::{PaginationMeta, PaginationParams};

const USER_COLUMNS: &str = "id, name, email, role, is_active, created_at, updated_at";

pub struct UserService;

impl UserService {
    /// Looks up an account by id with the password column excluded.
    /// Returns `None` when no such account exists; the caller decides
    /// whether that is a 401 (verifier) or a 404 (user endpoints).
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(user)
    }

    pub async fn get_user(db: &PgPool, id: Uuid) -> Result<User, AppError> {
        Self::find_by_id(db, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User with id {id} not found")))
    }

    #[instrument(skip(db))]
    pub async fn get_users(
        db: &PgPool,
        pagination: &PaginationParams,
    ) -> Result<(Vec<User>, PaginationMeta), AppError> {
        let limit = pagination.limit();
        let offset = pagination.offset();

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await?;

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             ORDER BY created_at DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        let meta = PaginationMeta {
            total,
            limit,
            offset: Some(offset),
            page: pagination.page(),
            has_more: offset + (users.len() as i64) < total,
        };

        Ok((users, meta))
    }

    #[instrument(skip(db))]
    pub async fn update_user(db: &PgPool, id: Uuid, dto: UpdateUserDto) -> Result<User, AppError> {
        let name = dto.name.as_deref().map(str::trim);
        let email = dto.email.as_deref().map(normalize_email);

        if let Some(email) = &email {
            if !email.validate_email() {
                return Err(AppError::validation("A valid email is required"));
            }

            let taken =
                sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1 AND id <> $2")
                    .bind(email)
                    .bind(id)
                    .fetch_optional(db)
                    .await?;

            if taken.is_some() {
                return Err(AppError::conflict("Email already exists"));
            }
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET name = COALESCE($2, name),
                 email = COALESCE($3, email),
                 updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(email.as_deref())
        .fetch_optional(db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::conflict("Email already exists")
            }
            _ => AppError::internal(e),
        })?
        .ok_or_else(|| AppError::not_found(format!("User with id {id} not found")))?;

        Ok(user)
    }

    #[instrument(skip(db))]
    pub async fn delete_user(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User with id {id} not found")));
        }

        Ok(())
    }
}
