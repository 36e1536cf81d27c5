//! Account models and DTOs.
//!
//! [`User`] is the externally visible account representation. It carries no
//! password field at all: the hashed secret only ever exists in the private
//! credential row inside the auth service and can never be serialized.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::PaginationMeta;

/// Account role. New accounts default to `user`; `admin` is granted through
/// the `create-admin` startup command or by direct database assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Admin => "admin",
        })
    }
}

/// An account as returned by every endpoint. Loaded with a projection that
/// excludes the password column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for updating an account. Both fields are optional; omitted fields
/// are left unchanged.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    /// Validated for format after normalization, in the service.
    #[validate(length(min = 1, message = "Email cannot be empty"))]
    pub email: Option<String>,
}

/// Paginated account listing for `GET /api/users`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub success: bool,
    pub data: Vec<User>,
    pub meta: PaginationMeta,
}

/// Canonical form of an email address: surrounding whitespace stripped,
/// lowercased. Applied before every lookup and write so uniqueness is
/// case-insensitive.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
