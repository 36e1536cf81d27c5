use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::modules::users::model::{User, UserRole};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_access_token;

/// Extractor that resolves a request's bearer token into the account it
/// belongs to.
///
/// Handlers (and the role gate) receive the loaded [`User`] as an explicit
/// value; nothing is attached to the request. The chain, each step rejecting
/// with 401:
///
/// 1. require an `Authorization` header starting with the literal `Bearer `
/// 2. verify signature and expiry
/// 3. load the account by the token subject (projection without the
///    password column)
/// 4. require the account to still exist and be active
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.0.id
    }

    pub fn role(&self) -> UserRole {
        self.0.role
    }

    pub fn is_admin(&self) -> bool {
        self.0.role == UserRole::Admin
    }

    /// True when the authenticated account is `target` itself or an admin.
    pub fn can_access(&self, target: Uuid) -> bool {
        self.id() == target || self.is_admin()
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::unauthorized("Not authorized to access this route"))?;

        let claims = verify_access_token(token, &state.jwt_config)
            .map_err(|_| AppError::unauthorized("Not authorized, token failed"))?;

        // A subject that is not a UUID can only come from a token we did not
        // issue; treat it like any other bad token.
        let user_id = Uuid::parse_str(&claims.id)
            .map_err(|_| AppError::unauthorized("Not authorized, token failed"))?;

        let user = UserService::find_by_id(&state.db, user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User not found"))?;

        if !user.is_active {
            return Err(AppError::unauthorized("User account is inactive"));
        }

        Ok(CurrentUser(user))
    }
}
