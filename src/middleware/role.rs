//! Role-based authorization middleware.
//!
//! The role gate is configured with a fixed allow-set of roles when a route
//! is registered. It runs the [`CurrentUser`] verifier first, then applies
//! [`check_any_role`] to the resolved account.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::middleware::auth::CurrentUser;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Middleware that permits continuation only for accounts whose role is in
/// `allowed_roles`.
///
/// # Usage with axum::middleware::from_fn_with_state
///
/// ```rust,ignore
/// let admin_routes = Router::new()
///     .route("/", get(list_handler))
///     .route_layer(middleware::from_fn_with_state(
///         state.clone(),
///         |state, req, next| require_roles(state, req, next, vec![UserRole::Admin]),
///     ));
/// ```
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: Vec<UserRole>,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    // The verifier runs first; the gate only ever sees a verified account.
    let current_user = CurrentUser::from_request_parts(&mut parts, &state).await?;

    check_any_role(&current_user, &allowed_roles)?;

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Gate for admin-only routes.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, vec![UserRole::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Pure predicate over an already-verified account. Rejects with 403 and a
/// message naming the offending role.
pub fn check_any_role(user: &CurrentUser, allowed_roles: &[UserRole]) -> Result<(), AppError> {
    if !allowed_roles.contains(&user.role()) {
        return Err(AppError::forbidden(format!(
            "User role '{}' is not authorized to access this route",
            user.role()
        )));
    }

    Ok(())
}
