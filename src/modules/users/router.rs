use axum::{
    Router, middleware,
    routing::{delete, get},
};

use crate::middleware::role::require_admin;
use crate::state::AppState;

use super::controller::{delete_user, get_user, get_users, update_user};

/// Listing and deletion are admin-gated at registration time; reading and
/// updating a single account are self-or-admin, checked in the handler
/// against the verified caller.
pub fn init_users_router(state: AppState) -> Router<AppState> {
    let admin_routes = Router::new()
        .route("/", get(get_users))
        .route("/{id}", delete(delete_user))
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    Router::new()
        .route("/{id}", get(get_user).put(update_user))
        .merge(admin_routes)
}
