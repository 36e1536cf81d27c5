//! Authentication and authorization middleware.
//!
//! # Request flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. The [`auth::CurrentUser`] extractor verifies the token and resolves
//!    the account (rejecting missing/invalid tokens, unknown and inactive
//!    accounts)
//! 3. [`role::require_roles`] checks the resolved account's role against the
//!    allow-set configured at route registration
//! 4. The handler runs with the resolved account as an explicit value

pub mod auth;
pub mod role;
