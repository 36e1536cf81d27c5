//! Application configuration.
//!
//! Each submodule loads one concern from environment variables into an
//! explicit struct; the structs are built once at startup and carried in
//! [`crate::state::AppState`].
//!
//! - [`cors`]: allowed CORS origins
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`jwt`]: token secrets and lifetimes

pub mod cors;
pub mod database;
pub mod jwt;
