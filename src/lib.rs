//! Client library for the ModShelf plugin registry API.
//!
//! ModShelf exposes a versioned REST API for browsing projects,
//! publishing plugin versions, and managing users and organizations.
//! This crate owns the caller's side of the credential protocol:
//!
//! - lazy, cached bearer sessions for logged-in and anonymous viewers,
//!   persisted per kind and refreshed when stale
//! - a request gateway that attaches the session and CSRF token,
//!   classifies error responses, and retries exactly once when the
//!   server reports the session expired
//! - typed models and endpoint wrappers for the registry's resources

pub mod alerts;
pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError, MultipartField, Payload, PermissionScope};
pub use auth::{Session, SessionKind, SessionStore};
pub use config::Config;
