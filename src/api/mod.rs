//! REST gateway module for the ModShelf API.
//!
//! This module provides the `ApiClient` gateway every API call goes
//! through, the `Payload` union callers pick request bodies from, and
//! the `ApiError` taxonomy.
//!
//! Sessions are acquired lazily through the authenticate endpoints and
//! presented as `Authorization: ApiSession <token>`; a server-rejected
//! session is re-acquired and the call retried exactly once.

pub mod client;
pub mod error;
pub mod payload;

pub use client::{ApiClient, PermissionScope};
pub use error::ApiError;
pub use payload::{MultipartField, Payload};
