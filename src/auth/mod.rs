//! Session management for the ModShelf API.
//!
//! This module provides:
//! - `Session` / `SessionKind`: the bearer credential model, with a
//!   60-second freshness margin on expiring sessions
//! - `SessionStore`: durable per-kind persistence of the current
//!   session
//!
//! Sessions are issued by the API's authenticate endpoints and cached
//! on disk until they go stale or the server rejects them.

pub mod session;
pub mod store;

pub use session::{Session, SessionKind};
pub use store::SessionStore;
