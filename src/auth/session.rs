use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Safety margin when judging session freshness.
/// A session that expires within the next minute is treated as stale so
/// it cannot lapse while a request is in flight.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Which caller a session authenticates: the logged-in viewer or an
/// anonymous visitor. The kind decides the storage slot, the
/// authentication endpoint, and the session type the server must
/// declare in its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    User,
    Public,
}

impl SessionKind {
    /// Path of the authentication endpoint for this kind, relative to
    /// the API base.
    pub fn authenticate_path(self) -> &'static str {
        match self {
            SessionKind::User => "authenticate/user",
            SessionKind::Public => "authenticate",
        }
    }

    /// The `type` field the authenticate response must carry.
    pub fn declared_type(self) -> &'static str {
        match self {
            SessionKind::User => "user",
            SessionKind::Public => "public",
        }
    }

    /// File name of the persisted slot for this kind.
    pub(crate) fn slot_file(self) -> &'static str {
        match self {
            SessionKind::User => "api_session.json",
            SessionKind::Public => "public_api_session.json",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.declared_type())
    }
}

/// A bearer credential for the API, as issued by the authenticate
/// endpoints and persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque token presented in the Authorization header.
    #[serde(rename = "session")]
    pub token: String,
    /// Expiry timestamp. Absent means the session is trusted until the
    /// server rejects it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(token: impl Into<String>, expires: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            expires,
        }
    }

    /// Whether the session may no longer be presented to the server.
    pub fn is_stale(&self) -> bool {
        match self.expires {
            Some(expires) => expires < Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS),
            None => false,
        }
    }
}
