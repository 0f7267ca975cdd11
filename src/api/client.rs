//! Request gateway for the ModShelf API.
//!
//! Every call goes through [`ApiClient::request`]: it resolves a bearer
//! session (lazily authenticating when the store has no fresh one),
//! attaches the CSRF token, dispatches the HTTP call, and classifies
//! the response. A 401 the server attributes to an expired or invalid
//! session invalidates the stored entry and is retried exactly once;
//! the retry acquires its session through the store like any first
//! attempt.

use std::sync::Arc;

use reqwest::{header, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::alerts::{AlertLevel, AlertLog, AlertSink};
use crate::auth::{Session, SessionKind, SessionStore};
use crate::config::Config;
use crate::models::{
    Member, Membership, Organization, PaginatedResult, Project, ProjectSearch, User, Version,
};

use super::error::{ApiError, ErrorBody};
use super::payload::{multipart_form, MultipartField, Payload};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Version prefix of every API path.
const API_PREFIX: &str = "api/v2";

/// Authorization scheme the API expects in front of the session token.
const AUTH_SCHEME: &str = "ApiSession";

/// Header the anti-forgery token travels in.
const CSRF_HEADER: &str = "Csrf-Token";

#[derive(Debug, serde::Deserialize)]
struct AuthResponse {
    #[serde(rename = "type")]
    session_type: String,
    session: String,
    #[serde(default)]
    expires: Option<chrono::DateTime<chrono::Utc>>,
}

/// Scope a permission query applies to.
#[derive(Debug, Clone)]
pub enum PermissionScope {
    /// Permissions of the session itself.
    Global,
    /// Permissions within a single project.
    Project(String),
    /// Permissions within an organization.
    Organization(String),
}

impl PermissionScope {
    fn to_payload(&self) -> Payload {
        match self {
            PermissionScope::Global => Payload::Empty,
            PermissionScope::Project(plugin_id) => Payload::Json(json!({ "pluginId": plugin_id })),
            PermissionScope::Organization(name) => Payload::Json(json!({ "organization": name })),
        }
    }
}

/// API client for a ModShelf registry.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: Config,
    store: SessionStore,
    alerts: Arc<dyn AlertSink>,
}

impl ApiClient {
    /// Create a client from configuration. The session store lives in
    /// the configured cache directory.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = SessionStore::new(config.session_dir()?);
        Self::with_store(config, store)
    }

    /// Create a client with an explicit session store.
    pub fn with_store(config: Config, store: SessionStore) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            config,
            store,
            alerts: Arc::new(AlertLog::new()),
        })
    }

    /// Route user-facing messages somewhere other than the default
    /// in-memory log.
    pub fn with_alert_sink(mut self, alerts: Arc<dyn AlertSink>) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session_store(&self) -> &SessionStore {
        &self.store
    }

    // ===== The request protocol =====

    /// Perform an API call. Resolves with the parsed JSON body, or
    /// `None` for an empty success response.
    pub async fn request(
        &self,
        path: &str,
        method: Method,
        payload: Payload,
    ) -> Result<Option<Value>, ApiError> {
        let kind = self.config.session_kind();
        let mut is_retry = false;

        // Bounded retry: one extra pass, only for a server-rejected
        // session.
        loop {
            let session = self.resolve_session(kind).await?;
            let response = self
                .dispatch(path, method.clone(), &payload, &session)
                .await?;
            let status = response.status();

            if status.is_success() {
                return Self::read_success(response).await;
            }

            let body = response.text().await.unwrap_or_default();
            let error_body = ErrorBody::parse(&body);

            if status == StatusCode::UNAUTHORIZED && error_body.is_session_rejection() {
                if is_retry {
                    return Err(ApiError::SessionExpiredTwice);
                }
                warn!(path, kind = %kind, "Session rejected by server, re-authenticating");
                if let Err(e) = self.store.invalidate(kind) {
                    warn!(kind = %kind, error = %e, "Failed to drop rejected session");
                }
                is_retry = true;
                continue;
            }

            if status == StatusCode::BAD_REQUEST {
                self.raise_alerts(&error_body);
            }

            debug!(path, status = status.as_u16(), "API request failed");
            return Err(ApiError::Status(status.as_u16()));
        }
    }

    /// Fresh session for `kind`: the stored one when present, otherwise
    /// a newly issued one from the authenticate endpoint.
    async fn resolve_session(&self, kind: SessionKind) -> Result<Session, ApiError> {
        if let Some(session) = self.store.read(kind) {
            return Ok(session);
        }

        let session = self.authenticate(kind).await?;
        if let Err(e) = self.store.write(kind, &session) {
            warn!(kind = %kind, error = %e, "Failed to persist session");
        }
        Ok(session)
    }

    /// Request a new session of the given kind. The response must
    /// declare the matching session type.
    async fn authenticate(&self, kind: SessionKind) -> Result<Session, ApiError> {
        let url = self.api_url(kind.authenticate_path());
        debug!(kind = %kind, "Requesting new API session");

        let mut request = self.client.post(&url);
        if let Some(ref csrf) = self.config.csrf_token {
            request = request.header(CSRF_HEADER, csrf);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let auth: AuthResponse = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("unparseable authenticate response: {}", e))
        })?;

        if auth.session_type != kind.declared_type() {
            return Err(ApiError::ProtocolMismatch {
                expected: kind,
                got: auth.session_type,
            });
        }

        Ok(Session::new(auth.session, auth.expires))
    }

    async fn dispatch(
        &self,
        path: &str,
        method: Method,
        payload: &Payload,
        session: &Session,
    ) -> Result<Response, ApiError> {
        let url = self.api_url(path);
        let has_body = method == Method::POST || method == Method::PUT || method == Method::PATCH;

        let mut request = self.client.request(method, &url).header(
            header::AUTHORIZATION,
            format!("{} {}", AUTH_SCHEME, session.token),
        );

        if let Some(ref csrf) = self.config.csrf_token {
            request = request.header(CSRF_HEADER, csrf);
        }

        request = match payload {
            Payload::Empty => request,
            Payload::Json(value) if has_body => request.json(value),
            Payload::Json(_) => {
                let pairs = payload.query_pairs();
                if pairs.is_empty() {
                    request
                } else {
                    request.query(&pairs)
                }
            }
            Payload::Multipart(fields) if has_body => {
                // Content type is the transport's to set: the form
                // carries the boundary.
                request.multipart(multipart_form(fields, self.config.csrf_token.as_deref()))
            }
            // A form body has no meaning on a bodiless method
            Payload::Multipart(_) => request,
        };

        Ok(request.send().await?)
    }

    async fn read_success(response: Response) -> Result<Option<Value>, ApiError> {
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = response.text().await?;
        if body.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| ApiError::InvalidResponse(format!("unparseable response body: {}", e)))
    }

    /// Route 400-response messages to the alert sink, one alert per
    /// message.
    fn raise_alerts(&self, body: &ErrorBody) {
        if let Some(ref message) = body.user_error {
            self.alerts.alert(AlertLevel::Error, message);
        } else if let Some(ref message) = body.api_error {
            self.alerts.alert(AlertLevel::Error, message);
        } else if let Some(ref messages) = body.api_errors {
            for message in messages {
                self.alerts.alert(AlertLevel::Error, message);
            }
        }
    }

    fn api_url(&self, path: &str) -> String {
        join_api_url(&self.config.api_base_url, path)
    }

    // ===== Typed helpers =====

    async fn get<T: DeserializeOwned>(&self, path: &str, payload: Payload) -> Result<T, ApiError> {
        Self::expect_body(self.request(path, Method::GET, payload).await?)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, payload: Payload) -> Result<T, ApiError> {
        Self::expect_body(self.request(path, Method::POST, payload).await?)
    }

    fn expect_body<T: DeserializeOwned>(body: Option<Value>) -> Result<T, ApiError> {
        let value =
            body.ok_or_else(|| ApiError::InvalidResponse("expected a response body".into()))?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("unexpected response shape: {}", e)))
    }

    // ===== Projects =====

    /// Fetch a project by its plugin id.
    pub async fn fetch_project(&self, plugin_id: &str) -> Result<Project, ApiError> {
        self.get(&format!("projects/{}", plugin_id), Payload::Empty)
            .await
    }

    /// Search projects. `ProjectSearch::exact(owner, slug)` resolves a
    /// namespace to at most one project.
    pub async fn search_projects(
        &self,
        search: &ProjectSearch,
    ) -> Result<PaginatedResult<Project>, ApiError> {
        self.get("projects", Payload::Json(search.to_query())).await
    }

    pub async fn fetch_project_members(&self, plugin_id: &str) -> Result<Vec<Member>, ApiError> {
        self.get(&format!("projects/{}/members", plugin_id), Payload::Empty)
            .await
    }

    // ===== Versions =====

    /// List versions of a project, optionally filtered to release
    /// channels.
    pub async fn fetch_versions(
        &self,
        plugin_id: &str,
        offset: u64,
        channels: &[String],
    ) -> Result<PaginatedResult<Version>, ApiError> {
        let mut path = format!("projects/{}/versions?offset={}", plugin_id, offset);
        for channel in channels {
            path.push_str("&tags=Channel:");
            path.push_str(channel);
        }
        self.get(&path, Payload::Empty).await
    }

    /// Upload a new version: the plugin file plus an optional JSON
    /// metadata blob, as one multipart form.
    pub async fn publish_version(
        &self,
        plugin_id: &str,
        file_name: &str,
        content: Vec<u8>,
        plugin_info: Option<Value>,
    ) -> Result<Version, ApiError> {
        let mut fields = Vec::new();
        if let Some(info) = plugin_info {
            fields.push(MultipartField::text("plugin-info", info.to_string()));
        }
        fields.push(MultipartField::file("plugin-file", file_name, content));
        self.post(
            &format!("projects/{}/versions", plugin_id),
            Payload::Multipart(fields),
        )
        .await
    }

    // ===== Users and organizations =====

    pub async fn fetch_user(&self, name: &str) -> Result<User, ApiError> {
        self.get(&format!("users/{}", name), Payload::Empty).await
    }

    /// The currently authenticated user. Only meaningful with a user
    /// session.
    pub async fn fetch_current_user(&self) -> Result<User, ApiError> {
        self.get("users/@me", Payload::Empty).await
    }

    pub async fn fetch_memberships(&self, name: &str) -> Result<Vec<Membership>, ApiError> {
        self.get(&format!("users/{}/memberships", name), Payload::Empty)
            .await
    }

    pub async fn fetch_organization(&self, name: &str) -> Result<Organization, ApiError> {
        self.get(&format!("organizations/{}", name), Payload::Empty)
            .await
    }

    pub async fn fetch_organization_members(&self, name: &str) -> Result<Vec<Member>, ApiError> {
        self.get(&format!("organizations/{}/members", name), Payload::Empty)
            .await
    }

    // ===== Permissions =====

    /// Named permissions of the current session in the given scope.
    pub async fn fetch_permissions(&self, scope: &PermissionScope) -> Result<Vec<String>, ApiError> {
        let response: PermissionsResponse = self.get("permissions", scope.to_payload()).await?;
        Ok(response.permissions)
    }
}

fn join_api_url(base: &str, path: &str) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), API_PREFIX, path)
}

// Internal API response types for parsing

#[derive(Debug, serde::Deserialize)]
struct PermissionsResponse {
    #[serde(default)]
    permissions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_api_url() {
        assert_eq!(
            join_api_url("https://shelf.example.org", "projects/abc"),
            "https://shelf.example.org/api/v2/projects/abc"
        );
        // A trailing slash on the base must not double up
        assert_eq!(
            join_api_url("https://shelf.example.org/", "authenticate"),
            "https://shelf.example.org/api/v2/authenticate"
        );
    }

    #[test]
    fn test_parse_auth_response() {
        let json = r#"{"type": "public", "session": "tok", "expires": "2026-08-07T12:00:00Z"}"#;
        let auth: AuthResponse = serde_json::from_str(json).expect("Failed to parse auth JSON");
        assert_eq!(auth.session_type, "public");
        assert_eq!(auth.session, "tok");
        assert!(auth.expires.is_some());

        // Expiry is optional
        let auth: AuthResponse =
            serde_json::from_str(r#"{"type": "user", "session": "tok"}"#).unwrap();
        assert!(auth.expires.is_none());
    }

    #[test]
    fn test_permission_scope_queries() {
        assert!(matches!(
            PermissionScope::Global.to_payload(),
            Payload::Empty
        ));

        let pairs = PermissionScope::Project("nucleus".into())
            .to_payload()
            .query_pairs();
        assert_eq!(pairs, vec![("pluginId".to_string(), "nucleus".to_string())]);

        let pairs = PermissionScope::Organization("SpongePowered".into())
            .to_payload()
            .query_pairs();
        assert_eq!(
            pairs,
            vec![("organization".to_string(), "SpongePowered".to_string())]
        );
    }
}
