use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pagination envelope the list endpoints wrap their results in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub pagination: Pagination,
    pub result: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
    pub count: u64,
}

impl Pagination {
    /// Total number of pages at this page size.
    pub fn page_count(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        (self.count + self.limit - 1) / self.limit
    }

    /// Page the current offset falls on, starting at 1.
    pub fn current_page(&self) -> u64 {
        if self.limit == 0 {
            return 1;
        }
        self.offset / self.limit + 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub plugin_id: String,
    pub name: String,
    pub namespace: ProjectNamespace,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stats: ProjectStats,
    #[serde(default)]
    pub user_actions: UserActions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectNamespace {
    pub owner: String,
    pub slug: String,
}

impl ProjectNamespace {
    /// `owner/slug`, as project pages address it.
    pub fn display(&self) -> String {
        format!("{}/{}", self.owner, self.slug)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectStats {
    #[serde(default)]
    pub stars: i64,
    #[serde(default)]
    pub watchers: i64,
    #[serde(default)]
    pub downloads: i64,
}

/// The viewer's own relationship to a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserActions {
    #[serde(default)]
    pub starred: bool,
    #[serde(default)]
    pub watching: bool,
}

/// Query for the project search endpoint.
///
/// `exact(owner, slug)` is the lookup the project page uses to resolve
/// a namespace to a project.
#[derive(Debug, Clone, Default)]
pub struct ProjectSearch {
    pub query: Option<String>,
    pub owner: Option<String>,
    pub category: Option<String>,
    pub exact: bool,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl ProjectSearch {
    pub fn query(q: impl Into<String>) -> Self {
        Self {
            query: Some(q.into()),
            ..Self::default()
        }
    }

    /// Exact namespace lookup: at most one result, matching
    /// `owner/slug`.
    pub fn exact(owner: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            query: Some(slug.into()),
            owner: Some(owner.into()),
            exact: true,
            ..Self::default()
        }
    }

    /// Render as the endpoint's query object. Unset fields are absent,
    /// `exact` only appears when set.
    pub fn to_query(&self) -> Value {
        let mut map = Map::new();
        if let Some(ref q) = self.query {
            map.insert("q".into(), Value::from(q.clone()));
        }
        if let Some(ref owner) = self.owner {
            map.insert("owner".into(), Value::from(owner.clone()));
        }
        if let Some(ref category) = self.category {
            map.insert("category".into(), Value::from(category.clone()));
        }
        if self.exact {
            map.insert("exact".into(), Value::from(true));
        }
        if let Some(limit) = self.limit {
            map.insert("limit".into(), Value::from(limit));
        }
        if let Some(offset) = self.offset {
            map.insert("offset".into(), Value::from(offset));
        }
        Value::Object(map)
    }
}
