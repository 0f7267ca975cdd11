use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub join_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub project_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// What a membership binds the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipScope {
    Organization,
    Project,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub scope: MembershipScope,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl Membership {
    pub fn is_organization(&self) -> bool {
        self.scope == MembershipScope::Organization
    }

    pub fn is_project(&self) -> bool {
        self.scope == MembershipScope::Project
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A member of a project or organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub user: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}
