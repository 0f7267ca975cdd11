//! Data models for ModShelf API resources.
//!
//! This module contains the structures the API's JSON responses
//! deserialize into:
//!
//! - `Project`, `ProjectNamespace`, `ProjectStats`: the registry's
//!   central resource, plus `ProjectSearch` for the search endpoint
//! - `Version`, `VersionTag`, `FileInfo`: uploaded plugin releases
//! - `User`, `Membership`, `Organization`, `Member`: account types
//! - `PaginatedResult`: the envelope list endpoints wrap results in

pub mod project;
pub mod user;
pub mod version;

pub use project::{
    PaginatedResult, Pagination, Project, ProjectNamespace, ProjectSearch, ProjectStats,
    UserActions,
};
pub use user::{Member, Membership, MembershipScope, Organization, Role, User};
pub use version::{FileInfo, TagColor, Version, VersionTag};
