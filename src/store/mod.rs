//! Record store adapter boundary.
//!
//! The feed only ever reads: filtered, descending-time, limited scans plus a
//! handful of point lookups. Everything behind [`FeedStore`] is an external
//! collaborator; the aggregation logic never sees a concrete database.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Boost, Brand, Collaboration, Partner, Project};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Other(String),
}

/// Which timeline collection a preference record targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Project,
    Collaboration,
    Partner,
}

impl ContentKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Project => "project",
            Self::Collaboration => "collaboration",
            Self::Partner => "partner",
        }
    }
}

/// Author predicate for timeline scans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthorScope {
    /// No author predicate.
    #[default]
    Any,
    /// Only rows authored by this user.
    Only(String),
    /// Only rows authored by someone else.
    Not(String),
}

/// Sort order for timeline scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimelineOrder {
    /// `created_at` descending, ties kept in insertion order.
    #[default]
    NewestFirst,
    /// `featured_order` ascending nulls-last, then `created_at` descending.
    FeaturedRank,
}

/// A filtered, sorted, capped scan over a timeline collection
/// (projects or collaborations).
#[derive(Debug, Clone, Default)]
pub struct TimelineQuery {
    /// Exact category match; `None` disables the filter.
    pub category: Option<String>,
    /// Status allow-list; empty applies no status filter.
    pub statuses: Vec<String>,
    /// Case-insensitive substring match on title/description.
    pub search: Option<String>,
    /// Exclusive upper bound on `created_at`.
    pub created_before: Option<DateTime<Utc>>,
    pub author: AuthorScope,
    /// Editorial-featured predicate; `None` disables the filter.
    pub featured: Option<bool>,
    pub order: TimelineOrder,
    /// Rows the viewer has hidden or blocked.
    pub exclude_ids: Vec<String>,
    /// Authors the viewer has blocked.
    pub exclude_authors: Vec<String>,
    pub limit: i64,
}

/// A filtered, capped scan over the partner or brand collection.
///
/// Preference exclusions are deliberately NOT part of this query: partner rows
/// are filtered after the fetch, matching the serving behavior the clients
/// already paginate against.
#[derive(Debug, Clone, Default)]
pub struct PartnerQuery {
    /// Display label matched as a case-insensitive substring of
    /// `activity_field`; `None` disables the filter.
    pub activity_label: Option<String>,
    /// Case-insensitive substring match on name/bio.
    pub search: Option<String>,
    pub created_before: Option<DateTime<Utc>>,
    /// Anonymous viewers only see approved brands.
    pub include_unapproved_brands: bool,
    pub limit: i64,
}

/// Read-only record access used by the feed aggregator.
#[async_trait]
pub trait FeedStore: Send + Sync {
    async fn list_projects(&self, query: &TimelineQuery) -> StoreResult<Vec<Project>>;

    async fn list_collaborations(&self, query: &TimelineQuery) -> StoreResult<Vec<Collaboration>>;

    async fn list_partners(&self, query: &PartnerQuery) -> StoreResult<Vec<Partner>>;

    async fn list_brands(&self, query: &PartnerQuery) -> StoreResult<Vec<Brand>>;

    async fn partners_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Partner>>;

    async fn brands_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Brand>>;

    /// Active paid placements (`ends_at > now`), rank ascending, capped.
    async fn active_boosts(&self, now: DateTime<Utc>, limit: i64) -> StoreResult<Vec<Boost>>;

    /// Ids of `kind` records the viewer has hidden or blocked.
    async fn excluded_content_ids(
        &self,
        viewer_id: &str,
        kind: ContentKind,
    ) -> StoreResult<Vec<String>>;

    /// Ids of users the viewer has blocked; their content is excluded across
    /// all content types.
    async fn blocked_author_ids(&self, viewer_id: &str) -> StoreResult<Vec<String>>;
}
