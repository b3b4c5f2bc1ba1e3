//! In-memory record store.
//!
//! Mirrors the Postgres adapter's filter semantics over plain vectors. Used by
//! the test suites and for local development without a database. Individual
//! sources can be made to fail to exercise the degraded-read paths.

use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Boost, Brand, Collaboration, Partner, Project};

use super::{
    AuthorScope, ContentKind, FeedStore, PartnerQuery, StoreError, StoreResult, TimelineOrder,
    TimelineQuery,
};

#[derive(Debug, Clone)]
struct PreferenceRecord {
    viewer_id: String,
    target_id: String,
    kind: ContentKind,
    status: String,
}

#[derive(Default)]
struct Inner {
    projects: Vec<Project>,
    collaborations: Vec<Collaboration>,
    partners: Vec<Partner>,
    brands: Vec<Brand>,
    boosts: Vec<Boost>,
    preferences: Vec<PreferenceRecord>,
    failing: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_project(&self, project: Project) {
        self.inner.write().unwrap().projects.push(project);
    }

    pub fn add_collaboration(&self, collaboration: Collaboration) {
        self.inner
            .write()
            .unwrap()
            .collaborations
            .push(collaboration);
    }

    pub fn add_partner(&self, partner: Partner) {
        self.inner.write().unwrap().partners.push(partner);
    }

    pub fn add_brand(&self, brand: Brand) {
        self.inner.write().unwrap().brands.push(brand);
    }

    pub fn add_boost(&self, boost: Boost) {
        self.inner.write().unwrap().boosts.push(boost);
    }

    /// Record a viewer preference (`status` is `"hidden"` or `"blocked"`).
    pub fn add_preference(&self, viewer_id: &str, target_id: &str, kind: ContentKind, status: &str) {
        self.inner.write().unwrap().preferences.push(PreferenceRecord {
            viewer_id: viewer_id.to_string(),
            target_id: target_id.to_string(),
            kind,
            status: status.to_string(),
        });
    }

    /// Make every subsequent read of `source` fail
    /// (`projects`, `collaborations`, `partners`, `brands`, `boosts`, `preferences`).
    pub fn fail_source(&self, source: &str) {
        self.inner.write().unwrap().failing.insert(source.to_string());
    }

    fn check_failing(&self, source: &str) -> StoreResult<()> {
        if self.inner.read().unwrap().failing.contains(source) {
            return Err(StoreError::Other(format!("{} source unavailable", source)));
        }
        Ok(())
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_timeline(
    query: &TimelineQuery,
    id: &str,
    created_by: &str,
    created_at: DateTime<Utc>,
    category: &str,
    status: &str,
    is_featured: bool,
    search_fields: (&str, &str),
) -> bool {
    if let Some(cat) = &query.category {
        if category != cat {
            return false;
        }
    }
    if !query.statuses.is_empty() && !query.statuses.iter().any(|s| s == status) {
        return false;
    }
    if let Some(search) = &query.search {
        if !contains_ci(search_fields.0, search) && !contains_ci(search_fields.1, search) {
            return false;
        }
    }
    if let Some(before) = query.created_before {
        if created_at >= before {
            return false;
        }
    }
    match &query.author {
        AuthorScope::Any => {}
        AuthorScope::Only(author) => {
            if created_by != author {
                return false;
            }
        }
        AuthorScope::Not(author) => {
            if created_by == author {
                return false;
            }
        }
    }
    if let Some(featured) = query.featured {
        if is_featured != featured {
            return false;
        }
    }
    if query.exclude_ids.iter().any(|x| x == id) {
        return false;
    }
    if query.exclude_authors.iter().any(|x| x == created_by) {
        return false;
    }
    true
}

fn sort_timeline<T>(
    rows: &mut Vec<T>,
    order: TimelineOrder,
    created_at: impl Fn(&T) -> DateTime<Utc>,
    featured_order: impl Fn(&T) -> Option<i32>,
) {
    match order {
        TimelineOrder::NewestFirst => {
            // stable sort keeps insertion order for equal timestamps
            rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
        }
        TimelineOrder::FeaturedRank => {
            rows.sort_by(|a, b| match (featured_order(a), featured_order(b)) {
                (Some(x), Some(y)) => x.cmp(&y).then(created_at(b).cmp(&created_at(a))),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => created_at(b).cmp(&created_at(a)),
            });
        }
    }
}

fn cap<T>(mut rows: Vec<T>, limit: i64) -> Vec<T> {
    let limit = limit.max(0) as usize;
    rows.truncate(limit);
    rows
}

#[async_trait]
impl FeedStore for MemoryStore {
    async fn list_projects(&self, query: &TimelineQuery) -> StoreResult<Vec<Project>> {
        self.check_failing("projects")?;
        let inner = self.inner.read().unwrap();
        let mut rows: Vec<Project> = inner
            .projects
            .iter()
            .filter(|p| {
                matches_timeline(
                    query,
                    &p.id,
                    &p.created_by,
                    p.created_at,
                    &p.category,
                    &p.status,
                    p.is_featured,
                    (&p.title, &p.description),
                )
            })
            .cloned()
            .collect();
        sort_timeline(&mut rows, query.order, |p| p.created_at, |p| p.featured_order);
        Ok(cap(rows, query.limit))
    }

    async fn list_collaborations(&self, query: &TimelineQuery) -> StoreResult<Vec<Collaboration>> {
        self.check_failing("collaborations")?;
        let inner = self.inner.read().unwrap();
        let mut rows: Vec<Collaboration> = inner
            .collaborations
            .iter()
            .filter(|c| {
                matches_timeline(
                    query,
                    &c.id,
                    &c.created_by,
                    c.created_at,
                    &c.category,
                    &c.status,
                    c.is_featured,
                    (&c.title, &c.brief_description),
                )
            })
            .cloned()
            .collect();
        sort_timeline(&mut rows, query.order, |c| c.created_at, |c| c.featured_order);
        Ok(cap(rows, query.limit))
    }

    async fn list_partners(&self, query: &PartnerQuery) -> StoreResult<Vec<Partner>> {
        self.check_failing("partners")?;
        let inner = self.inner.read().unwrap();
        let mut rows: Vec<Partner> = inner
            .partners
            .iter()
            .filter(|p| {
                if let Some(label) = &query.activity_label {
                    if !contains_ci(&p.activity_field, label) {
                        return false;
                    }
                }
                if let Some(search) = &query.search {
                    if !contains_ci(&p.name, search) && !contains_ci(&p.bio, search) {
                        return false;
                    }
                }
                if let Some(before) = query.created_before {
                    if p.created_at >= before {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cap(rows, query.limit))
    }

    async fn list_brands(&self, query: &PartnerQuery) -> StoreResult<Vec<Brand>> {
        self.check_failing("brands")?;
        let inner = self.inner.read().unwrap();
        let mut rows: Vec<Brand> = inner
            .brands
            .iter()
            .filter(|b| {
                if !b.is_active {
                    return false;
                }
                if !query.include_unapproved_brands && b.approval_status != "approved" {
                    return false;
                }
                if let Some(label) = &query.activity_label {
                    if !contains_ci(&b.activity_field, label) {
                        return false;
                    }
                }
                if let Some(search) = &query.search {
                    let description = b.description.as_deref().unwrap_or("");
                    if !contains_ci(&b.brand_name, search) && !contains_ci(description, search) {
                        return false;
                    }
                }
                if let Some(before) = query.created_before {
                    if b.created_at >= before {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cap(rows, query.limit))
    }

    async fn partners_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Partner>> {
        self.check_failing("partners")?;
        let inner = self.inner.read().unwrap();
        Ok(inner
            .partners
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn brands_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Brand>> {
        self.check_failing("brands")?;
        let inner = self.inner.read().unwrap();
        Ok(inner
            .brands
            .iter()
            .filter(|b| ids.contains(&b.profile_id))
            .cloned()
            .collect())
    }

    async fn active_boosts(&self, now: DateTime<Utc>, limit: i64) -> StoreResult<Vec<Boost>> {
        self.check_failing("boosts")?;
        let inner = self.inner.read().unwrap();
        let mut rows: Vec<Boost> = inner
            .boosts
            .iter()
            .filter(|b| b.ends_at > now)
            .cloned()
            .collect();
        rows.sort_by_key(|b| b.rank_position);
        Ok(cap(rows, limit))
    }

    async fn excluded_content_ids(
        &self,
        viewer_id: &str,
        kind: ContentKind,
    ) -> StoreResult<Vec<String>> {
        self.check_failing("preferences")?;
        let inner = self.inner.read().unwrap();
        Ok(inner
            .preferences
            .iter()
            .filter(|p| {
                p.viewer_id == viewer_id
                    && p.kind == kind
                    && (p.status == "hidden" || p.status == "blocked")
            })
            .map(|p| p.target_id.clone())
            .collect())
    }

    async fn blocked_author_ids(&self, viewer_id: &str) -> StoreResult<Vec<String>> {
        self.check_failing("preferences")?;
        let inner = self.inner.read().unwrap();
        Ok(inner
            .preferences
            .iter()
            .filter(|p| {
                p.viewer_id == viewer_id && p.kind == ContentKind::Partner && p.status == "blocked"
            })
            .map(|p| p.target_id.clone())
            .collect())
    }
}
