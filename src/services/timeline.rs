//! Priority-aware cursor pagination for the timeline types
//! (projects and collaborations, which share one algorithm).
//!
//! Page 1 for an authenticated viewer is a capped merge of three independently
//! fetched, already-sorted slices: the viewer's own items, editorially featured
//! items, then the general stream. The next-page cursor is anchored to the
//! general stream only, because "mine" and "featured" are never re-shown once
//! a cursor exists. Subsequent pages (and all anonymous pages) are a plain
//! descending scan below the cursor.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::metrics;
use crate::models::{Collaboration, Project};
use crate::store::{AuthorScope, FeedStore, StoreResult, TimelineOrder, TimelineQuery};

use super::exclusions::Exclusions;

/// Editorial slots available on page 1.
pub const FEATURED_SLOTS: i64 = 5;

/// A record that can appear in a prioritized timeline.
pub trait TimelineRecord {
    fn created_at(&self) -> DateTime<Utc>;
    fn mark_mine(&mut self);
}

impl TimelineRecord for Project {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn mark_mine(&mut self) {
        self.is_mine = true;
    }
}

impl TimelineRecord for Collaboration {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn mark_mine(&mut self) {
        self.is_mine = true;
    }
}

/// One timeline collection behind the record store.
#[async_trait]
pub trait TimelineFetch: Sync {
    type Record: TimelineRecord + Send;

    fn source_name(&self) -> &'static str;

    async fn fetch(&self, query: TimelineQuery) -> StoreResult<Vec<Self::Record>>;
}

pub struct ProjectTimeline<'a>(pub &'a dyn FeedStore);

#[async_trait]
impl TimelineFetch for ProjectTimeline<'_> {
    type Record = Project;

    fn source_name(&self) -> &'static str {
        "projects"
    }

    async fn fetch(&self, query: TimelineQuery) -> StoreResult<Vec<Project>> {
        self.0.list_projects(&query).await
    }
}

pub struct CollaborationTimeline<'a>(pub &'a dyn FeedStore);

#[async_trait]
impl TimelineFetch for CollaborationTimeline<'_> {
    type Record = Collaboration;

    fn source_name(&self) -> &'static str {
        "collaborations"
    }

    async fn fetch(&self, query: TimelineQuery) -> StoreResult<Vec<Collaboration>> {
        self.0.list_collaborations(&query).await
    }
}

/// Inputs for one timeline page fetch. Category is already normalized
/// (the "all" sentinel resolved to `None`) and statuses are the effective,
/// viewer-narrowed list.
#[derive(Debug, Clone, Default)]
pub struct TimelineOptions {
    pub category: Option<String>,
    pub statuses: Vec<String>,
    pub search: Option<String>,
    pub limit: i64,
    pub cursor: Option<DateTime<Utc>>,
    pub viewer_id: Option<String>,
}

/// One page of a timeline, plus the pagination state derived from it.
/// `next_anchor` is the raw resume timestamp (oldest row of the general
/// stream); boundary adjustment happens when cursors are composed.
#[derive(Debug, Clone)]
pub struct TimelinePage<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub next_anchor: Option<DateTime<Utc>>,
}

impl<T> Default for TimelinePage<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
            next_anchor: None,
        }
    }
}

impl<T> TimelinePage<T> {
    /// The empty-page sentinel returned for tabs skipped in active-only mode.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Ordered union with a cap: concatenate the priority lists in order and
/// truncate to `limit`. Each input list is already sorted; the merge preserves
/// list order, not global timestamp order (priority wins over recency).
pub fn cap_merge<T>(lists: Vec<Vec<T>>, limit: usize) -> Vec<T> {
    let mut merged: Vec<T> = lists.into_iter().flatten().collect();
    merged.truncate(limit);
    merged
}

async fn fetch_or_empty<S: TimelineFetch>(source: &S, query: TimelineQuery) -> Vec<S::Record> {
    match source.fetch(query).await {
        Ok(rows) => {
            metrics::observe_fanout(source.source_name(), "ok");
            rows
        }
        Err(err) => {
            warn!(
                "{} query failed (degrading to empty slice): {}",
                source.source_name(),
                err
            );
            metrics::observe_fanout(source.source_name(), "degraded");
            Vec::new()
        }
    }
}

/// Fetch one page of a timeline type.
pub async fn fetch_page<S: TimelineFetch>(
    source: &S,
    opts: &TimelineOptions,
    exclusions: &Exclusions,
) -> TimelinePage<S::Record> {
    let base = TimelineQuery {
        category: opts.category.clone(),
        statuses: opts.statuses.clone(),
        search: opts.search.clone(),
        exclude_ids: exclusions.item_ids_vec(),
        exclude_authors: exclusions.author_ids_vec(),
        limit: opts.limit,
        ..Default::default()
    };

    if opts.cursor.is_none() {
        if let Some(viewer) = opts.viewer_id.clone() {
            return fetch_first_page(source, opts, base, viewer).await;
        }
    }

    // Tail pages, and every anonymous page: plain descending scan.
    let author = match &opts.viewer_id {
        Some(viewer) => AuthorScope::Not(viewer.clone()),
        None => AuthorScope::Any,
    };
    let rows = fetch_or_empty(
        source,
        TimelineQuery {
            featured: Some(false),
            created_before: opts.cursor,
            author,
            ..base
        },
    )
    .await;

    let has_more = rows.len() as i64 == opts.limit;
    let next_anchor = rows.last().map(|r| r.created_at());
    TimelinePage {
        items: rows,
        has_more,
        next_anchor,
    }
}

async fn fetch_first_page<S: TimelineFetch>(
    source: &S,
    opts: &TimelineOptions,
    base: TimelineQuery,
    viewer: String,
) -> TimelinePage<S::Record> {
    // 1. The viewer's own items, up to the whole page.
    let mut mine = fetch_or_empty(
        source,
        TimelineQuery {
            author: AuthorScope::Only(viewer.clone()),
            ..base.clone()
        },
    )
    .await;
    for row in &mut mine {
        row.mark_mine();
    }

    // 2. Featured items fill whatever "mine" left open, never more than the
    //    editorial slot count.
    let featured_slots = FEATURED_SLOTS.min((opts.limit - mine.len() as i64).max(0));
    let featured = if featured_slots > 0 {
        fetch_or_empty(
            source,
            TimelineQuery {
                featured: Some(true),
                author: AuthorScope::Not(viewer.clone()),
                order: TimelineOrder::FeaturedRank,
                limit: featured_slots,
                ..base.clone()
            },
        )
        .await
    } else {
        Vec::new()
    };

    // 3. The general stream is always probed at the full page size, even when
    //    mine+featured already fill the page, so has-more and the next cursor
    //    stay accurate.
    let others = fetch_or_empty(
        source,
        TimelineQuery {
            featured: Some(false),
            author: AuthorScope::Not(viewer),
            ..base
        },
    )
    .await;

    let has_more = others.len() as i64 == opts.limit;
    let next_anchor = others.last().map(|r| r.created_at());
    let items = cap_merge(vec![mine, featured, others], opts.limit.max(0) as usize);

    TimelinePage {
        items,
        has_more,
        next_anchor,
    }
}
