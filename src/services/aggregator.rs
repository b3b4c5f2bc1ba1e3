//! Feed aggregation: concurrent fan-out to the three content types, partner
//! merge with the boost overlay, and cursor composition.
//!
//! The three type fetches are independent read-only operations with no shared
//! mutable state, so they are dispatched together and joined before the
//! response is composed. Each one sees its own snapshot of "now"; the overall
//! response is not atomic across types, which is accepted behavior.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::cursor::{self, CursorSet};
use crate::models::{Collaboration, FeedTab, FetchMode, Partner, Project};
use crate::store::{ContentKind, FeedStore};

use super::boosts;
use super::exclusions;
use super::partners::{self, PartnerTabOptions};
use super::timeline::{
    self, CollaborationTimeline, ProjectTimeline, TimelineOptions, TimelinePage,
};

/// Normalized inputs for one feed request. Statuses are already
/// viewer-narrowed and the category sentinel is resolved; cursors are parsed
/// instants with the legacy fallback applied per type.
#[derive(Debug, Clone, Default)]
pub struct ExploreQuery {
    pub category: Option<String>,
    pub statuses: Vec<String>,
    pub search: Option<String>,
    pub limit: i64,
    pub projects_cursor: Option<DateTime<Utc>>,
    pub collaborations_cursor: Option<DateTime<Utc>>,
    pub partners_cursor: Option<DateTime<Utc>>,
    pub active_tab: Option<FeedTab>,
    pub fetch_mode: FetchMode,
    pub viewer_id: Option<String>,
}

/// The composed feed: items per type plus the cursor set.
#[derive(Debug, Clone)]
pub struct ExploreFeed {
    pub projects: Vec<Project>,
    pub collaborations: Vec<Collaboration>,
    pub partners: Vec<Partner>,
    pub cursors: CursorSet,
    pub legacy_cursor: Option<DateTime<Utc>>,
}

struct PartnerTab {
    items: Vec<Partner>,
    has_more: bool,
    next_anchor: Option<DateTime<Utc>>,
}

impl PartnerTab {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
            next_anchor: None,
        }
    }
}

fn type_cursor<T>(page: &TimelinePage<T>) -> Option<DateTime<Utc>> {
    if page.has_more {
        page.next_anchor.map(cursor::adjust)
    } else {
        None
    }
}

pub struct FeedAggregator {
    store: Arc<dyn FeedStore>,
}

impl FeedAggregator {
    pub fn new(store: Arc<dyn FeedStore>) -> Self {
        Self { store }
    }

    /// Compose one feed response. Never fails: every collaborator read
    /// degrades to an empty slice on error.
    pub async fn aggregate(&self, query: &ExploreQuery) -> ExploreFeed {
        let active_only = query.fetch_mode == FetchMode::ActiveOnly;
        let fetch_projects = !active_only || query.active_tab == Some(FeedTab::Projects);
        let fetch_collaborations =
            !active_only || query.active_tab == Some(FeedTab::Collaborations);
        let fetch_partners = !active_only || query.active_tab == Some(FeedTab::Partners);

        let (projects_page, collaborations_page, partner_tab) = tokio::join!(
            self.projects_page(query, fetch_projects),
            self.collaborations_page(query, fetch_collaborations),
            self.partner_tab(query, fetch_partners),
        );

        let cursors = CursorSet {
            projects: type_cursor(&projects_page),
            collaborations: type_cursor(&collaborations_page),
            partners: if partner_tab.has_more {
                partner_tab.next_anchor.map(cursor::adjust)
            } else {
                None
            },
        };

        let total_items = projects_page.items.len()
            + collaborations_page.items.len()
            + partner_tab.items.len();
        let legacy_cursor = cursors.legacy(total_items);

        info!(
            "Explore feed composed: projects={} collaborations={} partners={} has_more={}",
            projects_page.items.len(),
            collaborations_page.items.len(),
            partner_tab.items.len(),
            projects_page.has_more || collaborations_page.has_more || partner_tab.has_more
        );

        ExploreFeed {
            projects: projects_page.items,
            collaborations: collaborations_page.items,
            partners: partner_tab.items,
            cursors,
            legacy_cursor,
        }
    }

    async fn projects_page(&self, query: &ExploreQuery, enabled: bool) -> TimelinePage<Project> {
        if !enabled {
            return TimelinePage::empty();
        }
        let exclusions = exclusions::resolve(
            self.store.as_ref(),
            query.viewer_id.as_deref(),
            ContentKind::Project,
        )
        .await;
        let opts = TimelineOptions {
            category: query.category.clone(),
            statuses: query.statuses.clone(),
            search: query.search.clone(),
            limit: query.limit,
            cursor: query.projects_cursor,
            viewer_id: query.viewer_id.clone(),
        };
        timeline::fetch_page(&ProjectTimeline(self.store.as_ref()), &opts, &exclusions).await
    }

    async fn collaborations_page(
        &self,
        query: &ExploreQuery,
        enabled: bool,
    ) -> TimelinePage<Collaboration> {
        if !enabled {
            return TimelinePage::empty();
        }
        let exclusions = exclusions::resolve(
            self.store.as_ref(),
            query.viewer_id.as_deref(),
            ContentKind::Collaboration,
        )
        .await;
        let opts = TimelineOptions {
            category: query.category.clone(),
            statuses: query.statuses.clone(),
            search: query.search.clone(),
            limit: query.limit,
            cursor: query.collaborations_cursor,
            viewer_id: query.viewer_id.clone(),
        };
        timeline::fetch_page(
            &CollaborationTimeline(self.store.as_ref()),
            &opts,
            &exclusions,
        )
        .await
    }

    async fn partner_tab(&self, query: &ExploreQuery, enabled: bool) -> PartnerTab {
        if !enabled {
            return PartnerTab::empty();
        }
        let store = self.store.as_ref();
        let exclusions =
            exclusions::resolve(store, query.viewer_id.as_deref(), ContentKind::Partner).await;
        let opts = PartnerTabOptions {
            category: query.category.clone(),
            search: query.search.clone(),
            limit: query.limit,
            cursor: query.partners_cursor,
            viewer_id: query.viewer_id.clone(),
        };

        let (partner_rows, brand_rows) = tokio::join!(
            partners::fetch_partners(store, &opts, &exclusions),
            partners::fetch_brands(store, &opts, &exclusions),
        );

        // Boosts only surface on page 1 of the partners tab.
        let boosted = if query.partners_cursor.is_none() {
            boosts::resolve_boosted_partners(store, Utc::now()).await
        } else {
            Vec::new()
        };

        // Saturation of either sub-query implies more pages may exist.
        let has_more = partner_rows.len() as i64 == query.limit
            || brand_rows.len() as i64 == query.limit;

        // The resume point is the oldest row either sub-query returned,
        // taken before boost dedup and before truncation.
        let mut all_rows: Vec<Partner> = partner_rows;
        all_rows.extend(brand_rows);
        let next_anchor = all_rows.iter().map(|p| p.created_at).min();

        let boosted_ids: HashSet<String> = boosted.iter().map(|p| p.id.clone()).collect();
        let mut normal: Vec<Partner> = all_rows
            .into_iter()
            .filter(|p| !boosted_ids.contains(&p.id))
            .collect();
        normal.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut items = boosted;
        items.extend(normal);
        items.truncate(query.limit.max(0) as usize);

        PartnerTab {
            items,
            has_more,
            next_anchor,
        }
    }
}
