use actix_web::{post, web, HttpResponse};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cursor;
use crate::error::Result;
use crate::models::{ExploreFeedRequest, ExploreFeedResponse};
use crate::services::{ExploreQuery, FeedAggregator};

/// Statuses an anonymous viewer is allowed to see.
const ANONYMOUS_STATUSES: [&str; 2] = ["open", "in_progress"];

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

/// Category sentinel meaning "no category filter".
const CATEGORY_ALL: &str = "all";

/// Narrow the requested statuses to what the viewer may see.
///
/// Authenticated viewers get their list as-is (empty means no status filter).
/// Anonymous viewers are restricted to the public statuses; if their request
/// names none of them, the whole public set applies.
fn effective_statuses(statuses: &[String], anonymous: bool) -> Vec<String> {
    if !anonymous {
        return statuses.to_vec();
    }
    let filtered: Vec<String> = statuses
        .iter()
        .filter(|s| ANONYMOUS_STATUSES.contains(&s.as_str()))
        .cloned()
        .collect();
    if filtered.is_empty() {
        ANONYMOUS_STATUSES.iter().map(|s| s.to_string()).collect()
    } else {
        filtered
    }
}

fn normalize_category(category: Option<&str>) -> Option<String> {
    match category {
        Some(c) if !c.is_empty() && c != CATEGORY_ALL => Some(c.to_string()),
        _ => None,
    }
}

/// Type-specific cursor wins over the legacy unified one; empty strings count
/// as absent. A present but unparsable cursor is a client error.
fn resolve_cursor(specific: Option<&str>, legacy: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    let raw = specific
        .filter(|s| !s.is_empty())
        .or_else(|| legacy.filter(|s| !s.is_empty()));
    match raw {
        Some(raw) => Ok(Some(cursor::decode(raw)?)),
        None => Ok(None),
    }
}

fn redact(value: Option<&str>) -> &'static str {
    match value {
        Some(v) if !v.is_empty() => "***",
        _ => "-",
    }
}

#[post("/explore")]
pub async fn explore_feed(
    body: web::Json<ExploreFeedRequest>,
    aggregator: web::Data<FeedAggregator>,
) -> Result<HttpResponse> {
    let req = body.into_inner();
    let viewer_id = req.user_id.clone().filter(|id| !id.is_empty());
    let anonymous = viewer_id.is_none();

    let limit = i64::from(req.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT));
    let statuses = effective_statuses(&req.statuses, anonymous);
    let category = normalize_category(req.category.as_deref());

    // Cursors and viewer id are redacted; they are opaque client state.
    debug!(
        "Explore feed request: category={:?} statuses={:?} search={:?} limit={} tab={:?} cursor={} projects_cursor={} collaborations_cursor={} partners_cursor={} viewer={}",
        category,
        statuses,
        req.search_query,
        limit,
        req.active_tab,
        redact(req.cursor.as_deref()),
        redact(req.projects_cursor.as_deref()),
        redact(req.collaborations_cursor.as_deref()),
        redact(req.partners_cursor.as_deref()),
        redact(viewer_id.as_deref()),
    );

    let legacy = req.cursor.as_deref();
    let query = ExploreQuery {
        category,
        statuses,
        search: req
            .search_query
            .clone()
            .filter(|s| !s.trim().is_empty()),
        limit,
        projects_cursor: resolve_cursor(req.projects_cursor.as_deref(), legacy)?,
        collaborations_cursor: resolve_cursor(req.collaborations_cursor.as_deref(), legacy)?,
        partners_cursor: resolve_cursor(req.partners_cursor.as_deref(), legacy)?,
        active_tab: req.active_tab,
        fetch_mode: req.fetch_mode,
        viewer_id,
    };

    let feed = aggregator.aggregate(&query).await;

    Ok(HttpResponse::Ok().json(ExploreFeedResponse {
        projects: feed.projects,
        collaborations: feed.collaborations,
        partners: feed.partners,
        projects_cursor: feed.cursors.projects.map(cursor::encode),
        collaborations_cursor: feed.cursors.collaborations.map(cursor::encode),
        partners_cursor: feed.cursors.partners.map(cursor::encode),
        next_cursor: feed.legacy_cursor.map(cursor::encode),
    }))
}
