//! Partner-tab sources: the partner collection and the brand collection.
//!
//! The two sources are queried independently and merged by the aggregator.
//! Category codes are translated to their display labels before matching
//! `activity_field`, because partner profiles store the label text, not the
//! code. Preference exclusions are applied after the fetch, not in the query.

use tracing::{debug, warn};

use crate::metrics;
use crate::models::Partner;
use crate::store::{FeedStore, PartnerQuery};

use super::exclusions::Exclusions;

/// Category code -> display label, as shown on partner profiles.
const CATEGORY_LABELS: &[(&str, &str)] = &[
    ("music", "Music"),
    ("fashion", "Fashion"),
    ("beauty", "Beauty"),
    ("contents", "Contents"),
    ("market", "Market"),
    ("investment", "Investment"),
    ("live_shopping", "Live Shopping"),
    ("event", "Event"),
    ("ticket", "Culture"),
    ("tech", "Digital"),
    ("life", "Life"),
    ("healing", "Healing"),
];

/// Translate a category code to its display label. Unmapped codes pass
/// through unchanged and are matched as-is.
pub fn category_label(code: &str) -> String {
    CATEGORY_LABELS
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Inputs shared by the partner and brand sub-queries. `category` is the
/// normalized request code (sentinel already resolved to `None`).
#[derive(Debug, Clone, Default)]
pub struct PartnerTabOptions {
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: i64,
    pub cursor: Option<chrono::DateTime<chrono::Utc>>,
    pub viewer_id: Option<String>,
}

fn build_query(opts: &PartnerTabOptions) -> PartnerQuery {
    PartnerQuery {
        activity_label: opts.category.as_deref().map(category_label),
        search: opts.search.clone(),
        created_before: opts.cursor,
        // Authenticated viewers see all active brands; anonymous viewers only
        // approved ones.
        include_unapproved_brands: opts.viewer_id.is_some(),
        limit: opts.limit,
    }
}

fn apply_exclusions(rows: Vec<Partner>, exclusions: &Exclusions) -> Vec<Partner> {
    if exclusions.item_ids.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|p| !exclusions.item_ids.contains(&p.id))
        .collect()
}

/// Fetch one page of partner rows, post-filtered by viewer exclusions.
pub async fn fetch_partners(
    store: &dyn FeedStore,
    opts: &PartnerTabOptions,
    exclusions: &Exclusions,
) -> Vec<Partner> {
    let query = build_query(opts);
    debug!(
        "Partner query: label={:?} search={:?} cursor_set={}",
        query.activity_label,
        query.search,
        query.created_before.is_some()
    );

    match store.list_partners(&query).await {
        Ok(rows) => {
            metrics::observe_fanout("partners", "ok");
            apply_exclusions(rows, exclusions)
        }
        Err(err) => {
            warn!("partners query failed (degrading to empty slice): {}", err);
            metrics::observe_fanout("partners", "degraded");
            Vec::new()
        }
    }
}

/// Fetch one page of brand rows mapped into the partner shape, post-filtered
/// by viewer exclusions.
pub async fn fetch_brands(
    store: &dyn FeedStore,
    opts: &PartnerTabOptions,
    exclusions: &Exclusions,
) -> Vec<Partner> {
    let query = build_query(opts);

    match store.list_brands(&query).await {
        Ok(rows) => {
            metrics::observe_fanout("brands", "ok");
            let mapped: Vec<Partner> = rows.into_iter().map(|b| b.into_partner()).collect();
            apply_exclusions(mapped, exclusions)
        }
        Err(err) => {
            warn!("brands query failed (degrading to empty slice): {}", err);
            metrics::observe_fanout("brands", "degraded");
            Vec::new()
        }
    }
}
