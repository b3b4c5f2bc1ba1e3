//! Paid-placement overlay for the partners tab.
//!
//! Resolves the currently active boosts into partner cards, in rank order.
//! Only applied to page 1; a boost whose target profile no longer resolves is
//! dropped silently.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::metrics;
use crate::models::Partner;
use crate::store::FeedStore;

/// Paid placements honored per page.
pub const BOOST_SLOTS: i64 = 5;

/// Resolve active boosts into an ordered list of partner cards.
pub async fn resolve_boosted_partners(store: &dyn FeedStore, now: DateTime<Utc>) -> Vec<Partner> {
    let boosts = match store.active_boosts(now, BOOST_SLOTS).await {
        Ok(boosts) => {
            metrics::observe_fanout("boosts", "ok");
            boosts
        }
        Err(err) => {
            warn!("Boost lookup failed (continuing without boosts): {}", err);
            metrics::observe_fanout("boosts", "degraded");
            return Vec::new();
        }
    };
    if boosts.is_empty() {
        return Vec::new();
    }

    // active_boosts is already rank-ascending; keep that order through the
    // id resolution below.
    let boosted_ids: Vec<String> = boosts.into_iter().map(|b| b.user_id).collect();

    let (partners, brands) = tokio::join!(
        store.partners_by_ids(&boosted_ids),
        store.brands_by_ids(&boosted_ids)
    );

    let mut pool: Vec<Partner> = match partners {
        Ok(rows) => rows,
        Err(err) => {
            warn!("Boosted partner lookup failed: {}", err);
            Vec::new()
        }
    };
    match brands {
        Ok(rows) => pool.extend(rows.into_iter().map(|b| b.into_partner())),
        Err(err) => warn!("Boosted brand lookup failed: {}", err),
    }

    boosted_ids
        .iter()
        .filter_map(|id| pool.iter().find(|p| &p.id == id).cloned())
        .collect()
}
