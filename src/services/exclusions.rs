//! Per-viewer exclusion sets.
//!
//! Resolves which records and authors a viewer never sees: individually hidden
//! or blocked items, plus everything authored by a blocked user. A failed
//! lookup degrades to an empty set so filtering problems never take down the
//! feed itself.

use std::collections::HashSet;

use tracing::warn;

use crate::metrics;
use crate::store::{ContentKind, FeedStore};

#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    pub item_ids: HashSet<String>,
    pub author_ids: HashSet<String>,
}

impl Exclusions {
    pub fn item_ids_vec(&self) -> Vec<String> {
        self.item_ids.iter().cloned().collect()
    }

    pub fn author_ids_vec(&self) -> Vec<String> {
        self.author_ids.iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty() && self.author_ids.is_empty()
    }
}

/// Resolve the exclusion sets for one viewer and content type.
///
/// Anonymous viewers have no preferences, so both sets are empty. Author
/// blocks only apply to authored content (projects/collaborations); partner
/// rows are their own authors and use item exclusions alone.
pub async fn resolve(
    store: &dyn FeedStore,
    viewer_id: Option<&str>,
    kind: ContentKind,
) -> Exclusions {
    let Some(viewer) = viewer_id else {
        return Exclusions::default();
    };

    let wants_author_blocks = !matches!(kind, ContentKind::Partner);

    let (items, authors) = tokio::join!(store.excluded_content_ids(viewer, kind), async {
        if wants_author_blocks {
            store.blocked_author_ids(viewer).await
        } else {
            Ok(Vec::new())
        }
    });

    let item_ids = match items {
        Ok(ids) => {
            metrics::observe_fanout("preferences", "ok");
            ids.into_iter().collect()
        }
        Err(err) => {
            warn!(
                "Preference lookup failed for {} (continuing unfiltered): {}",
                kind.as_str(),
                err
            );
            metrics::observe_fanout("preferences", "degraded");
            HashSet::new()
        }
    };

    let author_ids = match authors {
        Ok(ids) => ids.into_iter().collect(),
        Err(err) => {
            warn!("Block-list lookup failed (continuing unfiltered): {}", err);
            metrics::observe_fanout("preferences", "degraded");
            HashSet::new()
        }
    };

    Exclusions {
        item_ids,
        author_ids,
    }
}
