//! Cursor handling for the explore feed.
//!
//! A cursor is an opaque RFC 3339 instant meaning "strictly older than this
//! point". Each content type paginates independently, so a response carries one
//! cursor per type plus a legacy unified cursor derived from the set.

use chrono::{DateTime, Duration, SecondsFormat, Utc};

use crate::error::{AppError, Result};

/// Parse a client-supplied cursor string.
pub fn decode(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::BadRequest(format!("invalid cursor: {}", raw)))
}

/// Serialize a cursor the way clients replay it (millisecond precision, UTC).
pub fn encode(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Shift a boundary timestamp back by one millisecond so an item whose
/// `created_at` exactly equals the boundary is not re-shown on the next page.
pub fn adjust(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts - Duration::milliseconds(1)
}

/// The per-type next-cursors of one response. Each field is present only when
/// that type reported has-more; values are already boundary-adjusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorSet {
    pub projects: Option<DateTime<Utc>>,
    pub collaborations: Option<DateTime<Utc>>,
    pub partners: Option<DateTime<Utc>>,
}

impl CursorSet {
    /// Legacy unified cursor: the most recent of the per-type cursors.
    ///
    /// `total_items` is the item count of the whole response; an empty response
    /// never advertises a resume point, however the per-type flags landed.
    pub fn legacy(&self, total_items: usize) -> Option<DateTime<Utc>> {
        if total_items == 0 {
            return None;
        }
        [self.projects, self.collaborations, self.partners]
            .into_iter()
            .flatten()
            .max()
    }
}
