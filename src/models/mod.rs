use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project card in the explore feed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub cover_image_url: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub category: String,
    pub status: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub budget_range: Option<String>,
    pub deadline: Option<String>,
    pub team_size: Option<i32>,
    pub is_featured: bool,
    pub featured_order: Option<i32>,
    /// Set on page 1 for rows authored by the viewer; never stored.
    #[sqlx(default)]
    #[serde(default)]
    pub is_mine: bool,
}

/// A collaboration card in the explore feed.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Collaboration {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub brief_description: String,
    #[serde(default)]
    pub description: String,
    pub cover_image_url: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub category: String,
    pub status: String,
    pub collaboration_type: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub team_size: Option<i32>,
    pub is_featured: bool,
    pub featured_order: Option<i32>,
    #[sqlx(default)]
    #[serde(default)]
    pub is_mine: bool,
}

/// A partner card: artists and creatives, plus brands mapped into this shape.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: String,
    pub name: String,
    pub profile_image_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub activity_field: String,
    #[serde(default)]
    pub region: String,
    pub role: String,
    #[serde(default)]
    pub specialized_roles: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub bio: String,
    pub rating: Option<f64>,
    pub review_count: i32,
    pub completed_projects: i32,
    pub is_online: bool,
    pub is_verified: bool,
    #[serde(default)]
    pub career: String,
    pub created_at: DateTime<Utc>,
}

/// A brand profile. Brands live in their own collection but are served through
/// the partners tab, so they carry a mapping into [`Partner`].
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub profile_id: String,
    pub brand_name: String,
    pub logo_image_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub activity_field: String,
    pub region: Option<String>,
    #[serde(default)]
    pub target_audiences: Vec<String>,
    pub description: Option<String>,
    pub is_active: bool,
    pub approval_status: String,
    pub created_at: DateTime<Utc>,
}

impl Brand {
    /// Map a brand into the partner card shape served on the partners tab.
    /// Stats a brand cannot have (rating, matching metrics) are zeroed.
    pub fn into_partner(self) -> Partner {
        Partner {
            id: self.profile_id,
            name: self.brand_name,
            profile_image_url: self.logo_image_url,
            cover_image_url: self.cover_image_url,
            activity_field: self.activity_field,
            region: self.region.unwrap_or_default(),
            role: "brand".to_string(),
            specialized_roles: self.target_audiences,
            tags: Vec::new(),
            bio: self.description.unwrap_or_default(),
            rating: None,
            review_count: 0,
            completed_projects: 0,
            is_online: false,
            is_verified: false,
            career: String::new(),
            created_at: self.created_at,
        }
    }
}

/// An active paid placement on the partners tab.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Boost {
    pub user_id: String,
    pub rank_position: i32,
    pub ends_at: DateTime<Utc>,
}

/// Which tab the client is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedTab {
    Projects,
    Collaborations,
    Partners,
}

/// Whether to refresh every tab or only the active one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchMode {
    #[default]
    #[serde(rename = "full")]
    Full,
    #[serde(rename = "active-only")]
    ActiveOnly,
}

/// Request body of the explore feed endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreFeedRequest {
    pub category: Option<String>,
    #[serde(default)]
    pub statuses: Vec<String>,
    pub search_query: Option<String>,
    pub limit: Option<u32>,
    /// Legacy unified cursor, used as a fallback for any missing type cursor.
    pub cursor: Option<String>,
    pub active_tab: Option<FeedTab>,
    #[serde(default)]
    pub fetch_mode: FetchMode,
    pub projects_cursor: Option<String>,
    pub collaborations_cursor: Option<String>,
    pub partners_cursor: Option<String>,
    pub user_id: Option<String>,
}

/// Response payload of the explore feed endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreFeedResponse {
    pub projects: Vec<Project>,
    pub collaborations: Vec<Collaboration>,
    pub partners: Vec<Partner>,
    pub projects_cursor: Option<String>,
    pub collaborations_cursor: Option<String>,
    pub partners_cursor: Option<String>,
    /// Legacy: most recent of the per-type cursors.
    pub next_cursor: Option<String>,
}
