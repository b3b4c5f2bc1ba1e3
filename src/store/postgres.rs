//! Postgres implementation of the record store boundary.
//!
//! Dynamic filters are assembled with `QueryBuilder`; every query is a plain
//! read with bound parameters. Schema lives in `migrations/`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::{Boost, Brand, Collaboration, Partner, Project};

use super::{
    AuthorScope, ContentKind, FeedStore, PartnerQuery, StoreResult, TimelineOrder, TimelineQuery,
};

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn like_pattern(needle: &str) -> String {
    format!("%{}%", needle)
}

/// Append the shared timeline predicates (category, statuses, search, cursor,
/// author scope, featured flag, preference exclusions) to a builder.
fn push_timeline_filters(
    qb: &mut QueryBuilder<'_, Postgres>,
    query: &TimelineQuery,
    search_columns: (&str, &str),
) {
    if let Some(category) = &query.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if !query.statuses.is_empty() {
        qb.push(" AND status = ANY(")
            .push_bind(query.statuses.clone())
            .push(")");
    }
    if let Some(search) = &query.search {
        let pattern = like_pattern(search);
        qb.push(" AND (")
            .push(search_columns.0)
            .push(" ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR ")
            .push(search_columns.1)
            .push(" ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(before) = query.created_before {
        qb.push(" AND created_at < ").push_bind(before);
    }
    match &query.author {
        AuthorScope::Any => {}
        AuthorScope::Only(author) => {
            qb.push(" AND created_by = ").push_bind(author.clone());
        }
        AuthorScope::Not(author) => {
            qb.push(" AND created_by <> ").push_bind(author.clone());
        }
    }
    if let Some(featured) = query.featured {
        qb.push(" AND is_featured = ").push_bind(featured);
    }
    if !query.exclude_ids.is_empty() {
        qb.push(" AND id <> ALL(")
            .push_bind(query.exclude_ids.clone())
            .push(")");
    }
    if !query.exclude_authors.is_empty() {
        qb.push(" AND created_by <> ALL(")
            .push_bind(query.exclude_authors.clone())
            .push(")");
    }
}

fn push_timeline_order(qb: &mut QueryBuilder<'_, Postgres>, query: &TimelineQuery) {
    match query.order {
        TimelineOrder::NewestFirst => {
            qb.push(" ORDER BY created_at DESC");
        }
        TimelineOrder::FeaturedRank => {
            qb.push(" ORDER BY featured_order ASC NULLS LAST, created_at DESC");
        }
    }
    qb.push(" LIMIT ").push_bind(query.limit);
}

#[async_trait]
impl FeedStore for PostgresStore {
    async fn list_projects(&self, query: &TimelineQuery) -> StoreResult<Vec<Project>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, title, description, cover_image_url, created_by, created_at, \
             category, status, tags, skills, budget_range, deadline, team_size, \
             is_featured, featured_order \
             FROM projects WHERE 1=1",
        );
        push_timeline_filters(&mut qb, query, ("title", "description"));
        push_timeline_order(&mut qb, query);

        let rows = qb
            .build_query_as::<Project>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_collaborations(&self, query: &TimelineQuery) -> StoreResult<Vec<Collaboration>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, title, brief_description, description, cover_image_url, created_by, \
             created_at, category, status, collaboration_type, skills, tags, team_size, \
             is_featured, featured_order \
             FROM collaborations WHERE 1=1",
        );
        push_timeline_filters(&mut qb, query, ("title", "brief_description"));
        push_timeline_order(&mut qb, query);

        let rows = qb
            .build_query_as::<Collaboration>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_partners(&self, query: &PartnerQuery) -> StoreResult<Vec<Partner>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, name, profile_image_url, cover_image_url, activity_field, region, \
             role, specialized_roles, tags, bio, rating, review_count, completed_projects, \
             is_online, is_verified, career, created_at \
             FROM partners WHERE 1=1",
        );
        if let Some(label) = &query.activity_label {
            qb.push(" AND activity_field ILIKE ")
                .push_bind(like_pattern(label));
        }
        if let Some(search) = &query.search {
            let pattern = like_pattern(search);
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR bio ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(before) = query.created_before {
            qb.push(" AND created_at < ").push_bind(before);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ").push_bind(query.limit);

        let rows = qb
            .build_query_as::<Partner>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_brands(&self, query: &PartnerQuery) -> StoreResult<Vec<Brand>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT profile_id, brand_name, logo_image_url, cover_image_url, activity_field, \
             region, target_audiences, description, is_active, approval_status, created_at \
             FROM profile_brands WHERE is_active = TRUE",
        );
        if !query.include_unapproved_brands {
            qb.push(" AND approval_status = ").push_bind("approved");
        }
        if let Some(label) = &query.activity_label {
            qb.push(" AND activity_field ILIKE ")
                .push_bind(like_pattern(label));
        }
        if let Some(search) = &query.search {
            let pattern = like_pattern(search);
            qb.push(" AND (brand_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(before) = query.created_before {
            qb.push(" AND created_at < ").push_bind(before);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ").push_bind(query.limit);

        let rows = qb.build_query_as::<Brand>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn partners_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Partner>> {
        let rows = sqlx::query_as::<_, Partner>(
            "SELECT id, name, profile_image_url, cover_image_url, activity_field, region, \
             role, specialized_roles, tags, bio, rating, review_count, completed_projects, \
             is_online, is_verified, career, created_at \
             FROM partners WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn brands_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Brand>> {
        let rows = sqlx::query_as::<_, Brand>(
            "SELECT profile_id, brand_name, logo_image_url, cover_image_url, activity_field, \
             region, target_audiences, description, is_active, approval_status, created_at \
             FROM profile_brands WHERE profile_id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn active_boosts(&self, now: DateTime<Utc>, limit: i64) -> StoreResult<Vec<Boost>> {
        let rows = sqlx::query_as::<_, Boost>(
            "SELECT user_id, rank_position, ends_at \
             FROM explore_boosts WHERE ends_at > $1 \
             ORDER BY rank_position ASC LIMIT $2",
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn excluded_content_ids(
        &self,
        viewer_id: &str,
        kind: ContentKind,
    ) -> StoreResult<Vec<String>> {
        let sql = match kind {
            ContentKind::Project => {
                "SELECT project_id FROM user_project_preferences \
                 WHERE profile_id = $1 AND status IN ('hidden', 'blocked')"
            }
            ContentKind::Collaboration => {
                "SELECT collaboration_id FROM user_collaboration_preferences \
                 WHERE profile_id = $1 AND status IN ('hidden', 'blocked')"
            }
            ContentKind::Partner => {
                "SELECT partner_id FROM user_partner_preferences \
                 WHERE profile_id = $1 AND status IN ('hidden', 'blocked')"
            }
        };
        let ids = sqlx::query_scalar::<_, String>(sql)
            .bind(viewer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    async fn blocked_author_ids(&self, viewer_id: &str) -> StoreResult<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT partner_id FROM user_partner_preferences \
             WHERE profile_id = $1 AND status = 'blocked'",
        )
        .bind(viewer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
