//! End-to-end aggregation tests over the in-memory store: page ordering,
//! cursor chaining, the boost overlay, and the partner merge.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use explore_service::cursor;
use explore_service::models::{Boost, Brand, Collaboration, FeedTab, Partner, Project};
use explore_service::services::{ExploreQuery, FeedAggregator};
use explore_service::store::{ContentKind, MemoryStore};

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn project(id: &str, author: &str, secs: i64) -> Project {
    Project {
        id: id.to_string(),
        title: format!("project {}", id),
        description: String::new(),
        cover_image_url: None,
        created_by: author.to_string(),
        created_at: ts(secs),
        category: "music".to_string(),
        status: "open".to_string(),
        tags: Vec::new(),
        skills: Vec::new(),
        budget_range: None,
        deadline: None,
        team_size: None,
        is_featured: false,
        featured_order: None,
        is_mine: false,
    }
}

fn featured_project(id: &str, author: &str, secs: i64, order: Option<i32>) -> Project {
    let mut p = project(id, author, secs);
    p.is_featured = true;
    p.featured_order = order;
    p
}

fn collaboration(id: &str, author: &str, secs: i64) -> Collaboration {
    Collaboration {
        id: id.to_string(),
        title: format!("collab {}", id),
        brief_description: String::new(),
        description: String::new(),
        cover_image_url: None,
        created_by: author.to_string(),
        created_at: ts(secs),
        category: "music".to_string(),
        status: "open".to_string(),
        collaboration_type: None,
        skills: Vec::new(),
        tags: Vec::new(),
        team_size: None,
        is_featured: false,
        featured_order: None,
        is_mine: false,
    }
}

fn partner(id: &str, secs: i64) -> Partner {
    Partner {
        id: id.to_string(),
        name: format!("partner {}", id),
        profile_image_url: None,
        cover_image_url: None,
        activity_field: "Music".to_string(),
        region: String::new(),
        role: "artist".to_string(),
        specialized_roles: Vec::new(),
        tags: Vec::new(),
        bio: String::new(),
        rating: None,
        review_count: 0,
        completed_projects: 0,
        is_online: false,
        is_verified: false,
        career: String::new(),
        created_at: ts(secs),
    }
}

fn brand(id: &str, secs: i64, approval_status: &str) -> Brand {
    Brand {
        profile_id: id.to_string(),
        brand_name: format!("brand {}", id),
        logo_image_url: None,
        cover_image_url: None,
        activity_field: "Music".to_string(),
        region: None,
        target_audiences: Vec::new(),
        description: None,
        is_active: true,
        approval_status: approval_status.to_string(),
        created_at: ts(secs),
    }
}

fn boost(user_id: &str, rank: i32) -> Boost {
    Boost {
        user_id: user_id.to_string(),
        rank_position: rank,
        ends_at: Utc::now() + Duration::hours(1),
    }
}

fn anonymous_query(limit: i64) -> ExploreQuery {
    ExploreQuery {
        statuses: vec!["open".to_string(), "in_progress".to_string()],
        limit,
        ..Default::default()
    }
}

#[tokio::test]
async fn first_page_returns_newest_two_with_cursor() {
    let store = Arc::new(MemoryStore::new());
    store.add_project(project("p1", "u1", 100));
    store.add_project(project("p2", "u1", 200));
    store.add_project(project("p3", "u1", 300));

    let aggregator = FeedAggregator::new(store);
    let feed = aggregator
        .aggregate(&ExploreQuery {
            statuses: vec!["open".to_string()],
            limit: 2,
            ..Default::default()
        })
        .await;

    let ids: Vec<&str> = feed.projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p3", "p2"]);
    // Cursor sits one millisecond below the oldest returned row.
    assert_eq!(feed.cursors.projects, Some(ts(200) - Duration::milliseconds(1)));
    assert!(feed.legacy_cursor.is_some());
}

#[tokio::test]
async fn second_page_drains_the_remainder() {
    let store = Arc::new(MemoryStore::new());
    store.add_project(project("p1", "u1", 100));
    store.add_project(project("p2", "u1", 200));
    store.add_project(project("p3", "u1", 300));

    let aggregator = FeedAggregator::new(store.clone());
    let first = aggregator
        .aggregate(&ExploreQuery {
            statuses: vec!["open".to_string()],
            limit: 2,
            ..Default::default()
        })
        .await;

    let second = aggregator
        .aggregate(&ExploreQuery {
            statuses: vec!["open".to_string()],
            limit: 2,
            projects_cursor: first.cursors.projects,
            ..Default::default()
        })
        .await;

    let ids: Vec<&str> = second.projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1"]);
    assert_eq!(second.cursors.projects, None);
}

#[tokio::test]
async fn authenticated_first_page_puts_own_items_first() {
    let store = Arc::new(MemoryStore::new());
    // The viewer's project is the oldest, yet leads the page.
    store.add_project(project("mine", "viewer", 50));
    store.add_project(project("o1", "someone", 400));
    store.add_project(project("o2", "someone", 300));

    let aggregator = FeedAggregator::new(store);
    let feed = aggregator
        .aggregate(&ExploreQuery {
            limit: 3,
            viewer_id: Some("viewer".to_string()),
            ..Default::default()
        })
        .await;

    let ids: Vec<&str> = feed.projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["mine", "o1", "o2"]);
    assert!(feed.projects[0].is_mine);
    assert!(!feed.projects[1].is_mine);
    // The others probe came back short of the limit, so no cursor is emitted
    // even though it anchored to o2.
    assert_eq!(feed.cursors.projects, None);
}

#[tokio::test]
async fn page_one_priority_order_with_featured() {
    let store = Arc::new(MemoryStore::new());
    store.add_project(project("mine", "viewer", 10));
    store.add_project(featured_project("star", "someone", 20, Some(1)));
    for i in 0..4 {
        store.add_project(project(&format!("o{}", i), "someone", 500 - i));
    }

    let aggregator = FeedAggregator::new(store);
    let feed = aggregator
        .aggregate(&ExploreQuery {
            limit: 4,
            viewer_id: Some("viewer".to_string()),
            ..Default::default()
        })
        .await;

    let ids: Vec<&str> = feed.projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["mine", "star", "o0", "o1"]);
    assert_eq!(feed.projects.len(), 4);
    // Others probe saturated, so pagination continues.
    assert!(feed.cursors.projects.is_some());
}

#[tokio::test]
async fn cursor_chain_never_repeats_an_item() {
    let store = Arc::new(MemoryStore::new());
    for i in 0..7 {
        store.add_project(project(&format!("p{}", i), "u1", 1_000 + i * 10));
        store.add_collaboration(collaboration(&format!("c{}", i), "u1", 2_000 + i * 10));
    }

    let aggregator = FeedAggregator::new(store);
    let mut seen_projects: Vec<String> = Vec::new();
    let mut seen_collaborations: Vec<String> = Vec::new();
    let mut query = anonymous_query(3);

    for _ in 0..5 {
        let feed = aggregator.aggregate(&query).await;
        for p in &feed.projects {
            assert!(!seen_projects.contains(&p.id), "repeated project {}", p.id);
            seen_projects.push(p.id.clone());
        }
        for c in &feed.collaborations {
            assert!(
                !seen_collaborations.contains(&c.id),
                "repeated collaboration {}",
                c.id
            );
            seen_collaborations.push(c.id.clone());
        }
        // Ordering within one type is non-increasing across the whole chain.
        if feed.cursors.projects.is_none() && feed.cursors.collaborations.is_none() {
            break;
        }
        query.projects_cursor = feed.cursors.projects;
        query.collaborations_cursor = feed.cursors.collaborations;
    }

    assert_eq!(seen_projects.len(), 7);
    assert_eq!(seen_collaborations.len(), 7);
}

#[tokio::test]
async fn exhausted_cursor_yields_empty_page_and_no_cursor() {
    let store = Arc::new(MemoryStore::new());
    store.add_project(project("p1", "u1", 100));

    let aggregator = FeedAggregator::new(store);
    // Cursor below the oldest row: nothing left to serve.
    let mut query = anonymous_query(2);
    query.projects_cursor = Some(ts(50));
    query.collaborations_cursor = Some(ts(50));
    query.partners_cursor = Some(ts(50));

    let feed = aggregator.aggregate(&query).await;
    assert!(feed.projects.is_empty());
    assert!(feed.collaborations.is_empty());
    assert!(feed.partners.is_empty());
    assert_eq!(feed.cursors.projects, None);
    assert_eq!(feed.legacy_cursor, None);
}

#[tokio::test]
async fn partners_and_brands_merge_newest_first() {
    let store = Arc::new(MemoryStore::new());
    store.add_partner(partner("a", 300));
    store.add_partner(partner("b", 100));
    store.add_brand(brand("acme", 200, "approved"));

    let aggregator = FeedAggregator::new(store);
    let feed = aggregator.aggregate(&anonymous_query(10)).await;

    let ids: Vec<&str> = feed.partners.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "acme", "b"]);
    assert_eq!(feed.partners[1].role, "brand");
}

#[tokio::test]
async fn anonymous_viewer_sees_only_approved_brands() {
    let store = Arc::new(MemoryStore::new());
    store.add_brand(brand("approved", 200, "approved"));
    store.add_brand(brand("pending", 300, "pending"));

    let aggregator = FeedAggregator::new(store.clone());

    let anonymous = aggregator.aggregate(&anonymous_query(10)).await;
    let ids: Vec<&str> = anonymous.partners.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["approved"]);

    let authenticated = aggregator
        .aggregate(&ExploreQuery {
            limit: 10,
            viewer_id: Some("viewer".to_string()),
            ..Default::default()
        })
        .await;
    let ids: Vec<&str> = authenticated.partners.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["pending", "approved"]);
}

#[tokio::test]
async fn boosted_partner_appears_once_at_its_rank() {
    let store = Arc::new(MemoryStore::new());
    // "b" is both boosted and present in the normal scan.
    store.add_partner(partner("a", 400));
    store.add_partner(partner("b", 300));
    store.add_partner(partner("c", 200));
    store.add_boost(boost("b", 1));
    store.add_boost(boost("c", 2));

    let aggregator = FeedAggregator::new(store);
    let feed = aggregator.aggregate(&anonymous_query(10)).await;

    let ids: Vec<&str> = feed.partners.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);
}

#[tokio::test]
async fn boost_of_a_brand_resolves_through_the_brand_table() {
    let store = Arc::new(MemoryStore::new());
    store.add_partner(partner("a", 400));
    store.add_brand(brand("acme", 100, "approved"));
    store.add_boost(boost("acme", 1));

    let aggregator = FeedAggregator::new(store);
    let feed = aggregator.aggregate(&anonymous_query(10)).await;

    let ids: Vec<&str> = feed.partners.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["acme", "a"]);
    assert_eq!(feed.partners[0].role, "brand");
}

#[tokio::test]
async fn hidden_and_blocked_preferences_filter_each_type() {
    let store = Arc::new(MemoryStore::new());
    store.add_project(project("visible", "u1", 300));
    store.add_project(project("hidden-project", "u1", 200));
    store.add_partner(partner("blocked-partner", 100));
    store.add_partner(partner("ok-partner", 90));
    store.add_preference("viewer", "hidden-project", ContentKind::Project, "hidden");
    store.add_preference("viewer", "blocked-partner", ContentKind::Partner, "blocked");

    let aggregator = FeedAggregator::new(store);
    let feed = aggregator
        .aggregate(&ExploreQuery {
            limit: 10,
            viewer_id: Some("viewer".to_string()),
            ..Default::default()
        })
        .await;

    let project_ids: Vec<&str> = feed.projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(project_ids, vec!["visible"]);
    let partner_ids: Vec<&str> = feed.partners.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(partner_ids, vec!["ok-partner"]);
}

#[tokio::test]
async fn blocked_author_content_is_removed_from_timelines() {
    let store = Arc::new(MemoryStore::new());
    store.add_project(project("ok", "friendly", 300));
    store.add_project(project("bad", "hostile", 200));
    store.add_collaboration(collaboration("also-bad", "hostile", 100));
    store.add_preference("viewer", "hostile", ContentKind::Partner, "blocked");

    let aggregator = FeedAggregator::new(store);
    let feed = aggregator
        .aggregate(&ExploreQuery {
            limit: 10,
            viewer_id: Some("viewer".to_string()),
            ..Default::default()
        })
        .await;

    let project_ids: Vec<&str> = feed.projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(project_ids, vec!["ok"]);
    assert!(feed.collaborations.is_empty());
}

#[tokio::test]
async fn category_filters_timelines_and_partner_label() {
    let store = Arc::new(MemoryStore::new());
    store.add_project(project("music-project", "u1", 300));
    let mut tech = project("tech-project", "u1", 200);
    tech.category = "tech".to_string();
    store.add_project(tech);
    store.add_partner(partner("musician", 100));
    let mut designer = partner("designer", 90);
    designer.activity_field = "Design".to_string();
    store.add_partner(designer);

    let aggregator = FeedAggregator::new(store);
    let feed = aggregator
        .aggregate(&ExploreQuery {
            category: Some("music".to_string()),
            statuses: vec!["open".to_string()],
            limit: 10,
            ..Default::default()
        })
        .await;

    let project_ids: Vec<&str> = feed.projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(project_ids, vec!["music-project"]);
    let partner_ids: Vec<&str> = feed.partners.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(partner_ids, vec!["musician"]);
}

#[tokio::test]
async fn status_filter_is_applied_to_timelines() {
    let store = Arc::new(MemoryStore::new());
    store.add_project(project("open-project", "u1", 300));
    let mut done = project("done-project", "u1", 200);
    done.status = "completed".to_string();
    store.add_project(done);

    let aggregator = FeedAggregator::new(store);
    let feed = aggregator
        .aggregate(&ExploreQuery {
            statuses: vec!["open".to_string(), "in_progress".to_string()],
            limit: 10,
            ..Default::default()
        })
        .await;

    let ids: Vec<&str> = feed.projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["open-project"]);
}

#[tokio::test]
async fn search_filters_every_type_ignoring_case() {
    let store = Arc::new(MemoryStore::new());
    let mut p = project("p-hit", "u1", 300);
    p.title = "Jazz Night".to_string();
    store.add_project(p);
    store.add_project(project("p-miss", "u1", 200));

    let mut c = collaboration("c-hit", "u1", 300);
    c.brief_description = "jazz collective".to_string();
    store.add_collaboration(c);
    store.add_collaboration(collaboration("c-miss", "u1", 200));

    let mut a = partner("a-hit", 300);
    a.bio = "jazz improv".to_string();
    store.add_partner(a);
    store.add_partner(partner("a-miss", 200));

    let mut b = brand("b-hit", 100, "approved");
    b.description = Some("jazz label".to_string());
    store.add_brand(b);

    let aggregator = FeedAggregator::new(store);
    let mut query = anonymous_query(10);
    query.search = Some("JAZZ".to_string());
    let feed = aggregator.aggregate(&query).await;

    let project_ids: Vec<&str> = feed.projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(project_ids, vec!["p-hit"]);
    let collaboration_ids: Vec<&str> =
        feed.collaborations.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(collaboration_ids, vec!["c-hit"]);
    let partner_ids: Vec<&str> = feed.partners.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(partner_ids, vec!["a-hit", "b-hit"]);
}

#[tokio::test]
async fn search_without_matches_yields_empty_pages_and_no_cursors() {
    let store = Arc::new(MemoryStore::new());
    store.add_project(project("p1", "u1", 300));
    store.add_collaboration(collaboration("c1", "u1", 200));
    store.add_partner(partner("a1", 100));

    let aggregator = FeedAggregator::new(store);
    // limit 1 would paginate without the filter; the no-match search must
    // suppress both the items and every cursor.
    let mut query = anonymous_query(1);
    query.search = Some("no-such-term".to_string());
    let feed = aggregator.aggregate(&query).await;

    assert!(feed.projects.is_empty());
    assert!(feed.collaborations.is_empty());
    assert!(feed.partners.is_empty());
    assert_eq!(feed.cursors.projects, None);
    assert_eq!(feed.cursors.collaborations, None);
    assert_eq!(feed.cursors.partners, None);
    assert_eq!(feed.legacy_cursor, None);
}

#[tokio::test]
async fn active_only_mode_serves_a_single_tab() {
    let store = Arc::new(MemoryStore::new());
    store.add_project(project("p1", "u1", 300));
    store.add_collaboration(collaboration("c1", "u1", 200));
    store.add_partner(partner("a1", 100));

    let aggregator = FeedAggregator::new(store);
    let feed = aggregator
        .aggregate(&ExploreQuery {
            statuses: vec!["open".to_string()],
            limit: 10,
            active_tab: Some(FeedTab::Collaborations),
            fetch_mode: explore_service::models::FetchMode::ActiveOnly,
            ..Default::default()
        })
        .await;

    assert!(feed.projects.is_empty());
    assert_eq!(feed.collaborations.len(), 1);
    assert!(feed.partners.is_empty());
}

#[tokio::test]
async fn legacy_cursor_is_the_most_recent_per_type_cursor() {
    let store = Arc::new(MemoryStore::new());
    // Projects paginate (3 rows, limit 2); collaborations fit in one page.
    store.add_project(project("p1", "u1", 100));
    store.add_project(project("p2", "u1", 200));
    store.add_project(project("p3", "u1", 300));
    store.add_collaboration(collaboration("c1", "u1", 5_000));

    let aggregator = FeedAggregator::new(store);
    let feed = aggregator.aggregate(&anonymous_query(2)).await;

    assert!(feed.cursors.projects.is_some());
    assert_eq!(feed.cursors.collaborations, None);
    assert_eq!(feed.legacy_cursor, feed.cursors.projects);
}

#[tokio::test]
async fn cursor_roundtrips_through_the_wire_encoding() {
    let store = Arc::new(MemoryStore::new());
    store.add_project(project("p1", "u1", 100));
    store.add_project(project("p2", "u1", 200));
    store.add_project(project("p3", "u1", 300));

    let aggregator = FeedAggregator::new(store);
    let first = aggregator.aggregate(&anonymous_query(2)).await;
    let encoded = cursor::encode(first.cursors.projects.unwrap());
    let decoded = cursor::decode(&encoded).unwrap();

    let second = aggregator
        .aggregate(&ExploreQuery {
            statuses: vec!["open".to_string()],
            limit: 2,
            projects_cursor: Some(decoded),
            ..Default::default()
        })
        .await;
    let ids: Vec<&str> = second.projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1"]);
}
