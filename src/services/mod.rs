pub mod aggregator;
pub mod boosts;
pub mod exclusions;
pub mod partners;
pub mod timeline;

pub use aggregator::{ExploreFeed, ExploreQuery, FeedAggregator};
pub use exclusions::Exclusions;
pub use timeline::{TimelineOptions, TimelinePage};
