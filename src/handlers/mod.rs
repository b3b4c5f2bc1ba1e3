pub mod feed;

pub use feed::explore_feed;
