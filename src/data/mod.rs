//! Data ingestion
//!
//! Match history CSV loading and the live fixtures feed.

pub mod feed;
pub mod history;

pub use feed::{FeedClient, LiveFixture};
pub use history::HistorySource;
