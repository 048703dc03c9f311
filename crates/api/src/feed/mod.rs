//! Sighting feed: HTTP client and the periodic poller that drives it.

mod client;
mod poller;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{BeaconFeed, FeedError, HttpBeaconFeed};
pub use poller::{FeedPoller, PollerStatus};
