//! GitHub API client and remote fetcher.
//!
//! This module implements the remote side of the poller via the octocrab
//! library:
//! - The `RunFetcher` trait, the seam the scheduler consumes
//! - `GitHubClient`, the octocrab-backed implementation
//! - Classification of API failures into the poller's error taxonomy

mod client;
mod error;
mod fetcher;

pub use client::{DEFAULT_PAGE_SIZE, GitHubClient};
pub use error::FetchError;
pub use fetcher::{RemoteRunSnapshot, RunFetcher};
