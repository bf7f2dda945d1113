use crate::{Result, SearchPage};
use async_trait::async_trait;

/// Trait for the artist search capability the ingestion strategy depends on.
///
/// This is deliberately narrow so the strategy can be exercised without a
/// network. [`SpotifyClientImpl`](crate::SpotifyClientImpl) is the real
/// implementation.
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockSpotifyClient`
/// that implements this trait using the `mockall` library.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait(?Send)]
pub trait SpotifyClient {
    /// Search for artists matching `query`, starting at result `offset`.
    async fn search_artists(&self, query: &str, offset: u32) -> Result<SearchPage>;
}
