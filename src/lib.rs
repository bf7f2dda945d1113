//! # verse-ingest
//!
//! Ingest artist records from the Spotify Web API search endpoint.
//!
//! The centre of the crate is [`SearchIngestionStrategy`]: it drains a
//! worklist of query terms, pages through the artist search results for each
//! one, skips artists whose id is already in a caller-owned visited-set, and
//! saves the rest through an [`ArtistStorage`] sink. Both collaborators are
//! traits ([`SpotifyClient`], [`ArtistStorage`]) so the strategy can run
//! against test doubles; with the `mock` feature, mockall-generated
//! `MockSpotifyClient` and `MockArtistStorage` are exported.

pub mod api;
pub mod commands;
pub mod error;
pub mod headers;
pub mod iterator;
pub mod retry;
pub mod storage;
pub mod strategy;
pub mod r#trait;
pub mod types;

pub use api::{SpotifyClientImpl, SpotifyCredentials};
pub use error::IngestError;
pub use iterator::{ArtistSearchIterator, AsyncPaginatedIterator};
pub use r#trait::SpotifyClient;
pub use storage::{ArtistRecord, ArtistStorage, JsonLinesStorage, MemoryStorage};
pub use strategy::SearchIngestionStrategy;
pub use types::{
    Artist, ArtistItem, ArtistSearchResults, ClientConfig, ClientEvent, ClientEventReceiver,
    IngestConfig, IngestStats, RequestInfo, RetryConfig, SearchPage,
};

#[cfg(feature = "mock")]
pub use r#trait::MockSpotifyClient;
#[cfg(feature = "mock")]
pub use storage::MockArtistStorage;

pub type Result<T> = std::result::Result<T, IngestError>;
