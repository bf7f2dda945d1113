//! Search-driven artist ingestion.
//!
//! [`SearchIngestionStrategy`] drains a worklist of query terms, pages through
//! the artist search results for each term, and saves every artist it has not
//! seen before. The visited-set and the worklist belong to the caller and are
//! mutated in place, so the caller can inspect both once the run finishes or
//! carry them into another run.

use crate::iterator::{ArtistSearchIterator, AsyncPaginatedIterator};
use crate::r#trait::SpotifyClient;
use crate::storage::ArtistStorage;
use crate::{Artist, ArtistItem, IngestConfig, IngestStats, Result};

use std::collections::{HashSet, VecDeque};

/// Ingests artists for every term in a worklist.
///
/// # Examples
///
/// ```rust,no_run
/// use std::collections::{HashSet, VecDeque};
/// use verse_ingest::{
///     MemoryStorage, SearchIngestionStrategy, SpotifyClientImpl, SpotifyCredentials,
/// };
///
/// # tokio_test::block_on(async {
/// let client = SpotifyClientImpl::new(
///     Box::new(http_client::native::NativeClient::new()),
///     SpotifyCredentials::access_token("token"),
/// );
/// let mut storage = MemoryStorage::new();
/// let mut visited_ids = HashSet::new();
/// let mut to_process = VecDeque::from(["a".to_string()]);
///
/// SearchIngestionStrategy::new(&client, &mut storage, &mut visited_ids, &mut to_process)
///     .run()
///     .await?;
///
/// println!("{} artists ingested", visited_ids.len());
/// # Ok::<(), verse_ingest::IngestError>(())
/// # });
/// ```
pub struct SearchIngestionStrategy<'a, C: SpotifyClient + ?Sized, S: ArtistStorage + ?Sized> {
    client: &'a C,
    storage: &'a mut S,
    visited_ids: &'a mut HashSet<String>,
    to_process: &'a mut VecDeque<String>,
    config: IngestConfig,
    seen_genres: HashSet<String>,
    stats: IngestStats,
}

impl<'a, C: SpotifyClient + ?Sized, S: ArtistStorage + ?Sized> SearchIngestionStrategy<'a, C, S> {
    pub fn new(
        client: &'a C,
        storage: &'a mut S,
        visited_ids: &'a mut HashSet<String>,
        to_process: &'a mut VecDeque<String>,
    ) -> Self {
        Self {
            client,
            storage,
            visited_ids,
            to_process,
            config: IngestConfig::default(),
            seen_genres: HashSet::new(),
            stats: IngestStats::default(),
        }
    }

    pub fn with_config(mut self, config: IngestConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Every artist id seen so far, including any the caller seeded.
    pub fn visited_ids(&self) -> &HashSet<String> {
        self.visited_ids
    }

    /// Query terms not yet processed.
    pub fn pending(&self) -> &VecDeque<String> {
        self.to_process
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Process the worklist until it is empty.
    ///
    /// The first client or storage error aborts the run and is returned
    /// as is. Whatever was consumed or marked visited before the failure
    /// stays that way.
    pub async fn run(&mut self) -> Result<()> {
        while let Some(query) = self.to_process.pop_front() {
            log::info!(
                "Searching artists for '{query}' ({} terms pending)",
                self.to_process.len()
            );
            self.process_query(&query).await?;
            self.stats.queries_processed += 1;
        }

        log::info!("Ingestion finished: {}", self.stats);
        Ok(())
    }

    async fn process_query(&mut self, query: &str) -> Result<()> {
        let mut results = ArtistSearchIterator::new(self.client, query, &self.config);
        let outcome = self.drain(&mut results).await;
        self.stats.pages_fetched += results.pages_fetched();
        outcome
    }

    async fn drain(&mut self, results: &mut ArtistSearchIterator<'a, C>) -> Result<()> {
        while let Some(item) = results.next().await? {
            self.ingest_item(item).await?;
        }
        Ok(())
    }

    async fn ingest_item(&mut self, item: ArtistItem) -> Result<()> {
        if self.visited_ids.contains(&item.id) {
            log::debug!("Skipping already visited artist {}", item.id);
            self.stats.duplicates_skipped += 1;
            return Ok(());
        }

        let artist = Artist::from(item);
        self.visited_ids.insert(artist.id.clone());
        self.storage.save_artist(&artist).await?;
        self.stats.artists_saved += 1;
        log::debug!("Saved artist {artist}");

        if self.config.expand_genres {
            self.queue_genres(&artist);
        }
        Ok(())
    }

    fn queue_genres(&mut self, artist: &Artist) {
        for genre in &artist.genres {
            if self.seen_genres.insert(genre.clone()) {
                self.to_process.push_back(genre_query(genre));
                self.stats.genre_queries_queued += 1;
            }
        }
    }
}

/// Spotify field-filter query for a genre.
pub fn genre_query(genre: &str) -> String {
    format!("genre:\"{}\"", genre.replace('"', ""))
}
