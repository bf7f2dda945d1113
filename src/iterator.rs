use crate::r#trait::SpotifyClient;
use crate::{ArtistItem, IngestConfig, Result};

use async_trait::async_trait;
use std::collections::VecDeque;

/// Async iterator trait for paginated Spotify data.
///
/// Implementations fetch pages lazily as items are consumed.
#[async_trait(?Send)]
pub trait AsyncPaginatedIterator<T> {
    /// Fetch the next item from the iterator.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(item))` - Next item in the sequence
    /// - `Ok(None)` - No more items available
    /// - `Err(...)` - Network or parsing error occurred
    async fn next(&mut self) -> Result<Option<T>>;

    /// Collect all remaining items into a Vec.
    async fn collect_all(&mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Take up to n items from the iterator.
    async fn take(&mut self, n: usize) -> Result<Vec<T>> {
        let mut items = Vec::new();
        for _ in 0..n {
            match self.next().await? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(items)
    }

    /// Number of pages fetched so far.
    fn pages_fetched(&self) -> u32;

    /// Total number of results, if known.
    ///
    /// Not available until at least one page has been fetched.
    fn total(&self) -> Option<u32> {
        None
    }
}

/// Iterator over every artist a search query returns, across pages.
///
/// A further page is requested only while the previous page had a `next`
/// link and was non-empty, fewer than `max_pages` pages have been fetched,
/// and the next offset stays below `max_offset`. Those bounds make the
/// iteration finite even against a server that always reports `next`.
pub struct ArtistSearchIterator<'a, C: SpotifyClient + ?Sized> {
    client: &'a C,
    query: String,
    next_offset: u32,
    max_pages: u32,
    max_offset: u32,
    pages_fetched: u32,
    total: Option<u32>,
    has_more: bool,
    buffer: VecDeque<ArtistItem>,
}

impl<'a, C: SpotifyClient + ?Sized> ArtistSearchIterator<'a, C> {
    pub fn new(client: &'a C, query: impl Into<String>, config: &IngestConfig) -> Self {
        Self {
            client,
            query: query.into(),
            next_offset: 0,
            max_pages: config.max_pages,
            max_offset: config.max_offset,
            pages_fetched: 0,
            total: None,
            has_more: true,
            buffer: VecDeque::new(),
        }
    }

    fn may_fetch(&self) -> bool {
        self.has_more && self.pages_fetched < self.max_pages && self.next_offset < self.max_offset
    }

    async fn fetch_next_page(&mut self) -> Result<()> {
        let page = self
            .client
            .search_artists(&self.query, self.next_offset)
            .await?;
        let results = page.artists;
        self.pages_fetched += 1;
        self.total = Some(results.total);

        log::debug!(
            "Fetched page {} for '{}': {} items at offset {} (total {})",
            self.pages_fetched,
            self.query,
            results.items.len(),
            results.offset,
            results.total
        );

        let next_offset = u32::try_from(results.items.len())
            .ok()
            .and_then(|count| results.offset.checked_add(count));
        self.has_more = results.next.is_some() && !results.items.is_empty();
        match next_offset {
            Some(offset) => self.next_offset = offset,
            None => {
                log::debug!(
                    "Offset {} for '{}' cannot advance further, stopping",
                    results.offset,
                    self.query
                );
                self.has_more = false;
            }
        }
        self.buffer.extend(results.items);
        Ok(())
    }
}

#[async_trait(?Send)]
impl<'a, C: SpotifyClient + ?Sized> AsyncPaginatedIterator<ArtistItem>
    for ArtistSearchIterator<'a, C>
{
    async fn next(&mut self) -> Result<Option<ArtistItem>> {
        while self.buffer.is_empty() {
            if !self.may_fetch() {
                return Ok(None);
            }
            self.fetch_next_page().await?;
        }
        Ok(self.buffer.pop_front())
    }

    fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    fn total(&self) -> Option<u32> {
        self.total
    }
}
