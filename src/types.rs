//! Data types for Spotify artist ingestion.
//!
//! This module contains the core data structures used throughout the crate:
//! the artist value record, the search response shape, ingestion and client
//! configuration, and client event handling.

use http_types::Url;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};

// ================================================================================================
// ARTIST METADATA
// ================================================================================================

/// An artist as persisted by the ingestion pipeline.
///
/// Equality is structural: two artists built independently from the same
/// fields compare equal.
///
/// # Examples
///
/// ```rust
/// use verse_ingest::Artist;
///
/// let artist = Artist::new("1", "Artist One", vec!["rock".to_string()], 70);
/// assert_eq!(artist, Artist {
///     id: "1".to_string(),
///     name: "Artist One".to_string(),
///     genres: vec!["rock".to_string()],
///     popularity: 70,
/// });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Artist {
    /// Spotify artist id
    pub id: String,
    /// Display name
    pub name: String,
    /// Genres in the order Spotify reports them (may be empty)
    pub genres: Vec<String>,
    /// Spotify popularity score, 0-100
    pub popularity: u32,
}

impl Artist {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        genres: Vec<String>,
        popularity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            genres,
            popularity,
        }
    }
}

impl std::fmt::Display for Artist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.genres.is_empty() {
            write!(f, "{} ({})", self.name, self.id)
        } else {
            write!(
                f,
                "{} ({}) [{}]",
                self.name,
                self.id,
                self.genres.join(", ")
            )
        }
    }
}

impl From<ArtistItem> for Artist {
    fn from(item: ArtistItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            genres: item.genres,
            popularity: item.popularity,
        }
    }
}

// ================================================================================================
// SEARCH RESPONSES
// ================================================================================================

/// Top-level body of `GET /v1/search?type=artist`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub artists: ArtistSearchResults,
}

/// The paging object Spotify wraps artist results in.
///
/// Only `items` feeds ingestion; the pagination fields drive
/// [`ArtistSearchIterator`](crate::ArtistSearchIterator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistSearchResults {
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub items: Vec<ArtistItem>,
    #[serde(default)]
    pub limit: u32,
    pub next: Option<String>,
    #[serde(default)]
    pub offset: u32,
    pub previous: Option<String>,
    #[serde(default)]
    pub total: u32,
}

/// A single artist object in a search response.
///
/// Spotify sends more fields than these (followers, images, uri...); they are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: u32,
}

impl SearchPage {
    /// A page with the given items and no further pages.
    pub fn single(items: Vec<ArtistItem>) -> Self {
        let total = items.len() as u32;
        Self {
            artists: ArtistSearchResults {
                href: String::new(),
                limit: total,
                items,
                next: None,
                offset: 0,
                previous: None,
                total,
            },
        }
    }

    pub fn has_next_page(&self) -> bool {
        self.artists.next.is_some()
    }
}

// ================================================================================================
// INGESTION CONFIGURATION AND STATS
// ================================================================================================

/// Configuration for [`SearchIngestionStrategy`](crate::SearchIngestionStrategy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Maximum number of result pages fetched per query term
    pub max_pages: u32,
    /// Offsets at or above this are never requested (Spotify rejects >= 1000)
    pub max_offset: u32,
    /// Queue a `genre:"..."` query for every genre of a newly saved artist
    pub expand_genres: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_pages: 20,
            max_offset: 1000,
            expand_genres: false,
        }
    }
}

impl IngestConfig {
    /// Only ever look at the first page of each query
    pub fn single_page() -> Self {
        Self {
            max_pages: 1,
            ..Default::default()
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_max_offset(mut self, max_offset: u32) -> Self {
        self.max_offset = max_offset;
        self
    }

    pub fn with_genre_expansion(mut self, enabled: bool) -> Self {
        self.expand_genres = enabled;
        self
    }
}

/// Counters collected over one strategy's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    pub queries_processed: u32,
    pub pages_fetched: u32,
    pub artists_saved: u32,
    pub duplicates_skipped: u32,
    pub genre_queries_queued: u32,
}

impl std::fmt::Display for IngestStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} queries, {} pages, {} artists saved, {} duplicates skipped",
            self.queries_processed, self.pages_fetched, self.artists_saved, self.duplicates_skipped
        )?;
        if self.genre_queries_queued > 0 {
            write!(f, ", {} genre queries queued", self.genre_queries_queued)?;
        }
        Ok(())
    }
}

// ================================================================================================
// CLIENT CONFIGURATION
// ================================================================================================

/// Largest `limit` the search endpoint accepts.
pub const MAX_PAGE_LIMIT: u32 = 50;

/// Configuration for the HTTP search client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Retry configuration
    pub retry: RetryConfig,
    /// Results requested per search page (1..=50)
    pub page_limit: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            page_limit: MAX_PAGE_LIMIT,
        }
    }
}

impl ClientConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom retry configuration
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry = retry_config;
        self
    }

    /// Set custom retry count
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self.retry.enabled = max_retries > 0;
        self
    }

    /// Set the search page size, clamped to what Spotify accepts
    pub fn with_page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit.clamp(1, MAX_PAGE_LIMIT);
        self
    }
}

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (set to 0 to disable retries)
    pub max_retries: u32,
    /// Base delay for exponential backoff (in seconds)
    pub base_delay: u64,
    /// Maximum delay cap (in seconds)
    pub max_delay: u64,
    /// Whether retries are enabled at all
    pub enabled: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: 5,
            max_delay: 300, // 5 minutes
            enabled: true,
        }
    }
}

impl RetryConfig {
    /// Create a config with retries disabled
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            enabled: false,
            ..Default::default()
        }
    }

    /// Create a config with custom delays
    pub fn with_delays(base_delay: u64, max_delay: u64) -> Self {
        Self {
            base_delay,
            max_delay,
            ..Default::default()
        }
    }
}

/// Result of a retry operation with context
#[derive(Debug)]
pub struct RetryResult<T> {
    /// The successful result
    pub result: T,
    /// Number of retry attempts made
    pub attempts_made: u32,
    /// Total time spent retrying (in seconds)
    pub total_retry_time: u64,
}

// ================================================================================================
// EVENT SYSTEM
// ================================================================================================

/// Request information for client events
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestInfo {
    /// The HTTP method (GET, POST, etc.)
    pub method: String,
    /// The full URI being requested
    pub uri: String,
    /// Query parameters as key-value pairs
    pub query_params: Vec<(String, String)>,
    /// Path without query parameters
    pub path: String,
}

impl RequestInfo {
    /// Create RequestInfo from a URL and method
    pub fn from_url_and_method(url: &Url, method: &str) -> Self {
        Self {
            method: method.to_string(),
            uri: url.to_string(),
            query_params: url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            path: url.path().to_string(),
        }
    }

    /// Get a short description of the request for logging
    pub fn short_description(&self) -> String {
        let mut desc = format!("{} {}", self.method, self.path);
        if !self.query_params.is_empty() {
            let params: Vec<String> = self
                .query_params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            if params.len() <= 2 {
                desc.push_str(&format!("?{}", params.join("&")));
            } else {
                desc.push_str(&format!("?{}...", params[0]));
            }
        }
        desc
    }
}

/// Event type to describe internal HTTP client activity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ClientEvent {
    /// Request started
    RequestStarted {
        /// Request details
        request: RequestInfo,
    },
    /// Request completed (any status)
    RequestCompleted {
        /// Request details
        request: RequestInfo,
        /// HTTP status code
        status_code: u16,
        /// Duration of the request in milliseconds
        duration_ms: u64,
    },
    /// Spotify answered 429
    RateLimited {
        /// Seconds Spotify asked us to wait
        delay_seconds: u64,
        /// Request that triggered the rate limit
        request: Option<RequestInfo>,
    },
    /// A new access token was obtained
    TokenRefreshed {
        /// Token lifetime in seconds
        expires_in: u64,
    },
}

/// Type alias for the broadcast receiver
pub type ClientEventReceiver = broadcast::Receiver<ClientEvent>;

/// Shared event broadcasting state that persists across client clones
#[derive(Clone)]
pub struct SharedEventBroadcaster {
    event_tx: broadcast::Sender<ClientEvent>,
    last_event_tx: watch::Sender<Option<ClientEvent>>,
}

impl SharedEventBroadcaster {
    /// Create a new shared event broadcaster
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(100);
        let (last_event_tx, _) = watch::channel(None);

        Self {
            event_tx,
            last_event_tx,
        }
    }

    /// Broadcast an event to all subscribers
    pub fn broadcast_event(&self, event: ClientEvent) {
        let _ = self.event_tx.send(event.clone());
        self.last_event_tx.send_replace(Some(event));
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> ClientEventReceiver {
        self.event_tx.subscribe()
    }

    /// Get the latest event
    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.last_event_tx.borrow().clone()
    }
}

impl Default for SharedEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedEventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEventBroadcaster")
            .field("subscribers", &self.event_tx.receiver_count())
            .finish()
    }
}

// ================================================================================================
// TESTS
// ================================================================================================
