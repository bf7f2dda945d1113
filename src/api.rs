use crate::headers::{add_api_headers, add_token_headers};
use crate::r#trait::SpotifyClient;
use crate::retry::retry_with_backoff;
use crate::types::{
    ClientConfig, ClientEvent, ClientEventReceiver, RequestInfo, SharedEventBroadcaster,
};
use crate::{IngestError, Result, SearchPage};
use async_trait::async_trait;
use http_client::{HttpClient, Request};
use http_types::{Method, Url};
use serde::Deserialize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const DEFAULT_API_BASE: &str = "https://api.spotify.com";
pub const DEFAULT_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// Tokens are refreshed this long before Spotify says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Used when a 429 arrives without a usable `Retry-After` header.
const DEFAULT_RETRY_AFTER: u64 = 60;

/// How the client authenticates against the Web API.
#[derive(Clone, PartialEq, Eq)]
pub enum SpotifyCredentials {
    /// Client-credentials flow; tokens are fetched and refreshed automatically
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
    /// A token issued elsewhere, used as is until the API rejects it
    AccessToken(String),
}

impl SpotifyCredentials {
    pub fn client_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self::ClientCredentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn access_token(token: impl Into<String>) -> Self {
        Self::AccessToken(token.into())
    }
}

impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .finish(),
            Self::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at
            .map_or(true, |at| Instant::now() + TOKEN_EXPIRY_MARGIN < at)
    }
}

/// Spotify Web API client backed by any [`HttpClient`].
///
/// # Examples
///
/// ```rust,no_run
/// use verse_ingest::{SpotifyClient, SpotifyClientImpl, SpotifyCredentials};
///
/// # tokio_test::block_on(async {
/// let client = SpotifyClientImpl::new(
///     Box::new(http_client::native::NativeClient::new()),
///     SpotifyCredentials::client_credentials("client-id", "client-secret"),
/// );
///
/// let page = client.search_artists("radiohead", 0).await?;
/// for artist in page.artists.items {
///     println!("{} ({})", artist.name, artist.popularity);
/// }
/// # Ok::<(), verse_ingest::IngestError>(())
/// # });
/// ```
#[derive(Clone)]
pub struct SpotifyClientImpl {
    client: Arc<dyn HttpClient + Send + Sync>,
    credentials: SpotifyCredentials,
    config: ClientConfig,
    api_base: String,
    accounts_base: String,
    token: Arc<Mutex<Option<CachedToken>>>,
    broadcaster: Arc<SharedEventBroadcaster>,
}

impl SpotifyClientImpl {
    pub fn new(client: Box<dyn HttpClient + Send + Sync>, credentials: SpotifyCredentials) -> Self {
        Self::with_config(client, credentials, ClientConfig::default())
    }

    pub fn with_config(
        client: Box<dyn HttpClient + Send + Sync>,
        credentials: SpotifyCredentials,
        config: ClientConfig,
    ) -> Self {
        let token = match &credentials {
            SpotifyCredentials::AccessToken(value) => Some(CachedToken {
                value: value.clone(),
                expires_at: None,
            }),
            SpotifyCredentials::ClientCredentials { .. } => None,
        };

        Self {
            client: Arc::from(client),
            credentials,
            config,
            api_base: DEFAULT_API_BASE.to_string(),
            accounts_base: DEFAULT_ACCOUNTS_BASE.to_string(),
            token: Arc::new(Mutex::new(token)),
            broadcaster: Arc::new(SharedEventBroadcaster::new()),
        }
    }

    /// Point the client at different API and accounts hosts.
    pub fn with_base_urls(
        mut self,
        api_base: impl Into<String>,
        accounts_base: impl Into<String>,
    ) -> Self {
        self.api_base = api_base.into();
        self.accounts_base = accounts_base.into();
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn subscribe(&self) -> ClientEventReceiver {
        self.broadcaster.subscribe()
    }

    pub fn latest_event(&self) -> Option<ClientEvent> {
        self.broadcaster.latest_event()
    }

    fn cached_token(&self) -> Option<String> {
        let guard = self.token.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .filter(|token| token.is_fresh())
            .map(|token| token.value.clone())
    }

    fn store_token(&self, token: Option<CachedToken>) {
        *self.token.lock().unwrap_or_else(|e| e.into_inner()) = token;
    }

    async fn access_token(&self) -> Result<String> {
        if let Some(token) = self.cached_token() {
            return Ok(token);
        }

        match &self.credentials {
            SpotifyCredentials::AccessToken(_) => Err(IngestError::Auth(
                "Access token was rejected and cannot be refreshed".to_string(),
            )),
            SpotifyCredentials::ClientCredentials {
                client_id,
                client_secret,
            } => {
                let response = self.request_token(client_id, client_secret).await?;
                let expires_at =
                    Instant::now().checked_add(Duration::from_secs(response.expires_in));
                if expires_at.is_none() {
                    log::debug!(
                        "Token lifetime of {}s is out of range, keeping it until rejected",
                        response.expires_in
                    );
                }
                self.store_token(Some(CachedToken {
                    value: response.access_token.clone(),
                    expires_at,
                }));
                self.broadcaster.broadcast_event(ClientEvent::TokenRefreshed {
                    expires_in: response.expires_in,
                });
                Ok(response.access_token)
            }
        }
    }

    async fn request_token(&self, client_id: &str, client_secret: &str) -> Result<TokenResponse> {
        let url = format!("{}/api/token", self.accounts_base.trim_end_matches('/'))
            .parse::<Url>()
            .map_err(|e| IngestError::Parse(format!("Invalid accounts URL: {e}")))?;

        log::debug!("Requesting client-credentials token from {url}");

        let mut request = Request::new(Method::Post, url);
        add_token_headers(&mut request, client_id, client_secret);
        request.set_body("grant_type=client_credentials");

        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| IngestError::Http(e.to_string()))?;

        let status: u16 = response.status().into();
        let body = response
            .body_string()
            .await
            .map_err(|e| IngestError::Http(e.to_string()))?;

        match status {
            200..=299 => parse_token_response(&body),
            400 | 401 => {
                let message = parse_error_message(&body)
                    .unwrap_or_else(|| format!("token request rejected ({status})"));
                Err(IngestError::Auth(message))
            }
            _ => Err(IngestError::Http(format!("{status}: {}", excerpt(&body)))),
        }
    }

    fn can_refresh_token(&self) -> bool {
        matches!(
            self.credentials,
            SpotifyCredentials::ClientCredentials { .. }
        )
    }

    /// One search attempt. A 401 is answered with a single re-authentication
    /// when the credentials allow fetching a new token.
    async fn search_once(&self, query: &str, offset: u32) -> Result<SearchPage> {
        let token = self.access_token().await?;
        match self.send_search(&token, query, offset).await {
            Err(IngestError::Auth(message)) if self.can_refresh_token() => {
                log::info!("Access token rejected ({message}), requesting a new one");
                let token = self.access_token().await?;
                self.send_search(&token, query, offset).await
            }
            outcome => outcome,
        }
    }

    async fn send_search(&self, token: &str, query: &str, offset: u32) -> Result<SearchPage> {
        let url = build_search_url(&self.api_base, query, self.config.page_limit, offset)?;

        let request_info = RequestInfo::from_url_and_method(&url, "GET");
        let request_start = Instant::now();

        self.broadcaster.broadcast_event(ClientEvent::RequestStarted {
            request: request_info.clone(),
        });

        let mut request = Request::new(Method::Get, url);
        add_api_headers(&mut request, token);

        let mut response = self
            .client
            .send(request)
            .await
            .map_err(|e| IngestError::Http(e.to_string()))?;

        let status: u16 = response.status().into();
        self.broadcaster.broadcast_event(ClientEvent::RequestCompleted {
            request: request_info.clone(),
            status_code: status,
            duration_ms: request_start.elapsed().as_millis() as u64,
        });

        match status {
            200..=299 => {
                let body = response
                    .body_string()
                    .await
                    .map_err(|e| IngestError::Http(e.to_string()))?;
                parse_search_response(&body)
            }
            401 => {
                log::debug!("Search answered 401, dropping cached token");
                self.store_token(None);
                Err(IngestError::Auth("Access token expired or invalid".to_string()))
            }
            429 => {
                let retry_after = response
                    .header("retry-after")
                    .and_then(|h| h.get(0))
                    .and_then(|v| v.as_str().trim().parse::<u64>().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER);
                self.broadcaster.broadcast_event(ClientEvent::RateLimited {
                    delay_seconds: retry_after,
                    request: Some(request_info),
                });
                Err(IngestError::RateLimit { retry_after })
            }
            _ => {
                let body = response.body_string().await.unwrap_or_default();
                let message = parse_error_message(&body).unwrap_or_else(|| excerpt(&body));
                Err(IngestError::Http(format!("{status}: {message}")))
            }
        }
    }
}

#[async_trait(?Send)]
impl SpotifyClient for SpotifyClientImpl {
    async fn search_artists(&self, query: &str, offset: u32) -> Result<SearchPage> {
        let outcome = retry_with_backoff(
            self.config.retry.clone(),
            "artist search",
            || self.search_once(query, offset),
            |delay, operation| {
                log::warn!("{operation} for '{query}' rate limited, sleeping {delay}s");
            },
        )
        .await?;
        Ok(outcome.result)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ApiErrorDetail {
    /// Web API style: `{"error": {"status": 400, "message": "..."}}`
    Object { message: String },
    /// Accounts style: `{"error": "invalid_client", "error_description": "..."}`
    Code(String),
}

/// Build the artist search URL for `query` starting at `offset`.
pub fn build_search_url(api_base: &str, query: &str, limit: u32, offset: u32) -> Result<Url> {
    format!(
        "{}/v1/search?q={}&type=artist&limit={}&offset={}",
        api_base.trim_end_matches('/'),
        urlencoding::encode(query),
        limit,
        offset
    )
    .parse::<Url>()
    .map_err(|e| IngestError::Parse(format!("Invalid search URL: {e}")))
}

pub fn parse_search_response(json: &str) -> Result<SearchPage> {
    serde_json::from_str(json).map_err(|e| IngestError::Parse(e.to_string()))
}

pub fn parse_token_response(json: &str) -> Result<TokenResponse> {
    serde_json::from_str(json).map_err(|e| IngestError::Parse(format!("token response: {e}")))
}

/// Pull a human-readable message out of a Spotify error body.
pub fn parse_error_message(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(description) = value.get("error_description").and_then(|d| d.as_str()) {
            return Some(description.to_string());
        }
    }
    let parsed: ApiErrorBody = serde_json::from_str(body).ok()?;
    Some(match parsed.error {
        ApiErrorDetail::Object { message } => message,
        ApiErrorDetail::Code(code) => code,
    })
}

fn excerpt(body: &str) -> String {
    body.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "artists": {
                "href": "https://api.spotify.com/v1/search?query=a&type=artist&limit=50&offset=0",
                "items": [
                    {"id": "1", "name": "Artist One", "genres": ["rock"], "popularity": 70},
                    {"id": "2", "name": "Artist Two", "genres": ["pop"], "popularity": 60}
                ],
                "limit": 50,
                "next": null,
                "offset": 0,
                "previous": null,
                "total": 2
            }
        }"#;

        let page = parse_search_response(json).unwrap();
        assert_eq!(page.artists.items.len(), 2);
        assert_eq!(page.artists.items[0].id, "1");
        assert_eq!(page.artists.items[1].genres, vec!["pop".to_string()]);
        assert_eq!(page.artists.total, 2);
        assert!(!page.has_next_page());
    }

    #[test]
    fn test_parse_search_response_with_extra_fields() {
        let json = r#"{
            "artists": {
                "href": "h",
                "items": [
                    {
                        "id": "4Z8W4fKeB5YxbusRsdQVPb",
                        "name": "Radiohead",
                        "type": "artist",
                        "uri": "spotify:artist:4Z8W4fKeB5YxbusRsdQVPb",
                        "followers": {"href": null, "total": 1000},
                        "images": []
                    }
                ],
                "limit": 1,
                "next": "https://api.spotify.com/v1/search?offset=1",
                "offset": 0,
                "previous": null,
                "total": 800
            }
        }"#;

        let page = parse_search_response(json).unwrap();
        let item = &page.artists.items[0];
        assert_eq!(item.name, "Radiohead");
        assert!(item.genres.is_empty());
        assert_eq!(item.popularity, 0);
        assert!(page.has_next_page());
    }

    #[test]
    fn test_parse_search_response_invalid() {
        assert!(matches!(
            parse_search_response("<html>"),
            Err(IngestError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_token_response() {
        let token = parse_token_response(
            r#"{"access_token": "abc", "token_type": "Bearer", "expires_in": 3600}"#,
        )
        .unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.expires_in, 3600);
    }

    #[test]
    fn test_parse_error_message() {
        assert_eq!(
            parse_error_message(r#"{"error": {"status": 400, "message": "Bad search"}}"#),
            Some("Bad search".to_string())
        );
        assert_eq!(
            parse_error_message(
                r#"{"error": "invalid_client", "error_description": "Invalid client secret"}"#
            ),
            Some("Invalid client secret".to_string())
        );
        assert_eq!(parse_error_message("not json"), None);
    }

    #[test]
    fn test_build_search_url_encodes_query() {
        let url =
            build_search_url("https://api.spotify.com/", "genre:\"hip hop\"", 50, 100).unwrap();
        assert_eq!(url.path(), "/v1/search");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "genre:\"hip hop\"".to_string()),
                ("type".to_string(), "artist".to_string()),
                ("limit".to_string(), "50".to_string()),
                ("offset".to_string(), "100".to_string()),
            ]
        );
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = SpotifyCredentials::client_credentials("id", "super-secret");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("id"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn test_cached_token_freshness() {
        let static_token = CachedToken {
            value: "t".to_string(),
            expires_at: None,
        };
        assert!(static_token.is_fresh());

        let nearly_expired = CachedToken {
            value: "t".to_string(),
            expires_at: Some(Instant::now() + Duration::from_secs(5)),
        };
        assert!(!nearly_expired.is_fresh());
    }
}
