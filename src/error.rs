use thiserror::Error;

/// Error types for artist ingestion.
///
/// Errors fall into two groups. Client errors come from talking to the
/// Spotify Web API: network failures, authentication, rate limiting and
/// unparseable responses. Storage errors come from the artist sink.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use verse_ingest::{IngestError, SpotifyClient, SpotifyClientImpl, SpotifyCredentials};
///
/// #[tokio::main]
/// async fn main() {
///     let client = SpotifyClientImpl::new(
///         Box::new(http_client::native::NativeClient::new()),
///         SpotifyCredentials::access_token("token"),
///     );
///
///     match client.search_artists("radiohead", 0).await {
///         Ok(page) => println!("{} artists", page.artists.items.len()),
///         Err(IngestError::Auth(msg)) => eprintln!("Authentication failed: {}", msg),
///         Err(IngestError::RateLimit { retry_after }) => {
///             eprintln!("Rate limited, retry in {} seconds", retry_after);
///         }
///         Err(e) => eprintln!("Other error: {}", e),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum IngestError {
    /// HTTP/network related errors, including unexpected status codes.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication failures.
    ///
    /// Returned when the token endpoint rejects the client credentials or
    /// when the API answers 401 for an expired or revoked token.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Failed to parse a Spotify response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Rate limiting from Spotify.
    ///
    /// The `retry_after` field carries the `Retry-After` header value.
    #[error("Rate limited, retry after {retry_after} seconds")]
    RateLimit {
        /// Number of seconds to wait before retrying
        retry_after: u64,
    },

    /// The artist storage sink rejected a save or could not be read.
    #[error("Storage error: {0}")]
    Storage(String),

    /// File system I/O errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Whether this error came from the search client side.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            IngestError::Http(_)
                | IngestError::Auth(_)
                | IngestError::Parse(_)
                | IngestError::RateLimit { .. }
        )
    }

    /// Whether this error came from the storage sink.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, IngestError::Storage(_) | IngestError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(IngestError::Http("boom".to_string()).is_client_error());
        assert!(IngestError::RateLimit { retry_after: 3 }.is_client_error());
        assert!(!IngestError::Auth("bad".to_string()).is_storage_error());

        let io = IngestError::from(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(io.is_storage_error());
        assert!(!io.is_client_error());
        assert!(IngestError::Storage("full".to_string()).is_storage_error());
    }

    #[test]
    fn test_error_display() {
        let err = IngestError::RateLimit { retry_after: 30 };
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");
    }
}
